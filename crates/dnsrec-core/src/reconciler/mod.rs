//! Record reconciler
//!
//! Maps a declared record onto imperative zone record API calls:
//!
//! ```text
//! RecordSpec ──translate──▶ ZoneRecordApi ──response──▶ RecordState
//!                                │
//!                                └── 404 on read ──▶ ReadOutcome::Absent
//! ```
//!
//! Create and Update finish with a Read so the returned state reflects what
//! the API stored, not what was requested.
//!
//! The reconciler borrows its API client and account for the duration of a
//! call and keeps nothing between calls. Writing outcomes to a state store
//! is the job of [`RecordLifecycle`](crate::lifecycle::RecordLifecycle).

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::{
    ImportKey, RecordSpec, RecordState, ZoneRecordAttributes, ZoneRecordUpdate, parse_record_id,
};
use crate::traits::ZoneRecordApi;

/// Result of an operation that ends in a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The record exists; its current attributes
    Present(RecordState),
    /// The record no longer exists remotely; drop it from state
    Absent,
}

impl ReadOutcome {
    /// The record state, if present
    pub fn state(&self) -> Option<&RecordState> {
        match self {
            ReadOutcome::Present(state) => Some(state),
            ReadOutcome::Absent => None,
        }
    }

    /// Consume the outcome, returning the state if present
    pub fn into_state(self) -> Option<RecordState> {
        match self {
            ReadOutcome::Present(state) => Some(state),
            ReadOutcome::Absent => None,
        }
    }

    /// Whether the record was found
    pub fn is_present(&self) -> bool {
        matches!(self, ReadOutcome::Present(_))
    }
}

/// Reconciles one record resource against a [`ZoneRecordApi`]
#[derive(Clone, Copy)]
pub struct RecordReconciler<'a> {
    api: &'a dyn ZoneRecordApi,
    account: &'a str,
}

impl<'a> RecordReconciler<'a> {
    /// Bind a reconciler to an API client and account
    pub fn new(api: &'a dyn ZoneRecordApi, account: &'a str) -> Self {
        Self { api, account }
    }

    /// Create the record and read it back
    ///
    /// The returned state carries the remote-assigned ID. Nothing is returned
    /// if the create call fails.
    pub async fn create(&self, desired: &RecordSpec) -> Result<ReadOutcome> {
        let created = self.create_unread(desired).await?;
        self.read(&created.id, &desired.domain).await
    }

    /// Create the record without reading it back
    ///
    /// Returns the state echoed by the create call. Callers that track
    /// identity should store it before reading, so the ID survives a failed
    /// read.
    pub async fn create_unread(&self, desired: &RecordSpec) -> Result<RecordState> {
        let attributes = ZoneRecordAttributes::from_spec(desired);
        debug!(
            "Record create configuration for zone {}: {:?}",
            desired.domain, attributes
        );

        let created = self
            .api
            .create_record(self.account, &desired.domain, &attributes)
            .await
            .map_err(Error::RemoteCreate)?;

        info!("Created {} record ID: {}", self.api.provider_name(), created.id);
        Ok(RecordState::from_response(&desired.domain, &created))
    }

    /// Read the record's current attributes
    ///
    /// A not-found answer is not an error: it yields [`ReadOutcome::Absent`]
    /// so the caller can drop the resource instead of failing.
    pub async fn read(&self, id: &str, domain: &str) -> Result<ReadOutcome> {
        let record_id = parse_record_id(id)?;
        info!("Reading record ID: {} in zone {}", record_id, domain);

        match self.api.get_record(self.account, domain, record_id).await {
            Ok(record) => {
                debug!("Raw record response: {:?}", record);
                Ok(ReadOutcome::Present(RecordState::from_response(
                    domain, &record,
                )))
            }
            Err(e) if e.is_not_found() => {
                warn!(
                    "Record {} not found in zone {}, removing from state",
                    record_id, domain
                );
                Ok(ReadOutcome::Absent)
            }
            Err(e) => Err(Error::RemoteRead(e)),
        }
    }

    /// Apply the mutable fields of `desired` and read the record back
    ///
    /// Only set fields are sent; see [`ZoneRecordUpdate::from_spec`].
    pub async fn update(&self, id: &str, domain: &str, desired: &RecordSpec) -> Result<ReadOutcome> {
        let record_id = parse_record_id(id)?;

        let update = ZoneRecordUpdate::from_spec(desired);
        debug!(
            "Record update configuration for {} in zone {}: {:?}",
            record_id, domain, update
        );

        self.api
            .update_record(self.account, domain, record_id, &update)
            .await
            .map_err(Error::RemoteUpdate)?;

        self.read(id, domain).await
    }

    /// Delete the record
    ///
    /// On error the caller must keep tracking the resource.
    pub async fn delete(&self, id: &str, domain: &str) -> Result<()> {
        info!("Deleting record: {}, {}", domain, id);
        let record_id = parse_record_id(id)?;

        self.api
            .delete_record(self.account, domain, record_id)
            .await
            .map_err(Error::RemoteDelete)
    }

    /// Adopt an existing record from a `DOMAIN_RECORDID` key
    ///
    /// The key is validated before any API call is made.
    pub async fn import(&self, key: &str) -> Result<ReadOutcome> {
        let key = ImportKey::parse(key)?;
        info!("Importing record {} from zone {}", key.id, key.domain);
        self.read(&key.id, &key.domain).await
    }
}
