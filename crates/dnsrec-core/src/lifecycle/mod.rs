//! Record lifecycle driver
//!
//! `RecordLifecycle` binds [`RecordReconciler`] outcomes to a [`StateStore`]:
//!
//! ```text
//!                ┌──────────────────┐
//!  RecordSpec ──▶│ RecordLifecycle  │
//!                └──────────────────┘
//!                   │            │
//!         plan/call │            │ write on success only
//!                   ▼            ▼
//!        ┌──────────────────┐  ┌─────────────┐
//!        │ RecordReconciler │  │ StateStore  │
//!        └──────────────────┘  └─────────────┘
//!                   │
//!                   ▼
//!           ZoneRecordApi
//! ```
//!
//! ## State transitions
//!
//! - `Absent → Present` on create or import
//! - `Present → Present` on update, refresh, or replacement
//! - `Present → Absent` on destroy, or when a read finds the record gone
//!
//! A failed call leaves the stored entry exactly as it was.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::plan::Plan;
use crate::reconciler::{ReadOutcome, RecordReconciler};
use crate::record::{RecordSpec, RecordState};
use crate::traits::{StateStore, ZoneRecordApi};

/// Result of [`RecordLifecycle::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The record did not exist and was created
    Created(RecordState),
    /// Mutable fields were updated in place
    Updated {
        /// State after the update
        state: RecordState,
        /// Attributes that were out of date
        changed: Vec<&'static str>,
    },
    /// The record was deleted and created again
    Replaced {
        /// State of the new record
        state: RecordState,
        /// Attribute that forced replacement
        reason: &'static str,
    },
    /// Tracked state already matched
    Unchanged(RecordState),
    /// The record disappeared before it could be read back
    Vanished,
}

impl ApplyOutcome {
    /// State tracked after the apply, if any
    pub fn state(&self) -> Option<&RecordState> {
        match self {
            ApplyOutcome::Created(state)
            | ApplyOutcome::Unchanged(state)
            | ApplyOutcome::Updated { state, .. }
            | ApplyOutcome::Replaced { state, .. } => Some(state),
            ApplyOutcome::Vanished => None,
        }
    }
}

/// Drives record resources through their lifecycle
///
/// Holds the API client, the account every call is made on behalf of, and
/// the state store. The reconciler is rebuilt for each call and borrows
/// the client and account from here.
pub struct RecordLifecycle {
    api: Box<dyn ZoneRecordApi>,
    account: String,
    state_store: Box<dyn StateStore>,
}

impl RecordLifecycle {
    /// Create a lifecycle driver
    pub fn new(
        api: Box<dyn ZoneRecordApi>,
        account: impl Into<String>,
        state_store: Box<dyn StateStore>,
    ) -> Self {
        Self {
            api,
            account: account.into(),
            state_store,
        }
    }

    fn reconciler(&self) -> RecordReconciler<'_> {
        RecordReconciler::new(self.api.as_ref(), &self.account)
    }

    /// The state store entries are written to
    pub fn state_store(&self) -> &dyn StateStore {
        self.state_store.as_ref()
    }

    /// Store a read outcome at `address`
    async fn record_outcome(&self, address: &str, outcome: &ReadOutcome) -> Result<()> {
        match outcome {
            ReadOutcome::Present(state) => self.state_store.put(address, state).await,
            ReadOutcome::Absent => self.state_store.remove(address).await,
        }
    }

    /// Create a record and track it at `address`
    ///
    /// The echoed state is stored before the read-back, so a failed read
    /// leaves the new ID tracked and the next refresh picks it up.
    async fn create_tracked(
        &self,
        address: &str,
        desired: &RecordSpec,
    ) -> Result<Option<RecordState>> {
        let reconciler = self.reconciler();
        let created = reconciler.create_unread(desired).await?;
        self.state_store.put(address, &created).await?;

        let read = reconciler.read(&created.id, &created.domain).await?;
        self.record_outcome(address, &read).await?;
        Ok(read.into_state())
    }

    /// Converge `address` on `desired`
    ///
    /// Tracked state is refreshed first so the plan is made against what the
    /// API currently holds.
    pub async fn apply(&self, address: &str, desired: &RecordSpec) -> Result<ApplyOutcome> {
        desired.validate()?;

        // refresh drops the entry if the record is gone
        let prior = self.refresh(address).await?.into_state();

        let plan = Plan::for_resource(prior.as_ref(), desired);
        info!("{}: plan {:?}", address, plan);

        let reconciler = self.reconciler();
        let outcome = match (plan, prior) {
            (Plan::NoChange, Some(state)) => return Ok(ApplyOutcome::Unchanged(state)),
            (Plan::Update { changed }, Some(state)) => {
                let read = reconciler.update(&state.id, &state.domain, desired).await?;
                self.record_outcome(address, &read).await?;
                read.into_state()
                    .map(|state| ApplyOutcome::Updated { state, changed })
            }
            (Plan::Replace { reason }, Some(state)) => {
                info!(
                    "{}: {} changed, replacing record {}",
                    address, reason, state.id
                );
                reconciler.delete(&state.id, &state.domain).await?;
                self.state_store.remove(address).await?;

                self.create_tracked(address, desired)
                    .await?
                    .map(|state| ApplyOutcome::Replaced { state, reason })
            }
            _ => self
                .create_tracked(address, desired)
                .await?
                .map(ApplyOutcome::Created),
        };

        Ok(outcome.unwrap_or_else(|| {
            warn!("{}: record vanished right after it was written", address);
            ApplyOutcome::Vanished
        }))
    }

    /// Re-read the record tracked at `address`
    ///
    /// An untracked address reads as [`ReadOutcome::Absent`]. A record that
    /// no longer exists remotely is dropped from the store.
    pub async fn refresh(&self, address: &str) -> Result<ReadOutcome> {
        let Some(entry) = self.state_store.get(address).await? else {
            debug!("{}: not tracked", address);
            return Ok(ReadOutcome::Absent);
        };

        let outcome = self
            .reconciler()
            .read(&entry.state.id, &entry.state.domain)
            .await?;
        self.record_outcome(address, &outcome).await?;

        if !outcome.is_present() {
            info!("{}: record {} is gone, no longer tracked", address, entry.state.id);
        }
        Ok(outcome)
    }

    /// Delete the record tracked at `address`
    ///
    /// Returns `false` when nothing was tracked. On failure the entry stays in
    /// the store.
    pub async fn destroy(&self, address: &str) -> Result<bool> {
        let Some(entry) = self.state_store.get(address).await? else {
            debug!("{}: nothing to destroy", address);
            return Ok(false);
        };

        self.reconciler()
            .delete(&entry.state.id, &entry.state.domain)
            .await?;
        self.state_store.remove(address).await?;

        info!("{}: destroyed record {}", address, entry.state.id);
        Ok(true)
    }

    /// Adopt the record named by a `DOMAIN_RECORDID` key at `address`
    pub async fn import(&self, address: &str, key: &str) -> Result<ReadOutcome> {
        if let Some(entry) = self.state_store.get(address).await? {
            return Err(Error::config(format!(
                "{} is already tracking record {}",
                address, entry.state.id
            )));
        }

        let outcome = self.reconciler().import(key).await?;
        if let ReadOutcome::Present(state) = &outcome {
            self.state_store.put(address, state).await?;
            info!("{}: imported record {}", address, state.id);
        } else {
            warn!("{}: record {} does not exist, nothing imported", address, key);
        }
        Ok(outcome)
    }

    /// Flush the state store
    pub async fn flush(&self) -> Result<()> {
        self.state_store.flush().await
    }
}
