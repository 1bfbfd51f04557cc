// # Zone Record API Trait
//
// Defines the interface the reconciler uses to reach a DNS provider's
// zone record endpoints.
//
// ## Implementations
//
// - DNSimple: `dnsrec-provider-dnsimple` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsrec_core::traits::ZoneRecordApi;
//
// let record = api.get_record("1010", "example.com", 1234).await?;
// println!("{} {}", record.record_type, record.content);
// ```

use async_trait::async_trait;

use crate::error::ApiError;
use crate::record::{ZoneRecord, ZoneRecordAttributes, ZoneRecordUpdate};

/// Trait for provider API clients
///
/// Every call names the account and the zone explicitly; an implementation
/// keeps no per-record state and may be shared across resource instances.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Contract
///
/// - One HTTP request per call
/// - No retries, no backoff, no caching
/// - A missing record is reported as [`ApiError::Status`] with status 404
/// - The API token never appears in logs or error messages
#[async_trait]
pub trait ZoneRecordApi: Send + Sync {
    /// Create a record in `zone`
    ///
    /// # Returns
    ///
    /// - `Ok(ZoneRecord)`: The stored record, including its new ID
    /// - `Err(ApiError)`: If the call failed
    async fn create_record(
        &self,
        account: &str,
        zone: &str,
        attributes: &ZoneRecordAttributes,
    ) -> Result<ZoneRecord, ApiError>;

    /// Fetch a record by ID
    ///
    /// # Returns
    ///
    /// - `Ok(ZoneRecord)`: The current record
    /// - `Err(ApiError)`: Status 404 if the record is gone, anything else on failure
    async fn get_record(
        &self,
        account: &str,
        zone: &str,
        record_id: i64,
    ) -> Result<ZoneRecord, ApiError>;

    /// Apply a sparse update to a record
    ///
    /// Fields left unset in `update` keep their current remote value.
    async fn update_record(
        &self,
        account: &str,
        zone: &str,
        record_id: i64,
        update: &ZoneRecordUpdate,
    ) -> Result<ZoneRecord, ApiError>;

    /// Delete a record
    async fn delete_record(
        &self,
        account: &str,
        zone: &str,
        record_id: i64,
    ) -> Result<(), ApiError>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing API clients from configuration
pub trait ZoneRecordApiFactory: Send + Sync {
    /// Create a client from provider configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn ZoneRecordApi>, crate::Error>;
}
