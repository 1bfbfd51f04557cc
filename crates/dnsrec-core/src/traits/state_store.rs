// # State Store Trait
//
// Defines the interface for the declarative state holder.
//
// ## Purpose
//
// The state store tracks, per resource address:
// - The resource identity (remote record ID)
// - Every attribute as last read from the API
// - When it was last refreshed
//
// The reconciler never touches it; `RecordLifecycle` writes to it only after
// an operation succeeded.
//
// ## Implementations
//
// - In-memory: `MemoryStateStore`
// - File-based: `FileStateStore` (JSON)
//
// ## Usage
//
// ```rust,ignore
// use dnsrec_core::StateStore;
//
// if let Some(entry) = store.get("dnsimple_record.www").await? {
//     println!("tracked as {}", entry.state.id);
// }
// store.remove("dnsimple_record.www").await?;
// ```

use async_trait::async_trait;

use crate::record::RecordState;

/// State entry for a tracked resource
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoredResource {
    /// The tracked attributes, including the identity
    pub state: RecordState,
    /// Timestamp of the last successful read
    pub last_refreshed: chrono::DateTime<chrono::Utc>,
}

impl StoredResource {
    /// Wrap freshly read state
    pub fn new(state: RecordState) -> Self {
        Self {
            state,
            last_refreshed: chrono::Utc::now(),
        }
    }

    /// Check if the entry is stale (older than given duration)
    pub fn is_stale(&self, max_age: chrono::Duration) -> bool {
        let now = chrono::Utc::now();
        now.signed_duration_since(self.last_refreshed) > max_age
    }
}

/// Trait for state store implementations
///
/// Addresses are opaque strings chosen by the caller, e.g.
/// `dnsimple_record.www`.
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
/// Different addresses may be operated on concurrently; operations on a
/// single address are serialized by the caller.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the entry tracked at `address`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(StoredResource))`: The tracked entry
    /// - `Ok(None)`: Nothing tracked (resource absent)
    /// - `Err(Error)`: Storage error
    async fn get(&self, address: &str) -> Result<Option<StoredResource>, crate::Error>;

    /// Track `state` at `address`, replacing any previous entry
    async fn put(&self, address: &str, state: &RecordState) -> Result<(), crate::Error>;

    /// Stop tracking `address`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Removed (or wasn't tracked)
    /// - `Err(Error)`: Storage error
    async fn remove(&self, address: &str) -> Result<(), crate::Error>;

    /// List all tracked addresses
    async fn list(&self) -> Result<Vec<String>, crate::Error>;

    /// Persist any pending changes
    ///
    /// Some implementations may buffer writes. This ensures
    /// all changes are flushed to persistent storage.
    async fn flush(&self) -> Result<(), crate::Error>;
}

/// Helper trait for constructing state stores from configuration
#[async_trait]
pub trait StateStoreFactory: Send + Sync {
    /// Create a StateStore instance from configuration
    async fn create(
        &self,
        config: &crate::config::StateStoreConfig,
    ) -> Result<Box<dyn StateStore>, crate::Error>;
}
