// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Purpose
//
// Provides a simple, fast state store that doesn't persist across restarts.
// Useful for testing and one-shot runs where every resource is imported or
// created fresh.
//
// ## Crash Behavior
//
// - All tracked identities are lost on exit
// - The next run sees every resource as absent and plans a create

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::StateStoreConfig;
use crate::record::RecordState;
use crate::traits::state_store::{StateStore, StateStoreFactory, StoredResource};

/// In-memory state store implementation
///
/// This implementation stores all state in a HashMap protected by a RwLock.
/// Clones share the same map.
///
/// # Example
///
/// ```rust,ignore
/// use dnsrec_core::state::MemoryStateStore;
/// use dnsrec_core::StateStore;
///
/// let store = MemoryStateStore::new();
/// store.put("dnsimple_record.www", &state).await?;
/// assert!(store.get("dnsimple_record.www").await?.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<HashMap<String, StoredResource>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the number of tracked resources
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Clear all entries from the store
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, address: &str) -> Result<Option<StoredResource>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(address).cloned())
    }

    async fn put(&self, address: &str, state: &RecordState) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(address.to_string(), StoredResource::new(state.clone()));
        Ok(())
    }

    async fn remove(&self, address: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.remove(address);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        let guard = self.inner.read().await;
        let mut addresses: Vec<String> = guard.keys().cloned().collect();
        addresses.sort();
        Ok(addresses)
    }

    async fn flush(&self) -> Result<(), Error> {
        // Nothing to persist
        Ok(())
    }
}

/// Factory for [`MemoryStateStore`]
pub struct MemoryStateStoreFactory;

#[async_trait]
impl StateStoreFactory for MemoryStateStoreFactory {
    async fn create(&self, config: &StateStoreConfig) -> Result<Box<dyn StateStore>, Error> {
        match config {
            StateStoreConfig::Memory => Ok(Box::new(MemoryStateStore::new())),
            _ => Err(Error::config("Invalid config for memory state store")),
        }
    }
}
