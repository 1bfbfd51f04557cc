//! Plugin-based provider registry
//!
//! The registry allows API clients and state stores to be registered
//! dynamically at runtime, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dnsrec_core::ProviderRegistry;
//!
//! let registry = ProviderRegistry::with_builtin_state_stores();
//! dnsrec_provider_dnsimple::register(&registry);
//!
//! let api = registry.create_api_client(&manifest.provider)?;
//! let store = registry.create_state_store(&manifest.state_store).await?;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::config::{ProviderConfig, StateStoreConfig};
use crate::error::{Error, Result};
use crate::state::{FileStateStoreFactory, MemoryStateStoreFactory};
use crate::traits::{StateStore, StateStoreFactory, ZoneRecordApi, ZoneRecordApiFactory};

/// Registry of API client and state store factories
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn ZoneRecordApiFactory>>>,
    state_stores: RwLock<HashMap<String, Arc<dyn StateStoreFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the `memory` and `file` state stores registered
    pub fn with_builtin_state_stores() -> Self {
        let registry = Self::new();
        registry.register_state_store("memory", Box::new(MemoryStateStoreFactory));
        registry.register_state_store("file", Box::new(FileStateStoreFactory));
        registry
    }

    /// Register an API client factory under a provider type name
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn ZoneRecordApiFactory>) {
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.insert(name.into(), Arc::from(factory));
    }

    /// Register a state store factory under a store type name
    pub fn register_state_store(
        &self,
        name: impl Into<String>,
        factory: Box<dyn StateStoreFactory>,
    ) {
        let mut stores = self
            .state_stores
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        stores.insert(name.into(), Arc::from(factory));
    }

    /// Create an API client from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn ZoneRecordApi>)`: Created client
    /// - `Err(Error)`: If the provider type is not registered or creation fails
    pub fn create_api_client(&self, config: &ProviderConfig) -> Result<Box<dyn ZoneRecordApi>> {
        let provider_type = config.type_name();
        let factory = {
            let providers = self
                .providers
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            providers
                .get(provider_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?
        };

        factory.create(config)
    }

    /// Create a state store from configuration
    pub async fn create_state_store(
        &self,
        config: &StateStoreConfig,
    ) -> Result<Box<dyn StateStore>> {
        let store_type = config.type_name();

        // Release the lock before awaiting
        let factory = {
            let stores = self
                .state_stores
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            stores
                .get(store_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown state store type: {}", store_type)))?
        };

        factory.create(config).await
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// List all registered state store types
    pub fn list_state_stores(&self) -> Vec<String> {
        let stores = self
            .state_stores
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut names: Vec<String> = stores.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        self.providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(name)
    }

    /// Check if a state store type is registered
    pub fn has_state_store(&self, name: &str) -> bool {
        self.state_stores
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(name)
    }
}
