//! Configuration types for the record reconciler
//!
//! This module defines all configuration structures used throughout the crate.
//! A [`Manifest`] is the JSON document the CLI loads: which provider to talk
//! to, where to keep state, and the records to manage.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::record::RecordSpec;

/// Top-level manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Provider API configuration
    pub provider: ProviderConfig,

    /// State store configuration
    #[serde(default)]
    pub state_store: StateStoreConfig,

    /// Records to manage
    #[serde(default)]
    pub records: Vec<ResourceConfig>,
}

impl Manifest {
    /// Parse a manifest from JSON text
    pub fn from_json(text: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load and parse a manifest file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            crate::Error::config(format!(
                "Failed to read manifest {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&text)
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.state_store.validate()?;

        let mut seen = HashSet::new();
        for record in &self.records {
            record.validate()?;
            if !seen.insert(record.address.as_str()) {
                return Err(crate::Error::config(format!(
                    "Duplicate resource address: {}",
                    record.address
                )));
            }
        }

        Ok(())
    }

    /// Find a declared record by address
    pub fn record(&self, address: &str) -> Option<&ResourceConfig> {
        self.records.iter().find(|r| r.address == address)
    }
}

/// Provider API configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// DNSimple API v2
    Dnsimple {
        /// API access token
        #[serde(default)]
        token: String,
        /// Account identifier the zones belong to
        #[serde(default)]
        account: String,
        /// Use the sandbox environment
        #[serde(default)]
        sandbox: bool,
        /// Override the API base URL
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Account identifier
        account: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

// Hides the token
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Dnsimple {
                account,
                sandbox,
                base_url,
                ..
            } => f
                .debug_struct("Dnsimple")
                .field("token", &"<REDACTED>")
                .field("account", account)
                .field("sandbox", sandbox)
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Custom {
                factory, account, ..
            } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("account", account)
                .finish_non_exhaustive(),
        }
    }
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Dnsimple {
                token,
                account,
                base_url,
                ..
            } => {
                if token.is_empty() {
                    return Err(crate::Error::config("DNSimple API token cannot be empty"));
                }
                if account.is_empty() {
                    return Err(crate::Error::config("DNSimple account cannot be empty"));
                }
                if let Some(url) = base_url
                    && !url.starts_with("https://")
                    && !url.starts_with("http://")
                {
                    return Err(crate::Error::config(format!(
                        "DNSimple base URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                Ok(())
            }
            ProviderConfig::Custom {
                factory, account, ..
            } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if account.is_empty() {
                    return Err(crate::Error::config("Custom provider account cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Dnsimple { .. } => "dnsimple",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }

    /// The account every API call is made on behalf of
    pub fn account(&self) -> &str {
        match self {
            ProviderConfig::Dnsimple { account, .. } => account,
            ProviderConfig::Custom { account, .. } => account,
        }
    }

    /// Override the manifest's credentials with non-empty values
    pub fn with_credentials(mut self, new_token: Option<String>, new_account: Option<String>) -> Self {
        if let ProviderConfig::Dnsimple { token, account, .. } = &mut self {
            if let Some(t) = new_token.filter(|t| !t.is_empty()) {
                *token = t;
            }
            if let Some(a) = new_account.filter(|a| !a.is_empty()) {
                *account = a;
            }
        }
        self
    }
}

/// State store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateStoreConfig {
    /// File-based state store
    File {
        /// Path to the state file
        path: String,
    },

    /// In-memory state store (not persistent)
    #[default]
    Memory,

    /// Custom state store
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl StateStoreConfig {
    /// Validate the state store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StateStoreConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("State file path cannot be empty"))
            }
            StateStoreConfig::Custom { factory, .. } if factory.is_empty() => Err(
                crate::Error::config("Custom state store factory cannot be empty"),
            ),
            _ => Ok(()),
        }
    }

    /// Get the state store type name
    pub fn type_name(&self) -> &str {
        match self {
            StateStoreConfig::File { .. } => "file",
            StateStoreConfig::Memory => "memory",
            StateStoreConfig::Custom { factory, .. } => factory,
        }
    }
}

/// A declared record and the address it is tracked under
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// State store key, e.g. `dnsimple_record.www`
    pub address: String,

    /// Desired attributes
    #[serde(flatten)]
    pub spec: RecordSpec,
}

impl ResourceConfig {
    /// Create a resource declaration
    pub fn new(address: impl Into<String>, spec: RecordSpec) -> Self {
        Self {
            address: address.into(),
            spec,
        }
    }

    /// Validate the declaration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.address.is_empty() {
            return Err(crate::Error::config("Resource address cannot be empty"));
        }
        self.spec.validate().map_err(|e| {
            crate::Error::config(format!("{}: {}", self.address, e))
        })
    }
}
