// # File State Store
//
// File-based implementation of StateStore with crash recovery.
//
// ## Purpose
//
// Keeps tracked record identities across runs so the next refresh, update
// or destroy addresses the same remote record.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Automatic backup: Keeps .backup of last known good state
// - Recovery: Falls back to backup if the main file does not parse
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "resources": {
//     "dnsimple_record.www": {
//       "state": { "id": "1234", "domain": "example.com", ... },
//       "last_refreshed": "2025-01-09T12:00:00Z"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::StateStoreConfig;
use crate::record::RecordState;
use crate::traits::state_store::{StateStore, StateStoreFactory, StoredResource};

/// State file format version
const STATE_FILE_VERSION: &str = "1.0";

/// File-based state store with crash recovery
///
/// Every mutation is written through to disk before it returns.
///
/// # Example
///
/// ```rust,ignore
/// use dnsrec_core::state::FileStateStore;
/// use dnsrec_core::StateStore;
///
/// let store = FileStateStore::new("/var/lib/dnsrec/state.json").await?;
/// store.put("dnsimple_record.www", &state).await?;
/// ```
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

#[derive(Debug)]
struct FileState {
    resources: HashMap<String, StoredResource>,
    dirty: bool,
}

/// Serializable state file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    resources: HashMap<String, StoredResource>,
}

/// Why a state file could not be loaded
enum LoadFailure {
    /// The file exists but could not be read
    Unreadable(Error),
    /// The file was read but is not a valid state document
    Corrupt(Error),
}

impl FileStateStore {
    /// Create or load a file state store
    ///
    /// This will:
    /// 1. Try to load existing state file
    /// 2. If it is corrupt, try to load from backup
    /// 3. If both fail, start with empty state
    /// 4. Create parent directories if needed
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let resources = Self::load_state_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                resources,
                dirty: false,
            })),
        })
    }

    /// Load state from file with automatic recovery
    async fn load_state_with_recovery(
        path: &Path,
    ) -> Result<HashMap<String, StoredResource>, Error> {
        let err = match Self::load_state(path).await {
            Ok(resources) => {
                tracing::debug!("Loaded state from file: {} resources", resources.len());
                return Ok(resources);
            }
            Err(LoadFailure::Unreadable(e)) => return Err(e),
            Err(LoadFailure::Corrupt(e)) => e,
        };

        tracing::warn!(
            "State file appears corrupted: {}. Attempting recovery from backup.",
            err
        );

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            tracing::warn!("No backup file found. Starting with empty state.");
            return Ok(HashMap::new());
        }

        match Self::load_state(&backup_path).await {
            Ok(resources) => {
                tracing::info!("Recovered state from backup: {} resources", resources.len());
                if let Err(restore_err) = Self::restore_from_backup(path, &backup_path).await {
                    tracing::error!(
                        "Failed to restore state file from backup: {}",
                        restore_err
                    );
                }
                Ok(resources)
            }
            Err(LoadFailure::Unreadable(e) | LoadFailure::Corrupt(e)) => {
                tracing::error!("Backup also unusable: {}. Starting with empty state.", e);
                Ok(HashMap::new())
            }
        }
    }

    async fn load_state(path: &Path) -> Result<HashMap<String, StoredResource>, LoadFailure> {
        if !path.exists() {
            tracing::debug!("State file does not exist: {}", path.display());
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            LoadFailure::Unreadable(Error::state_store(format!(
                "Failed to read state file {}: {}",
                path.display(),
                e
            )))
        })?;

        let state_file: StateFileFormat = serde_json::from_str(&content).map_err(|e| {
            LoadFailure::Corrupt(Error::state_store(format!(
                "Failed to parse state file {}: {}",
                path.display(),
                e
            )))
        })?;

        if state_file.version != STATE_FILE_VERSION {
            tracing::warn!(
                "State file version mismatch: expected {}, got {}. \
                Attempting to load anyway.",
                STATE_FILE_VERSION,
                state_file.version
            );
        }

        Ok(state_file.resources)
    }

    /// Write state to file atomically
    async fn write_state(&self) -> Result<(), Error> {
        let mut guard = self.state.write().await;

        let state_file = StateFileFormat {
            version: STATE_FILE_VERSION.to_string(),
            resources: guard.resources.clone(),
        };

        let json = serde_json::to_string_pretty(&state_file)
            .map_err(|e| Error::state_store(format!("Failed to serialize state: {}", e)))?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        guard.dirty = false;
        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }

    async fn restore_from_backup(path: &Path, backup_path: &Path) -> Result<(), Error> {
        fs::copy(backup_path, path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to restore from backup {} to {}: {}",
                backup_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!("Restored state file from backup");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get(&self, address: &str) -> Result<Option<StoredResource>, Error> {
        let guard = self.state.read().await;
        Ok(guard.resources.get(address).cloned())
    }

    async fn put(&self, address: &str, state: &RecordState) -> Result<(), Error> {
        {
            let mut guard = self.state.write().await;
            guard
                .resources
                .insert(address.to_string(), StoredResource::new(state.clone()));
            guard.dirty = true;
        }

        self.write_state().await
    }

    async fn remove(&self, address: &str) -> Result<(), Error> {
        {
            let mut guard = self.state.write().await;
            if guard.resources.remove(address).is_none() {
                return Ok(());
            }
            guard.dirty = true;
        }

        self.write_state().await
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        let guard = self.state.read().await;
        let mut addresses: Vec<String> = guard.resources.keys().cloned().collect();
        addresses.sort();
        Ok(addresses)
    }

    async fn flush(&self) -> Result<(), Error> {
        let dirty = self.state.read().await.dirty;
        if dirty { self.write_state().await } else { Ok(()) }
    }
}

/// Factory for [`FileStateStore`]
pub struct FileStateStoreFactory;

#[async_trait]
impl StateStoreFactory for FileStateStoreFactory {
    async fn create(&self, config: &StateStoreConfig) -> Result<Box<dyn StateStore>, Error> {
        match config {
            StateStoreConfig::File { path } => Ok(Box::new(FileStateStore::new(path).await?)),
            _ => Err(Error::config("Invalid config for file state store")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::hostname;
    use tempfile::tempdir;

    fn state(id: &str, value: &str) -> RecordState {
        RecordState {
            id: id.to_string(),
            domain: "example.com".to_string(),
            domain_id: "example.com".to_string(),
            name: "www".to_string(),
            hostname: hostname("www", "example.com"),
            record_type: "A".to_string(),
            value: value.to_string(),
            regions: ["global".to_string()].into_iter().collect(),
            ttl: "3600".to_string(),
            priority: "0".to_string(),
        }
    }

    #[tokio::test]
    async fn test_file_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());

        store.put("dnsimple_record.www", &state("1234", "192.0.2.1")).await.unwrap();
        assert!(path.exists());

        let reopened = FileStateStore::new(&path).await.unwrap();
        let entry = reopened.get("dnsimple_record.www").await.unwrap().unwrap();
        assert_eq!(entry.state.id, "1234");
        assert_eq!(entry.state.hostname, "www.example.com");
    }

    #[tokio::test]
    async fn test_file_store_remove_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        store.put("a", &state("1", "192.0.2.1")).await.unwrap();
        store.remove("a").await.unwrap();
        store.remove("never-tracked").await.unwrap();

        let reopened = FileStateStore::new(&path).await.unwrap();
        assert!(reopened.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_corruption_recovery() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        store.put("a", &state("1", "192.0.2.1")).await.unwrap();
        // second write leaves the first in the backup
        store.put("a", &state("1", "192.0.2.2")).await.unwrap();

        let backup_path = FileStateStore::backup_path(&path);
        assert!(backup_path.exists(), "Backup file should exist after write");

        fs::write(&path, b"corrupted json data").await.unwrap();

        let recovered = FileStateStore::new(&path).await.unwrap();
        let entry = recovered.get("a").await.unwrap().unwrap();
        assert_eq!(
            entry.state.value, "192.0.2.1",
            "Backup should contain previous state, not latest"
        );
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        store.put("a", &state("1", "192.0.2.1")).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_factory_builds_from_config() {
        let dir = tempdir().unwrap();
        let config = StateStoreConfig::File {
            path: dir.path().join("state.json").display().to_string(),
        };

        let store = FileStateStoreFactory.create(&config).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(FileStateStoreFactory.create(&StateStoreConfig::Memory).await.is_err());
    }
}
