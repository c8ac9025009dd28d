use crate::config::project_dirs;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, warn};

const STORAGE_FILE_NAME: &str = "storage.json";

/// Persistent string key-value storage local to this machine.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Key-value entries kept in a single JSON object file.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns a store in the platform data directory, or `None` when this
    /// environment has no usable data directory.
    pub fn probe() -> Option<Self> {
        let dirs = project_dirs()?;
        Self::probe_in(dirs.data_dir())
    }

    pub fn probe_in(dir: &Path) -> Option<Self> {
        match fs::create_dir_all(dir) {
            Ok(()) => {
                let path = dir.join(STORAGE_FILE_NAME);
                debug!(path = %path.display(), "local storage available");
                Some(Self::new(path))
            }
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "local storage unavailable");
                None
            }
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.lock.lock().map_err(|_| StoreError::Poisoned)
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(payload) if payload.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(payload) => Ok(serde_json::from_str(&payload)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let payload = serde_json::to_string_pretty(entries)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, payload)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.guard()?;
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.guard()?;
        let mut entries = self.read_entries()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.guard()?;
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// Process-lifetime storage, used for `--ephemeral` sessions.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    data: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let data = self.data.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut data = self.data.lock().map_err(|_| StoreError::Poisoned)?;
        data.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut data = self.data.lock().map_err(|_| StoreError::Poisoned)?;
        data.remove(key);
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileKeyValueStore::probe_in(dir.path()).unwrap();
        first.set("ec_token", "abc").unwrap();

        let second = FileKeyValueStore::new(first.path().to_path_buf());
        assert_eq!(second.get("ec_token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn file_store_remove_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::probe_in(dir.path()).unwrap();
        store.set("ec_token", "abc").unwrap();
        store.set("locale", "en").unwrap();

        store.remove("ec_token").unwrap();

        assert!(store.get("ec_token").unwrap().is_none());
        assert_eq!(store.get("locale").unwrap().as_deref(), Some("en"));
    }

    #[test]
    fn file_store_reads_missing_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("absent.json"));
        assert!(store.get("ec_token").unwrap().is_none());
        store.remove("ec_token").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn file_store_reports_corrupt_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILE_NAME);
        fs::write(&path, "not json").unwrap();

        let store = FileKeyValueStore::new(path);
        assert!(matches!(
            store.get("ec_token"),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn probe_fails_when_directory_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        fs::write(&blocker, "file, not a directory").unwrap();

        assert!(FileKeyValueStore::probe_in(&blocker.join("nested")).is_none());
    }
}
