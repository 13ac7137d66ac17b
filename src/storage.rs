//! Durable client-side storage for the cart snapshot and search history.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::StorageError;

pub const CART_SNAPSHOT_KEY: &str = "foodiegramCart";
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

/// Key/value string storage that survives reloads.
pub trait LocalStore: Send + Sync + Debug {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn store(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub fn load_json<T: DeserializeOwned>(store: &dyn LocalStore, key: &str) -> Result<Option<T>, StorageError> {
    match store.load(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn store_json<T: Serialize + ?Sized>(store: &dyn LocalStore, key: &str, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.store(key, &raw)
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl LocalStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // readers only ever see a complete file
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(key, bytes = value.len(), "Stored snapshot");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl LocalStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[test]
    fn file_store_round_trips_and_removes() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path().join("state"))?;

        assert_eq!(store.load(CART_SNAPSHOT_KEY)?, None);

        store.store(CART_SNAPSHOT_KEY, "[]")?;
        assert_eq!(store.load(CART_SNAPSHOT_KEY)?.as_deref(), Some("[]"));

        store.remove(CART_SNAPSHOT_KEY)?;
        store.remove(CART_SNAPSHOT_KEY)?;
        assert_eq!(store.load(CART_SNAPSHOT_KEY)?, None);
        Ok(())
    }

    #[test]
    fn json_helpers_report_corrupt_data() -> TestResult {
        let store = MemoryStore::default();
        store.store(RECENT_SEARCHES_KEY, "{not json")?;

        let loaded: Result<Option<Vec<String>>, _> = load_json(&store, RECENT_SEARCHES_KEY);
        assert!(matches!(loaded, Err(StorageError::Serde(_))));

        store_json(&store, RECENT_SEARCHES_KEY, &vec!["a".to_string()])?;
        let loaded: Option<Vec<String>> = load_json(&store, RECENT_SEARCHES_KEY)?;
        assert_eq!(loaded, Some(vec!["a".to_string()]));
        Ok(())
    }
}
