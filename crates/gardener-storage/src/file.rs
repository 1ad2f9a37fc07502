//! File-backed storage.
//!
//! A single JSON map on disk. Writes go through a temp file + rename so a
//! crash mid-write never leaves a truncated store behind.

use crate::{SessionStore, StorageError, StorageResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Persistent key-value store backed by a JSON file.
pub struct FileStore {
    path: PathBuf,
    data: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or create) a store at the given file path.
    ///
    /// Parent directories are created as needed. A missing or unreadable
    /// file starts the store empty rather than failing; a corrupted store
    /// must not lock the user out of re-authenticating.
    pub fn new(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Discarding unreadable session store");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, data: &BTreeMap<String, String>) -> StorageResult<()> {
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self.data.lock().unwrap();
        data.insert(key.to_string(), value.to_string());
        self.flush(&data)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self.data.lock().unwrap();
        Ok(data.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        let mut data = self.data.lock().unwrap();
        let existed = data.remove(key).is_some();
        if existed {
            self.flush(&data)?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(dir.path().join("session.json")).unwrap()
    }

    #[test]
    fn set_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.set("user_name", "alice").unwrap();
        assert_eq!(store.get("user_name").unwrap(), Some("alice".to_string()));
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        {
            let store = FileStore::new(&path).unwrap();
            store.set("auth_mode", "passkey").unwrap();
        }

        let reopened = FileStore::new(&path).unwrap();
        assert_eq!(
            reopened.get("auth_mode").unwrap(),
            Some("passkey".to_string())
        );
    }

    #[test]
    fn remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        {
            let store = FileStore::new(&path).unwrap();
            store.set("user_name", "bob").unwrap();
            assert!(store.remove("user_name").unwrap());
            assert!(!store.remove("user_name").unwrap());
        }

        let reopened = FileStore::new(&path).unwrap();
        assert_eq!(reopened.get("user_name").unwrap(), None);
    }

    #[test]
    fn corrupted_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path).unwrap();
        assert_eq!(store.get("user_name").unwrap(), None);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("s.json");

        let store = FileStore::new(&path).unwrap();
        store.set("k", "v").unwrap();
        assert!(path.exists());
    }
}
