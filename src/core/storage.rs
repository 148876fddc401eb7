//! Persistent key-value storage for client state
//!
//! A small string-to-string store, written through on every change. The
//! session keeps exactly two keys in it (token and serialized user).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt storage file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Store backed by a JSON object on disk
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open a store, starting empty if the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        if self.entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path).map_err(io_err)?;
            }
            return Ok(());
        }
        let content = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            StorageError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, content).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// In-memory store whose contents can be inspected through a shared handle
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every key currently stored
    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_roundtrip() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("session.json");

        let mut store = FileStore::open(&path).unwrap();
        assert!(store.get("auth_token").is_none());
        store.set("auth_token", "abc").unwrap();
        assert!(path.exists());

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("auth_token").as_deref(), Some("abc"));
    }

    #[test]
    fn test_file_store_removes_file_when_empty() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("session.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set("auth_token", "abc").unwrap();
        store.remove("auth_token").unwrap();

        assert!(!path.exists());
        assert!(store.get("auth_token").is_none());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_memory_store_shares_state_between_clones() {
        let mut store = MemoryStore::new();
        let observer = store.clone();

        store.set("auth_user", "{}").unwrap();
        assert_eq!(observer.keys(), vec!["auth_user".to_string()]);

        store.remove("auth_user").unwrap();
        assert!(observer.is_empty());
    }
}
