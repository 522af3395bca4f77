//! File Store Module
//!
//! A persistent [`KvStore`] backed by a single JSON file: the in-memory map
//! is the source of truth and every mutation is written straight through to
//! disk. A byte quota bounds total usage the way a browser bounds its
//! per-origin storage.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::cache::backend::{KvStore, StoreError};

// == File Store ==
/// Write-through file-backed key-value store with a byte quota.
#[derive(Debug)]
pub struct FileStore {
    /// On-disk location of the serialized map
    path: PathBuf,
    /// In-memory view, mirrored to `path` on every mutation
    entries: HashMap<String, String>,
    /// Maximum total bytes (keys + values)
    quota_bytes: usize,
}

impl FileStore {
    // == Open ==
    /// Opens the store at `path`, loading any previously persisted contents.
    ///
    /// A file that cannot be parsed degrades to an empty store with a
    /// warning: the contents are cached data, losing them is always safe.
    /// A location that cannot be created reports `StoreError::Unavailable`.
    pub fn open(path: impl Into<PathBuf>, quota_bytes: usize) -> Result<Self, StoreError> {
        let path = path.into();
        ensure_parent_dir(&path)?;

        let entries = if path.exists() {
            load_entries(&path)
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries,
            quota_bytes,
        })
    }

    // == Open Fresh ==
    /// Opens the store at `path` starting empty, truncating any stale file.
    ///
    /// This backs session-scoped storage: entries live only as long as the
    /// current process run.
    pub fn open_fresh(path: impl Into<PathBuf>, quota_bytes: usize) -> Result<Self, StoreError> {
        let path = path.into();
        ensure_parent_dir(&path)?;

        let store = Self {
            path,
            entries: HashMap::new(),
            quota_bytes,
        };
        store.persist()?;

        Ok(store)
    }

    // == Usage ==
    /// Current usage in bytes (sum of key and value lengths).
    fn usage(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    // == Persist ==
    /// Writes the whole map to disk.
    fn persist(&self) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(&self.entries)
            .map_err(|err| StoreError::Serialization(err.to_string()))?;

        fs::write(&self.path, serialized)
            .map_err(|err| StoreError::Other(format!("write to {}: {err}", self.path.display())))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let replaced = self
            .entries
            .get(key)
            .map(|old| key.len() + old.len())
            .unwrap_or(0);
        let projected = self.usage() - replaced + key.len() + value.len();
        if projected > self.quota_bytes {
            return Err(StoreError::QuotaExceeded);
        }

        self.entries.insert(key.to_owned(), value.to_owned());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.persist()
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

// == Helpers ==
/// Creates the parent directory of `path` if it does not exist yet.
fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            StoreError::Unavailable(format!("cannot create {}: {err}", parent.display()))
        })?;
    }
    Ok(())
}

/// Reads the persisted map from `path`, degrading to empty on any failure.
fn load_entries(path: &Path) -> HashMap<String, String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            warn!("failed to read store file {}: {err}", path.display());
            return HashMap::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(
                "store file {} is corrupt, starting empty: {err}",
                path.display()
            );
            HashMap::new()
        }
    }
}
