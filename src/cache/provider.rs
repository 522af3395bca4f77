//! Storage Provider Module
//!
//! Construction-time injection of the host's persistent stores. The provider
//! replaces ambient storage globals with an explicit capability, so tests can
//! substitute in-memory stores for the disk-backed defaults.

use std::path::PathBuf;

use crate::cache::backend::{KvStore, MemoryStore, StoreError};
use crate::cache::file_store::FileStore;
use crate::cache::store::StorageKind;
use crate::config::Config;

// == Storage Provider Trait ==
/// Resolves the persistent store backing a storage kind.
///
/// Consulted once per cache instance, at construction. `Cache` never calls it
/// for [`StorageKind::Memory`].
pub trait StorageProvider: Send + Sync {
    /// Opens the store backing `kind`.
    fn open(&self, kind: StorageKind) -> Result<Box<dyn KvStore>, StoreError>;
}

// == Disk Provider ==
/// The default host capability: file-backed stores under one data directory.
///
/// `local` maps to `local.json` and survives process restarts; `session` maps
/// to `session.json` and is truncated on open, scoping its contents to the
/// current process run. Both share one byte quota.
#[derive(Debug, Clone)]
pub struct DiskProvider {
    /// Directory holding the store files
    root: PathBuf,
    /// Byte quota applied to each store
    quota_bytes: usize,
}

impl DiskProvider {
    // == Constructors ==
    /// Creates a provider rooted at `root` with the given per-store quota.
    pub fn new(root: impl Into<PathBuf>, quota_bytes: usize) -> Self {
        Self {
            root: root.into(),
            quota_bytes,
        }
    }

    /// Creates a provider from server configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.data_dir, config.quota_bytes)
    }
}

impl StorageProvider for DiskProvider {
    fn open(&self, kind: StorageKind) -> Result<Box<dyn KvStore>, StoreError> {
        match kind {
            StorageKind::Memory => Err(StoreError::Unavailable(
                "memory caches do not use a persistent store".to_string(),
            )),
            StorageKind::Local => {
                let store = FileStore::open(self.root.join("local.json"), self.quota_bytes)?;
                Ok(Box::new(store))
            }
            StorageKind::Session => {
                let store = FileStore::open_fresh(self.root.join("session.json"), self.quota_bytes)?;
                Ok(Box::new(store))
            }
        }
    }
}

// == Memory Provider ==
/// Hands out fresh in-memory stores; for tests and ephemeral deployments.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    /// Byte quota applied to each store, None = unbounded
    quota_bytes: Option<usize>,
}

impl MemoryProvider {
    // == Constructors ==
    /// Creates a provider of unbounded in-memory stores.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider whose stores reject writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
        }
    }
}

impl StorageProvider for MemoryProvider {
    fn open(&self, _kind: StorageKind) -> Result<Box<dyn KvStore>, StoreError> {
        let store = match self.quota_bytes {
            Some(quota) => MemoryStore::with_quota(quota),
            None => MemoryStore::new(),
        };
        Ok(Box::new(store))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_root(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("scoped_cache_provider_{}_{name}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        path
    }

    #[test]
    fn test_disk_provider_rejects_memory_kind() {
        let provider = DiskProvider::new(temp_root("memory_kind"), 1024);
        let result = provider.open(StorageKind::Memory);
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_disk_provider_local_survives_reopen() {
        let root = temp_root("local");
        let provider = DiskProvider::new(&root, 64 * 1024);

        {
            let mut store = provider.open(StorageKind::Local).unwrap();
            store.set("m:k", "persisted").unwrap();
        }

        let store = provider.open(StorageKind::Local).unwrap();
        assert_eq!(store.get("m:k").unwrap(), Some("persisted".to_string()));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn test_disk_provider_session_starts_fresh() {
        let root = temp_root("session");
        let provider = DiskProvider::new(&root, 64 * 1024);

        {
            let mut store = provider.open(StorageKind::Session).unwrap();
            store.set("m:k", "stale").unwrap();
        }

        // A new open models a new process run: the session store is empty
        let store = provider.open(StorageKind::Session).unwrap();
        assert_eq!(store.get("m:k").unwrap(), None);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn test_memory_provider_stores_are_independent() {
        let provider = MemoryProvider::new();

        let mut first = provider.open(StorageKind::Local).unwrap();
        let second = provider.open(StorageKind::Local).unwrap();

        first.set("m:k", "only in first").unwrap();
        assert_eq!(second.get("m:k").unwrap(), None);
    }

    #[test]
    fn test_memory_provider_quota_applies() {
        let provider = MemoryProvider::with_quota(4);
        let mut store = provider.open(StorageKind::Session).unwrap();

        let result = store.set("long-key", "long-value");
        assert!(matches!(result, Err(StoreError::QuotaExceeded)));
    }
}
