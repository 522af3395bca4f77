//! Storage Backend Capability
//!
//! Defines the string-keyed store interface persistent cache backends are
//! built on, the storage error taxonomy, and an in-memory implementation.

use std::collections::HashMap;

use thiserror::Error;

// == Store Error Enum ==
/// Closed error taxonomy raised by [`KvStore`] implementations.
///
/// The quota variant is load-bearing: `Cache::set` pattern-matches it to
/// drive its clear-expired-and-retry recovery path.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A write would exceed the store's byte quota
    #[error("storage quota exceeded")]
    QuotaExceeded,

    /// A value could not be serialized or deserialized
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The store cannot be opened or reached
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Any other storage failure
    #[error("storage error: {0}")]
    Other(String),
}

// == KvStore Trait ==
/// A string-keyed, string-valued store with full key enumeration.
///
/// This is the capability set the persistent cache backends require: get,
/// set, remove, clear, and iterate-keys. Implementations report failures
/// through [`StoreError`]; they never panic on missing keys.
pub trait KvStore: Send + Sync {
    /// Returns the stored value for `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, overwriting any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key` if present. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Removes every key in the store.
    fn clear(&mut self) -> Result<(), StoreError>;

    /// Returns all physical keys currently in the store.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

// == Memory Store ==
/// In-memory [`KvStore`] with an optional byte quota.
///
/// Serves two roles: a substitutable fake for exercising the persistent code
/// path in tests, and the backing store handed out by
/// [`MemoryProvider`](crate::cache::MemoryProvider) for ephemeral setups.
/// Usage is accounted as the byte length of every key plus every value, the
/// same measure [`FileStore`](crate::cache::FileStore) applies.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Key-value storage
    entries: HashMap<String, String>,
    /// Maximum total bytes (keys + values), None = unbounded
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    // == Constructors ==
    /// Creates an unbounded in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory store that rejects writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    // == Usage ==
    /// Current usage in bytes (sum of key and value lengths).
    fn usage(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota_bytes {
            let replaced = self
                .entries
                .get(key)
                .map(|old| key.len() + old.len())
                .unwrap_or(0);
            let projected = self.usage() - replaced + key.len() + value.len();
            if projected > quota {
                return Err(StoreError::QuotaExceeded);
            }
        }

        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}
