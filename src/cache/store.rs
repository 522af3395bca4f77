//! Cache Store Module
//!
//! The core cache type: a storage kind bound once at construction, module-scoped
//! keys, per-entry TTL with lazy expiration, and an eager expired sweep.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::cache::backend::{KvStore, StoreError};
use crate::cache::entry::CacheEntry;
use crate::cache::provider::StorageProvider;
use crate::cache::stats::CacheStats;
use crate::error::CacheError;

// == Storage Kind ==
/// Selects the backend a cache instance is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageKind {
    /// In-process map, scoped to the instance's lifetime
    #[default]
    Memory,
    /// Persistent store that survives process restarts
    Local,
    /// Persistent store scoped to the current process run
    Session,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageKind::Memory => "memory",
            StorageKind::Local => "local",
            StorageKind::Session => "session",
        };
        f.write_str(name)
    }
}

impl FromStr for StorageKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(StorageKind::Memory),
            "local" => Ok(StorageKind::Local),
            "session" => Ok(StorageKind::Session),
            other => Err(CacheError::InvalidRequest(format!(
                "unknown storage kind: {other}"
            ))),
        }
    }
}

// == Backend ==
/// The two storage shapes a cache instance delegates to.
enum Backend {
    /// Two-level map: module name -> key -> entry
    Memory(HashMap<String, HashMap<String, CacheEntry>>),
    /// External string store holding serialized entries under flattened keys
    Persistent(Box<dyn KvStore>),
}

// == Cache ==
/// An expiring key-value cache with module-scoped namespacing.
///
/// Every logical key is the pair `(module, key)`. The in-process backend
/// keeps a two-level map; persistent backends flatten the pair into the
/// physical key `"{module}:{key}"` and store the entry serialized.
///
/// The storage kind and backend are bound once at construction and cannot be
/// reassigned afterwards; only the cached contents mutate. Writes are
/// best-effort by contract: storage failures are logged and swallowed, never
/// surfaced to the caller.
pub struct Cache {
    /// Which backend this instance is bound to, fixed at construction
    kind: StorageKind,
    /// The bound storage, fixed at construction
    backend: Backend,
    /// Access counters
    stats: CacheStats,
}

impl Cache {
    // == Constructors ==
    /// Creates an in-process cache, the default kind. Never fails.
    pub fn memory() -> Self {
        Self {
            kind: StorageKind::Memory,
            backend: Backend::Memory(HashMap::new()),
            stats: CacheStats::new(),
        }
    }

    /// Creates a cache bound to `kind`, resolving persistent backends through
    /// `provider`.
    ///
    /// Construction fails with [`CacheError::BackendUnavailable`] when the
    /// provider cannot open the requested store; there is no silent fallback
    /// to in-process storage. The `Memory` kind never consults the provider.
    pub fn new(kind: StorageKind, provider: &dyn StorageProvider) -> Result<Self, CacheError> {
        let backend = match kind {
            StorageKind::Memory => Backend::Memory(HashMap::new()),
            StorageKind::Local | StorageKind::Session => {
                let store = provider.open(kind).map_err(|err| {
                    CacheError::BackendUnavailable(format!("{kind} storage: {err}"))
                })?;
                Backend::Persistent(store)
            }
        };

        Ok(Self {
            kind,
            backend,
            stats: CacheStats::new(),
        })
    }

    // == Kind ==
    /// The storage kind this instance was constructed with.
    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    // == Set ==
    /// Stores `value` under `(module, key)` with optional TTL.
    ///
    /// `ttl_ms == 0` means the entry never expires; otherwise it expires
    /// `ttl_ms` milliseconds from now. An existing entry under the same pair
    /// is overwritten.
    ///
    /// Never returns an error: when a persistent backend rejects the write
    /// for quota, expired entries are swept and the write retried exactly
    /// once; any remaining failure is logged and swallowed.
    pub fn set(&mut self, module: &str, key: &str, value: Value, ttl_ms: u64) {
        let entry = CacheEntry::new(value, ttl_ms);

        if let Backend::Memory(modules) = &mut self.backend {
            modules
                .entry(module.to_owned())
                .or_default()
                .insert(key.to_owned(), entry);
            return;
        }

        let physical = full_key(module, key);
        let serialized = match serde_json::to_string(&entry) {
            Ok(serialized) => serialized,
            Err(err) => {
                error!(
                    "failed to serialize entry for {physical} in {} storage: {err}",
                    self.kind
                );
                return;
            }
        };

        match self.write_through(&physical, &serialized) {
            Ok(()) => {}
            Err(StoreError::QuotaExceeded) => {
                warn!(
                    "cache write limit exceeded in {} storage, clearing expired entries",
                    self.kind
                );
                self.clear_expired();
                if let Err(err) = self.write_through(&physical, &serialized) {
                    warn!(
                        "cache write in {} storage still failing after clearing expired entries: {err}",
                        self.kind
                    );
                }
            }
            Err(err) => {
                error!(
                    "an error occurred while setting {physical} in {} storage: {err}",
                    self.kind
                );
            }
        }
    }

    /// Persistent-path write; the memory backend never reaches this.
    fn write_through(&mut self, physical: &str, serialized: &str) -> Result<(), StoreError> {
        match &mut self.backend {
            Backend::Persistent(store) => store.set(physical, serialized),
            Backend::Memory(_) => Ok(()),
        }
    }

    // == Get ==
    /// Retrieves the value under `(module, key)`.
    ///
    /// Returns `None` on an absent key or an unparseable stored value. An
    /// expired entry is lazily deleted on access and reported as `None`.
    /// Persistent backends round-trip the payload through serialization, so
    /// callers get an equal value, never the identical one.
    pub fn get(&mut self, module: &str, key: &str) -> Option<Value> {
        let Some(entry) = self.peek(module, key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired() {
            // Lazy expiration: purge on access
            self.delete(module, key);
            self.stats.record_expired(1);
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        Some(entry.value)
    }

    /// Reads the raw entry without liveness checks or stats side effects.
    fn peek(&self, module: &str, key: &str) -> Option<CacheEntry> {
        match &self.backend {
            Backend::Memory(modules) => modules
                .get(module)
                .and_then(|entries| entries.get(key))
                .cloned(),
            Backend::Persistent(store) => {
                let physical = full_key(module, key);
                let raw = match store.get(&physical) {
                    Ok(Some(raw)) => raw,
                    Ok(None) => return None,
                    Err(err) => {
                        warn!(
                            "cache read failed for {physical} in {} storage: {err}",
                            self.kind
                        );
                        return None;
                    }
                };

                match serde_json::from_str(&raw) {
                    Ok(entry) => Some(entry),
                    Err(err) => {
                        // Malformed stored values are misses, not errors
                        debug!(
                            "unparseable entry under {physical} in {} storage: {err}",
                            self.kind
                        );
                        None
                    }
                }
            }
        }
    }

    // == Delete ==
    /// Removes the entry under `(module, key)` if present; a no-op otherwise.
    pub fn delete(&mut self, module: &str, key: &str) {
        match &mut self.backend {
            Backend::Memory(modules) => {
                if let Some(entries) = modules.get_mut(module) {
                    entries.remove(key);
                }
            }
            Backend::Persistent(store) => {
                let physical = full_key(module, key);
                if let Err(err) = store.remove(&physical) {
                    warn!(
                        "cache delete failed for {physical} in {} storage: {err}",
                        self.kind
                    );
                }
            }
        }
    }

    // == Has ==
    /// Whether a live entry exists under `(module, key)`.
    ///
    /// Defined as `get(module, key).is_some()`, so an expired entry is lazily
    /// deleted by the lookup; this is not a pure predicate.
    pub fn has(&mut self, module: &str, key: &str) -> bool {
        self.get(module, key).is_some()
    }

    // == Clear Module ==
    /// Removes every entry in `module`, expired or not. Other modules are
    /// untouched.
    pub fn clear_module(&mut self, module: &str) {
        match &mut self.backend {
            Backend::Memory(modules) => {
                modules.remove(module);
            }
            Backend::Persistent(store) => {
                let prefix = module_prefix(module);
                let keys = match store.keys() {
                    Ok(keys) => keys,
                    Err(err) => {
                        warn!(
                            "cannot enumerate {} storage to clear module {module}: {err}",
                            self.kind
                        );
                        return;
                    }
                };

                for physical in keys.iter().filter(|key| key.starts_with(&prefix)) {
                    if let Err(err) = store.remove(physical) {
                        warn!(
                            "cache delete failed for {physical} in {} storage: {err}",
                            self.kind
                        );
                    }
                }
            }
        }
    }

    // == Clear All ==
    /// Removes every entry in every module, for this instance's backend only.
    pub fn clear_all(&mut self) {
        match &mut self.backend {
            Backend::Memory(modules) => modules.clear(),
            Backend::Persistent(store) => {
                if let Err(err) = store.clear() {
                    warn!("cache clear failed in {} storage: {err}", self.kind);
                }
            }
        }
    }

    // == Clear Expired ==
    /// Eagerly removes every expired entry across all modules.
    ///
    /// Entries with no expiration are never touched. On the persistent path
    /// physical keys whose value does not parse as an entry are skipped, not
    /// deleted: the underlying store may be shared with unrelated code.
    ///
    /// Returns the number of entries removed.
    pub fn clear_expired(&mut self) -> usize {
        let removed = match &mut self.backend {
            Backend::Memory(modules) => {
                let mut removed = 0;
                for entries in modules.values_mut() {
                    let before = entries.len();
                    entries.retain(|_, entry| !entry.is_expired());
                    removed += before - entries.len();
                }
                removed
            }
            Backend::Persistent(store) => {
                let keys = match store.keys() {
                    Ok(keys) => keys,
                    Err(err) => {
                        warn!("cannot enumerate {} storage for sweep: {err}", self.kind);
                        return 0;
                    }
                };

                let mut removed = 0;
                for physical in keys {
                    let raw = match store.get(&physical) {
                        Ok(Some(raw)) => raw,
                        _ => continue,
                    };
                    let Ok(entry) = serde_json::from_str::<CacheEntry>(&raw) else {
                        continue;
                    };
                    if entry.is_expired() && store.remove(&physical).is_ok() {
                        removed += 1;
                    }
                }
                removed
            }
        };

        if removed > 0 {
            debug!("swept {removed} expired entries from {} storage", self.kind);
            self.stats.record_expired(removed);
        }
        removed
    }

    // == Length ==
    /// Returns the current number of physical entries, best-effort 0 when the
    /// backend cannot enumerate.
    pub fn len(&self) -> usize {
        match &self.backend {
            Backend::Memory(modules) => modules.values().map(|entries| entries.len()).sum(),
            Backend::Persistent(store) => store.keys().map(|keys| keys.len()).unwrap_or(0),
        }
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Snapshots the access counters with the current entry count filled in.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.len());
        stats
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("kind", &self.kind)
            .field("entries", &self.len())
            .finish()
    }
}

// == Key Flattening ==
/// Physical key for persistent backends. Neither component is escaped, so a
/// module name or key containing ':' can make boundaries ambiguous
/// (`"A:B"`/`"k"` collides with `"A"`/`"B:k"`).
fn full_key(module: &str, key: &str) -> String {
    format!("{module}:{key}")
}

/// Prefix matching every physical key of `module`.
fn module_prefix(module: &str) -> String {
    format!("{module}:")
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    use serde_json::json;

    use crate::cache::backend::MemoryStore;
    use crate::cache::entry::now_ms;
    use crate::cache::provider::MemoryProvider;

    /// Provider whose stores come pre-populated with raw physical entries.
    struct SeededProvider {
        entries: Vec<(String, String)>,
    }

    impl SeededProvider {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self {
                entries: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    impl StorageProvider for SeededProvider {
        fn open(&self, _kind: StorageKind) -> Result<Box<dyn KvStore>, StoreError> {
            let mut store = MemoryStore::new();
            for (key, value) in &self.entries {
                store.set(key, value)?;
            }
            Ok(Box::new(store))
        }
    }

    /// Provider that refuses to open anything.
    struct FailingProvider;

    impl StorageProvider for FailingProvider {
        fn open(&self, kind: StorageKind) -> Result<Box<dyn KvStore>, StoreError> {
            Err(StoreError::Unavailable(format!("{kind} not supported here")))
        }
    }

    fn persistent_cache() -> Cache {
        Cache::new(StorageKind::Local, &MemoryProvider::new()).unwrap()
    }

    #[test]
    fn test_storage_kind_parse_and_display() {
        for kind in [StorageKind::Memory, StorageKind::Local, StorageKind::Session] {
            assert_eq!(kind.to_string().parse::<StorageKind>().unwrap(), kind);
        }
        assert!("disk".parse::<StorageKind>().is_err());
        assert_eq!(StorageKind::default(), StorageKind::Memory);
    }

    #[test]
    fn test_construction_fails_when_backend_unavailable() {
        let result = Cache::new(StorageKind::Local, &FailingProvider);
        assert!(matches!(result, Err(CacheError::BackendUnavailable(_))));
    }

    #[test]
    fn test_memory_kind_never_consults_provider() {
        let cache = Cache::new(StorageKind::Memory, &FailingProvider).unwrap();
        assert_eq!(cache.kind(), StorageKind::Memory);
    }

    #[test]
    fn test_set_and_get_memory() {
        let mut cache = Cache::memory();

        cache.set("users", "ada", json!({"id": 1}), 0);

        assert_eq!(cache.get("users", "ada"), Some(json!({"id": 1})));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_nonexistent_returns_none() {
        let mut cache = Cache::memory();
        assert_eq!(cache.get("users", "nobody"), None);
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let mut cache = Cache::memory();

        cache.set("users", "ada", json!(1), 0);
        cache.set("users", "ada", json!(2), 0);

        assert_eq!(cache.get("users", "ada"), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut cache = Cache::memory();

        cache.set("users", "ada", json!(1), 0);
        cache.delete("users", "ada");
        assert_eq!(cache.get("users", "ada"), None);

        // Deleting an absent key changes nothing and does not panic
        cache.delete("users", "ada");
        cache.delete("ghosts", "nobody");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ttl_expiry_removes_entry() {
        let mut cache = Cache::memory();

        cache.set("users", "ada", json!("v"), 20);
        assert_eq!(cache.get("users", "ada"), Some(json!("v")));

        sleep(Duration::from_millis(50));

        assert_eq!(cache.get("users", "ada"), None);
        // The lazy delete physically removed the entry
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_no_ttl_entry_never_expires() {
        let mut cache = Cache::memory();

        cache.set("users", "ada", json!("v"), 0);
        sleep(Duration::from_millis(30));

        assert_eq!(cache.get("users", "ada"), Some(json!("v")));
    }

    #[test]
    fn test_namespacing_isolation() {
        let mut cache = Cache::memory();

        cache.set("a", "k", json!(1), 0);
        cache.set("b", "k", json!(2), 0);

        assert_eq!(cache.get("a", "k"), Some(json!(1)));
        assert_eq!(cache.get("b", "k"), Some(json!(2)));
    }

    #[test]
    fn test_clear_module_scope() {
        let mut cache = Cache::memory();

        cache.set("a", "x", json!(1), 0);
        cache.set("a", "y", json!(2), 0);
        cache.set("b", "z", json!(3), 0);

        cache.clear_module("a");

        assert_eq!(cache.get("a", "x"), None);
        assert_eq!(cache.get("a", "y"), None);
        assert_eq!(cache.get("b", "z"), Some(json!(3)));
    }

    #[test]
    fn test_clear_all_empties_instance() {
        let mut cache = Cache::memory();

        cache.set("a", "x", json!(1), 0);
        cache.set("b", "y", json!(2), 60_000);

        cache.clear_all();

        assert!(cache.is_empty());
        assert_eq!(cache.get("a", "x"), None);
        assert_eq!(cache.get("b", "y"), None);
    }

    #[test]
    fn test_clear_expired_selectivity() {
        let mut cache = Cache::memory();

        cache.set("m", "a", json!("forever"), 0);
        cache.set("m", "b", json!("short"), 10);
        cache.set("m", "c", json!("long"), 60_000);

        sleep(Duration::from_millis(40));
        let removed = cache.clear_expired();

        assert_eq!(removed, 1);
        assert_eq!(cache.get("m", "a"), Some(json!("forever")));
        assert_eq!(cache.get("m", "b"), None);
        assert_eq!(cache.get("m", "c"), Some(json!("long")));
    }

    #[test]
    fn test_has_get_coupling_on_expired_entry() {
        let mut cache = Cache::memory();

        cache.set("m", "k", json!("v"), 10);
        sleep(Duration::from_millis(40));

        // has() observes the expired entry, deletes it, and reports false
        assert!(!cache.has("m", "k"));
        assert_eq!(cache.get("m", "k"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_backend_independence() {
        let mut memory = Cache::memory();
        let mut local = persistent_cache();

        memory.set("m", "k", json!("in-process"), 0);
        local.set("m", "k", json!("persistent"), 0);

        assert_eq!(memory.get("m", "k"), Some(json!("in-process")));
        assert_eq!(local.get("m", "k"), Some(json!("persistent")));

        memory.clear_all();
        assert_eq!(local.get("m", "k"), Some(json!("persistent")));
    }

    #[test]
    fn test_persistent_roundtrip_deep_equality() {
        let mut cache = persistent_cache();
        let value = json!({"nested": {"list": [1, 2, 3], "flag": true}, "n": null});

        cache.set("m", "k", value.clone(), 0);

        assert_eq!(cache.get("m", "k"), Some(value));
    }

    #[test]
    fn test_persistent_lazy_expiry() {
        let mut cache = persistent_cache();

        cache.set("m", "k", json!("v"), 10);
        sleep(Duration::from_millis(40));

        assert_eq!(cache.get("m", "k"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_persistent_clear_module_prefix_scope() {
        let mut cache = persistent_cache();

        cache.set("a", "x", json!(1), 0);
        cache.set("a", "y", json!(2), 0);
        cache.set("b", "z", json!(3), 0);

        cache.clear_module("a");

        assert_eq!(cache.get("a", "x"), None);
        assert_eq!(cache.get("a", "y"), None);
        assert_eq!(cache.get("b", "z"), Some(json!(3)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_malformed_stored_value_is_a_miss() {
        let provider = SeededProvider::new(&[("mod:bad", "{{not json")]);
        let mut cache = Cache::new(StorageKind::Local, &provider).unwrap();

        assert_eq!(cache.get("mod", "bad"), None);
        // The malformed entry is reported absent but not deleted
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sweep_skips_unparseable_entries() {
        let provider = SeededProvider::new(&[("rogue", "foreign data")]);
        let mut cache = Cache::new(StorageKind::Local, &provider).unwrap();

        cache.set("m", "short", json!("v"), 10);
        sleep(Duration::from_millis(40));

        let removed = cache.clear_expired();

        assert_eq!(removed, 1);
        // The foreign physical key survived the sweep
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_quota_recovery_retries_after_sweep() {
        // Room for one serialized entry, not two
        let provider = MemoryProvider::with_quota(90);
        let mut cache = Cache::new(StorageKind::Local, &provider).unwrap();

        cache.set("quota", "old", json!("0123456789abcdef"), 20);
        sleep(Duration::from_millis(50));

        // Rejected for quota, recovered by sweeping the expired entry
        cache.set("quota", "new", json!("0123456789abcdef"), 0);

        assert_eq!(cache.get("quota", "new"), Some(json!("0123456789abcdef")));
        assert_eq!(cache.get("quota", "old"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_quota_failure_after_sweep_is_swallowed() {
        let provider = MemoryProvider::with_quota(10);
        let mut cache = Cache::new(StorageKind::Local, &provider).unwrap();

        // Nothing expired to reclaim; both attempts fail and are swallowed
        cache.set("m", "k", json!("0123456789abcdef"), 0);

        assert_eq!(cache.get("m", "k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats_track_hits_misses_and_expiries() {
        let mut cache = Cache::memory();

        cache.set("m", "hit", json!(1), 0);
        cache.set("m", "gone", json!(2), 10);

        assert!(cache.get("m", "hit").is_some()); // hit
        assert!(cache.get("m", "absent").is_none()); // miss

        sleep(Duration::from_millis(40));
        assert!(cache.get("m", "gone").is_none()); // expired: miss + expiry

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_expired_entry_constructed_in_past_is_gone() {
        let raw = serde_json::to_string(&CacheEntry {
            value: json!("stale"),
            expiration: Some(now_ms() - 1_000),
        })
        .unwrap();
        let provider = SeededProvider::new(&[("m:stale", raw.as_str())]);
        let mut cache = Cache::new(StorageKind::Local, &provider).unwrap();

        assert!(!cache.has("m", "stale"));
        assert_eq!(cache.len(), 0);
    }
}
