//! Cache Entry Module
//!
//! Defines the stored unit: a JSON payload with an optional absolute expiration.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A single cache entry: an arbitrary JSON payload plus expiration metadata.
///
/// This struct is also the persisted representation: persistent backends
/// serialize it to a JSON object with exactly the fields `value` and
/// `expiration` (`null` meaning "never expires").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Value,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expiration: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    ///
    /// # Arguments
    /// * `value` - The payload to store
    /// * `ttl_ms` - TTL in milliseconds; `0` means the entry never expires
    pub fn new(value: Value, ttl_ms: u64) -> Self {
        let expiration = if ttl_ms > 0 {
            Some(now_ms() + ttl_ms)
        } else {
            None
        };

        Self { value, expiration }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is live iff its expiration is strictly in
    /// the future, so an entry whose expiration equals the current clock is
    /// already expired.
    ///
    /// # Returns
    /// - `true` if the entry has an expiration and the current time >= expiration
    /// - `false` if the entry has no expiration (never expires) or it hasn't elapsed
    pub fn is_expired(&self) -> bool {
        match self.expiration {
            Some(expiration) => now_ms() >= expiration,
            None => false,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
