//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// Request body for the SET operation (PUT /:store/set)
///
/// # Fields
/// - `module`: Namespace the entry belongs to
/// - `key`: The cache key within the module
/// - `value`: Arbitrary JSON payload to store
/// - `ttl`: Optional TTL in milliseconds; absent or 0 means no expiration
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// Module namespace
    pub module: String,
    /// The cache key
    pub key: String,
    /// The payload to store
    pub value: Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.module.is_empty() {
            return Some("Module name cannot be empty".to_string());
        }
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        None
    }
}
