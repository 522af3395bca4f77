//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

/// Response body for the GET operation (GET /:store/get/:module/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// Storage kind the entry came from
    pub store: String,
    /// Module namespace
    pub module: String,
    /// The requested key
    pub key: String,
    /// The stored payload
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(
        store: impl Into<String>,
        module: impl Into<String>,
        key: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            store: store.into(),
            module: module.into(),
            key: key.into(),
            value,
        }
    }
}

/// Response body for the SET operation (PUT /:store/set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// Module namespace
    pub module: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(module: impl Into<String>, key: impl Into<String>) -> Self {
        let module = module.into();
        let key = key.into();
        Self {
            message: format!("Entry '{}:{}' accepted", module, key),
            module,
            key,
        }
    }
}

/// Response body for the DELETE operation (DELETE /:store/del/:module/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// Module namespace
    pub module: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(module: impl Into<String>, key: impl Into<String>) -> Self {
        let module = module.into();
        let key = key.into();
        Self {
            message: format!("Entry '{}:{}' deleted", module, key),
            module,
            key,
        }
    }
}

/// Response body for clearing a module (DELETE /:store/module/:module)
#[derive(Debug, Clone, Serialize)]
pub struct ClearModuleResponse {
    /// Success message
    pub message: String,
    /// The module that was cleared
    pub module: String,
}

impl ClearModuleResponse {
    /// Creates a new ClearModuleResponse
    pub fn new(module: impl Into<String>) -> Self {
        let module = module.into();
        Self {
            message: format!("Module '{}' cleared", module),
            module,
        }
    }
}

/// Response body for clearing a whole instance (DELETE /:store/flush)
#[derive(Debug, Clone, Serialize)]
pub struct ClearAllResponse {
    /// Success message
    pub message: String,
    /// Storage kind that was flushed
    pub store: String,
}

impl ClearAllResponse {
    /// Creates a new ClearAllResponse
    pub fn new(store: impl Into<String>) -> Self {
        let store = store.into();
        Self {
            message: format!("Storage '{}' flushed", store),
            store,
        }
    }
}

/// Response body for the eager expired sweep (POST /:store/sweep)
#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    /// Number of expired entries removed
    pub removed: usize,
}

impl SweepResponse {
    /// Creates a new SweepResponse
    pub fn new(removed: usize) -> Self {
        Self { removed }
    }
}

/// Response body for the stats endpoint (GET /:store/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries removed because their TTL elapsed
    pub expired: u64,
    /// Current number of entries in the instance
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(hits: u64, misses: u64, expired: u64, total_entries: usize) -> Self {
        let total_lookups = hits + misses;
        let hit_rate = if total_lookups > 0 {
            hits as f64 / total_lookups as f64
        } else {
            0.0
        };
        Self {
            hits,
            misses,
            expired,
            total_entries,
            hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
