//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint. Every data route
//! addresses one of the three cache instances through its `:store` path
//! segment.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheSet, DiskProvider, StorageKind};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearAllResponse, ClearModuleResponse, DeleteResponse, GetResponse, HealthResponse,
    SetRequest, SetResponse, StatsResponse, SweepResponse,
};

/// Application state shared across all handlers.
///
/// Contains the three cache instances wrapped in Arc<RwLock<>> for
/// thread-safe access.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache set
    pub caches: Arc<RwLock<CacheSet>>,
}

impl AppState {
    /// Creates a new AppState with the given cache set.
    pub fn new(caches: CacheSet) -> Self {
        Self {
            caches: Arc::new(RwLock::new(caches)),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the disk-backed stores under the configured data directory;
    /// fails if either persistent store cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = DiskProvider::from_config(config);
        Ok(Self::new(CacheSet::open(&provider)?))
    }
}

/// Handler for PUT /:store/set
///
/// Stores a module-scoped entry with optional TTL. Storage failures never
/// surface here: the cache is best-effort by contract, so an accepted
/// request is a 200 even if the backend rejected the write.
pub async fn set_handler(
    State(state): State<AppState>,
    Path(store): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    let kind: StorageKind = store.parse()?;

    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let SetRequest {
        module,
        key,
        value,
        ttl,
    } = req;

    // Acquire write lock and store the entry
    let mut caches = state.caches.write().await;
    caches
        .by_kind(kind)
        .set(&module, &key, value, ttl.unwrap_or(0));

    Ok(Json(SetResponse::new(module, key)))
}

/// Handler for GET /:store/get/:module/:key
///
/// Retrieves a module-scoped entry. A missing, expired, or unparseable
/// entry is a 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path((store, module, key)): Path<(String, String, String)>,
) -> Result<Json<GetResponse>> {
    let kind: StorageKind = store.parse()?;

    // Acquire write lock (needed for lazy expiration and stats update)
    let mut caches = state.caches.write().await;
    match caches.by_kind(kind).get(&module, &key) {
        Some(value) => Ok(Json(GetResponse::new(kind.to_string(), module, key, value))),
        None => Err(CacheError::NotFound(format!("{module}:{key}"))),
    }
}

/// Handler for DELETE /:store/del/:module/:key
///
/// Deletes a module-scoped entry. Deletion is idempotent, so an absent key
/// still answers 200.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((store, module, key)): Path<(String, String, String)>,
) -> Result<Json<DeleteResponse>> {
    let kind: StorageKind = store.parse()?;

    // Acquire write lock
    let mut caches = state.caches.write().await;
    caches.by_kind(kind).delete(&module, &key);

    Ok(Json(DeleteResponse::new(module, key)))
}

/// Handler for DELETE /:store/module/:module
///
/// Removes every entry in the module namespace, expired or not.
pub async fn clear_module_handler(
    State(state): State<AppState>,
    Path((store, module)): Path<(String, String)>,
) -> Result<Json<ClearModuleResponse>> {
    let kind: StorageKind = store.parse()?;

    let mut caches = state.caches.write().await;
    caches.by_kind(kind).clear_module(&module);

    Ok(Json(ClearModuleResponse::new(module)))
}

/// Handler for DELETE /:store/flush
///
/// Empties the addressed instance; the sibling instances are untouched.
pub async fn clear_all_handler(
    State(state): State<AppState>,
    Path(store): Path<String>,
) -> Result<Json<ClearAllResponse>> {
    let kind: StorageKind = store.parse()?;

    let mut caches = state.caches.write().await;
    caches.by_kind(kind).clear_all();

    Ok(Json(ClearAllResponse::new(kind.to_string())))
}

/// Handler for POST /:store/sweep
///
/// Eagerly removes every expired entry from the addressed instance and
/// reports how many were swept.
pub async fn sweep_handler(
    State(state): State<AppState>,
    Path(store): Path<String>,
) -> Result<Json<SweepResponse>> {
    let kind: StorageKind = store.parse()?;

    let mut caches = state.caches.write().await;
    let removed = caches.by_kind(kind).clear_expired();

    Ok(Json(SweepResponse::new(removed)))
}

/// Handler for GET /:store/stats
///
/// Returns current access counters for the addressed instance.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(store): Path<String>,
) -> Result<Json<StatsResponse>> {
    let kind: StorageKind = store.parse()?;

    let mut caches = state.caches.write().await;
    let stats = caches.by_kind(kind).stats();

    Ok(Json(StatsResponse::new(
        stats.hits,
        stats.misses,
        stats.expired,
        stats.total_entries,
    )))
}

/// Handler for GET /health
///
/// Returns health status of the service.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
