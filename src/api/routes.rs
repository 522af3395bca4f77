//! API Routes
//!
//! Configures the Axum router with all cache service endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_all_handler, clear_module_handler, delete_handler, get_handler, health_handler,
    set_handler, stats_handler, sweep_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /:store/set` - Store a module-scoped entry
/// - `GET /:store/get/:module/:key` - Retrieve an entry
/// - `DELETE /:store/del/:module/:key` - Delete an entry
/// - `DELETE /:store/module/:module` - Clear a module namespace
/// - `DELETE /:store/flush` - Clear the whole instance
/// - `POST /:store/sweep` - Eagerly remove expired entries
/// - `GET /:store/stats` - Get instance statistics
/// - `GET /health` - Health check endpoint
///
/// `:store` selects one of the three instances: memory, local, or session.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/:store/set", put(set_handler))
        .route("/:store/get/:module/:key", get(get_handler))
        .route("/:store/del/:module/:key", delete(delete_handler))
        .route("/:store/module/:module", delete(clear_module_handler))
        .route("/:store/flush", delete(clear_all_handler))
        .route("/:store/sweep", post(sweep_handler))
        .route("/:store/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
