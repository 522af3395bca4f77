//! API Module
//!
//! HTTP handlers and routing for the cache service REST API.
//!
//! # Endpoints
//! - `PUT /:store/set` - Store a module-scoped entry
//! - `GET /:store/get/:module/:key` - Retrieve an entry
//! - `DELETE /:store/del/:module/:key` - Delete an entry
//! - `DELETE /:store/module/:module` - Clear a module namespace
//! - `DELETE /:store/flush` - Clear the whole instance
//! - `POST /:store/sweep` - Eagerly remove expired entries
//! - `GET /:store/stats` - Get instance statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
