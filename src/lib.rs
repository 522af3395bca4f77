//! Scoped Cache - an expiring key-value cache with module namespacing
//!
//! Unifies an in-process map and two persistent stores behind one `Cache`
//! type, with per-entry TTL expiration and a small REST surface over the
//! three instances.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{Cache, CacheSet, StorageKind};
pub use config::Config;
