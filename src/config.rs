//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the persistent store files
    pub data_dir: PathBuf,
    /// Byte quota applied to each persistent store
    pub quota_bytes: usize,
    /// HTTP server port
    pub server_port: u16,
}

/// Default per-store quota in bytes.
const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DATA_DIR` - Directory for persistent store files (default: cache_data)
    /// - `STORAGE_QUOTA_BYTES` - Per-store byte quota (default: 5 MiB)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("cache_data")),
            quota_bytes: env::var("STORAGE_QUOTA_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_QUOTA_BYTES),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("cache_data"),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            server_port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("cache_data"));
        assert_eq!(config.quota_bytes, 5 * 1024 * 1024);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("DATA_DIR");
        env::remove_var("STORAGE_QUOTA_BYTES");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.data_dir, PathBuf::from("cache_data"));
        assert_eq!(config.quota_bytes, 5 * 1024 * 1024);
        assert_eq!(config.server_port, 3000);
    }
}
