//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults that suit local development. A `.env` file is honored when
//! present (loaded in `main`).

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Maximum accepted request body size (multipart uploads included).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,

    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Directory where uploaded media objects are stored.
    pub media_dir: PathBuf,

    /// Public base URL under which media objects are reachable.
    pub media_base_url: String,

    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {0}")]
    InvalidValue(String),
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_addr = env::var("BODEGA_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        let config = ServerConfig {
            database_path: env::var("BODEGA_DB")
                .unwrap_or_else(|_| "./bodega.db".to_string())
                .into(),

            media_dir: env::var("BODEGA_MEDIA_DIR")
                .unwrap_or_else(|_| "./media".to_string())
                .into(),

            // Defaults to the server's own /media mount; point this at a
            // CDN or reverse proxy in production.
            media_base_url: env::var("BODEGA_MEDIA_BASE_URL")
                .unwrap_or_else(|_| format!("http://{bind_addr}/media")),

            max_upload_bytes: env::var("BODEGA_MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BODEGA_MAX_UPLOAD_BYTES".to_string()))?,

            bind_addr,
        };

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Env-free load picks development defaults
        let config = ServerConfig::load().unwrap();
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.media_base_url.ends_with("/media"));
    }
}
