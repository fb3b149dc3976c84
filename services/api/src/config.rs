//! Service configuration
//!
//! Settings come from `QF_`-prefixed environment variables layered over
//! defaults. Database settings are read separately by
//! `common::database::DatabaseConfig`.

use axum::http::{HeaderValue, header::InvalidHeaderValue};
use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::net::SocketAddr;

/// Where the entity store lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// API service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Entity store backend
    pub storage: StorageBackend,
    /// JSON file of questions imported into an empty catalog at startup
    pub seed_path: Option<String>,
    /// Comma-separated browser origins allowed to call the API
    pub cors_origins: String,
}

/// Origins of the browser client during development and on GitHub Pages
const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:5173,http://localhost:3000,https://ohmjariwala.github.io";

impl AppConfig {
    /// Load configuration from the environment
    ///
    /// # Environment Variables
    /// - `QF_HOST`: bind address (default: "0.0.0.0")
    /// - `QF_PORT`: listen port (default: 8000)
    /// - `QF_STORAGE`: `postgres` or `memory` (default: postgres)
    /// - `QF_SEED_PATH`: optional question seed file
    /// - `QF_CORS_ORIGINS`: comma-separated allowed origins (default: the
    ///   local dev servers and the GitHub Pages site)
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000)?
            .set_default("storage", "postgres")?
            .set_default("cors_origins", DEFAULT_CORS_ORIGINS)?
            .add_source(Environment::with_prefix("QF").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Allowed origins as header values; blank entries are skipped
    pub fn allowed_origins(&self) -> Result<Vec<HeaderValue>, InvalidHeaderValue> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(HeaderValue::from_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        "QF_HOST",
        "QF_PORT",
        "QF_STORAGE",
        "QF_SEED_PATH",
        "QF_CORS_ORIGINS",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.seed_path, None);
        assert_eq!(config.bind_addr().unwrap().port(), 8000);
        assert_eq!(config.allowed_origins().unwrap().len(), 3);
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("QF_HOST", "127.0.0.1");
            std::env::set_var("QF_PORT", "9100");
            std::env::set_var("QF_STORAGE", "memory");
            std::env::set_var("QF_SEED_PATH", "data/questions.json");
            std::env::set_var("QF_CORS_ORIGINS", "https://qf.example.com, ,http://localhost:4173");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9100);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.seed_path.as_deref(), Some("data/questions.json"));
        assert_eq!(
            config.bind_addr().unwrap(),
            "127.0.0.1:9100".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            config.allowed_origins().unwrap(),
            vec![
                HeaderValue::from_static("https://qf.example.com"),
                HeaderValue::from_static("http://localhost:4173"),
            ]
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_unknown_backend_is_rejected() {
        clear_env();
        unsafe {
            std::env::set_var("QF_STORAGE", "sqlite");
        }

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }
}
