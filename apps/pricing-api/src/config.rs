//! Pricing API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Secret used when `TESSERA_JWT_SECRET` is not set. Development only.
pub const DEV_JWT_SECRET: &str = "tessera-dev-secret-change-in-production";

/// Pricing API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind the HTTP server to
    pub bind_addr: String,

    /// HTTP server port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Maximum pooled database connections
    pub db_max_connections: u32,

    /// Secret for validating admin bearer tokens
    pub jwt_secret: String,

    /// History entries that may wait to be written
    pub history_queue_capacity: usize,

    /// Maximum variants in one CSV export
    pub export_limit: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: 9000,
            database_path: "./tessera.db".to_string(),
            db_max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            history_queue_capacity: 1024,
            export_limit: 5000,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            bind_addr: env::var("TESSERA_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_var("TESSERA_PORT", defaults.port)?,
            database_path: env::var("TESSERA_DATABASE_PATH").unwrap_or(defaults.database_path),
            db_max_connections: parse_var("TESSERA_DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            jwt_secret: env::var("TESSERA_JWT_SECRET").unwrap_or(defaults.jwt_secret),
            history_queue_capacity: parse_var(
                "TESSERA_HISTORY_QUEUE_CAPACITY",
                defaults.history_queue_capacity,
            )?,
            export_limit: parse_var("TESSERA_EXPORT_LIMIT", defaults.export_limit)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("TESSERA_PORT".to_string()));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("TESSERA_DB_MAX_CONNECTIONS".to_string()));
        }
        if self.history_queue_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "TESSERA_HISTORY_QUEUE_CAPACITY".to_string(),
            ));
        }
        if self.export_limit == 0 {
            return Err(ConfigError::InvalidValue("TESSERA_EXPORT_LIMIT".to_string()));
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("TESSERA_JWT_SECRET".to_string()));
        }
        Ok(())
    }

    /// Whether the development JWT secret is in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
