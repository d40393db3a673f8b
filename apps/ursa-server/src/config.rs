//! Server configuration from environment variables.

use std::fmt;

/// Configuration load errors.
#[derive(Debug)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    Missing(&'static str),
    /// An environment variable could not be parsed.
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => {
                write!(f, "Missing required environment variable {name}")
            }
            ConfigError::Invalid(name, value) => {
                write!(f, "Invalid value '{value}' for environment variable {name}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: String,
    /// Base URL of the external identity directory.
    pub identity_directory_url: String,
    /// When set, the canonical user id must be supplied inline in uploads.
    pub require_inline_user_id: bool,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Log filter directive.
    pub rust_log: String,
}

impl Config {
    /// Load configuration from the environment. Fails fast on missing
    /// required values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = require("DATABASE_URL")?;
        let identity_directory_url = require("IDENTITY_DIRECTORY_URL")?;

        let require_inline_user_id = std::env::var("REQUIRE_INLINE_USER_ID")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
            .unwrap_or(false);

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 8080,
        };

        let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            database_url,
            identity_directory_url,
            require_inline_user_id,
            host,
            port,
            rust_log,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}
