//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    /// Base URL of an OpenAI-compatible endpoint; the provider default when unset.
    pub completion_api_base: Option<String>,
    pub completion_model: String,
    pub session_ttl_days: i64,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
        let database_max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 5u32)?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Completion Provider Settings ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let completion_api_base = std::env::var("COMPLETION_API_BASE").ok();
        let completion_model =
            std::env::var("COMPLETION_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        // --- Load Auth and CORS Settings ---
        let session_ttl_days = parse_var("SESSION_TTL_DAYS", 7i64)?;
        if session_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_DAYS".to_string(),
                "must be a positive number of days".to_string(),
            ));
        }

        let origins =
            std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string());
        let allowed_origins =
            parse_origins(&origins, std::env::var("FRONTEND_URL").ok().as_deref());

        Ok(Self {
            bind_address,
            database_url,
            database_max_connections,
            log_level,
            openai_api_key,
            completion_api_base,
            completion_model,
            session_ttl_days,
            allowed_origins,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Splits a comma-separated origin list and appends the frontend URL.
fn parse_origins(list: &str, frontend_url: Option<&str>) -> Vec<String> {
    let mut origins: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();
    if let Some(url) = frontend_url.map(str::trim).filter(|url| !url.is_empty()) {
        if !origins.iter().any(|origin| origin == url) {
            origins.push(url.to_string());
        }
    }
    origins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_frontend_url_appended_once() {
        let origins = parse_origins(" http://a.test , ,http://b.test", Some("http://c.test"));
        assert_eq!(origins, vec!["http://a.test", "http://b.test", "http://c.test"]);

        let origins = parse_origins("http://a.test", Some("http://a.test"));
        assert_eq!(origins, vec!["http://a.test"]);
    }

    #[test]
    fn default_origin_list_parses() {
        assert_eq!(parse_origins(DEFAULT_ALLOWED_ORIGINS, None).len(), 2);
    }
}
