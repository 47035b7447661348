//! Application configuration loaded from environment variables.
//!
//! Fail-fast loading with validation: required variables must be present and
//! valid or the application exits with a clear error message.

use std::env;

use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {name}: {message}")]
    InvalidVar { name: String, message: String },
}

/// Runtime configuration for the fleethub API.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind host (`HOST`, default `0.0.0.0`).
    pub host: String,

    /// Bind port (`PORT`, default `8080`).
    pub port: u16,

    /// Postgres connection string (`DATABASE_URL`).
    pub database_url: String,

    /// Connection pool size (`DATABASE_MAX_CONNECTIONS`, default `10`).
    pub database_max_connections: u32,

    /// Identity provider base URL (`KEYCLOAK_BASE_URL`).
    pub keycloak_base_url: String,

    /// Realm holding the fleet's user accounts (`KEYCLOAK_REALM`).
    pub keycloak_realm: String,

    /// Service-account client ID (`KEYCLOAK_CLIENT_ID`).
    pub keycloak_client_id: String,

    /// Service-account client secret (`KEYCLOAK_CLIENT_SECRET`).
    pub keycloak_client_secret: String,

    /// Root directory for stored blobs (`BLOB_ROOT`).
    pub blob_root: String,

    /// Public base URL blobs are served under (`BLOB_PUBLIC_BASE_URL`).
    pub blob_public_base_url: String,

    /// Log filter directive (`RUST_LOG`, default `info`).
    pub rust_log: String,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or("HOST", "0.0.0.0"),
            port: parse_var("PORT", 8080)?,
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
            keycloak_base_url: required("KEYCLOAK_BASE_URL")?,
            keycloak_realm: required("KEYCLOAK_REALM")?,
            keycloak_client_id: required("KEYCLOAK_CLIENT_ID")?,
            keycloak_client_secret: required("KEYCLOAK_CLIENT_SECRET")?,
            blob_root: required("BLOB_ROOT")?,
            blob_public_base_url: required("BLOB_PUBLIC_BASE_URL")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

fn required(name: &str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingVar(name.to_string()))
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.is_empty() => {
            value.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
                name: name.to_string(),
                message: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}
