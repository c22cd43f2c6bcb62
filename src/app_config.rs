// Centralized configuration management for the placebook backend.
// All environment variables are read once at startup; services receive the
// values they need through constructors instead of a global static.

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Insecure development fallback the original deployment shipped with.
/// Startup refuses to proceed when the configured secret equals this value.
pub const INSECURE_DEFAULT_SECRET: &str = "dev-secret-change-me";

/// Minimum length for the referral token secret.
const MIN_SECRET_LENGTH: usize = 16;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
    #[error("SHARE_TOKEN_SECRET is the insecure default; set a real secret")]
    InsecureSecret,
    #[error("SHARE_TOKEN_SECRET must be at least {MIN_SECRET_LENGTH} bytes")]
    SecretTooShort,
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // Server
    pub bind_address: String,
    pub rust_log: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    pub database_connect_timeout: u64,
    pub database_idle_timeout: u64,
    pub database_max_lifetime: u64,

    // Share links
    pub share_token_secret: String,
    pub share_base_url: String,
    pub asset_base_url: String,
    pub share_link_ttl_days: i64,

    // JWT validation (issuance lives in the auth service)
    pub jwt_access_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,

    pub disable_embedded_migrations: bool,
}

impl AppConfig {
    /// Load configuration from environment variables, failing fast on
    /// anything missing or unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let share_token_secret = require_var("SHARE_TOKEN_SECRET")?;
        if share_token_secret == INSECURE_DEFAULT_SECRET {
            return Err(ConfigError::InsecureSecret);
        }
        if share_token_secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort);
        }

        let share_base_url =
            env::var("SHARE_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
        let asset_base_url =
            env::var("ASSET_BASE_URL").unwrap_or_else(|_| share_base_url.clone());

        Ok(Self {
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            rust_log: env::var("RUST_LOG")
                .unwrap_or_else(|_| "placebook_backend=debug,tower_http=info".to_string()),

            database_url: require_var("DATABASE_URL")?,
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 20)?,
            database_min_connections: parse_var("DATABASE_MIN_CONNECTIONS", 2)?,
            database_connect_timeout: parse_var("DATABASE_CONNECT_TIMEOUT", 10)?,
            database_idle_timeout: parse_var("DATABASE_IDLE_TIMEOUT", 300)?,
            database_max_lifetime: parse_var("DATABASE_MAX_LIFETIME", 1800)?,

            share_token_secret,
            share_base_url: share_base_url.trim_end_matches('/').to_string(),
            asset_base_url: asset_base_url.trim_end_matches('/').to_string(),
            share_link_ttl_days: parse_var("SHARE_LINK_TTL_DAYS", 30)?,

            jwt_access_secret: require_var("JWT_ACCESS_SECRET")?,
            jwt_audience: env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "placebook.app".to_string()),
            jwt_issuer: env::var("JWT_ISSUER")
                .unwrap_or_else(|_| "placebook-auth".to_string()),

            disable_embedded_migrations: env::var("DISABLE_EMBEDDED_MIGRATIONS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }
}

fn require_var(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name.to_string())),
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(v) => v
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(name.to_string(), v)),
        Err(_) => Ok(default),
    }
}
