// Process configuration loaded from the environment

use std::{env, fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::info;

use crate::db::PoolSettings;

/// Seven days, the default lifetime of a session token
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 604_800;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Runtime configuration for the auth service
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// `None` issues tokens without an expiry claim
    pub token_ttl: Option<Duration>,
    pub host: String,
    pub port: u16,
    pub pool: PoolSettings,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("pool", &self.pool)
            .finish()
    }
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Secrets are required; everything else falls back to a default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required(&lookup, "DATABASE_URL")?;
        let jwt_secret = required(&lookup, "JWT_SECRET")?;

        let token_ttl = match lookup("TOKEN_TTL_SECONDS") {
            None => Some(Duration::from_secs(DEFAULT_TOKEN_TTL_SECONDS)),
            Some(raw) => parse_ttl(&raw)?,
        };

        let pool = PoolSettings {
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            connect_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DB_CONNECT_TIMEOUT_SECONDS",
                5,
            )?),
            query_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DB_QUERY_TIMEOUT_SECONDS",
                5,
            )?),
        };

        Ok(Self {
            database_url,
            jwt_secret,
            token_ttl,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 4000)?,
            pool,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}

fn parse_ttl(raw: &str) -> Result<Option<Duration>, ConfigError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("never") {
        return Ok(None);
    }
    let seconds: u64 = raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
        key: "TOKEN_TTL_SECONDS",
        reason: e.to_string(),
    })?;
    Ok((seconds > 0).then(|| Duration::from_secs(seconds)))
}
