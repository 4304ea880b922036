use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;
use tracing::info;

use crate::auth::{AuthMode, DEFAULT_ADMIN_EMAIL};

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/gatepass";
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
const MAX_RESET_TTL_MINUTES: i64 = 60 * 24 * 7;
const DEFAULT_RESET_REDIRECT: &str = "http://localhost:5173/reset-password";

#[derive(Debug, Error)]
#[error("Invalid value for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub auth_mode: AuthMode,
    pub admin_email: String,
    pub session_ttl: Duration,
    pub reset_ttl: Duration,
    pub password_reset_redirect: String,
    pub mock_session_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            database_url: text("DATABASE_URL", DEFAULT_DATABASE_URL),
            db_max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            port: parse(&lookup, "PORT", 3001)?,
            auth_mode: parse(&lookup, "AUTH_MODE", AuthMode::Remote)?,
            admin_email: text("ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
            session_ttl: ttl(
                &lookup,
                "SESSION_TTL_HOURS",
                24,
                MAX_SESSION_TTL_HOURS,
                Duration::try_hours,
            )?,
            reset_ttl: ttl(
                &lookup,
                "RESET_TTL_MINUTES",
                30,
                MAX_RESET_TTL_MINUTES,
                Duration::try_minutes,
            )?,
            password_reset_redirect: text("PASSWORD_RESET_REDIRECT", DEFAULT_RESET_REDIRECT),
            mock_session_file: lookup("MOCK_SESSION_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

/// A positive duration of at most `max` units.
fn ttl<F>(
    lookup: &F,
    key: &'static str,
    default: i64,
    max: i64,
    unit: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let amount: i64 = parse(lookup, key, default)?;
    if !(1..=max).contains(&amount) {
        return Err(ConfigError {
            key,
            reason: format!("must be between 1 and {max}, got {amount}"),
        });
    }
    unit(amount).ok_or_else(|| ConfigError {
        key,
        reason: format!("{amount} is out of range"),
    })
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            reason: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
