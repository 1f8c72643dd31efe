//! Process configuration, read from the environment at startup.

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

/// Bounds applied to the `limit` parameter of `GET /events`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventsLimit {
    /// Used when the request has no `limit`.
    pub default: NonZeroU32,
    /// Larger requests are clamped to this.
    pub max: NonZeroU32,
}

impl Default for EventsLimit {
    fn default() -> Self {
        Self {
            default: NonZeroU32::new(100).unwrap_or(NonZeroU32::MIN),
            max: NonZeroU32::new(1000).unwrap_or(NonZeroU32::MIN),
        }
    }
}

impl EventsLimit {
    /// Resolves a raw `limit` query value.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message if `raw` is not a positive integer.
    pub fn resolve(&self, raw: Option<&str>) -> Result<NonZeroU32, String> {
        let Some(raw) = raw else {
            return Ok(self.default);
        };
        let requested: u64 = raw
            .trim()
            .parse()
            .map_err(|_| format!("limit must be a positive integer, got '{raw}'"))?;
        if requested == 0 {
            return Err("limit must be a positive integer, got '0'".to_owned());
        }
        let clamped = requested.min(u64::from(self.max.get()));
        // Clamped to `max`, which is a non-zero u32.
        Ok(u32::try_from(clamped)
            .ok()
            .and_then(NonZeroU32::new)
            .unwrap_or(self.max))
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `SQLite` connection URL.
    pub database_url: String,
    /// Connection pool size.
    pub database_max_connections: u32,
    /// Path of the validation schema document.
    pub schema_path: PathBuf,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Bounds for `GET /events`.
    pub events_limit: EventsLimit,
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{name} must be valid: {e}"))),
    }
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = EventsLimit::default();
        let events_limit = EventsLimit {
            default: parse_var(&lookup, "DEFAULT_EVENTS_LIMIT", defaults.default)?,
            max: parse_var(&lookup, "MAX_EVENTS_LIMIT", defaults.max)?,
        };
        if events_limit.default > events_limit.max {
            return Err(AppError::Config(
                "DEFAULT_EVENTS_LIMIT must not exceed MAX_EVENTS_LIMIT".to_owned(),
            ));
        }

        let database_max_connections = parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", 5_u32)?;
        if database_max_connections == 0 {
            return Err(AppError::Config(
                "DATABASE_MAX_CONNECTIONS must be at least 1".to_owned(),
            ));
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://appointments.db".to_owned()),
            database_max_connections,
            schema_path: lookup("SCHEMA_PATH").map_or_else(|| "schema.json".into(), PathBuf::from),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse_var(&lookup, "PORT", 8000_u16)?,
            events_limit,
        })
    }
}
