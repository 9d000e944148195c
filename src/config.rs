//! Configuration loaded from environment variables

use std::env;
use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_URL: &str = "contacts.db";
pub const DEFAULT_LOG_FILTER: &str = "contact_directory=debug,tower_http=debug";
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server port number (default: 8080)
    pub port: u16,

    /// Path to the database file (default: "contacts.db")
    pub database_url: String,

    /// tracing-subscriber filter directives
    pub log_filter: String,

    /// Directory for daily rolling log files, `None` logs to stdout only
    pub log_dir: Option<PathBuf>,

    /// Insert demo contacts into an empty database on start-up
    pub seed_demo_data: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `PORT`: Server port (default: 8080)
    /// - `DATABASE_URL`: Database file path (default: "contacts.db")
    /// - `RUST_LOG`: Log filter (default: "contact_directory=debug,tower_http=debug")
    /// - `LOG_DIR`: Directory for daily log files (default: "logs", empty disables)
    /// - `SEED_DEMO_DATA`: "true"/"1" to seed an empty database (default: false)
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                var: "PORT".to_string(),
                reason: format!("'{value}' is not a valid port number"),
            })?,
            None => DEFAULT_PORT,
        };

        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let log_filter = lookup("RUST_LOG")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let log_dir = match lookup("LOG_DIR") {
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(PathBuf::from(value.trim())),
            None => Some(PathBuf::from(DEFAULT_LOG_DIR)),
        };

        let seed_demo_data = match lookup("SEED_DEMO_DATA") {
            Some(value) => parse_bool("SEED_DEMO_DATA", &value)?,
            None => false,
        };

        Ok(Self {
            port,
            database_url,
            log_filter,
            log_dir,
            seed_demo_data,
        })
    }
}

fn parse_bool(var: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            reason: format!("'{value}' is not a boolean"),
        }),
    }
}
