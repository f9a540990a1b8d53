//! Application configuration.

use serde::Deserialize;
use std::path::Path;

use crate::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Identity store configuration.
    pub identity: IdentityConfig,
    /// Document store configuration.
    pub documents: DocumentsConfig,
    /// Auto-loop schedule configuration.
    #[serde(default)]
    pub auto_loop: AutoLoopConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Identity store connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the identity provider's admin API.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
}

/// Document store connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsConfig {
    /// Base URL of the document database API.
    pub base_url: String,
    /// Logical database name within the document store.
    #[serde(default = "default_database")]
    pub database: String,
}

/// Auto-loop schedule configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoLoopConfig {
    /// Hour of day the nightly run fires (in `timezone`).
    #[serde(default = "default_auto_loop_hour")]
    pub hour: u32,
    /// Minute of the hour the nightly run fires.
    #[serde(default)]
    pub minute: u32,
    /// IANA timezone the schedule and the `tomorrow` calendar use.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for AutoLoopConfig {
    fn default() -> Self {
        Self {
            hour: default_auto_loop_hour(),
            minute: 0,
            timezone: default_timezone(),
        }
    }
}

impl AutoLoopConfig {
    /// Parse the configured timezone.
    pub fn schedule_tz(&self) -> AppResult<chrono_tz::Tz> {
        self.timezone
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid timezone: {}", self.timezone)))
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_database() -> String {
    "(default)".to_string()
}

const fn default_auto_loop_hour() -> u32 {
    21
}

fn default_timezone() -> String {
    "Asia/Dhaka".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `SMARTMESS_ENV`)
    /// 3. Environment variables with `SMARTMESS_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("SMARTMESS_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SMARTMESS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("SMARTMESS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_loop_defaults() {
        let auto_loop = AutoLoopConfig::default();
        assert_eq!(auto_loop.hour, 21);
        assert_eq!(auto_loop.minute, 0);
        assert_eq!(auto_loop.timezone, "Asia/Dhaka");
        assert_eq!(auto_loop.schedule_tz().unwrap(), chrono_tz::Asia::Dhaka);
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let auto_loop = AutoLoopConfig {
            timezone: "Mars/Olympus".to_string(),
            ..AutoLoopConfig::default()
        };
        assert!(auto_loop.schedule_tz().is_err());
    }
}
