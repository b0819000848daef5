//! Configuration loading and resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`ROLLCALL_*`, parsed together with the CLI)
//! 3. TOML configuration file
//! 4. Built-in defaults
//!
//! The binary parses 1 and 2 into [`ConfigOverrides`]; this module layers them
//! over the TOML file and defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE_PATH: &str = "rollcall.db";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_AGE_URL: &str = "https://api.agify.io";
pub const DEFAULT_GENDER_URL: &str = "https://api.genderize.io";
pub const DEFAULT_NATIONALITY_URL: &str = "https://api.nationalize.io";

/// Configuration as read from the TOML file
///
/// Every key is optional; missing keys fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// External lookup endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupConfig {
    #[serde(default = "default_age_url")]
    pub age_url: String,
    #[serde(default = "default_gender_url")]
    pub gender_url: String,
    #[serde(default = "default_nationality_url")]
    pub nationality_url: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            age_url: default_age_url(),
            gender_url: default_gender_url(),
            nationality_url: default_nationality_url(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_age_url() -> String {
    DEFAULT_AGE_URL.to_string()
}

fn default_gender_url() -> String {
    DEFAULT_GENDER_URL.to_string()
}

fn default_nationality_url() -> String {
    DEFAULT_NATIONALITY_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub port: u16,
    pub lookup: LookupConfig,
    pub log_level: String,
}

/// Parse a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Layer overrides over the TOML file (if any) and built-in defaults
///
/// An explicitly named config file that cannot be read is an error.
pub fn resolve_config(
    config_file: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<ServiceConfig> {
    let toml_config = match config_file {
        Some(path) => load_toml_config(path)?,
        None => TomlConfig::default(),
    };

    let config = ServiceConfig {
        database_path: overrides
            .database_path
            .or(toml_config.database_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
        port: overrides.port.or(toml_config.port).unwrap_or(DEFAULT_PORT),
        lookup: toml_config.lookup,
        log_level: overrides.log_level.unwrap_or(toml_config.logging.level),
    };

    if config.database_path.as_os_str().is_empty() {
        return Err(Error::Config("database_path must not be empty".to_string()));
    }

    Ok(config)
}
