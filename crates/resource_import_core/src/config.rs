//! Environment-driven configuration for one import run.
//!
//! # Responsibility
//! - Resolve input/db paths, log level, log directory and the exit pause.
//! - Keep parsing independent of the process environment for tests.

use crate::logging::{default_log_level, LogLevel, LoggingError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_INPUT: &str = "RESOURCE_IMPORT_INPUT";
pub const ENV_DB: &str = "RESOURCE_IMPORT_DB";
pub const ENV_LOG_LEVEL: &str = "RESOURCE_IMPORT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "RESOURCE_IMPORT_LOG_DIR";
pub const ENV_PAUSE: &str = "RESOURCE_IMPORT_PAUSE";

const DEFAULT_INPUT: &str = "resources.yml";
const DEFAULT_DB: &str = "resources.sqlite3";

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    EmptyValue(&'static str),
    InvalidFlag { key: &'static str, value: String },
    LogLevel(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyValue(key) => write!(f, "{key} is set but empty"),
            Self::InvalidFlag { key, value } => {
                write!(f, "{key} must be one of 1|0|true|false|yes|no, got `{value}`")
            }
            Self::LogLevel(err) => write!(f, "{ENV_LOG_LEVEL}: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LogLevel(err) => Some(err),
            _ => None,
        }
    }
}

/// Resolved run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub input_path: PathBuf,
    pub db_path: PathBuf,
    pub log_level: LogLevel,
    /// `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Wait for Enter before the process exits.
    pub pause_on_exit: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT),
            db_path: PathBuf::from(DEFAULT_DB),
            log_level: default_log_level(),
            log_dir: None,
            pause_on_exit: false,
        }
    }
}

impl ImportConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = non_empty(&lookup, ENV_INPUT)? {
            config.input_path = PathBuf::from(value);
        }
        if let Some(value) = non_empty(&lookup, ENV_DB)? {
            config.db_path = PathBuf::from(value);
        }
        if let Some(value) = non_empty(&lookup, ENV_LOG_LEVEL)? {
            config.log_level = value.parse().map_err(ConfigError::LogLevel)?;
        }
        if let Some(value) = non_empty(&lookup, ENV_LOG_DIR)? {
            config.log_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = non_empty(&lookup, ENV_PAUSE)? {
            config.pause_on_exit = parse_flag(ENV_PAUSE, &value)?;
        }

        Ok(config)
    }
}

fn non_empty<F>(lookup: &F, key: &'static str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue(key)),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ImportConfig, ENV_DB, ENV_LOG_LEVEL, ENV_PAUSE};
    use crate::logging::LogLevel;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ImportConfig, ConfigError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ImportConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn unset_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ImportConfig::default());
        assert_eq!(config.input_path, PathBuf::from("resources.yml"));
        assert!(config.log_dir.is_none());
        assert!(!config.pause_on_exit);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            (ENV_DB, "/tmp/catalog.db"),
            (ENV_LOG_LEVEL, "WARN"),
            (ENV_PAUSE, "yes"),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/catalog.db"));
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(config.pause_on_exit);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[(ENV_PAUSE, "maybe")]),
            Err(ConfigError::InvalidFlag { .. })
        ));
        assert!(matches!(
            config_from(&[(ENV_DB, "  ")]),
            Err(ConfigError::EmptyValue(ENV_DB))
        ));
        assert!(matches!(
            config_from(&[(ENV_LOG_LEVEL, "verbose")]),
            Err(ConfigError::LogLevel(_))
        ));
    }
}
