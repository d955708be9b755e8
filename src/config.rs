//! Runtime configuration from environment variables.
//!
//! Every variable is optional; with none set the app loads
//! `models/model.json` and logs to `heartwise.log` when attached to a terminal.

use std::path::PathBuf;

pub const MODEL_PATH_ENV: &str = "HEARTWISE_MODEL_PATH";
pub const REQUIRE_MANIFEST_ENV: &str = "HEARTWISE_REQUIRE_MANIFEST";
pub const LOG_MODE_ENV: &str = "HEARTWISE_LOG_MODE";
pub const LOG_FILE_ENV: &str = "HEARTWISE_LOG_FILE";

const DEFAULT_MODEL_PATH: &str = "models/model.json";
const DEFAULT_LOG_FILE: &str = "heartwise.log";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be one of auto, file, stdout (got {0:?})", var = LOG_MODE_ENV)]
    InvalidLogMode(String),
}

/// Where log output goes.
///
/// Writing logs to the terminal corrupts the TUI (alternate screen), so
/// `Auto` picks a file when stdout is interactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    /// Resolve `Auto` against whether stdout is a terminal.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

impl std::str::FromStr for LogMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "file" => Ok(Self::File),
            "stdout" => Ok(Self::Stdout),
            _ => Err(ConfigError::InvalidLogMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Model artifact, or a directory containing `model.json`.
    pub model_path: PathBuf,
    /// Refuse to start without `manifest.json` next to the model.
    pub require_manifest: bool,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            require_manifest: false,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "yes" | "YES")
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns error if a variable holds an unsupported value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    /// Returns error if a variable holds an unsupported value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            model_path: lookup(MODEL_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            require_manifest: lookup(REQUIRE_MANIFEST_ENV)
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.require_manifest),
            log_mode: match lookup(LOG_MODE_ENV) {
                Some(v) => v.parse()?,
                None => defaults.log_mode,
            },
            log_file: lookup(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = Config::from_lookup(|_| None).expect("config");
        assert_eq!(config, Config::default());
        assert_eq!(config.model_path, PathBuf::from("models/model.json"));
        assert!(!config.require_manifest);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (MODEL_PATH_ENV, "/opt/models"),
            (REQUIRE_MANIFEST_ENV, "yes"),
            (LOG_MODE_ENV, "Stdout"),
            (LOG_FILE_ENV, "/tmp/hw.log"),
        ]))
        .expect("config");

        assert_eq!(config.model_path, PathBuf::from("/opt/models"));
        assert!(config.require_manifest);
        assert_eq!(config.log_mode, LogMode::Stdout);
        assert_eq!(config.log_file, PathBuf::from("/tmp/hw.log"));
    }

    #[test]
    fn test_invalid_log_mode() {
        let err = Config::from_lookup(lookup_from(&[(LOG_MODE_ENV, "syslog")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidLogMode("syslog".into()));
    }

    #[test]
    fn test_log_mode_resolution() {
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
        assert!(!LogMode::Stdout.use_file(true));
    }
}
