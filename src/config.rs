//! Configuration management for pipewright
//!
//! Settings load from environment variables with sensible defaults; CLI
//! flags override both. Components never read the environment themselves;
//! the resolved configuration is passed in, so tests can inject fixture
//! paths.
//!
//! # Environment Variables
//!
//! - `PIPEWRIGHT_LIBRARY`: module-library directory - default: `~/.pipewright/modules`
//! - `PIPEWRIGHT_DATA_ROOT`: root of the per-subject data tree - default: `~/studies`
//! - `PIPEWRIGHT_LOG_LEVEL`: logging level - default: "info"

use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither the environment nor a flag supplied a usable path.
    #[error("no {what} configured and no home directory to derive one from")]
    NoDefaultPath { what: &'static str },

    /// Configuration validation failed
    #[error("configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Resolved configuration for one pipewright invocation.
#[derive(Debug, Clone)]
pub struct PipewrightConfig {
    /// Module-library directory.
    pub library: PathBuf,

    /// Root of the per-subject data tree.
    pub data_root: PathBuf,

    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl PipewrightConfig {
    /// Loads configuration from the environment, falling back to home-based
    /// defaults for the two paths.
    pub fn from_env() -> Result<Self, ConfigError> {
        let library = match env::var("PIPEWRIGHT_LIBRARY") {
            Ok(value) => PathBuf::from(value),
            Err(_) => dirs::home_dir()
                .map(|home| home.join(".pipewright").join("modules"))
                .ok_or(ConfigError::NoDefaultPath {
                    what: "module library",
                })?,
        };

        let data_root = match env::var("PIPEWRIGHT_DATA_ROOT") {
            Ok(value) => PathBuf::from(value),
            Err(_) => dirs::home_dir()
                .map(|home| home.join("studies"))
                .ok_or(ConfigError::NoDefaultPath { what: "data root" })?,
        };

        let log_level = env::var("PIPEWRIGHT_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Ok(Self {
            library,
            data_root,
            log_level,
        })
    }

    /// Applies CLI-flag overrides on top of the environment-derived values.
    pub fn with_overrides(
        mut self,
        library: Option<PathBuf>,
        data_root: Option<PathBuf>,
    ) -> Self {
        if let Some(library) = library {
            self.library = library;
        }
        if let Some(data_root) = data_root {
            self.data_root = data_root;
        }
        self
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the log level is unknown or a path is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationFailed(format!(
                    "invalid log level: {other}. Valid options: trace, debug, info, warn, error"
                )))
            }
        }

        if self.library.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "module library path is empty".to_string(),
            ));
        }
        if self.data_root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "data root path is empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for PipewrightConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipewright Configuration:")?;
        writeln!(f, "  Library: {}", self.library.display())?;
        writeln!(f, "  Data Root: {}", self.data_root.display())?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("PIPEWRIGHT_LIBRARY", "/opt/modules"),
            EnvGuard::set("PIPEWRIGHT_DATA_ROOT", "/srv/studies"),
            EnvGuard::set("PIPEWRIGHT_LOG_LEVEL", "DEBUG"),
        ];

        let config = PipewrightConfig::from_env().unwrap();
        assert_eq!(config.library, PathBuf::from("/opt/modules"));
        assert_eq!(config.data_root, PathBuf::from("/srv/studies"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_defaults_derive_from_home() {
        let _guards = vec![
            EnvGuard::unset("PIPEWRIGHT_LIBRARY"),
            EnvGuard::unset("PIPEWRIGHT_DATA_ROOT"),
            EnvGuard::unset("PIPEWRIGHT_LOG_LEVEL"),
        ];

        let config = PipewrightConfig::from_env().unwrap();
        assert!(config.library.ends_with(".pipewright/modules"));
        assert!(config.data_root.ends_with("studies"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    #[serial]
    fn test_flag_overrides_take_precedence() {
        let _guards = vec![
            EnvGuard::set("PIPEWRIGHT_LIBRARY", "/from/env"),
            EnvGuard::set("PIPEWRIGHT_DATA_ROOT", "/from/env"),
        ];

        let config = PipewrightConfig::from_env()
            .unwrap()
            .with_overrides(Some(PathBuf::from("/from/flag")), None);
        assert_eq!(config.library, PathBuf::from("/from/flag"));
        assert_eq!(config.data_root, PathBuf::from("/from/env"));
    }

    #[test]
    fn test_validation_rejects_unknown_log_level() {
        let config = PipewrightConfig {
            library: PathBuf::from("/lib"),
            data_root: PathBuf::from("/data"),
            log_level: "loud".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_accepts_sane_config() {
        let config = PipewrightConfig {
            library: PathBuf::from("/lib"),
            data_root: PathBuf::from("/data"),
            log_level: "info".to_string(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_paths() {
        let config = PipewrightConfig {
            library: PathBuf::new(),
            data_root: PathBuf::from("/data"),
            log_level: "info".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_display() {
        let config = PipewrightConfig {
            library: PathBuf::from("/lib"),
            data_root: PathBuf::from("/data"),
            log_level: "info".to_string(),
        };
        let display = format!("{config}");
        assert!(display.contains("Pipewright Configuration:"));
        assert!(display.contains("/lib"));
    }
}
