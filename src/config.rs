//! Builder configuration.
//!
//! Read from a TOML file whose path comes from `TRIGGER_BUILDER_CONFIG`
//! (a `.env` file is honoured). Every key is optional:
//!
//! ```toml
//! [logging]
//! level = "info"
//! file = "trigger_builder.log"
//! console_timestamps = true
//!
//! [submission]
//! timeout_secs = 30
//! ```
//!
//! `TRIGGER_BUILDER_LOG_LEVEL` overrides `logging.level`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::logging::{self, Component, LogLevel};

pub const CONFIG_PATH_VAR: &str = "TRIGGER_BUILDER_CONFIG";
pub const LOG_LEVEL_VAR: &str = "TRIGGER_BUILDER_LOG_LEVEL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {var}: {message}")]
    Env { var: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            console_timestamps: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Upper bound on one create request to the trigger store; 0 disables it.
    pub timeout_secs: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl SubmissionConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub logging: LoggingConfig,
    pub submission: SubmissionConfig,
}

impl BuilderConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads `.env`, then the file named by `TRIGGER_BUILDER_CONFIG` (or the
    /// defaults when unset), then applies environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => {
                let config = Self::load(&path).inspect_err(|err| {
                    logging::error(Component::Config, None, &err.to_string());
                })?;
                logging::debug(Component::Config, None, &format!("loaded {}", path));
                config
            }
            Err(_) => Self::default(),
        };

        if let Ok(level) = std::env::var(LOG_LEVEL_VAR) {
            config.logging.level = level.parse().map_err(|message| ConfigError::Env {
                var: LOG_LEVEL_VAR,
                message,
            })?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests that touch process environment run one at a time.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_env(config_path: Option<&Path>, level: Option<&str>) {
        // SAFETY: callers hold ENV_LOCK, and no other test reads these vars.
        unsafe {
            match config_path {
                Some(path) => std::env::set_var(CONFIG_PATH_VAR, path),
                None => std::env::remove_var(CONFIG_PATH_VAR),
            }
            match level {
                Some(level) => std::env::set_var(LOG_LEVEL_VAR, level),
                None => std::env::remove_var(LOG_LEVEL_VAR),
            }
        }
    }

    fn write_temp_config(name: &str, text: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "trigger_builder_{}_{}.toml",
            name,
            std::process::id()
        ));
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BuilderConfig::from_toml_str("").unwrap();
        assert_eq!(config, BuilderConfig::default());
        assert_eq!(config.submission.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_full_config() {
        let config = BuilderConfig::from_toml_str(
            r#"
            [logging]
            level = "warn"
            file = "/var/log/trigger_builder.log"
            console_timestamps = false

            [submission]
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.level, LogLevel::Warning);
        assert_eq!(config.logging.file.as_deref(), Some("/var/log/trigger_builder.log"));
        assert!(!config.logging.console_timestamps);
        assert_eq!(config.submission.timeout_secs, 5);
    }

    #[test]
    fn test_zero_timeout_disables_bound() {
        let config = BuilderConfig::from_toml_str("[submission]\ntimeout_secs = 0").unwrap();
        assert_eq!(config.submission.timeout(), None);
    }

    #[test]
    fn test_invalid_level_is_parse_error() {
        let err = BuilderConfig::from_toml_str("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = BuilderConfig::load("/nonexistent/trigger_builder.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/trigger_builder.toml"));
    }

    #[test]
    fn test_from_env_without_vars_uses_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_env(None, None);
        assert_eq!(BuilderConfig::from_env().unwrap(), BuilderConfig::default());
    }

    #[test]
    fn test_from_env_reads_file_and_level_override() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = write_temp_config(
            "override",
            "[logging]\nlevel = \"debug\"\nconsole_timestamps = false\n\n[submission]\ntimeout_secs = 9\n",
        );

        set_env(Some(&path), None);
        let from_file = BuilderConfig::from_env().unwrap();
        assert_eq!(from_file.logging.level, LogLevel::Debug);
        assert!(!from_file.logging.console_timestamps);
        assert_eq!(from_file.submission.timeout(), Some(Duration::from_secs(9)));

        set_env(Some(&path), Some("error"));
        let overridden = BuilderConfig::from_env().unwrap();
        set_env(None, None);
        std::fs::remove_file(&path).ok();

        assert_eq!(overridden.logging.level, LogLevel::Error);
        assert!(!overridden.logging.console_timestamps);
        assert_eq!(overridden.submission.timeout_secs, 9);
    }

    #[test]
    fn test_from_env_rejects_unknown_level() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_env(None, Some("bogus"));
        let err = BuilderConfig::from_env().unwrap_err();
        set_env(None, None);

        match err {
            ConfigError::Env { var, message } => {
                assert_eq!(var, LOG_LEVEL_VAR);
                assert!(message.contains("bogus"));
            }
            other => panic!("expected Env error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_env_missing_config_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_env(Some(Path::new("/nonexistent/trigger_builder.toml")), None);
        let err = BuilderConfig::from_env().unwrap_err();
        set_env(None, None);
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
