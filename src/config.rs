//! Configuration for taplock.

use crate::capture::DEFAULT_SILENCE_TIMEOUT;
use crate::rhythm::DEFAULT_TOLERANCE_MICROS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Silence after the last tap that ends an attempt
    #[serde(rename = "silence_timeout_ms", with = "duration_ms")]
    pub silence_timeout: Duration,

    /// Largest per-interval timing difference that still matches
    #[serde(rename = "tolerance_ms", with = "duration_ms")]
    pub tolerance: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            silence_timeout: DEFAULT_SILENCE_TIMEOUT,
            tolerance: Duration::from_micros(DEFAULT_TOLERANCE_MICROS),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or the defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taplock")
            .join("config.json")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.silence_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "silence_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialize error: {0}")]
    SerializeError(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Serde support for Duration as whole milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.silence_timeout, Duration::from_secs(1));
        assert_eq!(config.tolerance, Duration::from_millis(200));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            silence_timeout: Duration::from_millis(1_500),
            tolerance: Duration::from_millis(120),
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"silence_timeout_ms\": 1500"));
        assert!(raw.contains("\"tolerance_ms\": 120"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "tolerance_ms": 150 }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.tolerance, Duration::from_millis(150));
        assert_eq!(config.silence_timeout, DEFAULT_SILENCE_TIMEOUT);
    }

    #[test]
    fn test_invalid_files_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));

        std::fs::write(&path, r#"{ "silence_timeout_ms": 0 }"#).unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Invalid(_))));
    }
}
