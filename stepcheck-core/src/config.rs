// Configuration
// YAML-loadable settings for the interpreters (currently the correlation lane)

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lower and upper bounds for the correlation poll interval
const MIN_POLL_INTERVAL_MS: u64 = 1;
const MAX_POLL_INTERVAL_MS: u64 = 100;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepcheckConfig {
    pub correlation: CorrelationConfig,
}

impl StepcheckConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: StepcheckConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.correlation.validate()
    }
}

/// Settings for the correlation manager and its default object store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CorrelationConfig {
    /// How often `find` re-checks the store while waiting
    pub poll_interval_ms: u64,

    /// Timeout used by `find_default`
    pub default_timeout_ms: u64,

    /// Maximum number of entries in the in-memory store (None = unbounded)
    pub capacity: Option<usize>,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            default_timeout_ms: 5000,
            capacity: None,
        }
    }
}

impl CorrelationConfig {
    /// Poll interval, clamped so waiting never spins nor oversleeps
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.poll_interval_ms
                .clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS),
        )
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == Some(0) {
            return Err(ConfigError::Invalid(
                "correlation.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
