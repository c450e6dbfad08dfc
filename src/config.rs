//! Configuration file parsing for mutation testing

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::MutationError;
use crate::selector::validate_pattern;

/// Top-level configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub settings: Settings,
    /// Glob patterns selecting files to mutate
    pub include: Vec<String>,
    /// Glob patterns removed from the include set
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Shell command running the test suite
    pub test_command: String,
}

/// Global settings for mutation testing
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    /// Timeout in seconds for each test run; no timeout when absent
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl Settings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, MutationError> {
        let content = std::fs::read_to_string(path).map_err(|e| MutationError::ConfigError {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        Self::from_yaml(&content).map_err(|e| MutationError::ConfigError {
            message: format!("Failed to parse config file '{}': {}", path.display(), e),
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Validate the configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<MutationError>> {
        let mut errors = Vec::new();

        if self.include.is_empty() {
            errors.push(MutationError::ConfigError {
                message: "'include' must list at least one pattern".to_string(),
            });
        }

        if self.test_command.trim().is_empty() {
            errors.push(MutationError::ConfigError {
                message: "'test_command' must not be empty".to_string(),
            });
        }

        if self.settings.timeout == Some(0) {
            errors.push(MutationError::ConfigError {
                message: "'settings.timeout' must be at least 1 second".to_string(),
            });
        }

        for pattern in self.include.iter().chain(&self.exclude) {
            if let Err(e) = validate_pattern(pattern) {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
