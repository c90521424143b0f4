//! Reconciliation configuration
//!
//! Loaded from TOML. Every field has a default so an empty file is valid.
//!
//! ```toml
//! log_policy_contents = false
//!
//! [conflict_retry]
//! max_attempts = 3
//! initial_delay_ms = 100
//! max_delay_ms = 5000
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration loading/validation failure
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// The contents are not valid TOML for this schema
    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// How a caller re-runs a whole cycle after an etag conflict
///
/// The orchestrator never retries by itself; this only drives
/// caller-level re-invocation with a fresh fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictRetryConfig {
    /// Total attempts including the first one (1 = no retries)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay_ms: u64,
    /// Upper bound for the exponential backoff
    pub max_delay_ms: u64,
}

impl Default for ConflictRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5_000,
        }
    }
}

impl ConflictRetryConfig {
    /// Single attempt, never retry
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set total attempts
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay_ms = duration_ms(delay);
        self
    }

    /// Set maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay_ms = duration_ms(delay);
        self
    }

    /// Delay before retry number `retry` (1-based), doubling and capped
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(32);
        let ms = self
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "conflict_retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(ConfigError::Invalid(format!(
                "conflict_retry.max_delay_ms ({}) is below initial_delay_ms ({})",
                self.max_delay_ms, self.initial_delay_ms
            )));
        }
        Ok(())
    }
}

/// Top level reconciliation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Caller-level retry on commit conflicts
    pub conflict_retry: ConflictRetryConfig,
    /// Dump full policies at trace level (they list every principal)
    pub log_policy_contents: bool,
}

impl ReconcileConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Validate value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.conflict_retry.validate()
    }
}

fn duration_ms(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}
