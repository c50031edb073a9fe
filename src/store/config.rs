//! Store Configuration
//!
//! Table name, per-call ceilings, retry policy and page-size limits. One
//! value is built at startup and handed to each component at construction.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event, Event};

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Store and engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Collection that holds records, posting entries and the catalogue
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Maximum keys per bulk get call (default: 100)
    #[serde(default = "default_read_ceiling")]
    pub read_ceiling: usize,

    /// Maximum items per bulk write call (default: 25)
    #[serde(default = "default_write_ceiling")]
    pub write_ceiling: usize,

    /// Resubmissions of an unprocessed residue per chunk (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay before a resubmission, multiplied by the attempt number.
    /// Zero retries immediately.
    #[serde(default)]
    pub retry_backoff_ms: u64,

    /// Page size when the caller gives none (default: 20)
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Largest page size a caller may request (default: 1000)
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

/// Largest accepted `retry_backoff_ms`
pub const MAX_RETRY_BACKOFF_MS: u64 = 60_000;

fn default_table_name() -> String {
    "records".to_string()
}

fn default_read_ceiling() -> usize {
    100
}

fn default_write_ceiling() -> usize {
    25
}

fn default_max_retries() -> u32 {
    3
}

fn default_limit() -> usize {
    20
}

fn default_max_limit() -> usize {
    1000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            read_ceiling: default_read_ceiling(),
            write_ceiling: default_write_ceiling(),
            max_retries: default_max_retries(),
            retry_backoff_ms: 0,
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl StoreConfig {
    /// Create a config for the given table with default limits
    pub fn for_table(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: StoreConfig = serde_json::from_str(&content)?;
        config.validate()?;

        log_event(
            Event::ConfigLoaded,
            &[
                ("path", path.display().to_string().as_str()),
                ("table", config.table_name.as_str()),
            ],
        );

        Ok(config)
    }

    /// Validate ceilings and limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_name.is_empty() {
            return Err(ConfigError::Invalid("table_name must not be empty".into()));
        }

        if self.read_ceiling == 0 || self.write_ceiling == 0 {
            return Err(ConfigError::Invalid("batch ceilings must be > 0".into()));
        }

        if self.write_ceiling > self.read_ceiling {
            return Err(ConfigError::Invalid(format!(
                "write_ceiling ({}) must not exceed read_ceiling ({})",
                self.write_ceiling, self.read_ceiling
            )));
        }

        if self.retry_backoff_ms > MAX_RETRY_BACKOFF_MS {
            return Err(ConfigError::Invalid(format!(
                "retry_backoff_ms ({}) must not exceed {}",
                self.retry_backoff_ms, MAX_RETRY_BACKOFF_MS
            )));
        }

        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(ConfigError::Invalid(format!(
                "default_limit must be in 1..={}",
                self.max_limit
            )));
        }

        Ok(())
    }
}
