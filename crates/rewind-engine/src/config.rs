#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! [`EngineConfig`] carries the history cap and the grouping policy. It can
//! be built in code or loaded from JSON (and TOML with the `config-file`
//! feature). Missing keys fall back to the defaults.
//!
//! ```toml
//! # rewind.toml
//! max_history_size = 200
//! grouping_time_window_ms = 750
//! grouping_enabled = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for [`UndoEngine`](crate::UndoEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of entries kept on the undo stack. The oldest entry
    /// is evicted when a push would exceed it.
    pub max_history_size: usize,
    /// Same-kind actions closer together than this (in milliseconds) fold
    /// into one undo step.
    pub grouping_time_window_ms: u64,
    /// Whether implicit grouping runs at all.
    pub grouping_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_history_size: 100,
            grouping_time_window_ms: 500,
            grouping_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with custom limits.
    #[must_use]
    pub fn new(max_history_size: usize, grouping_time_window_ms: u64) -> Self {
        Self {
            max_history_size,
            grouping_time_window_ms,
            grouping_enabled: true,
        }
    }

    /// Set the history cap.
    #[must_use]
    pub fn with_max_history_size(mut self, max: usize) -> Self {
        self.max_history_size = max;
        self
    }

    /// Set the grouping window.
    #[must_use]
    pub fn with_grouping_window_ms(mut self, window_ms: u64) -> Self {
        self.grouping_time_window_ms = window_ms;
        self
    }

    /// Turn implicit grouping off. `compress()` still applies the window.
    #[must_use]
    pub fn without_grouping(mut self) -> Self {
        self.grouping_enabled = false;
        self
    }

    /// Unlimited history (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_history_size: usize::MAX,
            ..Self::default()
        }
    }

    /// Check every parameter. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.max_history_size == 0 {
            errors.push("max_history_size must be > 0".into());
        }
        errors
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.checked()
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }
}

/// Errors that can occur when loading an engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-file")]
    #[error("config TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse error.
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Parsed but out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
