//! Engine configuration
//!
//! JSON configuration file consumed by the CLI and handed to connector
//! implementations. Every field has a conservative single-threaded
//! default, so an empty object is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::{DeprecatedKeys, ParserResult};

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file unreadable
    #[error("cannot read config '{path}': {source}")]
    Io {
        /// Affected path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON for this shape
    #[error("invalid config '{path}': {detail}")]
    Invalid {
        /// Affected path
        path: PathBuf,
        /// What failed to parse
        detail: String,
    },
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Worker pool size; `<= 1` selects sequential execution
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Worker startup stagger, seconds
    #[serde(default = "default_interval")]
    pub interval_secs: f64,

    /// Maximum encoded query-string length before slicing
    #[serde(default = "default_url_length")]
    pub url_length: usize,

    /// API schema version the deployment was written against
    #[serde(default)]
    pub api_version: Option<String>,

    /// Path to an external deprecated-key table (JSON array)
    #[serde(default)]
    pub deprecated_keys: Option<PathBuf>,
}

fn default_threads() -> usize {
    1
}

fn default_interval() -> f64 {
    0.5
}

fn default_url_length() -> usize {
    2000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            interval_secs: default_interval(),
            url_length: default_url_length(),
            api_version: None,
            deprecated_keys: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let body = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&body).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// The deprecated-key table this configuration selects: the external
    /// file when `deprecated_keys` is set, the built-in default otherwise
    pub fn deprecated_keys(&self) -> ParserResult<DeprecatedKeys> {
        match &self.deprecated_keys {
            Some(path) => DeprecatedKeys::from_json(path),
            None => Ok(DeprecatedKeys::builtin()),
        }
    }
}
