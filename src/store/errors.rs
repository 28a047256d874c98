//! Record store error types

use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors for store snapshot persistence
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure while reading or writing a snapshot
    #[error("snapshot I/O error at '{path}': {source}")]
    Io {
        /// Affected path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Snapshot payload is not valid JSON or not a snapshot document
    #[error("corrupt snapshot at '{path}': {detail}")]
    Corrupt {
        /// Affected path
        path: PathBuf,
        /// What failed to parse
        detail: String,
    },

    /// Snapshot checksum does not match the stored payload
    #[error("snapshot checksum mismatch: expected {expected}, computed {computed}")]
    ChecksumMismatch {
        /// Checksum recorded in the snapshot document
        expected: String,
        /// Checksum computed over the store payload
        computed: String,
    },

    /// Store serialization failure
    #[error("snapshot serialization failed: {0}")]
    Serialize(String),
}

impl StoreError {
    /// Build an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a corrupt-snapshot error with path context
    pub fn corrupt(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            detail: detail.into(),
        }
    }
}
