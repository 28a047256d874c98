//! CLI error types
//!
//! Top-level translation layer for the binary; every variant is fatal
//! and exits non-zero.

use thiserror::Error;

use crate::config::ConfigError;
use crate::parser::ParserError;
use crate::store::StoreError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors surfaced by the command-line interface
#[derive(Debug, Error)]
pub enum CliError {
    /// Snapshot load/store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration failure
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Deprecated-key table failure
    #[error(transparent)]
    Parser(#[from] ParserError),

    /// Requested bucket does not exist in the snapshot
    #[error("no such bucket: {0}")]
    UnknownBucket(String),

    /// A verification check failed
    #[error("verification failed: {0}")]
    Verify(String),
}
