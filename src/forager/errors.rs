//! Forager error types
//!
//! A failed sub-fetch aborts the whole `get()` call: fetch errors are
//! fatal and non-partial.

use thiserror::Error;

use crate::connect::ConnectError;
use crate::record::RecordError;

/// Result type for forage operations
pub type ForageResult<T> = Result<T, ForageError>;

/// Errors raised while orchestrating fetches
#[derive(Debug, Error)]
pub enum ForageError {
    /// Transport/HTTP failure, propagated unmodified from the connector
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Structural failure parsing a discovered cross-reference URL
    #[error(transparent)]
    Record(#[from] RecordError),
}
