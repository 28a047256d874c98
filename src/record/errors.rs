//! Record error types
//!
//! Structural errors raised at the URL-parsing boundary. Callers decide
//! whether to propagate or translate.

use thiserror::Error;

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors for record envelope and URL handling
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// URL does not contain a parseable /api/{app}/{model}/ segment
    #[error("malformed API URL '{0}'")]
    MalformedUrl(String),

    /// URL carries an id segment that is not a positive integer
    #[error("malformed record id in URL '{0}'")]
    MalformedId(String),

    /// Record body is missing a required field
    #[error("record missing required field '{0}'")]
    MissingField(&'static str),
}
