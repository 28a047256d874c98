//! Connector error types
//!
//! Transport and HTTP failures originate here and propagate unmodified
//! through the forager: no retry, no partial-result salvage.

use thiserror::Error;

/// Result type for connector operations
pub type ConnectResult<T> = Result<T, ConnectError>;

/// Errors surfaced by a connector implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// Transport or HTTP failure
    #[error("transport failure for '{path}'{}: {detail}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Transport {
        /// Endpoint path the request targeted
        path: String,
        /// HTTP status code, when one was received
        status: Option<u16>,
        /// Failure description
        detail: String,
    },

    /// Path has no entry in the endpoint registry
    #[error("unknown endpoint '{0}'")]
    UnknownEndpoint(String),

    /// Response body was not the expected record list shape
    #[error("malformed response from '{path}': {detail}")]
    MalformedResponse {
        /// Endpoint path the request targeted
        path: String,
        /// What failed to parse
        detail: String,
    },
}
