//! Accessor error types
//!
//! Strict mode raises `Miss` naming the failed key path and the record's
//! source identity. Lenient mode swallows misses and returns zero values,
//! except `Version`, which raises in both modes: silently returning empty
//! for a relocated key would mask an integration break.

use std::fmt;

/// Result type for accessor operations
pub type ParserResult<T> = Result<T, ParserError>;

/// Errors raised by the nested accessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// Missing key, bad index, or type mismatch along the key chain
    Miss {
        /// Dotted form of the requested key chain
        path: String,
        /// Record `url` if present, else its string form
        source: String,
    },

    /// Key path retired by an API schema change; raised even in lenient mode
    Version {
        /// Dotted form of the requested key chain
        path: String,
        /// The key path that replaced it
        replacement: String,
        /// First API version without the old path
        since: String,
        /// Record `url` if present, else its string form
        source: String,
    },

    /// Deprecated-key table could not be loaded
    TableLoad {
        /// File the table was read from
        path: String,
        /// What failed
        detail: String,
    },
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserError::Miss { path, source } => {
                write!(f, "key path '{path}' not resolvable in record from {source}")
            }
            ParserError::Version {
                path,
                replacement,
                since,
                source,
            } => {
                write!(
                    f,
                    "key path '{path}' retired since API {since}, use '{replacement}' (record from {source})"
                )
            }
            ParserError::TableLoad { path, detail } => {
                write!(f, "deprecated-key table at '{path}' unusable: {detail}")
            }
        }
    }
}

impl std::error::Error for ParserError {}
