//! Observability
//!
//! Structured JSON logging for the fetch/join lifecycle. Logging is
//! read-only and synchronous; it never changes execution.

mod logger;

pub use logger::{Logger, Severity};
