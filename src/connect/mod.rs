//! Connector boundary
//!
//! The connector is the external collaborator that owns HTTP sessions,
//! auth, pagination, and TLS. The engine consumes it through the
//! [`Connector`] trait and never retries or suppresses its failures.
//!
//! Work-item queries return owned result vectors; the orchestrator, not
//! the connector, collects them.

mod errors;
mod registry;

pub use errors::{ConnectError, ConnectResult};
pub use registry::{device_components, lookup, Endpoint, ENDPOINTS};

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

/// Filter map for a query: key → values. Repeated values under one key
/// express `k=v1&k=v2`. Ordered for deterministic encoding.
pub type FilterMap = BTreeMap<String, Vec<String>>;

/// Blocking client boundary to the inventory API.
///
/// `Send + Sync` because the forager shares one connector across its
/// worker threads; implementations hold no per-call mutable state.
pub trait Connector: Send + Sync {
    /// Full filtered query against a `{app}/{model}` path, following
    /// pagination to exhaustion
    fn get(&self, path: &str, filters: &FilterMap) -> ConnectResult<Vec<Value>>;

    /// One blocking paged fetch for a work item; returns owned results
    fn query_page(&self, path: &str, params: &[(String, String)]) -> ConnectResult<Vec<Value>>;

    /// Worker startup stagger, seconds
    fn interval(&self) -> f64 {
        0.0
    }

    /// Worker pool size; `<= 1` selects sequential execution
    fn threads(&self) -> usize {
        1
    }

    /// Maximum encoded query-string length before slicing
    fn url_length(&self) -> usize {
        2000
    }

    /// Filter keys whose value lists may be split across requests
    fn sliceable_keys(&self) -> &HashSet<String>;
}
