//! Deprecated-key table
//!
//! Some key paths relocated across API schema versions (ipam/prefixes
//! `site` → `scope` being the canonical case). The table driving the
//! version contract is externally supplied configuration; a one-entry
//! built-in default ships so skew is caught out of the box.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{ParserError, ParserResult};

/// One retired key path and its replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecatedKey {
    /// Application namespace the rule applies to
    pub app: String,
    /// Model name (underscore form) the rule applies to
    pub model: String,
    /// The retired top-level key
    pub key: String,
    /// The key that replaced it
    pub replacement: String,
    /// First API version without the old key
    pub since: String,
}

/// Lookup table of retired key paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeprecatedKeys {
    entries: Vec<DeprecatedKey>,
}

impl DeprecatedKeys {
    /// Empty table (no version checks)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in default: ipam/prefixes `site` → `scope`
    pub fn builtin() -> Self {
        Self {
            entries: vec![DeprecatedKey {
                app: "ipam".to_string(),
                model: "prefixes".to_string(),
                key: "site".to_string(),
                replacement: "scope".to_string(),
                since: "4.2".to_string(),
            }],
        }
    }

    /// Load a table from a JSON file holding an array of entries
    pub fn from_json(path: &Path) -> ParserResult<Self> {
        let body = fs::read_to_string(path).map_err(|e| ParserError::TableLoad {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        let entries: Vec<DeprecatedKey> =
            serde_json::from_str(&body).map_err(|e| ParserError::TableLoad {
                path: path.display().to_string(),
                detail: e.to_string(),
            })?;
        Ok(Self { entries })
    }

    /// Every rule in the table
    pub fn entries(&self) -> &[DeprecatedKey] {
        &self.entries
    }

    /// Find the rule for a (app, model, key) triple, if any
    pub fn lookup(&self, app: &str, model: &str, key: &str) -> Option<&DeprecatedKey> {
        self.entries
            .iter()
            .find(|entry| entry.app == app && entry.model == model && entry.key == key)
    }
}

/// Whether `declared` is at or past `since`. Dotted numeric comparison;
/// non-numeric segments compare as zero.
pub fn version_at_least(declared: &str, since: &str) -> bool {
    let segments = |v: &str| -> Vec<u64> {
        v.split('.')
            .map(|seg| seg.parse::<u64>().unwrap_or(0))
            .collect()
    };
    segments(declared) >= segments(since)
}
