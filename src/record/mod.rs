//! Record envelope helpers
//!
//! A Record is an untyped JSON object returned by the inventory API. Every
//! persisted record carries:
//!
//! - `id`: positive integer, unique within its (app, model) bucket
//! - `url`: absolute or relative reference encoding app, model, id
//! - `_nested`: whether the record was fetched with full relation expansion
//!   or discovered only as a cross-reference stub
//!
//! Records are created by the forager, mutated in place only to attach
//! join-computed fields, and overwritten wholesale only by a fresh fetch
//! with the same id.

mod errors;
mod url;

pub use errors::{RecordError, RecordResult};
pub use url::{encode_query, model_key, model_wire, parse_query, ApiUrl};

use serde_json::Value;

/// Field marking a record as fetched with relation expansion
pub const NESTED_FLAG: &str = "_nested";

/// Read a record's positive integer id
pub fn record_id(record: &Value) -> Option<i64> {
    record.get("id").and_then(Value::as_i64).filter(|id| *id > 0)
}

/// Read a record's API URL
pub fn record_url(record: &Value) -> Option<&str> {
    record.get("url").and_then(Value::as_str)
}

/// Diagnostic identity for a record: its `url` if present, else its
/// compact string form
pub fn record_source(record: &Value) -> String {
    match record_url(record) {
        Some(url) => url.to_string(),
        None => record.to_string(),
    }
}

/// Stamp the `_nested` flag on a record
pub fn stamp_nested(record: &mut Value, nested: bool) {
    if let Value::Object(map) = record {
        map.insert(NESTED_FLAG.to_string(), Value::Bool(nested));
    }
}

/// Whether a record was fetched with full relation expansion
pub fn is_nested(record: &Value) -> bool {
    record
        .get(NESTED_FLAG)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
