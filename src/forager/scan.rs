//! Cross-reference discovery
//!
//! Expanded records embed related objects as `{id, url, ...}` stubs at
//! arbitrary depth. The scan walks every nested map and list and collects
//! each `url` string it finds; the caller filters out targets already in
//! the store.

use std::collections::HashSet;

use serde_json::Value;

/// Collect candidate cross-reference URLs from a record, depth-first,
/// deduplicated in discovery order. The record's own top-level `url` is
/// included; store-presence filtering drops it along with every other
/// already-known target.
pub fn scan_urls(record: &Value, seen: &mut HashSet<String>, out: &mut Vec<String>) {
    match record {
        Value::Object(map) => {
            for (key, value) in map {
                if key == "url" {
                    if let Some(url) = value.as_str() {
                        if seen.insert(url.to_string()) {
                            out.push(url.to_string());
                        }
                    }
                } else {
                    scan_urls(value, seen, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                scan_urls(item, seen, out);
            }
        }
        _ => {}
    }
}
