//! Object-graph assembler
//!
//! Consumes a "root" store snapshot and produces the enriched "tree"
//! copy: bidirectional device↔port↔address links and the CIDR containment
//! forest, attached in place as underscore-prefixed join fields.
//!
//! Join fields are pre-initialized to their empty defaults on every
//! eligible record before any join runs; presence, not value, signals
//! eligibility to the join algorithms.

mod adjacency;
mod forest;
mod natsort;

pub use adjacency::{assign_addresses, attach_components, group_vc_members};
pub use forest::build as build_forest;
pub use natsort::natural_cmp;

use serde_json::{json, Map, Value};

use crate::connect::device_components;
use crate::observability::Logger;
use crate::parser::{Key, Parser};
use crate::store::RecordStore;

/// Graph assembler over a record store snapshot
pub struct Joiner;

impl Joiner {
    /// Deep-copy `root` into a new tree and run every join to completion.
    /// The result is only meaningful as a whole; no join output should be
    /// read from a partially assembled tree.
    pub fn assemble(root: &RecordStore) -> RecordStore {
        Logger::info("join_start", &[("records", &root.record_count().to_string())]);

        let mut tree = root.clone();
        prepare(&mut tree);
        forest::build(&mut tree);
        adjacency::attach_components(&mut tree);
        adjacency::assign_addresses(&mut tree);
        adjacency::group_vc_members(&mut tree);

        Logger::info("join_complete", &[("records", &tree.record_count().to_string())]);
        tree
    }
}

/// Shallow link stub pointing at a joined record: its address plus the
/// human-facing scalar fields, never the full (possibly cyclic) body
pub(crate) fn link_ref(record: &Value) -> Value {
    let mut map = Map::new();
    for key in ["id", "url", "name", "display", "prefix", "address"] {
        if let Some(value) = record.get(key) {
            if !value.is_null() {
                map.insert(key.to_string(), value.clone());
            }
        }
    }
    Value::Object(map)
}

/// Whether a record is IPv4. The API encodes family both as a plain
/// integer and as a `{value, label}` choice object.
fn family4(record: &Value) -> bool {
    let parser = Parser::new(Some(record), false);
    parser
        .int(&[Key::from("family"), Key::from("value")])
        .unwrap_or(0)
        == 4
        || parser.int(&[Key::from("family")]).unwrap_or(0) == 4
}

/// Whether a record has no VRF qualifier; the joins only cover the
/// global routing context
fn vrf_is_null(record: &Value) -> bool {
    record.get("vrf").map_or(true, Value::is_null)
}

/// Add a join field with its empty default unless already present
fn init_field(record: &mut Value, field: &str, default: Value) {
    if let Some(map) = record.as_object_mut() {
        if !map.contains_key(field) {
            map.insert(field.to_string(), default);
        }
    }
}

/// Copy a record's CIDR source field into `_ipv4`
fn init_ipv4(record: &mut Value, source_field: &str) -> bool {
    let Some(cidr) = record.get(source_field).and_then(Value::as_str) else {
        return false;
    };
    let cidr = cidr.to_string();
    init_field(record, "_ipv4", Value::String(cidr));
    true
}

/// Iterate a bucket mutably without creating it
fn existing_bucket<'a>(
    tree: &'a mut RecordStore,
    app: &str,
    model: &str,
) -> impl Iterator<Item = &'a mut Value> {
    let present = tree.get(app, model).is_some();
    present
        .then(|| tree.bucket(app, model).values_mut())
        .into_iter()
        .flatten()
}

/// Pre-initialize every join field on every eligible record
fn prepare(tree: &mut RecordStore) {
    for record in existing_bucket(tree, "ipam", "aggregates") {
        if family4(record) && init_ipv4(record, "prefix") {
            init_field(record, "_sub_prefixes", json!([]));
        }
    }

    for record in existing_bucket(tree, "ipam", "prefixes") {
        if family4(record) && vrf_is_null(record) && init_ipv4(record, "prefix") {
            init_field(record, "_aggregate", json!({}));
            init_field(record, "_super_prefix", json!({}));
            init_field(record, "_sub_prefixes", json!([]));
            init_field(record, "_ip_addresses", json!([]));
        }
    }

    for record in existing_bucket(tree, "ipam", "ip_addresses") {
        if family4(record) && vrf_is_null(record) && init_ipv4(record, "address") {
            init_field(record, "_aggregate", json!({}));
            init_field(record, "_super_prefix", json!({}));
        }
    }

    let dcim_fields: Vec<String> = device_components("dcim")
        .map(|endpoint| endpoint.component_field())
        .collect();
    for record in existing_bucket(tree, "dcim", "devices") {
        for field in &dcim_fields {
            init_field(record, field, json!({}));
        }
        init_field(record, "_vc_members", json!({}));
    }

    for record in existing_bucket(tree, "virtualization", "virtual_machines") {
        init_field(record, "_interfaces", json!({}));
    }

    for app in ["dcim", "virtualization"] {
        for record in existing_bucket(tree, app, "interfaces") {
            init_field(record, "_ip_addresses", json!({}));
        }
    }
}
