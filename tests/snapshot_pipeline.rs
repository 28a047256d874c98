//! Snapshot pipeline tests
//!
//! End-to-end through the CLI layer: write a root snapshot, run the
//! join command, and read the joined tree back with its checksum
//! verified.

use netgraph::cli;
use netgraph::store::{load_snapshot, write_snapshot, RecordStore};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn sample_root() -> RecordStore {
    let mut root = RecordStore::new();
    root.upsert(
        "ipam",
        "aggregates",
        json!({"id": 1, "url": "/api/ipam/aggregates/1/", "prefix": "10.0.0.0/8", "family": {"value": 4}}),
    );
    root.upsert(
        "ipam",
        "prefixes",
        json!({"id": 2, "url": "/api/ipam/prefixes/2/", "prefix": "10.1.0.0/24",
               "family": {"value": 4}, "vrf": null, "_depth": 0}),
    );
    root.upsert(
        "dcim",
        "devices",
        json!({"id": 3, "url": "/api/dcim/devices/3/", "name": "core-1"}),
    );
    root
}

// =============================================================================
// Join Pipeline
// =============================================================================

#[test]
fn test_join_command_produces_verified_tree() {
    let tmp = TempDir::new().unwrap();
    let root_path = tmp.path().join("root.json");
    let tree_path = tmp.path().join("tree.json");

    write_snapshot(&sample_root(), &root_path, "test").unwrap();
    cli::join(&root_path, &tree_path, None).unwrap();

    cli::verify(&tree_path).unwrap();
    let (tree, meta) = load_snapshot(&tree_path).unwrap();
    assert_eq!(meta.source, "test");
    assert_eq!(meta.record_count, 3);

    let prefix = tree.record("ipam", "prefixes", 2).unwrap();
    assert_eq!(prefix["_aggregate"]["prefix"], "10.0.0.0/8");
    let device = tree.record("dcim", "devices", 3).unwrap();
    assert_eq!(device["_interfaces"], json!({}));
}

#[test]
fn test_join_preserves_root_snapshot() {
    let tmp = TempDir::new().unwrap();
    let root_path = tmp.path().join("root.json");
    let tree_path = tmp.path().join("tree.json");

    write_snapshot(&sample_root(), &root_path, "test").unwrap();
    cli::join(&root_path, &tree_path, None).unwrap();

    let (root, _) = load_snapshot(&root_path).unwrap();
    assert_eq!(root, sample_root());
}

#[test]
fn test_joining_a_tree_snapshot_is_stable() {
    let tmp = TempDir::new().unwrap();
    let root_path = tmp.path().join("root.json");
    let tree_path = tmp.path().join("tree.json");
    let again_path = tmp.path().join("tree2.json");

    write_snapshot(&sample_root(), &root_path, "test").unwrap();
    cli::join(&root_path, &tree_path, None).unwrap();
    cli::join(&tree_path, &again_path, None).unwrap();

    let (first, _) = load_snapshot(&tree_path).unwrap();
    let (second, _) = load_snapshot(&again_path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_verify_rejects_tampered_snapshot() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("root.json");
    write_snapshot(&sample_root(), &path, "test").unwrap();

    let body = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, body.replace("core-1", "core-2")).unwrap();

    assert!(cli::verify(&path).is_err());
}
