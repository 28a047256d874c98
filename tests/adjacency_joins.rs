//! Device adjacency join tests
//!
//! - Ports attach to their owning device keyed by name, numeric-aware
//!   name order
//! - VM interfaces attach to their virtual machine
//! - IP addresses attach to their assigned interface keyed by address
//!   string, plain string order
//! - Virtual-chassis members group under the chassis master

use netgraph::joiner::Joiner;
use netgraph::store::RecordStore;
use serde_json::{json, Value};

// =============================================================================
// Test Utilities
// =============================================================================

fn interface(id: i64, name: &str, device_id: i64) -> Value {
    json!({
        "id": id,
        "url": format!("/api/dcim/interfaces/{}/", id),
        "name": name,
        "device": {"id": device_id}
    })
}

fn keys_of(value: &Value) -> Vec<&str> {
    value
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect()
}

// =============================================================================
// Port Attachment
// =============================================================================

#[test]
fn test_ports_attach_in_natural_name_order() {
    let mut root = RecordStore::new();
    root.upsert("dcim", "devices", json!({"id": 1, "url": "/api/dcim/devices/1/", "name": "core-1"}));
    root.upsert("dcim", "interfaces", interface(101, "eth10", 1));
    root.upsert("dcim", "interfaces", interface(102, "eth2", 1));
    root.upsert("dcim", "interfaces", interface(103, "eth1", 1));

    let tree = Joiner::assemble(&root);

    let device = tree.record("dcim", "devices", 1).unwrap();
    assert_eq!(keys_of(&device["_interfaces"]), vec!["eth1", "eth2", "eth10"]);
    assert_eq!(device["_interfaces"]["eth2"]["id"], 102);
}

#[test]
fn test_ports_without_known_owner_are_skipped() {
    let mut root = RecordStore::new();
    root.upsert("dcim", "devices", json!({"id": 1, "name": "core-1"}));
    root.upsert("dcim", "interfaces", interface(101, "eth0", 99));
    root.upsert(
        "dcim",
        "interfaces",
        json!({"id": 102, "url": "/api/dcim/interfaces/102/", "name": "lo0", "device": null}),
    );

    let tree = Joiner::assemble(&root);
    assert_eq!(tree.record("dcim", "devices", 1).unwrap()["_interfaces"], json!({}));
}

#[test]
fn test_console_ports_use_their_own_slot() {
    let mut root = RecordStore::new();
    root.upsert("dcim", "devices", json!({"id": 1, "name": "core-1"}));
    root.upsert(
        "dcim",
        "console_ports",
        json!({"id": 7, "url": "/api/dcim/console-ports/7/", "name": "con0", "device": {"id": 1}}),
    );

    let tree = Joiner::assemble(&root);

    let device = tree.record("dcim", "devices", 1).unwrap();
    assert_eq!(device["_console_ports"]["con0"]["id"], 7);
    assert_eq!(device["_interfaces"], json!({}));
}

#[test]
fn test_vm_interfaces_attach_to_virtual_machine() {
    let mut root = RecordStore::new();
    root.upsert(
        "virtualization",
        "virtual_machines",
        json!({"id": 3, "url": "/api/virtualization/virtual-machines/3/", "name": "vm-1"}),
    );
    root.upsert(
        "virtualization",
        "interfaces",
        json!({
            "id": 31,
            "url": "/api/virtualization/interfaces/31/",
            "name": "ens1",
            "virtual_machine": {"id": 3}
        }),
    );

    let tree = Joiner::assemble(&root);

    let vm = tree.record("virtualization", "virtual_machines", 3).unwrap();
    assert_eq!(vm["_interfaces"]["ens1"]["id"], 31);
}

// =============================================================================
// Address Assignment
// =============================================================================

#[test]
fn test_addresses_attach_in_string_order() {
    let mut root = RecordStore::new();
    root.upsert("dcim", "devices", json!({"id": 1, "name": "core-1"}));
    root.upsert("dcim", "interfaces", interface(101, "eth0", 1));
    for (id, addr) in [(201, "10.0.0.2/24"), (202, "10.0.0.10/24")] {
        root.upsert(
            "ipam",
            "ip_addresses",
            json!({
                "id": id,
                "url": format!("/api/ipam/ip-addresses/{}/", id),
                "address": addr,
                "family": {"value": 4},
                "vrf": null,
                "assigned_object_type": "dcim.interface",
                "assigned_object_id": 101
            }),
        );
    }

    let tree = Joiner::assemble(&root);

    let iface = tree.record("dcim", "interfaces", 101).unwrap();
    // Plain string order, so "10.0.0.10" sorts before "10.0.0.2"
    assert_eq!(
        keys_of(&iface["_ip_addresses"]),
        vec!["10.0.0.10/24", "10.0.0.2/24"]
    );
}

#[test]
fn test_unassigned_addresses_attach_nowhere() {
    let mut root = RecordStore::new();
    root.upsert("dcim", "devices", json!({"id": 1, "name": "core-1"}));
    root.upsert("dcim", "interfaces", interface(101, "eth0", 1));
    root.upsert(
        "ipam",
        "ip_addresses",
        json!({
            "id": 201,
            "url": "/api/ipam/ip-addresses/201/",
            "address": "10.0.0.2/24",
            "family": {"value": 4},
            "vrf": null
        }),
    );

    let tree = Joiner::assemble(&root);
    assert_eq!(
        tree.record("dcim", "interfaces", 101).unwrap()["_ip_addresses"],
        json!({})
    );
}

// =============================================================================
// Virtual Chassis
// =============================================================================

#[test]
fn test_vc_members_group_under_master_by_position() {
    let mut root = RecordStore::new();
    let chassis = |master| json!({"id": 5, "master": {"id": master}});
    root.upsert(
        "dcim",
        "devices",
        json!({"id": 1, "url": "/api/dcim/devices/1/", "name": "stack-a",
               "virtual_chassis": chassis(1), "vc_position": 2}),
    );
    root.upsert(
        "dcim",
        "devices",
        json!({"id": 2, "url": "/api/dcim/devices/2/", "name": "stack-b",
               "virtual_chassis": chassis(1), "vc_position": 1}),
    );
    root.upsert(
        "dcim",
        "devices",
        json!({"id": 3, "url": "/api/dcim/devices/3/", "name": "solo"}),
    );

    let tree = Joiner::assemble(&root);

    let master = tree.record("dcim", "devices", 1).unwrap();
    // Position order, master included among its own members
    assert_eq!(keys_of(&master["_vc_members"]), vec!["stack-b", "stack-a"]);
    assert_eq!(master["_vc_members"]["stack-b"]["id"], 2);

    // Non-master members and standalone devices hold no member map entries
    assert_eq!(tree.record("dcim", "devices", 2).unwrap()["_vc_members"], json!({}));
    assert_eq!(tree.record("dcim", "devices", 3).unwrap()["_vc_members"], json!({}));
}

#[test]
fn test_chassis_without_master_is_skipped() {
    let mut root = RecordStore::new();
    root.upsert(
        "dcim",
        "devices",
        json!({"id": 1, "name": "stack-a", "virtual_chassis": {"id": 5}, "vc_position": 1}),
    );
    root.upsert(
        "dcim",
        "devices",
        json!({"id": 2, "name": "stack-b", "virtual_chassis": {"id": 5}, "vc_position": 2}),
    );

    let tree = Joiner::assemble(&root);
    for id in [1, 2] {
        assert_eq!(tree.record("dcim", "devices", id).unwrap()["_vc_members"], json!({}));
    }
}
