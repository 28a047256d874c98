//! Device/interface adjacency joins
//!
//! Ports attach to their owning device keyed by name, in numeric-aware
//! name order, so enumeration mirrors the UI. IP addresses attach to
//! their assigned interface keyed by address string, in plain string
//! order (source behavior, deliberately not CIDR order). Virtual-chassis
//! members group under the chassis master.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::Value;

use crate::connect::device_components;
use crate::parser::{Key, Parser};
use crate::store::RecordStore;

use super::link_ref;
use super::natsort::natural_cmp;

/// Owner bucket for a port record: `device` id points at dcim/devices,
/// `virtual_machine` id at virtualization/virtual_machines
fn port_owner(record: &Value) -> Option<(&'static str, &'static str, i64)> {
    let parser = Parser::new(Some(record), false);
    let device = parser.int(&[Key::from("device"), Key::from("id")]).unwrap_or(0);
    if device > 0 {
        return Some(("dcim", "devices", device));
    }
    let vm = parser
        .int(&[Key::from("virtual_machine"), Key::from("id")])
        .unwrap_or(0);
    if vm > 0 {
        return Some(("virtualization", "virtual_machines", vm));
    }
    None
}

/// Attach every port-like record to its owning device's `_{model}` map
pub fn attach_components(tree: &mut RecordStore) {
    for app in ["dcim", "virtualization"] {
        for endpoint in device_components(app) {
            let field = endpoint.component_field();

            let mut ports: Vec<(String, (&str, &str, i64), Value)> = tree
                .get(endpoint.app, endpoint.model)
                .map(|bucket| {
                    bucket
                        .values()
                        .filter_map(|record| {
                            let name = Parser::new(Some(record), false)
                                .string(&[Key::from("name")])
                                .unwrap_or_default();
                            if name.is_empty() {
                                return None;
                            }
                            let owner = port_owner(record)?;
                            Some((name, owner, link_ref(record)))
                        })
                        .collect()
                })
                .unwrap_or_default();
            ports.sort_by(|a, b| natural_cmp(&a.0, &b.0));

            for (name, (owner_app, owner_model, owner_id), reference) in ports {
                let Some(owner) = tree.record_mut(owner_app, owner_model, owner_id) else {
                    continue;
                };
                // Presence of the reserved field marks the owner eligible
                if let Some(Value::Object(slot)) =
                    owner.as_object_mut().and_then(|map| map.get_mut(&field))
                {
                    slot.insert(name, reference);
                }
            }
        }
    }
}

/// Interface bucket for an `assigned_object_type` discriminator
fn interface_target(object_type: &str) -> Option<(&'static str, &'static str)> {
    match object_type {
        "dcim.interface" => Some(("dcim", "interfaces")),
        "virtualization.vminterface" => Some(("virtualization", "interfaces")),
        _ => None,
    }
}

/// Attach IP addresses to their assigned interfaces, keyed by address
/// string in lexicographic order
pub fn assign_addresses(tree: &mut RecordStore) {
    let mut addresses: Vec<(String, (&str, &str), i64, Value)> = tree
        .get("ipam", "ip_addresses")
        .map(|bucket| {
            bucket
                .values()
                .filter_map(|record| {
                    let parser = Parser::new(Some(record), false);
                    let address = parser.string(&[Key::from("address")]).unwrap_or_default();
                    if address.is_empty() {
                        return None;
                    }
                    let object_type = parser
                        .string(&[Key::from("assigned_object_type")])
                        .unwrap_or_default();
                    let target = interface_target(&object_type)?;
                    let assigned = parser
                        .int(&[Key::from("assigned_object_id")])
                        .unwrap_or(0);
                    if assigned <= 0 {
                        return None;
                    }
                    Some((address, target, assigned, link_ref(record)))
                })
                .collect()
        })
        .unwrap_or_default();
    // String order, not CIDR order
    addresses.sort_by(|a, b| a.0.cmp(&b.0));

    for (address, (app, model), interface_id, reference) in addresses {
        let Some(interface) = tree.record_mut(app, model, interface_id) else {
            continue;
        };
        if let Some(Value::Object(slot)) = interface
            .as_object_mut()
            .and_then(|map| map.get_mut("_ip_addresses"))
        {
            slot.insert(address, reference);
        }
    }
}

/// Group virtual-chassis members under the chassis master.
///
/// The master is the device whose `virtual_chassis.master.id` equals its
/// own id; members are all devices sharing the `virtual_chassis.id`,
/// ordered by `vc_position`.
pub fn group_vc_members(tree: &mut RecordStore) {
    struct Member {
        id: i64,
        name: String,
        position: i64,
        is_master: bool,
        reference: Value,
    }

    let mut chassis: HashMap<i64, Vec<Member>> = HashMap::new();
    if let Some(bucket) = tree.get("dcim", "devices") {
        for (id, record) in bucket {
            let parser = Parser::new(Some(record), false);
            let vc_id = parser
                .int(&[Key::from("virtual_chassis"), Key::from("id")])
                .unwrap_or(0);
            if vc_id <= 0 {
                continue;
            }
            let master_id = parser
                .int(&[
                    Key::from("virtual_chassis"),
                    Key::from("master"),
                    Key::from("id"),
                ])
                .unwrap_or(0);
            let name = parser.string(&[Key::from("name")]).unwrap_or_default();
            if name.is_empty() {
                continue;
            }
            chassis.entry(vc_id).or_default().push(Member {
                id: *id,
                name,
                position: parser.int(&[Key::from("vc_position")]).unwrap_or(0),
                is_master: master_id == *id,
                reference: link_ref(record),
            });
        }
    }

    for members in chassis.values_mut() {
        members.sort_by(|a, b| match a.position.cmp(&b.position) {
            Ordering::Equal => a.name.cmp(&b.name),
            other => other,
        });
        let Some(master_id) = members.iter().find(|m| m.is_master).map(|m| m.id) else {
            continue;
        };
        let entries: Vec<(String, Value)> = members
            .iter()
            .map(|m| (m.name.clone(), m.reference.clone()))
            .collect();

        let Some(master) = tree.record_mut("dcim", "devices", master_id) else {
            continue;
        };
        if let Some(Value::Object(slot)) = master
            .as_object_mut()
            .and_then(|map| map.get_mut("_vc_members"))
        {
            for (name, reference) in entries {
                slot.insert(name, reference);
            }
        }
    }
}
