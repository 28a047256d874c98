//! CIDR containment forest
//!
//! Links ipam aggregates, prefixes, and addresses into a containment
//! hierarchy (aggregate ⊇ prefix ⊇ sub-prefix ⊇ address) from
//! depth-annotated, unordered input. The server-supplied `_depth` on
//! prefixes is trusted and never recomputed; only depth-adjacent buckets
//! are ever compared.
//!
//! The steps must run to completion in order; partial state after any
//! single step is not meaningful externally.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;

use crate::cidr::Cidr;
use crate::parser::{Key, Parser};
use crate::store::RecordStore;

use super::link_ref;

/// Working view of one eligible aggregate/prefix/address record
struct Node {
    id: i64,
    cidr: Cidr,
    depth: i64,
    reference: Value,
}

/// Records carrying a parseable `_ipv4`; pre-initialization decides
/// eligibility, the forest only reads it
fn nodes(tree: &RecordStore, model: &str) -> Vec<Node> {
    let Some(bucket) = tree.get("ipam", model) else {
        return Vec::new();
    };
    bucket
        .iter()
        .filter_map(|(id, record)| {
            let cidr_str = record.get("_ipv4")?.as_str()?;
            let cidr = Cidr::parse(cidr_str, false).ok()?;
            let depth = Parser::new(Some(record), false)
                .int(&[Key::from("_depth")])
                .unwrap_or(0);
            Some(Node {
                id: *id,
                cidr,
                depth,
                reference: link_ref(record),
            })
        })
        .collect()
}

/// Run the containment join over the tree in place
pub fn build(tree: &mut RecordStore) {
    // Step A: sorted aggregates; prefixes grouped by depth, each bucket
    // sorted ascending by CIDR
    let mut aggregates = nodes(tree, "aggregates");
    aggregates.sort_by(|a, b| a.cidr.cmp(&b.cidr));

    let mut depth_buckets: BTreeMap<i64, Vec<Node>> = BTreeMap::new();
    for node in nodes(tree, "prefixes") {
        depth_buckets.entry(node.depth).or_default().push(node);
    }
    for bucket in depth_buckets.values_mut() {
        bucket.sort_by(|a, b| a.cidr.cmp(&b.cidr));
    }

    let addresses = nodes(tree, "ip_addresses");

    // Step B: aggregate linkage; later aggregates in the sort overwrite
    // `_aggregate` on conflict, depth-0 prefixes become aggregate children
    let mut prefix_agg: HashMap<i64, i64> = HashMap::new();
    let mut agg_children: HashMap<i64, Vec<i64>> = HashMap::new();
    for agg in &aggregates {
        for (depth, bucket) in &depth_buckets {
            for prefix in bucket {
                if agg.cidr.contains(&prefix.cidr) {
                    prefix_agg.insert(prefix.id, agg.id);
                    if *depth == 0 {
                        agg_children.entry(agg.id).or_default().push(prefix.id);
                    }
                }
            }
        }
    }

    // Step C: super/sub linkage between depth-adjacent buckets only;
    // `previous` advances unconditionally
    let mut super_of: HashMap<i64, i64> = HashMap::new();
    let mut prefix_children: HashMap<i64, Vec<i64>> = HashMap::new();
    {
        let mut buckets = depth_buckets.values();
        if let Some(mut previous) = buckets.next() {
            for current in buckets {
                for shallow in previous {
                    if shallow.cidr.prefix_len() >= 32 {
                        continue;
                    }
                    for deep in current {
                        if shallow.cidr.contains(&deep.cidr) {
                            prefix_children
                                .entry(shallow.id)
                                .or_default()
                                .push(deep.id);
                            super_of.insert(deep.id, shallow.id);
                        }
                    }
                }
                previous = current;
            }
        }
    }

    // Step D: deepest-match-wins address binding. Deeper buckets are
    // visited first, so an address always binds to its most specific
    // containing prefix.
    let mut consumed: HashSet<i64> = HashSet::new();
    let mut prefix_addrs: HashMap<i64, Vec<i64>> = HashMap::new();
    let mut addr_links: HashMap<i64, (Option<i64>, i64)> = HashMap::new();
    for bucket in depth_buckets.values().rev() {
        for prefix in bucket {
            for address in &addresses {
                if consumed.contains(&address.id) {
                    continue;
                }
                if prefix.cidr.contains(&address.cidr) {
                    addr_links.insert(address.id, (prefix_agg.get(&prefix.id).copied(), prefix.id));
                    prefix_addrs.entry(prefix.id).or_default().push(address.id);
                    consumed.insert(address.id);
                }
            }
        }
    }

    // Reference tables for the apply + normalize passes
    let agg_refs: HashMap<i64, (Cidr, Value)> = aggregates
        .iter()
        .map(|n| (n.id, (n.cidr, n.reference.clone())))
        .collect();
    let prefix_refs: HashMap<i64, (Cidr, Value)> = depth_buckets
        .values()
        .flatten()
        .map(|n| (n.id, (n.cidr, n.reference.clone())))
        .collect();
    let addr_refs: HashMap<i64, (Cidr, Value)> = addresses
        .iter()
        .map(|n| (n.id, (n.cidr, n.reference.clone())))
        .collect();

    // Apply to prefixes, with step E normalization (dedup + sort)
    let prefix_ids: Vec<i64> = prefix_refs.keys().copied().collect();
    for id in prefix_ids {
        let children = merged_refs(
            tree.record("ipam", "prefixes", id).and_then(|r| r.get("_sub_prefixes")),
            prefix_children.get(&id).map_or(&[][..], Vec::as_slice),
            &prefix_refs,
            |_| true,
        );
        let addrs = merged_refs(
            tree.record("ipam", "prefixes", id).and_then(|r| r.get("_ip_addresses")),
            prefix_addrs.get(&id).map_or(&[][..], Vec::as_slice),
            &addr_refs,
            |_| true,
        );
        let Some(record) = tree.record_mut("ipam", "prefixes", id) else {
            continue;
        };
        let Some(map) = record.as_object_mut() else {
            continue;
        };
        if let Some(agg_id) = prefix_agg.get(&id) {
            if let Some((_, reference)) = agg_refs.get(agg_id) {
                map.insert("_aggregate".to_string(), reference.clone());
            }
        }
        if let Some(super_id) = super_of.get(&id) {
            if let Some((_, reference)) = prefix_refs.get(super_id) {
                map.insert("_super_prefix".to_string(), reference.clone());
            }
        }
        map.insert("_sub_prefixes".to_string(), children);
        map.insert("_ip_addresses".to_string(), addrs);
    }

    // Apply to addresses
    for (id, (agg_id, super_id)) in &addr_links {
        let Some(record) = tree.record_mut("ipam", "ip_addresses", *id) else {
            continue;
        };
        let Some(map) = record.as_object_mut() else {
            continue;
        };
        if let Some(agg_id) = agg_id {
            if let Some((_, reference)) = agg_refs.get(agg_id) {
                map.insert("_aggregate".to_string(), reference.clone());
            }
        }
        if let Some((_, reference)) = prefix_refs.get(super_id) {
            map.insert("_super_prefix".to_string(), reference.clone());
        }
    }

    // Apply to aggregates; only true top-level children survive, an
    // entry already owned by an intermediate prefix is dropped
    let agg_ids: Vec<i64> = agg_refs.keys().copied().collect();
    for id in agg_ids {
        let children = merged_refs(
            tree.record("ipam", "aggregates", id).and_then(|r| r.get("_sub_prefixes")),
            agg_children.get(&id).map_or(&[][..], Vec::as_slice),
            &prefix_refs,
            |child_id| !super_of.contains_key(&child_id),
        );
        let Some(record) = tree.record_mut("ipam", "aggregates", id) else {
            continue;
        };
        if let Some(map) = record.as_object_mut() {
            map.insert("_sub_prefixes".to_string(), children);
        }
    }
}

/// Merge existing ref-array entries with newly computed ids, dedup by id,
/// filter, and sort ascending by CIDR. Entries whose id is no longer an
/// eligible record drop out.
fn merged_refs(
    existing: Option<&Value>,
    computed: &[i64],
    refs: &HashMap<i64, (Cidr, Value)>,
    keep: impl Fn(i64) -> bool,
) -> Value {
    let mut ids: Vec<i64> = Vec::new();
    let mut seen: HashSet<i64> = HashSet::new();

    if let Some(Value::Array(entries)) = existing {
        for entry in entries {
            if let Some(id) = entry.get("id").and_then(Value::as_i64) {
                if refs.contains_key(&id) && seen.insert(id) {
                    ids.push(id);
                }
            }
        }
    }
    for id in computed {
        if refs.contains_key(id) && seen.insert(*id) {
            ids.push(*id);
        }
    }

    ids.retain(|id| keep(*id));
    ids.sort_by(|a, b| refs[a].0.cmp(&refs[b].0));
    Value::Array(ids.into_iter().map(|id| refs[&id].1.clone()).collect())
}
