//! Endpoint registry
//!
//! A static table of `(app, model)` descriptors replaces the original
//! class-per-endpoint inheritance: one generic connector/forager pair is
//! parameterized by a table entry. Model names are stored in underscore
//! form; the wire form hyphenates.
//!
//! This is a representative table of the commonly-joined endpoints, not
//! the full per-endpoint catalogue.

use crate::record::model_wire;

/// One endpoint descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Application namespace
    pub app: &'static str,
    /// Model name, underscore form
    pub model: &'static str,
    /// Whether records of this model attach to a device-like record as a
    /// `_{model}` adjacency map (ports, bays, inventory items)
    pub device_component: bool,
}

impl Endpoint {
    /// `{app}/{model}` in underscore form, the registry key
    pub fn path(&self) -> String {
        format!("{}/{}", self.app, self.model)
    }

    /// `{app}/{model}` in hyphen form, for the wire
    pub fn wire_path(&self) -> String {
        format!("{}/{}", self.app, model_wire(self.model))
    }

    /// Reserved join-field name on the owning device (`_{model}`)
    pub fn component_field(&self) -> String {
        format!("_{}", self.model)
    }
}

const fn endpoint(app: &'static str, model: &'static str) -> Endpoint {
    Endpoint {
        app,
        model,
        device_component: false,
    }
}

const fn component(app: &'static str, model: &'static str) -> Endpoint {
    Endpoint {
        app,
        model,
        device_component: true,
    }
}

/// The endpoint table, built once at compile time
pub const ENDPOINTS: &[Endpoint] = &[
    endpoint("dcim", "sites"),
    endpoint("dcim", "racks"),
    endpoint("dcim", "manufacturers"),
    endpoint("dcim", "device_types"),
    endpoint("dcim", "device_roles"),
    endpoint("dcim", "platforms"),
    endpoint("dcim", "devices"),
    endpoint("dcim", "modules"),
    endpoint("dcim", "virtual_chassis"),
    endpoint("dcim", "cables"),
    component("dcim", "interfaces"),
    component("dcim", "console_ports"),
    component("dcim", "console_server_ports"),
    component("dcim", "power_ports"),
    component("dcim", "power_outlets"),
    component("dcim", "front_ports"),
    component("dcim", "rear_ports"),
    component("dcim", "device_bays"),
    component("dcim", "module_bays"),
    component("dcim", "inventory_items"),
    endpoint("ipam", "aggregates"),
    endpoint("ipam", "prefixes"),
    endpoint("ipam", "ip_addresses"),
    endpoint("ipam", "vrfs"),
    endpoint("ipam", "vlans"),
    endpoint("ipam", "vlan_groups"),
    endpoint("ipam", "rirs"),
    endpoint("ipam", "roles"),
    endpoint("ipam", "services"),
    endpoint("tenancy", "tenants"),
    endpoint("tenancy", "tenant_groups"),
    endpoint("virtualization", "clusters"),
    endpoint("virtualization", "cluster_types"),
    endpoint("virtualization", "virtual_machines"),
    component("virtualization", "interfaces"),
    endpoint("extras", "tags"),
];

/// Find a descriptor by app and model (either name form)
pub fn lookup(app: &str, model: &str) -> Option<&'static Endpoint> {
    let key = crate::record::model_key(model);
    ENDPOINTS
        .iter()
        .find(|e| e.app == app && e.model == key)
}

/// Descriptors for device-attached component models under an app
pub fn device_components(app: &str) -> impl Iterator<Item = &'static Endpoint> + use<'_> {
    ENDPOINTS
        .iter()
        .filter(move |e| e.app == app && e.device_component)
}
