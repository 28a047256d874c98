//! netgraph - deterministic inventory graph engine
//!
//! Fetches records from a DCIM/IPAM inventory API into an in-memory
//! store, then assembles a derived object graph: device/port/address
//! adjacency and the IPv4 containment forest.

pub mod cidr;
pub mod cli;
pub mod config;
pub mod connect;
pub mod forager;
pub mod joiner;
pub mod observability;
pub mod parser;
pub mod record;
pub mod store;
