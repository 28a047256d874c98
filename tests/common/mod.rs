//! Shared test fixtures
//!
//! An in-memory connector serving canned records, keyed by wire path
//! ("dcim/sites", "ipam/ip-addresses"). Filters match on top-level
//! fields, which covers the id-merged follow-up queries the engine
//! generates.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;

use netgraph::connect::{ConnectError, ConnectResult, Connector, FilterMap};
use netgraph::forager::filters_from_params;

pub struct MockConnector {
    buckets: BTreeMap<String, Vec<Value>>,
    calls: AtomicUsize,
    threads: usize,
    url_length: usize,
    malformed_path: Option<String>,
    sliceable: HashSet<String>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            calls: AtomicUsize::new(0),
            threads: 1,
            url_length: 2000,
            malformed_path: None,
            sliceable: ["id".to_string()].into_iter().collect(),
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_url_length(mut self, url_length: usize) -> Self {
        self.url_length = url_length;
        self
    }

    /// Make one wire path answer with an unparseable body
    pub fn with_malformed_path(mut self, path: &str) -> Self {
        self.malformed_path = Some(path.to_string());
        self
    }

    /// Seed one record under a wire path such as "dcim/sites"
    pub fn add(&mut self, path: &str, record: Value) {
        self.buckets
            .entry(path.to_string())
            .or_default()
            .push(record);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self, path: &str, filters: &FilterMap) -> ConnectResult<Vec<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.malformed_path.as_deref() == Some(path) {
            return Err(ConnectError::MalformedResponse {
                path: path.to_string(),
                detail: "response body is not a record list".to_string(),
            });
        }
        Ok(self.matching(path, filters))
    }

    fn matching(&self, path: &str, filters: &FilterMap) -> Vec<Value> {
        self.buckets
            .get(path)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| {
                        filters.iter().all(|(key, values)| {
                            field_string(record, key)
                                .is_some_and(|actual| values.iter().any(|v| *v == actual))
                        })
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn field_string(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl Connector for MockConnector {
    fn get(&self, path: &str, filters: &FilterMap) -> ConnectResult<Vec<Value>> {
        self.respond(path, filters)
    }

    fn query_page(&self, path: &str, params: &[(String, String)]) -> ConnectResult<Vec<Value>> {
        self.respond(path, &filters_from_params(params))
    }

    fn threads(&self) -> usize {
        self.threads
    }

    fn url_length(&self) -> usize {
        self.url_length
    }

    fn sliceable_keys(&self) -> &HashSet<String> {
        &self.sliceable
    }
}
