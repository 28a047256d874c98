//! In-memory record store
//!
//! The nested `app → model → {id: Record}` container. Two independent
//! instances exist at runtime:
//!
//! - "root": raw fetch results, filled by the forager
//! - "tree": derived copy, enriched in place by the joiner
//!
//! Bucket invariant: within one (app, model) bucket, id keys are unique.
//! Bucket iteration is sorted by id and therefore deterministic;
//! join-derived adjacency order lives inside records as insertion-ordered
//! JSON maps.

mod errors;
mod snapshot;

pub use errors::{StoreError, StoreResult};
pub use snapshot::{load_snapshot, write_snapshot, SnapshotMeta};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{model_key, record_id};

/// One (app, model) bucket: id → record
pub type Bucket = BTreeMap<i64, Value>;

/// The `app → model → {id: Record}` nested map
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordStore {
    apps: BTreeMap<String, BTreeMap<String, Bucket>>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Application namespaces present in the store
    pub fn apps(&self) -> Vec<&str> {
        self.apps.keys().map(String::as_str).collect()
    }

    /// Model names present under an application
    pub fn models(&self, app: &str) -> Vec<&str> {
        self.apps
            .get(app)
            .map(|models| models.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Borrow a bucket if it exists. Model names are normalized
    /// (hyphens → underscores) before lookup.
    pub fn get(&self, app: &str, model: &str) -> Option<&Bucket> {
        self.apps.get(app).and_then(|models| models.get(&model_key(model)))
    }

    /// Borrow a bucket mutably, creating it if absent
    pub fn bucket(&mut self, app: &str, model: &str) -> &mut Bucket {
        self.apps
            .entry(app.to_string())
            .or_default()
            .entry(model_key(model))
            .or_default()
    }

    /// Whether a record id exists in a bucket
    pub fn contains(&self, app: &str, model: &str, id: i64) -> bool {
        self.get(app, model).is_some_and(|bucket| bucket.contains_key(&id))
    }

    /// Borrow one record
    pub fn record(&self, app: &str, model: &str, id: i64) -> Option<&Value> {
        self.get(app, model).and_then(|bucket| bucket.get(&id))
    }

    /// Borrow one record mutably
    pub fn record_mut(&mut self, app: &str, model: &str, id: i64) -> Option<&mut Value> {
        self.apps
            .get_mut(app)
            .and_then(|models| models.get_mut(&model_key(model)))
            .and_then(|bucket| bucket.get_mut(&id))
    }

    /// Insert or overwrite a record by its own `id`. A fresh fetch with the
    /// same id replaces the stored record wholesale. Records without a
    /// positive integer id are ignored.
    pub fn upsert(&mut self, app: &str, model: &str, record: Value) -> Option<i64> {
        let id = record_id(&record)?;
        self.bucket(app, model).insert(id, record);
        Some(id)
    }

    /// Insert a record only if its id is absent (first-writer-wins).
    /// Returns true when the record was inserted.
    pub fn insert_if_absent(&mut self, app: &str, model: &str, record: Value) -> bool {
        let Some(id) = record_id(&record) else {
            return false;
        };
        let bucket = self.bucket(app, model);
        if bucket.contains_key(&id) {
            return false;
        }
        bucket.insert(id, record);
        true
    }

    /// Total number of records across all buckets
    pub fn record_count(&self) -> u64 {
        self.apps
            .values()
            .flat_map(|models| models.values())
            .map(|bucket| bucket.len() as u64)
            .sum()
    }
}
