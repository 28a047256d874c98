//! Fetch orchestrator
//!
//! One forager per (app, model) endpoint. `get` issues the base query
//! through the connector, discovers cross-references embedded in the
//! results, batches and slices follow-up requests, runs them sequentially
//! or across a bounded worker pool, and merges everything into the record
//! store.
//!
//! Fetch failures are fatal and non-partial: the first connector error
//! aborts the in-progress `get` call.

mod errors;
mod pool;
mod scan;
mod slicing;

pub use errors::{ForageError, ForageResult};
pub use pool::{run_threaded, WorkItem};
pub use scan::scan_urls;
pub use slicing::{
    filters_from_params, merge_urls, params_from_filters, slice_filters, split_job, QueryJob,
};

use std::collections::HashSet;

use serde_json::Value;

use crate::connect::{self, ConnectError, Connector, Endpoint, FilterMap};
use crate::observability::Logger;
use crate::record::{is_nested, record_id, stamp_nested, ApiUrl, RecordError};
use crate::store::RecordStore;

/// Per-endpoint fetch controller
pub struct Forager<'a> {
    connector: &'a dyn Connector,
    endpoint: &'static Endpoint,
}

impl<'a> Forager<'a> {
    /// Bind a forager to an endpoint from the registry
    pub fn new(connector: &'a dyn Connector, app: &str, model: &str) -> ForageResult<Self> {
        let endpoint = connect::lookup(app, model)
            .ok_or_else(|| ConnectError::UnknownEndpoint(format!("{}/{}", app, model)))?;
        Ok(Self {
            connector,
            endpoint,
        })
    }

    /// The endpoint this forager controls
    pub fn endpoint(&self) -> &'static Endpoint {
        self.endpoint
    }

    /// Fetch records matching `filters` into `store`, following embedded
    /// cross-references when `nested` is set. Returns the ids of the base
    /// records fetched (not the discovered stubs).
    pub fn get(
        &self,
        store: &mut RecordStore,
        nested: bool,
        filters: &FilterMap,
    ) -> ForageResult<Vec<i64>> {
        Logger::info(
            "forage_start",
            &[
                ("path", &self.endpoint.path()),
                ("nested", if nested { "true" } else { "false" }),
            ],
        );

        // Pure id filters skip ids already fetched with full expansion.
        let filters = match self.dedup_id_filter(store, filters) {
            Some(remaining) => remaining,
            None => {
                Logger::trace("forage_complete", &[("path", &self.endpoint.path()), ("records", "0")]);
                return Ok(Vec::new());
            }
        };

        let fetched = self
            .connector
            .get(&self.endpoint.wire_path(), &filters)?;

        let mut base_ids = Vec::new();
        for mut record in fetched.iter().cloned() {
            stamp_nested(&mut record, nested);
            if let Some(id) = store.upsert(self.endpoint.app, self.endpoint.model, record) {
                base_ids.push(id);
            }
        }

        if !nested {
            Logger::info(
                "forage_complete",
                &[
                    ("path", &self.endpoint.path()),
                    ("records", &base_ids.len().to_string()),
                ],
            );
            return Ok(base_ids);
        }

        let candidates = self.discover(store, &fetched)?;
        Logger::trace(
            "forage_refs_found",
            &[
                ("path", &self.endpoint.path()),
                ("refs", &candidates.len().to_string()),
            ],
        );

        let items = self.plan(&candidates)?;
        let stubs = self.execute(items)?;
        self.merge_stubs(store, stubs)?;

        Logger::info(
            "forage_complete",
            &[
                ("path", &self.endpoint.path()),
                ("records", &base_ids.len().to_string()),
            ],
        );
        Ok(base_ids)
    }

    /// For a filter of exactly `{id: [...]}`, drop ids already stored with
    /// `_nested == true`. `None` means a non-empty id filter emptied out
    /// and there is nothing to do.
    fn dedup_id_filter(&self, store: &RecordStore, filters: &FilterMap) -> Option<FilterMap> {
        if filters.len() != 1 || !filters.contains_key("id") {
            return Some(filters.clone());
        }
        let requested = &filters["id"];
        let remaining: Vec<String> = requested
            .iter()
            .filter(|raw| {
                let Ok(id) = raw.parse::<i64>() else {
                    return true;
                };
                !store
                    .record(self.endpoint.app, self.endpoint.model, id)
                    .is_some_and(is_nested)
            })
            .cloned()
            .collect();

        if remaining.is_empty() && !requested.is_empty() {
            return None;
        }
        let mut deduped = FilterMap::new();
        deduped.insert("id".to_string(), remaining);
        Some(deduped)
    }

    /// Scan fetched records for cross-reference URLs, dropping targets
    /// already present in the store
    fn discover(&self, store: &RecordStore, fetched: &[Value]) -> ForageResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        for record in fetched {
            scan_urls(record, &mut seen, &mut urls);
        }

        let mut kept = Vec::new();
        for url in urls {
            let parsed = ApiUrl::parse(&url)?;
            let known = parsed
                .id
                .is_some_and(|id| store.contains(&parsed.app, &parsed.model, id));
            if !known {
                kept.push(url);
            }
        }
        Ok(kept)
    }

    /// Merge candidate URLs per path, split oversized queries, and re-slice
    /// any still-oversized sliceable filter keys into flat work items
    fn plan(&self, candidates: &[String]) -> ForageResult<Vec<WorkItem>> {
        let max_len = self.connector.url_length();
        let sliceable = self.connector.sliceable_keys();

        let mut items = Vec::new();
        for job in merge_urls(candidates)? {
            for slice in split_job(&job, max_len) {
                let filters = filters_from_params(&slice.params);
                for part in slice_filters(&filters, sliceable, max_len) {
                    items.push(WorkItem {
                        path: wire(&slice.path),
                        filters: part,
                    });
                }
            }
        }
        Ok(items)
    }

    /// Run the work items sequentially or across the worker pool
    fn execute(&self, items: Vec<WorkItem>) -> ForageResult<Vec<Value>> {
        let threads = self.connector.threads();
        if threads <= 1 {
            let mut results = Vec::new();
            for item in items {
                let params = params_from_filters(&item.filters);
                results.extend(self.connector.query_page(&item.path, &params)?);
            }
            return Ok(results);
        }
        run_threaded(self.connector, items, threads, self.connector.interval())
    }

    /// Insert fetched stubs by the address in their own `url`,
    /// first-writer-wins, tagged `_nested = false`
    fn merge_stubs(&self, store: &mut RecordStore, stubs: Vec<Value>) -> ForageResult<()> {
        for mut record in stubs {
            let url = record
                .get("url")
                .and_then(Value::as_str)
                .ok_or(RecordError::MissingField("url"))?
                .to_string();
            let parsed = ApiUrl::parse(&url)?;
            if record_id(&record).is_none() {
                return Err(RecordError::MissingField("id").into());
            }
            stamp_nested(&mut record, false);
            store.insert_if_absent(&parsed.app, &parsed.model, record);
        }
        Ok(())
    }
}

/// Underscore path → wire path (`dcim/ip_addresses` → `dcim/ip-addresses`)
fn wire(path: &str) -> String {
    match path.split_once('/') {
        Some((app, model)) => format!("{}/{}", app, crate::record::model_wire(model)),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NullConnector(HashSet<String>);

    impl NullConnector {
        fn new() -> Self {
            Self(HashSet::new())
        }
    }

    impl Connector for NullConnector {
        fn get(&self, _: &str, _: &FilterMap) -> crate::connect::ConnectResult<Vec<Value>> {
            Ok(Vec::new())
        }
        fn query_page(
            &self,
            _: &str,
            _: &[(String, String)],
        ) -> crate::connect::ConnectResult<Vec<Value>> {
            Ok(Vec::new())
        }
        fn sliceable_keys(&self) -> &HashSet<String> {
            &self.0
        }
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let connector = NullConnector::new();
        assert!(Forager::new(&connector, "dcim", "devices").is_ok());
        assert!(Forager::new(&connector, "dcim", "bogus").is_err());
    }

    #[test]
    fn test_dedup_id_filter_keeps_stub_ids() {
        let connector = NullConnector::new();
        let forager = Forager::new(&connector, "dcim", "devices").unwrap();

        let mut store = RecordStore::new();
        store.upsert("dcim", "devices", json!({"id": 1, "_nested": true}));
        store.upsert("dcim", "devices", json!({"id": 2, "_nested": false}));

        let mut filters = FilterMap::new();
        filters.insert(
            "id".to_string(),
            vec!["1".to_string(), "2".to_string(), "9".to_string()],
        );

        // id 1 is fully expanded already; ids 2 (stub) and 9 (unknown) remain
        let remaining = forager.dedup_id_filter(&store, &filters).unwrap();
        assert_eq!(remaining["id"], vec!["2", "9"]);

        let mut only_known = FilterMap::new();
        only_known.insert("id".to_string(), vec!["1".to_string()]);
        assert!(forager.dedup_id_filter(&store, &only_known).is_none());
    }
}
