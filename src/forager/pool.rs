//! Worker pool for follow-up fetches
//!
//! One shared queue of (path, filters) work items, drained by `threads`
//! OS workers. Worker startup is staggered by the connector's `interval`
//! to avoid request bursts. Each item's results are owned return values
//! collected into an orchestrator-owned vector; the first connector error
//! stops the pool and aborts the whole fetch.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::connect::{ConnectError, Connector, FilterMap};
use crate::forager::slicing::params_from_filters;
use crate::observability::Logger;

use super::errors::ForageResult;

/// One queued follow-up fetch
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// `{app}/{model}` in underscore form
    pub path: String,
    /// Filters for this slice
    pub filters: FilterMap,
}

/// Drain `items` through `threads` workers and collect every result.
///
/// Completion order is nondeterministic; the caller's merge is an
/// idempotent id-keyed upsert, so final state is not.
pub fn run_threaded(
    connector: &dyn Connector,
    items: Vec<WorkItem>,
    threads: usize,
    interval: f64,
) -> ForageResult<Vec<Value>> {
    let queue: Mutex<VecDeque<WorkItem>> = Mutex::new(items.into());
    let results: Mutex<Vec<Value>> = Mutex::new(Vec::new());
    let failure: Mutex<Option<ConnectError>> = Mutex::new(None);

    thread::scope(|scope| {
        for worker in 0..threads {
            let queue = &queue;
            let results = &results;
            let failure = &failure;
            scope.spawn(move || {
                if worker > 0 && interval > 0.0 {
                    thread::sleep(Duration::from_secs_f64(interval * worker as f64));
                }
                Logger::trace("worker_start", &[("worker", &worker.to_string())]);
                let mut handled = 0usize;
                loop {
                    if failure.lock().unwrap().is_some() {
                        break;
                    }
                    let item = match queue.lock().unwrap().pop_front() {
                        Some(item) => item,
                        None => break,
                    };
                    let params = params_from_filters(&item.filters);
                    match connector.query_page(&item.path, &params) {
                        Ok(mut fetched) => {
                            results.lock().unwrap().append(&mut fetched);
                            handled += 1;
                        }
                        Err(e) => {
                            let mut slot = failure.lock().unwrap();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            break;
                        }
                    }
                }
                Logger::trace(
                    "worker_done",
                    &[
                        ("worker", &worker.to_string()),
                        ("items", &handled.to_string()),
                    ],
                );
            });
        }
    });

    if let Some(e) = failure.into_inner().unwrap() {
        return Err(e.into());
    }
    Ok(results.into_inner().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect::ConnectResult;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingConnector {
        calls: AtomicUsize,
        fail_path: Option<String>,
        sliceable: HashSet<String>,
    }

    impl CountingConnector {
        fn new(fail_path: Option<&str>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_path: fail_path.map(str::to_string),
                sliceable: HashSet::new(),
            }
        }
    }

    impl Connector for CountingConnector {
        fn get(&self, _path: &str, _filters: &FilterMap) -> ConnectResult<Vec<Value>> {
            Ok(Vec::new())
        }

        fn query_page(
            &self,
            path: &str,
            params: &[(String, String)],
        ) -> ConnectResult<Vec<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_path.as_deref() == Some(path) {
                return Err(ConnectError::Transport {
                    path: path.to_string(),
                    status: Some(500),
                    detail: "boom".to_string(),
                });
            }
            Ok(params
                .iter()
                .filter(|(k, _)| k == "id")
                .map(|(_, v)| json!({"id": v.parse::<i64>().unwrap(), "path": path}))
                .collect())
        }

        fn sliceable_keys(&self) -> &HashSet<String> {
            &self.sliceable
        }
    }

    fn item(path: &str, ids: &[i64]) -> WorkItem {
        let mut filters = FilterMap::new();
        filters.insert("id".to_string(), ids.iter().map(i64::to_string).collect());
        WorkItem {
            path: path.to_string(),
            filters,
        }
    }

    #[test]
    fn test_pool_drains_every_item() {
        let connector = CountingConnector::new(None);
        let items = vec![
            item("dcim/sites", &[1, 2]),
            item("dcim/racks", &[3]),
            item("extras/tags", &[4, 5, 6]),
        ];
        let results = run_threaded(&connector, items, 3, 0.0).unwrap();
        assert_eq!(results.len(), 6);
        assert_eq!(connector.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_pool_surfaces_first_error() {
        let connector = CountingConnector::new(Some("dcim/racks"));
        let items = vec![item("dcim/sites", &[1]), item("dcim/racks", &[2])];
        let err = run_threaded(&connector, items, 2, 0.0).unwrap_err();
        assert!(err.to_string().contains("dcim/racks"));
    }

    #[test]
    fn test_single_worker_processes_in_order() {
        let connector = CountingConnector::new(None);
        let items = vec![item("a/b", &[1]), item("c/d", &[2])];
        let results = run_threaded(&connector, items, 1, 0.0).unwrap();
        assert_eq!(results[0]["path"], "a/b");
        assert_eq!(results[1]["path"], "c/d");
    }
}
