//! Follow-up query batching and slicing
//!
//! Discovered single-object URLs collapse into one `id=1&id=2...` query
//! per `{app}/{model}` path. A merged query whose encoded length exceeds
//! the connector's limit splits into multiple queries, each within the
//! limit, preserving other parameters.

use std::collections::BTreeMap;

use crate::connect::FilterMap;
use crate::record::{encode_query, ApiUrl, RecordResult};

/// One follow-up query: a registry path plus ordered query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryJob {
    /// `{app}/{model}` in underscore form
    pub path: String,
    /// Query parameters in wire order; keys may repeat
    pub params: Vec<(String, String)>,
}

/// Group candidate URLs by path, merging single-object URLs into one
/// filtered query per path. Collection URLs pass through with their own
/// query parameters.
pub fn merge_urls(candidates: &[String]) -> RecordResult<Vec<QueryJob>> {
    let mut ids_by_path: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut passthrough = Vec::new();

    for candidate in candidates {
        let url = ApiUrl::parse(candidate)?;
        match url.id {
            Some(id) => ids_by_path
                .entry(url.path())
                .or_default()
                .push(id.to_string()),
            None => passthrough.push(QueryJob {
                path: url.path(),
                params: url.query,
            }),
        }
    }

    let mut jobs: Vec<QueryJob> = ids_by_path
        .into_iter()
        .map(|(path, ids)| QueryJob {
            path,
            params: ids.into_iter().map(|id| ("id".to_string(), id)).collect(),
        })
        .collect();
    jobs.extend(passthrough);
    Ok(jobs)
}

/// Split a job whose encoded query exceeds `max_len`. The most-repeated
/// key is sliced; all other parameters ride along with every slice.
pub fn split_job(job: &QueryJob, max_len: usize) -> Vec<QueryJob> {
    if encode_query(&job.params).len() <= max_len {
        return vec![job.clone()];
    }

    let Some(repeat_key) = most_repeated_key(&job.params) else {
        return vec![job.clone()];
    };

    let (sliced, others): (Vec<_>, Vec<_>) = job
        .params
        .iter()
        .cloned()
        .partition(|(k, _)| *k == repeat_key);

    chunk_pairs(&sliced, &others, max_len)
        .into_iter()
        .map(|params| QueryJob {
            path: job.path.clone(),
            params,
        })
        .collect()
}

/// Slice an oversized filter map along its sliceable list-valued keys.
/// Filters that fit, or that have no sliceable key, come back whole.
pub fn slice_filters(
    filters: &FilterMap,
    sliceable: &std::collections::HashSet<String>,
    max_len: usize,
) -> Vec<FilterMap> {
    let params = params_from_filters(filters);
    if encode_query(&params).len() <= max_len {
        return vec![filters.clone()];
    }

    let Some(key) = filters
        .iter()
        .filter(|(k, _)| sliceable.contains(*k))
        .max_by_key(|(_, values)| values.len())
        .map(|(k, _)| k.clone())
    else {
        return vec![filters.clone()];
    };

    let (sliced, others): (Vec<_>, Vec<_>) =
        params.into_iter().partition(|(k, _)| *k == key);

    chunk_pairs(&sliced, &others, max_len)
        .into_iter()
        .map(|chunk| filters_from_params(&chunk))
        .collect()
}

/// Rebuild a filter map from ordered query pairs
pub fn filters_from_params(params: &[(String, String)]) -> FilterMap {
    let mut filters = FilterMap::new();
    for (key, value) in params {
        filters.entry(key.clone()).or_default().push(value.clone());
    }
    filters
}

/// Flatten a filter map back into ordered query pairs
pub fn params_from_filters(filters: &FilterMap) -> Vec<(String, String)> {
    filters
        .iter()
        .flat_map(|(key, values)| values.iter().map(move |v| (key.clone(), v.clone())))
        .collect()
}

fn most_repeated_key(params: &[(String, String)]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (key, _) in params {
        *counts.entry(key).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(key, _)| key.to_string())
}

/// Pack the sliced pairs into chunks that, together with `others`, encode
/// within `max_len`. A single pair larger than the limit still gets its
/// own chunk; it cannot be split further.
fn chunk_pairs(
    sliced: &[(String, String)],
    others: &[(String, String)],
    max_len: usize,
) -> Vec<Vec<(String, String)>> {
    let base_len = encode_query(others).len();
    let mut chunks = Vec::new();
    let mut current: Vec<(String, String)> = others.to_vec();
    let mut current_len = base_len;

    for pair in sliced {
        let pair_len = pair.0.len() + 1 + pair.1.len();
        let separator = usize::from(current_len > 0);
        if current.len() > others.len() && current_len + separator + pair_len > max_len {
            chunks.push(current);
            current = others.to_vec();
            current_len = base_len;
        }
        let separator = usize::from(current_len > 0);
        current_len += separator + pair_len;
        current.push(pair.clone());
    }
    if current.len() > others.len() {
        chunks.push(current);
    }
    chunks
}
