//! API URL parsing
//!
//! URL shapes:
//! - `.../api/{app}/{model}/{id}/`
//! - `.../api/{app}/{model}/?k=v&k=v2`
//!
//! `{id}` is optional for collection endpoints. Hyphens in `{model}` are
//! normalized to underscores for registry lookup and back to hyphens for
//! the wire.

use regex::Regex;
use std::sync::OnceLock;

use super::errors::{RecordError, RecordResult};

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Path portion only; query string is split off before matching.
        Regex::new(r"/api/([a-z0-9_-]+)/([a-z0-9_-]+)/(?:([^/?]+)/)?$")
            .expect("url pattern is valid")
    })
}

/// A parsed API URL: app/model address, optional id, optional query pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUrl {
    /// Application namespace (e.g. "dcim", "ipam")
    pub app: String,
    /// Model name as it appeared on the wire (hyphenated)
    pub model: String,
    /// Object id for single-object URLs
    pub id: Option<i64>,
    /// Query pairs in source order; keys may repeat
    pub query: Vec<(String, String)>,
}

impl ApiUrl {
    /// Parse an absolute or relative API URL
    pub fn parse(url: &str) -> RecordResult<Self> {
        let (path, query_str) = match url.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (url, None),
        };

        let caps = url_pattern()
            .captures(path)
            .ok_or_else(|| RecordError::MalformedUrl(url.to_string()))?;

        let id = match caps.get(3) {
            Some(raw) => Some(
                raw.as_str()
                    .parse::<i64>()
                    .ok()
                    .filter(|id| *id > 0)
                    .ok_or_else(|| RecordError::MalformedId(url.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            app: caps[1].to_string(),
            model: caps[2].to_string(),
            id,
            query: query_str.map(parse_query).unwrap_or_default(),
        })
    }

    /// `{app}/{model}` with underscores, for registry lookup
    pub fn path(&self) -> String {
        format!("{}/{}", self.app, model_key(&self.model))
    }

    /// `{app}/{model}` with hyphens, for the wire
    pub fn wire_path(&self) -> String {
        format!("{}/{}", self.app, model_wire(&self.model))
    }
}

/// Normalize a model name for attribute/registry lookup (hyphens → underscores)
pub fn model_key(model: &str) -> String {
    model.replace('-', "_")
}

/// Normalize a model name for the wire (underscores → hyphens)
pub fn model_wire(model: &str) -> String {
    model.replace('_', "-")
}

/// Parse a query string into ordered pairs; repeated keys are preserved
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (part.to_string(), String::new()),
        })
        .collect()
}

/// Encode ordered pairs back into a query string
pub fn encode_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_object_url() {
        let url = ApiUrl::parse("https://nb.example.com/api/dcim/devices/5/").unwrap();
        assert_eq!(url.app, "dcim");
        assert_eq!(url.model, "devices");
        assert_eq!(url.id, Some(5));
        assert!(url.query.is_empty());
    }

    #[test]
    fn test_parse_collection_url_with_query() {
        let url = ApiUrl::parse("/api/ipam/ip-addresses/?limit=0&id=1&id=2").unwrap();
        assert_eq!(url.app, "ipam");
        assert_eq!(url.model, "ip-addresses");
        assert_eq!(url.id, None);
        assert_eq!(
            url.query,
            vec![
                ("limit".to_string(), "0".to_string()),
                ("id".to_string(), "1".to_string()),
                ("id".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_model_normalization() {
        let url = ApiUrl::parse("/api/ipam/ip-addresses/9/").unwrap();
        assert_eq!(url.path(), "ipam/ip_addresses");
        assert_eq!(url.wire_path(), "ipam/ip-addresses");
    }

    #[test]
    fn test_malformed_urls_rejected() {
        assert!(matches!(
            ApiUrl::parse("https://nb.example.com/dcim/devices/5/"),
            Err(RecordError::MalformedUrl(_))
        ));
        assert!(matches!(
            ApiUrl::parse("/api/dcim/devices/abc/"),
            Err(RecordError::MalformedId(_))
        ));
        assert!(matches!(
            ApiUrl::parse("/api/dcim/devices/0/"),
            Err(RecordError::MalformedId(_))
        ));
    }

    #[test]
    fn test_query_round_trip() {
        let pairs = parse_query("brand=core&id=1&id=2");
        assert_eq!(encode_query(&pairs), "brand=core&id=1&id=2");
    }
}
