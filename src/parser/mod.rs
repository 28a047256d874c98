//! Resilient nested-field accessor
//!
//! API records are partially-absent, heterogeneous JSON: a stub record has
//! `id` and `url` and little else, while an expanded record nests related
//! objects several levels deep. The accessor walks a chain of keys through
//! that shape with two failure modes:
//!
//! - strict: any missing key, bad index, or type mismatch raises a
//!   `ParserError::Miss` naming the key path and the record's source
//! - lenient: misses are swallowed and the zero value of the requested
//!   type comes back ("" / 0 / false / {} / [])
//!
//! Retired key paths (see [`DeprecatedKeys`]) raise in both modes.

mod deprecated;
mod errors;

pub use deprecated::{version_at_least, DeprecatedKey, DeprecatedKeys};
pub use errors::{ParserError, ParserResult};

use serde_json::{Map, Value};

use crate::record::{record_source, ApiUrl};

/// One step in a key chain: an object field or a list index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Object field name
    Field(String),
    /// List index
    Index(usize),
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Field(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Field(name)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

/// Dotted display form of a key chain, for diagnostics
fn format_path(keys: &[Key]) -> String {
    keys.iter()
        .map(|key| match key {
            Key::Field(name) => name.clone(),
            Key::Index(i) => i.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Typed chain-key reader over one record
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    record: Option<&'a Value>,
    strict: bool,
    api_version: Option<String>,
    deprecated: DeprecatedKeys,
}

impl<'a> Parser<'a> {
    /// Wrap a record (absent normalizes to an empty record). The built-in
    /// deprecated-key table applies until overridden.
    pub fn new(record: Option<&'a Value>, strict: bool) -> Self {
        Self {
            record,
            strict,
            api_version: None,
            deprecated: DeprecatedKeys::builtin(),
        }
    }

    /// Declare the API schema version the caller was written against
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Replace the deprecated-key table (externally supplied configuration)
    pub fn with_deprecated(mut self, table: DeprecatedKeys) -> Self {
        self.deprecated = table;
        self
    }

    /// The record's diagnostic identity: `url` if present, else string form
    pub fn source(&self) -> String {
        match self.record {
            Some(record) => record_source(record),
            None => "<absent record>".to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Typed getters
    // ------------------------------------------------------------------

    /// Raw value at the key chain; lenient misses yield `Value::Null`
    pub fn any(&self, keys: &[Key]) -> ParserResult<Value> {
        match self.resolve(keys, self.strict)? {
            Some(value) => Ok(value.clone()),
            None => Ok(Value::Null),
        }
    }

    /// String at the key chain; non-strings are a miss
    pub fn string(&self, keys: &[Key]) -> ParserResult<String> {
        self.typed(keys, self.strict, as_string, String::new())
    }

    /// Integer at the key chain; numeric strings coerce, nothing else does
    pub fn int(&self, keys: &[Key]) -> ParserResult<i64> {
        self.typed(keys, self.strict, as_int, 0)
    }

    /// Boolean at the key chain
    pub fn boolean(&self, keys: &[Key]) -> ParserResult<bool> {
        self.typed(keys, self.strict, as_bool, false)
    }

    /// Object at the key chain
    pub fn dict(&self, keys: &[Key]) -> ParserResult<Map<String, Value>> {
        self.typed(keys, self.strict, as_dict, Map::new())
    }

    /// List at the key chain
    pub fn list(&self, keys: &[Key]) -> ParserResult<Vec<Value>> {
        self.typed(keys, self.strict, as_list, Vec::new())
    }

    // ------------------------------------------------------------------
    // Strict-in-the-small variants: force strict for one call, and treat
    // an empty/zero success as absent
    // ------------------------------------------------------------------

    /// Non-empty string or a miss, regardless of the object's own mode
    pub fn strict_string(&self, keys: &[Key]) -> ParserResult<String> {
        let value = self.typed(keys, true, as_string, String::new())?;
        if value.is_empty() {
            return Err(self.miss_error(keys));
        }
        Ok(value)
    }

    /// Non-zero integer or a miss
    pub fn strict_int(&self, keys: &[Key]) -> ParserResult<i64> {
        let value = self.typed(keys, true, as_int, 0)?;
        if value == 0 {
            return Err(self.miss_error(keys));
        }
        Ok(value)
    }

    /// Non-empty object or a miss
    pub fn strict_dict(&self, keys: &[Key]) -> ParserResult<Map<String, Value>> {
        let value = self.typed(keys, true, as_dict, Map::new())?;
        if value.is_empty() {
            return Err(self.miss_error(keys));
        }
        Ok(value)
    }

    /// Non-empty list or a miss
    pub fn strict_list(&self, keys: &[Key]) -> ParserResult<Vec<Value>> {
        let value = self.typed(keys, true, as_list, Vec::new())?;
        if value.is_empty() {
            return Err(self.miss_error(keys));
        }
        Ok(value)
    }

    /// Tag slugs, read leniently; elements without a `slug` string are
    /// skipped
    pub fn tags(&self) -> Vec<String> {
        self.record
            .and_then(|record| record.get("tags"))
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(|tag| tag.get("slug"))
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn typed<T>(
        &self,
        keys: &[Key],
        strict: bool,
        convert: fn(&Value) -> Option<T>,
        zero: T,
    ) -> ParserResult<T> {
        match self.resolve(keys, strict)? {
            None => Ok(zero),
            Some(value) => match convert(value) {
                Some(converted) => Ok(converted),
                None if strict => Err(self.miss_error(keys)),
                None => Ok(zero),
            },
        }
    }

    /// Walk the key chain. `Ok(None)` is a lenient miss; strict misses are
    /// errors. Retired key paths error in both modes.
    fn resolve(&self, keys: &[Key], strict: bool) -> ParserResult<Option<&Value>> {
        self.check_version(keys)?;

        let mut current = match self.record {
            Some(record) => record,
            None => return self.miss(keys, strict),
        };
        for key in keys {
            let next = match key {
                Key::Field(name) => current.as_object().and_then(|map| map.get(name)),
                Key::Index(i) => current.as_array().and_then(|list| list.get(*i)),
            };
            match next {
                Some(value) => current = value,
                None => return self.miss(keys, strict),
            }
        }
        Ok(Some(current))
    }

    /// Raise for a key chain starting at a retired key. Applies when the
    /// record's own URL names a model with a matching rule and the declared
    /// API version is at or past the retirement (unknown version: raise,
    /// the caller cannot prove the old path still exists).
    fn check_version(&self, keys: &[Key]) -> ParserResult<()> {
        let Some(Key::Field(first)) = keys.first() else {
            return Ok(());
        };
        let Some(url) = self.record.and_then(|r| r.get("url")).and_then(Value::as_str) else {
            return Ok(());
        };
        let Ok(api_url) = ApiUrl::parse(url) else {
            return Ok(());
        };

        let model = crate::record::model_key(&api_url.model);
        if let Some(rule) = self.deprecated.lookup(&api_url.app, &model, first) {
            let retired = match &self.api_version {
                Some(declared) => version_at_least(declared, &rule.since),
                None => true,
            };
            if retired {
                return Err(ParserError::Version {
                    path: format_path(keys),
                    replacement: rule.replacement.clone(),
                    since: rule.since.clone(),
                    source: self.source(),
                });
            }
        }
        Ok(())
    }

    fn miss(&self, keys: &[Key], strict: bool) -> ParserResult<Option<&Value>> {
        if strict {
            Err(self.miss_error(keys))
        } else {
            Ok(None)
        }
    }

    fn miss_error(&self, keys: &[Key]) -> ParserError {
        ParserError::Miss {
            path: format_path(keys),
            source: self.source(),
        }
    }
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    value.as_bool()
}

fn as_dict(value: &Value) -> Option<Map<String, Value>> {
    value.as_object().cloned()
}

fn as_list(value: &Value) -> Option<Vec<Value>> {
    value.as_array().cloned()
}
