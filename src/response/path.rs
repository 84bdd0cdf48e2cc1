//! Typed access into `serde_json::Value` that remembers where it is
//!
//! Every failure names the full JSON path, e.g.
//! `facet_counts.facet_fields.age[3]`.

use serde_json::{Map, Value};
use std::fmt;

use crate::error::{SolrError, SolrResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct JsonPath(String);

impl JsonPath {
    pub(crate) fn root() -> Self {
        Self(String::new())
    }

    pub(crate) fn key(&self, key: &str) -> Self {
        if self.0.is_empty() {
            Self(key.to_string())
        } else {
            Self(format!("{}.{}", self.0, key))
        }
    }

    pub(crate) fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    pub(crate) fn malformed(&self, detail: impl Into<String>) -> SolrError {
        SolrError::malformed(self.to_string(), detail)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "$")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn as_object<'a>(value: &'a Value, path: &JsonPath) -> SolrResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| path.malformed(format!("expected object, found {}", kind(value))))
}

pub(crate) fn as_array<'a>(value: &'a Value, path: &JsonPath) -> SolrResult<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| path.malformed(format!("expected array, found {}", kind(value))))
}

pub(crate) fn as_u64(value: &Value, path: &JsonPath) -> SolrResult<u64> {
    value
        .as_u64()
        .ok_or_else(|| path.malformed(format!("expected non-negative integer, found {}", value)))
}

pub(crate) fn as_i64(value: &Value, path: &JsonPath) -> SolrResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| path.malformed(format!("expected integer, found {}", value)))
}

pub(crate) fn as_f64(value: &Value, path: &JsonPath) -> SolrResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| path.malformed(format!("expected number, found {}", value)))
}

pub(crate) fn as_str<'a>(value: &'a Value, path: &JsonPath) -> SolrResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| path.malformed(format!("expected string, found {}", kind(value))))
}

pub(crate) fn as_bool(value: &Value, path: &JsonPath) -> SolrResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| path.malformed(format!("expected boolean, found {}", kind(value))))
}

/// Required key of an object, returned with its path.
pub(crate) fn required<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    path: &JsonPath,
) -> SolrResult<(&'a Value, JsonPath)> {
    let child = path.key(key);
    match object.get(key) {
        Some(value) => Ok((value, child)),
        None => Err(child.malformed("missing required key")),
    }
}

/// Optional key of an object. Explicit `null` counts as absent.
pub(crate) fn optional<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    path: &JsonPath,
) -> Option<(&'a Value, JsonPath)> {
    match object.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some((value, path.key(key))),
    }
}
