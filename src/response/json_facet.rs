//! Results of the JSON Facet API (`facets` in the response)
//!
//! The tree mirrors the request: every named facet is either a flat stat or
//! a nested result which may carry `buckets` of further results.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SolrResult;
use crate::response::path::{self, JsonPath};

/// Whether `value` under `key` describes the result itself rather than a
/// named child facet. A reserved name holding a value of another type is a
/// user facet that happens to share the name.
fn is_metadata(key: &str, value: &Value) -> bool {
    match key {
        "val" => true,
        "count" | "numBuckets" => value.is_u64(),
        "allBuckets" | "missing" => value.is_object(),
        "buckets" => value.is_array(),
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JsonFacetNode {
    /// Aggregation result such as the value of `sum(count)` or the list
    /// returned by `percentile(age,25,50,75)`
    Stat(Value),
    Facet(JsonFacetResult),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonFacetResult {
    pub count: Option<u64>,
    /// Bucket value, only set on buckets
    pub val: Option<Value>,
    pub num_buckets: Option<u64>,
    pub all_buckets: Option<Box<JsonFacetResult>>,
    pub missing: Option<Box<JsonFacetResult>>,
    pub buckets: Vec<JsonFacetResult>,
    pub children: IndexMap<String, JsonFacetNode>,
}

impl JsonFacetResult {
    pub(crate) fn parse(value: &Value, at: &JsonPath) -> SolrResult<Self> {
        let object = path::as_object(value, at)?;
        let mut result = JsonFacetResult::default();

        for (name, child) in object {
            let p = at.key(name);
            if is_metadata(name, child) {
                match name.as_str() {
                    "count" => result.count = Some(path::as_u64(child, &p)?),
                    "val" => result.val = Some(child.clone()),
                    "numBuckets" => result.num_buckets = Some(path::as_u64(child, &p)?),
                    "allBuckets" => result.all_buckets = Some(Box::new(Self::parse(child, &p)?)),
                    "missing" => result.missing = Some(Box::new(Self::parse(child, &p)?)),
                    _ => {
                        result.buckets = path::as_array(child, &p)?
                            .iter()
                            .enumerate()
                            .map(|(i, bucket)| Self::parse_bucket(bucket, &p.index(i)))
                            .collect::<SolrResult<Vec<_>>>()?;
                    }
                }
                continue;
            }
            let node = match child {
                Value::Object(_) => JsonFacetNode::Facet(Self::parse(child, &p)?),
                stat => JsonFacetNode::Stat(stat.clone()),
            };
            result.children.insert(name.clone(), node);
        }
        Ok(result)
    }

    fn parse_bucket(value: &Value, at: &JsonPath) -> SolrResult<Self> {
        let bucket = Self::parse(value, at)?;
        if bucket.val.is_none() {
            return Err(at.key("val").malformed("missing required key"));
        }
        Ok(bucket)
    }

    /// Named stat at this level.
    pub fn get_stat(&self, name: &str) -> Option<&Value> {
        match self.children.get(name) {
            Some(JsonFacetNode::Stat(value)) => Some(value),
            _ => None,
        }
    }

    /// Named stat at this level as a number.
    pub fn get_stat_f64(&self, name: &str) -> Option<f64> {
        self.get_stat(name).and_then(Value::as_f64)
    }

    /// Named nested facet at this level.
    pub fn get_facet(&self, name: &str) -> Option<&JsonFacetResult> {
        match self.children.get(name) {
            Some(JsonFacetNode::Facet(result)) => Some(result),
            _ => None,
        }
    }

    /// Rebuild the JSON this result was parsed from.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(val) = &self.val {
            map.insert("val".to_string(), val.clone());
        }
        if let Some(count) = self.count {
            map.insert("count".to_string(), Value::from(count));
        }
        if let Some(num_buckets) = self.num_buckets {
            map.insert("numBuckets".to_string(), Value::from(num_buckets));
        }
        if let Some(all) = &self.all_buckets {
            map.insert("allBuckets".to_string(), all.to_value());
        }
        if let Some(missing) = &self.missing {
            map.insert("missing".to_string(), missing.to_value());
        }
        if !self.buckets.is_empty() {
            map.insert(
                "buckets".to_string(),
                Value::Array(self.buckets.iter().map(Self::to_value).collect()),
            );
        }
        for (name, node) in &self.children {
            let value = match node {
                JsonFacetNode::Stat(v) => v.clone(),
                JsonFacetNode::Facet(f) => f.to_value(),
            };
            map.insert(name.clone(), value);
        }
        Value::Object(map)
    }
}
