//! JSON Facet API component, sent as a single `json.facet` parameter

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::error::SolrResult;
use crate::queries::params::ParamList;

/// Named facets at one level of a JSON facet request. Names are unique per level.
pub type JsonFacetMap = IndexMap<String, JsonFacetType>;

/// Top level `json.facet` request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonFacetComponent {
    pub facets: JsonFacetMap,
}

impl JsonFacetComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named facet. A later facet with the same name replaces the earlier one.
    pub fn facet(mut self, name: impl Into<String>, facet: impl Into<JsonFacetType>) -> Self {
        self.facets.insert(name.into(), facet.into());
        self
    }

    pub fn facets<K, V, I>(mut self, facets: I) -> Self
    where
        K: Into<String>,
        V: Into<JsonFacetType>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.facets = facets
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn to_value(&self) -> Value {
        facets_to_value(&self.facets)
    }

    pub(crate) fn append_params(&self, params: &mut ParamList) -> SolrResult<()> {
        params.push("json.facet", serde_json::to_string(&self.to_value())?);
        Ok(())
    }
}

/// A single JSON facet request node.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonFacetType {
    Terms(Box<JsonTermsFacet>),
    Query(Box<JsonQueryFacet>),
    /// Aggregation function such as `sum(count)` or `avg(age)`
    Stat(String),
}

impl JsonFacetType {
    pub fn to_value(&self) -> Value {
        match self {
            JsonFacetType::Terms(terms) => terms.to_value(),
            JsonFacetType::Query(query) => query.to_value(),
            JsonFacetType::Stat(stat) => Value::String(stat.clone()),
        }
    }
}

fn facets_to_value(facets: &JsonFacetMap) -> Value {
    Value::Object(
        facets
            .iter()
            .map(|(name, facet)| (name.clone(), facet.to_value()))
            .collect(),
    )
}

fn insert_opt<T: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonTermsFacet {
    pub field: String,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub sort: Option<String>,
    pub min_count: Option<usize>,
    pub num_buckets: Option<bool>,
    pub all_buckets: Option<bool>,
    pub missing: Option<bool>,
    pub facets: JsonFacetMap,
}

impl JsonTermsFacet {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            offset: None,
            limit: None,
            sort: None,
            min_count: None,
            num_buckets: None,
            all_buckets: None,
            missing: None,
            facets: JsonFacetMap::new(),
        }
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn min_count(mut self, min_count: usize) -> Self {
        self.min_count = Some(min_count);
        self
    }

    pub fn num_buckets(mut self, num_buckets: bool) -> Self {
        self.num_buckets = Some(num_buckets);
        self
    }

    pub fn all_buckets(mut self, all_buckets: bool) -> Self {
        self.all_buckets = Some(all_buckets);
        self
    }

    pub fn missing(mut self, missing: bool) -> Self {
        self.missing = Some(missing);
        self
    }

    pub fn facet(mut self, name: impl Into<String>, facet: impl Into<JsonFacetType>) -> Self {
        self.facets.insert(name.into(), facet.into());
        self
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), json!("terms"));
        map.insert("field".to_string(), json!(self.field));
        insert_opt(&mut map, "offset", self.offset);
        insert_opt(&mut map, "limit", self.limit);
        insert_opt(&mut map, "sort", self.sort.clone());
        insert_opt(&mut map, "mincount", self.min_count);
        insert_opt(&mut map, "numBuckets", self.num_buckets);
        insert_opt(&mut map, "allBuckets", self.all_buckets);
        insert_opt(&mut map, "missing", self.missing);
        if !self.facets.is_empty() {
            map.insert("facet".to_string(), facets_to_value(&self.facets));
        }
        Value::Object(map)
    }
}

impl From<JsonTermsFacet> for JsonFacetType {
    fn from(facet: JsonTermsFacet) -> Self {
        JsonFacetType::Terms(Box::new(facet))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonQueryFacet {
    pub q: String,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort: Option<String>,
    pub fq: Vec<String>,
    pub facets: JsonFacetMap,
}

impl JsonQueryFacet {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            limit: None,
            offset: None,
            sort: None,
            fq: Vec::new(),
            facets: JsonFacetMap::new(),
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn fq<S: Into<String>, I: IntoIterator<Item = S>>(mut self, fq: I) -> Self {
        self.fq = fq.into_iter().map(Into::into).collect();
        self
    }

    pub fn facet(mut self, name: impl Into<String>, facet: impl Into<JsonFacetType>) -> Self {
        self.facets.insert(name.into(), facet.into());
        self
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), json!("query"));
        map.insert("q".to_string(), json!(self.q));
        insert_opt(&mut map, "limit", self.limit);
        insert_opt(&mut map, "offset", self.offset);
        insert_opt(&mut map, "sort", self.sort.clone());
        if !self.fq.is_empty() {
            map.insert("fq".to_string(), json!(self.fq));
        }
        if !self.facets.is_empty() {
            map.insert("facet".to_string(), facets_to_value(&self.facets));
        }
        Value::Object(map)
    }
}

impl From<JsonQueryFacet> for JsonFacetType {
    fn from(facet: JsonQueryFacet) -> Self {
        JsonFacetType::Query(Box::new(facet))
    }
}

/// Aggregation function, e.g. `JsonStatFacet::new("sum(count)")`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonStatFacet(pub String);

impl JsonStatFacet {
    pub fn new(stat: impl Into<String>) -> Self {
        Self(stat.into())
    }
}

impl From<JsonStatFacet> for JsonFacetType {
    fn from(facet: JsonStatFacet) -> Self {
        JsonFacetType::Stat(facet.0)
    }
}
