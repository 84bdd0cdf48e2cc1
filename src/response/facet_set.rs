//! `facet_counts`: field facets, facet queries and pivots

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SolrResult;
use crate::response::path::{self, JsonPath};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetSetResult {
    pub queries: IndexMap<String, u64>,
    pub fields: IndexMap<String, Vec<FieldFacetCount>>,
    pub pivots: IndexMap<String, Vec<PivotFacetResult>>,
}

/// One `(value, count)` pair of a field facet. `value` is `null` for the
/// `facet.missing` bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFacetCount {
    pub value: Value,
    pub count: u64,
}

impl FieldFacetCount {
    pub fn key(&self) -> Option<&str> {
        self.value.as_str()
    }
}

/// A node of a pivot facet tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotFacetResult {
    pub field: String,
    pub value: Value,
    pub count: u64,
    pub pivots: Vec<PivotFacetResult>,
    pub queries: IndexMap<String, u64>,
}

impl PivotFacetResult {
    pub fn get_value<T: DeserializeOwned>(&self) -> SolrResult<T> {
        Ok(serde_json::from_value(self.value.clone())?)
    }

    /// Child pivot whose value renders as `value` (numbers compare by their JSON text).
    pub fn child_by_value(&self, value: &str) -> Option<&PivotFacetResult> {
        find_by_value(&self.pivots, value)
    }

    fn parse(value: &Value, at: &JsonPath) -> SolrResult<Self> {
        let object = path::as_object(value, at)?;
        let (field, field_path) = path::required(object, "field", at)?;
        let (node_value, _) = path::required(object, "value", at)?;
        let (count, count_path) = path::required(object, "count", at)?;
        let pivots = match path::optional(object, "pivot", at) {
            Some((v, p)) => parse_pivot_list(v, &p)?,
            None => Vec::new(),
        };
        let queries = match path::optional(object, "queries", at) {
            Some((v, p)) => parse_count_map(v, &p)?,
            None => IndexMap::new(),
        };
        Ok(Self {
            field: path::as_str(field, &field_path)?.to_string(),
            value: node_value.clone(),
            count: path::as_u64(count, &count_path)?,
            pivots,
            queries,
        })
    }
}

fn value_matches(value: &Value, wanted: &str) -> bool {
    match value {
        Value::String(s) => s == wanted,
        other => other.to_string() == wanted,
    }
}

fn find_by_value<'a>(nodes: &'a [PivotFacetResult], wanted: &str) -> Option<&'a PivotFacetResult> {
    nodes.iter().find(|node| value_matches(&node.value, wanted))
}

fn parse_pivot_list(value: &Value, at: &JsonPath) -> SolrResult<Vec<PivotFacetResult>> {
    path::as_array(value, at)?
        .iter()
        .enumerate()
        .map(|(i, node)| PivotFacetResult::parse(node, &at.index(i)))
        .collect()
}

fn parse_count_map(value: &Value, at: &JsonPath) -> SolrResult<IndexMap<String, u64>> {
    path::as_object(value, at)?
        .iter()
        .map(|(k, v)| Ok((k.clone(), path::as_u64(v, &at.key(k))?)))
        .collect()
}

/// Pair up Solr's flat `[v1, c1, v2, c2, ...]` list.
fn parse_field_counts(value: &Value, at: &JsonPath) -> SolrResult<Vec<FieldFacetCount>> {
    let flat = path::as_array(value, at)?;
    if flat.len() % 2 != 0 {
        return Err(at.malformed(format!(
            "expected alternating value/count pairs, found {} elements",
            flat.len()
        )));
    }
    flat.chunks(2)
        .enumerate()
        .map(|(pair, chunk)| {
            Ok(FieldFacetCount {
                value: chunk[0].clone(),
                count: path::as_u64(&chunk[1], &at.index(pair * 2 + 1))?,
            })
        })
        .collect()
}

impl FacetSetResult {
    pub(crate) fn parse(value: &Value, at: &JsonPath) -> SolrResult<Self> {
        let object = path::as_object(value, at)?;
        let queries = match path::optional(object, "facet_queries", at) {
            Some((v, p)) => parse_count_map(v, &p)?,
            None => IndexMap::new(),
        };
        let fields = match path::optional(object, "facet_fields", at) {
            Some((v, p)) => path::as_object(v, &p)?
                .iter()
                .map(|(name, counts)| Ok((name.clone(), parse_field_counts(counts, &p.key(name))?)))
                .collect::<SolrResult<IndexMap<_, _>>>()?,
            None => IndexMap::new(),
        };
        let pivots = match path::optional(object, "facet_pivot", at) {
            Some((v, p)) => path::as_object(v, &p)?
                .iter()
                .map(|(name, tree)| Ok((name.clone(), parse_pivot_list(tree, &p.key(name))?)))
                .collect::<SolrResult<IndexMap<_, _>>>()?,
            None => IndexMap::new(),
        };
        Ok(Self {
            queries,
            fields,
            pivots,
        })
    }

    pub fn get_field(&self, field: &str) -> Option<&[FieldFacetCount]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn get_query(&self, query: &str) -> Option<u64> {
        self.queries.get(query).copied()
    }

    /// Top level nodes of a pivot, keyed as requested (e.g. `interests,age`).
    pub fn get_pivot(&self, pivot: &str) -> Option<&[PivotFacetResult]> {
        self.pivots.get(pivot).map(Vec::as_slice)
    }

    pub fn pivot_by_value(&self, pivot: &str, value: &str) -> Option<&PivotFacetResult> {
        self.pivots.get(pivot).and_then(|nodes| find_by_value(nodes, value))
    }
}
