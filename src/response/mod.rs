//! Response model
//!
//! Solr's JSON is walked by hand into typed structures. Insertion order of
//! every map is kept, and any missing required key or wrong type fails with
//! [`SolrError::MalformedResponse`](crate::SolrError::MalformedResponse)
//! naming the JSON path. Nothing is silently defaulted.

pub mod docs;
pub mod facet_set;
pub mod group;
pub mod json_facet;
pub(crate) mod path;
pub mod stats;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SolrResult;
use path::JsonPath;

pub use docs::DocsResponse;
pub use facet_set::{FacetSetResult, FieldFacetCount, PivotFacetResult};
pub use group::{FieldGroupEntry, FieldGroupResult, GroupResult, GroupedResponse, QueryGroupResult};
pub use json_facet::{JsonFacetNode, JsonFacetResult};
pub use stats::{FieldStats, StatsResult};

/// Top level keys that mark a body as a Solr response.
pub(crate) const SOLR_TOP_LEVEL_KEYS: [&str; 11] = [
    "responseHeader",
    "response",
    "grouped",
    "facet_counts",
    "facets",
    "stats",
    "nextCursorMark",
    "error",
    "configSets",
    "collections",
    "aliases",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub status: i64,
    pub q_time: u64,
    pub zk_connected: Option<bool>,
}

impl ResponseHeader {
    fn parse(value: &Value, at: &JsonPath) -> SolrResult<Self> {
        let object = path::as_object(value, at)?;
        let (status, status_path) = path::required(object, "status", at)?;
        let (q_time, q_time_path) = path::required(object, "QTime", at)?;
        let zk_connected = match path::optional(object, "zkConnected", at) {
            Some((v, p)) => Some(path::as_bool(v, &p)?),
            None => None,
        };
        Ok(Self {
            status: path::as_i64(status, &status_path)?,
            q_time: path::as_u64(q_time, &q_time_path)?,
            zk_connected,
        })
    }
}

/// Either plain documents or grouped documents, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultSet {
    Docs(DocsResponse),
    Grouped(GroupedResponse),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolrResponse {
    pub header: Option<ResponseHeader>,
    pub result: Option<ResultSet>,
    pub facet_set: Option<FacetSetResult>,
    pub json_facet: Option<JsonFacetResult>,
    pub stats: Option<StatsResult>,
    pub next_cursor_mark: Option<String>,
    pub aliases: Option<IndexMap<String, Vec<String>>>,
    pub config_sets: Option<Vec<String>>,
    pub collections: Option<Vec<String>>,
}

impl SolrResponse {
    /// Parse an already classified Solr body.
    pub fn from_value(value: &Value) -> SolrResult<Self> {
        let root = JsonPath::root();
        let object = path::as_object(value, &root)?;
        let mut response = SolrResponse::default();

        if let Some((v, p)) = path::optional(object, "responseHeader", &root) {
            response.header = Some(ResponseHeader::parse(v, &p)?);
        }

        let docs = path::optional(object, "response", &root);
        let grouped = path::optional(object, "grouped", &root);
        response.result = match (docs, grouped) {
            (Some(_), Some(_)) => {
                return Err(root.malformed("both response and grouped are present"))
            }
            (Some((v, p)), None) => Some(ResultSet::Docs(DocsResponse::parse(v, &p)?)),
            (None, Some((v, p))) => Some(ResultSet::Grouped(group::parse_grouped(v, &p)?)),
            (None, None) => None,
        };

        if let Some((v, p)) = path::optional(object, "facet_counts", &root) {
            response.facet_set = Some(FacetSetResult::parse(v, &p)?);
        }
        if let Some((v, p)) = path::optional(object, "facets", &root) {
            response.json_facet = Some(JsonFacetResult::parse(v, &p)?);
        }
        if let Some((v, p)) = path::optional(object, "stats", &root) {
            response.stats = Some(StatsResult::parse(v, &p)?);
        }
        if let Some((v, p)) = path::optional(object, "nextCursorMark", &root) {
            response.next_cursor_mark = Some(path::as_str(v, &p)?.to_string());
        }
        if let Some((v, p)) = path::optional(object, "aliases", &root) {
            response.aliases = Some(parse_aliases(v, &p)?);
        }
        if let Some((v, p)) = path::optional(object, "configSets", &root) {
            response.config_sets = Some(parse_string_list(v, &p)?);
        }
        if let Some((v, p)) = path::optional(object, "collections", &root) {
            response.collections = Some(parse_string_list(v, &p)?);
        }
        Ok(response)
    }

    pub fn get_docs_response(&self) -> Option<&DocsResponse> {
        match &self.result {
            Some(ResultSet::Docs(docs)) => Some(docs),
            _ => None,
        }
    }

    pub fn get_groups(&self) -> Option<&GroupedResponse> {
        match &self.result {
            Some(ResultSet::Grouped(groups)) => Some(groups),
            _ => None,
        }
    }

    pub fn get_facet_set(&self) -> Option<&FacetSetResult> {
        self.facet_set.as_ref()
    }

    pub fn get_json_facets(&self) -> Option<&JsonFacetResult> {
        self.json_facet.as_ref()
    }

    pub fn get_stats(&self) -> Option<&StatsResult> {
        self.stats.as_ref()
    }

    pub fn next_cursor_mark(&self) -> Option<&str> {
        self.next_cursor_mark.as_deref()
    }

    /// Whether cursor paging is done: Solr echoes the cursor it was sent
    /// once there is nothing left.
    pub fn is_last_page(&self, sent_cursor_mark: &str) -> bool {
        match &self.next_cursor_mark {
            Some(next) => next == sent_cursor_mark,
            None => true,
        }
    }
}

fn parse_string_list(value: &Value, at: &JsonPath) -> SolrResult<Vec<String>> {
    path::as_array(value, at)?
        .iter()
        .enumerate()
        .map(|(i, v)| Ok(path::as_str(v, &at.index(i))?.to_string()))
        .collect()
}

/// `{"alias": "c1,c2"}` into alias name to collections.
pub(crate) fn parse_aliases(value: &Value, at: &JsonPath) -> SolrResult<IndexMap<String, Vec<String>>> {
    path::as_object(value, at)?
        .iter()
        .map(|(alias, collections)| {
            let collections = path::as_str(collections, &at.key(alias))?
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect();
            Ok((alias.clone(), collections))
        })
        .collect()
}
