//! Select queries against `/solr/<collection>/<handler>`

use serde_json::Value;

use crate::engine::SolrRequest;
use crate::error::SolrResult;
use crate::queries::components::{
    FacetSetComponent, GroupingComponent, JsonFacetComponent, StatsComponent,
};
use crate::queries::def_type::DefType;
use crate::queries::params::ParamList;

/// Cursor value that starts deep paging.
pub const CURSOR_MARK_START: &str = "*";

/// Builder for a select request.
///
/// Defaults to `q=*:*`, `rows=10`, `start=0` on the `select` handler.
///
/// # Example
/// ```
/// use solrcloud::{SelectQuery, JsonFacetComponent, JsonQueryFacet, JsonStatFacet};
///
/// let query = SelectQuery::new()
///     .fq(["age:[0 TO 59]"])
///     .rows(0)
///     .json_facet(JsonFacetComponent::new().facet(
///         "below_60",
///         JsonQueryFacet::new("age:[0 TO 59]").facet("total", JsonStatFacet::new("sum(count)")),
///     ));
/// assert_eq!(query.rows, 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub q: String,
    pub fq: Vec<String>,
    pub fl: Vec<String>,
    pub sort: Vec<String>,
    pub handle: String,
    pub rows: usize,
    pub start: usize,
    pub cursor_mark: Option<String>,
    pub def_type: Option<DefType>,
    pub facet_set: Option<FacetSetComponent>,
    pub json_facet: Option<JsonFacetComponent>,
    pub grouping: Option<GroupingComponent>,
    pub stats: Option<StatsComponent>,
    pub additional_params: ParamList,
}

impl Default for SelectQuery {
    fn default() -> Self {
        Self {
            q: "*:*".to_string(),
            fq: Vec::new(),
            fl: Vec::new(),
            sort: Vec::new(),
            handle: "select".to_string(),
            rows: 10,
            start: 0,
            cursor_mark: None,
            def_type: None,
            facet_set: None,
            json_facet: None,
            grouping: None,
            stats: None,
            additional_params: ParamList::new(),
        }
    }
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn q(mut self, q: impl Into<String>) -> Self {
        self.q = q.into();
        self
    }

    pub fn fq<S: Into<String>, I: IntoIterator<Item = S>>(mut self, fq: I) -> Self {
        self.fq = fq.into_iter().map(Into::into).collect();
        self
    }

    pub fn fl<S: Into<String>, I: IntoIterator<Item = S>>(mut self, fl: I) -> Self {
        self.fl = fl.into_iter().map(Into::into).collect();
        self
    }

    pub fn sort<S: Into<String>, I: IntoIterator<Item = S>>(mut self, sort: I) -> Self {
        self.sort = sort.into_iter().map(Into::into).collect();
        self
    }

    /// Request handler, `select` unless overridden.
    pub fn handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = handle.into();
        self
    }

    pub fn rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// Page with a cursor instead of `start`. Use [`CURSOR_MARK_START`] for the first page.
    /// Solr requires a `sort` that includes the unique key when paging this way.
    pub fn cursor_mark(mut self, cursor_mark: impl Into<String>) -> Self {
        self.cursor_mark = Some(cursor_mark.into());
        self
    }

    pub fn def_type(mut self, def_type: impl Into<DefType>) -> Self {
        self.def_type = Some(def_type.into());
        self
    }

    pub fn facet_set(mut self, facet_set: FacetSetComponent) -> Self {
        self.facet_set = Some(facet_set);
        self
    }

    pub fn json_facet(mut self, json_facet: JsonFacetComponent) -> Self {
        self.json_facet = Some(json_facet);
        self
    }

    pub fn grouping(mut self, grouping: GroupingComponent) -> Self {
        self.grouping = Some(grouping);
        self
    }

    pub fn stats(mut self, stats: StatsComponent) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Extra raw parameters. Repeated keys are sent repeatedly, in order.
    pub fn additional_params<K, V, I>(mut self, params: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.additional_params = params.into_iter().collect();
        self
    }

    /// Serialize into query-string parameters, in a stable order.
    pub fn to_params(&self) -> SolrResult<ParamList> {
        let mut params = ParamList::new();
        params.push("q", self.q.as_str());
        for fq in &self.fq {
            params.push("fq", fq.as_str());
        }
        if !self.fl.is_empty() {
            params.push("fl", self.fl.join(","));
        }
        if !self.sort.is_empty() {
            params.push("sort", self.sort.join(","));
        }
        params.push("rows", self.rows.to_string());
        match &self.cursor_mark {
            Some(cursor) => params.push("cursorMark", cursor.as_str()),
            None => params.push("start", self.start.to_string()),
        }
        if let Some(def_type) = &self.def_type {
            def_type.append_params(&mut params);
        }
        if let Some(facet_set) = &self.facet_set {
            facet_set.append_params(&mut params);
        }
        if let Some(json_facet) = &self.json_facet {
            json_facet.append_params(&mut params)?;
        }
        if let Some(grouping) = &self.grouping {
            grouping.append_params(&mut params);
        }
        if let Some(stats) = &self.stats {
            stats.append_params(&mut params);
        }
        params.extend(self.additional_params.clone());
        Ok(params)
    }

    pub(crate) fn to_request(&self, collection: &str) -> SolrResult<SolrRequest> {
        Ok(SolrRequest::get(
            format!("/solr/{}/{}", collection, self.handle),
            self.to_params()?,
        ))
    }
}

/// Parameters of a select as they would appear in a `{"params": {...}}` JSON request.
/// Repeated keys become arrays.
pub fn params_to_json(params: &ParamList) -> Value {
    let mut map = serde_json::Map::new();
    for (key, value) in params.iter() {
        match map.get_mut(key) {
            Some(Value::Array(values)) => values.push(Value::String(value.to_string())),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value.to_string())]);
            }
            None => {
                map.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
    }
    Value::Object(map)
}
