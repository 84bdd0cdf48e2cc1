//! Classic facet component: `facet.query`, `facet.field` and `facet.pivot`

use serde::{Deserialize, Serialize};

use crate::queries::params::ParamList;

/// Facet set attached to a select query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetSetComponent {
    pub queries: Vec<String>,
    pub fields: Option<FieldFacetComponent>,
    pub pivots: Option<PivotFacetComponent>,
}

impl FacetSetComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queries<S: Into<String>, I: IntoIterator<Item = S>>(mut self, queries: I) -> Self {
        self.queries = queries.into_iter().map(Into::into).collect();
        self
    }

    pub fn fields(mut self, fields: FieldFacetComponent) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn pivots(mut self, pivots: PivotFacetComponent) -> Self {
        self.pivots = Some(pivots);
        self
    }

    pub(crate) fn append_params(&self, params: &mut ParamList) {
        params.push("facet", "true");
        for query in &self.queries {
            params.push("facet.query", query.as_str());
        }
        if let Some(fields) = &self.fields {
            fields.append_params(params);
        }
        if let Some(pivots) = &self.pivots {
            pivots.append_params(params);
        }
    }
}

/// `facet.pivot` entries, each a comma separated field chain like `interests,age`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotFacetComponent {
    pub pivots: Vec<String>,
    pub min_count: Option<usize>,
}

impl PivotFacetComponent {
    pub fn new<S: Into<String>, I: IntoIterator<Item = S>>(pivots: I) -> Self {
        Self {
            pivots: pivots.into_iter().map(Into::into).collect(),
            min_count: None,
        }
    }

    pub fn min_count(mut self, min_count: usize) -> Self {
        self.min_count = Some(min_count);
        self
    }

    fn append_params(&self, params: &mut ParamList) {
        for pivot in &self.pivots {
            params.push("facet.pivot", pivot.as_str());
        }
        params.push_opt("facet.pivot.mincount", self.min_count);
    }
}

/// Field facets with optional per-field overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFacetComponent {
    pub fields: Vec<FieldFacetEntry>,
    pub exclude_terms: Option<String>,
}

impl FieldFacetComponent {
    pub fn new<T: Into<FieldFacetEntry>, I: IntoIterator<Item = T>>(fields: I) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            exclude_terms: None,
        }
    }

    pub fn exclude_terms(mut self, exclude_terms: impl Into<String>) -> Self {
        self.exclude_terms = Some(exclude_terms.into());
        self
    }

    fn append_params(&self, params: &mut ParamList) {
        for entry in &self.fields {
            params.push("facet.field", entry.field.as_str());
        }
        for entry in &self.fields {
            entry.append_params(params);
        }
        params.push_opt("facet.excludeTerms", self.exclude_terms.as_deref());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldFacetSort {
    Count,
    Index,
}

impl FieldFacetSort {
    fn as_str(&self) -> &'static str {
        match self {
            FieldFacetSort::Count => "count",
            FieldFacetSort::Index => "index",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldFacetMethod {
    Enum,
    Fc,
    Fcs,
}

impl FieldFacetMethod {
    fn as_str(&self) -> &'static str {
        match self {
            FieldFacetMethod::Enum => "enum",
            FieldFacetMethod::Fc => "fc",
            FieldFacetMethod::Fcs => "fcs",
        }
    }
}

/// One faceted field. Options are sent as `f.<field>.facet.<option>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFacetEntry {
    pub field: String,
    pub prefix: Option<String>,
    pub contains: Option<String>,
    pub contains_ignore_case: Option<bool>,
    pub sort: Option<FieldFacetSort>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub min_count: Option<usize>,
    pub missing: Option<bool>,
    pub method: Option<FieldFacetMethod>,
    pub enum_cache_min_df: Option<usize>,
    pub exists: Option<bool>,
}

impl FieldFacetEntry {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            prefix: None,
            contains: None,
            contains_ignore_case: None,
            sort: None,
            limit: None,
            offset: None,
            min_count: None,
            missing: None,
            method: None,
            enum_cache_min_df: None,
            exists: None,
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn contains(mut self, contains: impl Into<String>) -> Self {
        self.contains = Some(contains.into());
        self
    }

    pub fn contains_ignore_case(mut self, ignore_case: bool) -> Self {
        self.contains_ignore_case = Some(ignore_case);
        self
    }

    pub fn sort(mut self, sort: FieldFacetSort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn min_count(mut self, min_count: usize) -> Self {
        self.min_count = Some(min_count);
        self
    }

    pub fn missing(mut self, missing: bool) -> Self {
        self.missing = Some(missing);
        self
    }

    pub fn method(mut self, method: FieldFacetMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn enum_cache_min_df(mut self, min_df: usize) -> Self {
        self.enum_cache_min_df = Some(min_df);
        self
    }

    pub fn exists(mut self, exists: bool) -> Self {
        self.exists = Some(exists);
        self
    }

    fn append_params(&self, params: &mut ParamList) {
        let key = |option: &str| format!("f.{}.facet.{}", self.field, option);
        params.push_opt(key("prefix"), self.prefix.as_deref());
        params.push_opt(key("contains"), self.contains.as_deref());
        params.push_opt(key("contains.ignoreCase"), self.contains_ignore_case);
        params.push_opt(key("sort"), self.sort.map(|s| s.as_str()));
        params.push_opt(key("limit"), self.limit);
        params.push_opt(key("offset"), self.offset);
        params.push_opt(key("mincount"), self.min_count);
        params.push_opt(key("missing"), self.missing);
        params.push_opt(key("method"), self.method.map(|m| m.as_str()));
        params.push_opt(key("enum.cache.minDf"), self.enum_cache_min_df);
        params.push_opt(key("exists"), self.exists);
    }
}

impl From<&str> for FieldFacetEntry {
    fn from(field: &str) -> Self {
        FieldFacetEntry::new(field)
    }
}

impl From<String> for FieldFacetEntry {
    fn from(field: String) -> Self {
        FieldFacetEntry::new(field)
    }
}
