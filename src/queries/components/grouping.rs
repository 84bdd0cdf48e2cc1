//! Result grouping (`group=true`)

use serde::{Deserialize, Serialize};

use crate::queries::params::ParamList;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupFormatting {
    Grouped,
    Simple,
}

impl GroupFormatting {
    fn as_str(&self) -> &'static str {
        match self {
            GroupFormatting::Grouped => "grouped",
            GroupFormatting::Simple => "simple",
        }
    }
}

/// Grouping by field values (`group.field`) and/or by queries (`group.query`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupingComponent {
    pub fields: Vec<String>,
    pub queries: Vec<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort: Vec<String>,
    pub format: Option<GroupFormatting>,
    pub main: Option<bool>,
    pub n_groups: Option<bool>,
    pub truncate: Option<bool>,
    pub facet: Option<bool>,
}

impl GroupingComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields<S: Into<String>, I: IntoIterator<Item = S>>(mut self, fields: I) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn queries<S: Into<String>, I: IntoIterator<Item = S>>(mut self, queries: I) -> Self {
        self.queries = queries.into_iter().map(Into::into).collect();
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

    pub fn sort<S: Into<String>, I: IntoIterator<Item = S>>(mut self, sort: I) -> Self {
        self.sort = sort.into_iter().map(Into::into).collect();
        self
    }

    pub fn format(mut self, format: GroupFormatting) -> Self {
        self.format = Some(format);
        self
    }

    pub fn main(mut self, main: bool) -> Self {
        self.main = Some(main);
        self
    }

    pub fn n_groups(mut self, n_groups: bool) -> Self {
        self.n_groups = Some(n_groups);
        self
    }

    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = Some(truncate);
        self
    }

    pub fn facet(mut self, facet: bool) -> Self {
        self.facet = Some(facet);
        self
    }

    pub(crate) fn append_params(&self, params: &mut ParamList) {
        params.push("group", "true");
        for field in &self.fields {
            params.push("group.field", field.as_str());
        }
        for query in &self.queries {
            params.push("group.query", query.as_str());
        }
        params.push_opt("group.limit", self.limit);
        params.push_opt("group.offset", self.offset);
        if !self.sort.is_empty() {
            params.push("group.sort", self.sort.join(","));
        }
        params.push_opt("group.format", self.format.map(|f| f.as_str()));
        params.push_opt("group.main", self.main);
        params.push_opt("group.ngroups", self.n_groups);
        params.push_opt("group.truncate", self.truncate);
        params.push_opt("group.facet", self.facet);
    }
}
