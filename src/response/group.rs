use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SolrResult;
use crate::response::docs::DocsResponse;
use crate::response::path::{self, JsonPath};

/// Group key (`group.field` or `group.query`) to its result.
pub type GroupedResponse = IndexMap<String, GroupResult>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroupResult {
    Field(FieldGroupResult),
    Query(QueryGroupResult),
}

impl GroupResult {
    pub fn matches(&self) -> u64 {
        match self {
            GroupResult::Field(g) => g.matches,
            GroupResult::Query(g) => g.matches,
        }
    }

    pub fn as_field(&self) -> Option<&FieldGroupResult> {
        match self {
            GroupResult::Field(g) => Some(g),
            GroupResult::Query(_) => None,
        }
    }

    pub fn as_query(&self) -> Option<&QueryGroupResult> {
        match self {
            GroupResult::Query(g) => Some(g),
            GroupResult::Field(_) => None,
        }
    }

    fn parse(value: &Value, at: &JsonPath) -> SolrResult<Self> {
        let object = path::as_object(value, at)?;
        let (matches, matches_path) = path::required(object, "matches", at)?;
        let matches = path::as_u64(matches, &matches_path)?;

        if let Some((groups, groups_path)) = path::optional(object, "groups", at) {
            let n_groups = match path::optional(object, "ngroups", at) {
                Some((v, p)) => Some(path::as_u64(v, &p)?),
                None => None,
            };
            let groups = path::as_array(groups, &groups_path)?
                .iter()
                .enumerate()
                .map(|(i, g)| FieldGroupEntry::parse(g, &groups_path.index(i)))
                .collect::<SolrResult<Vec<_>>>()?;
            return Ok(GroupResult::Field(FieldGroupResult {
                matches,
                n_groups,
                groups,
            }));
        }

        match path::optional(object, "doclist", at) {
            Some((doc_list, p)) => Ok(GroupResult::Query(QueryGroupResult {
                matches,
                doc_list: DocsResponse::parse(doc_list, &p)?,
            })),
            None => Err(at.malformed("group has neither groups nor doclist")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGroupResult {
    pub matches: u64,
    /// Only present when the query asked for `group.ngroups=true`
    pub n_groups: Option<u64>,
    pub groups: Vec<FieldGroupEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGroupEntry {
    pub group_value: Value,
    pub doc_list: DocsResponse,
}

impl FieldGroupEntry {
    pub fn get_group_value<T: DeserializeOwned>(&self) -> SolrResult<T> {
        Ok(serde_json::from_value(self.group_value.clone())?)
    }

    fn parse(value: &Value, at: &JsonPath) -> SolrResult<Self> {
        let object = path::as_object(value, at)?;
        let (group_value, _) = path::required(object, "groupValue", at)?;
        let (doc_list, doc_list_path) = path::required(object, "doclist", at)?;
        Ok(Self {
            group_value: group_value.clone(),
            doc_list: DocsResponse::parse(doc_list, &doc_list_path)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryGroupResult {
    pub matches: u64,
    pub doc_list: DocsResponse,
}

pub(crate) fn parse_grouped(value: &Value, at: &JsonPath) -> SolrResult<GroupedResponse> {
    path::as_object(value, at)?
        .iter()
        .map(|(key, group)| Ok((key.clone(), GroupResult::parse(group, &at.key(key))?)))
        .collect()
}
