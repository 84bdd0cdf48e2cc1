//! Update and delete requests against the update handler

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::engine::SolrRequest;
use crate::error::{SolrError, SolrResult};
use crate::queries::params::ParamList;

/// How the update is committed once Solr has applied it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    /// Flush to stable storage and open a new searcher
    #[default]
    Hard,
    /// Make the change visible without a durable flush
    Soft,
    /// Leave it to the server's autocommit policy
    None,
}

impl CommitType {
    fn append_params(&self, params: &mut ParamList) {
        match self {
            CommitType::Hard => params.push("commit", "true"),
            CommitType::Soft => params.push("softCommit", "true"),
            CommitType::None => {}
        }
    }
}

/// Indexing request. The documents are given to [`UpdateQuery::with_documents`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuery {
    pub handler: String,
    pub commit_type: CommitType,
}

impl Default for UpdateQuery {
    fn default() -> Self {
        Self {
            handler: "update".to_string(),
            commit_type: CommitType::Hard,
        }
    }
}

impl UpdateQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = handler.into();
        self
    }

    pub fn commit_type(mut self, commit_type: CommitType) -> Self {
        self.commit_type = commit_type;
        self
    }

    /// Attach a batch of documents. Every document must serialize to a JSON object.
    pub fn with_documents<T: Serialize>(&self, documents: &[T]) -> SolrResult<UpdateBatch> {
        let documents = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| match serde_json::to_value(doc)? {
                Value::Object(fields) => Ok(fields),
                other => Err(SolrError::ConfigError(format!(
                    "document {} is not a JSON object: {}",
                    i, other
                ))),
            })
            .collect::<SolrResult<Vec<_>>>()?;
        Ok(UpdateBatch {
            query: self.clone(),
            documents,
        })
    }
}

/// Field maps ready to be posted, with the update settings they go out with.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBatch {
    pub query: UpdateQuery,
    pub documents: Vec<serde_json::Map<String, Value>>,
}

impl UpdateBatch {
    pub(crate) fn to_request(&self, collection: &str) -> SolrResult<SolrRequest> {
        let mut params = ParamList::new();
        params.push("overwrite", "true");
        self.query.commit_type.append_params(&mut params);
        let body = Bytes::from(serde_json::to_vec(&self.documents)?);
        Ok(SolrRequest::post_json(
            format!("/solr/{}/{}", collection, self.query.handler),
            params,
            body,
        ))
    }
}

/// Delete by id and/or by query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteQuery {
    pub handler: String,
    pub commit_type: CommitType,
    pub ids: Vec<String>,
    pub queries: Vec<String>,
}

impl Default for DeleteQuery {
    fn default() -> Self {
        Self {
            handler: "update".to_string(),
            commit_type: CommitType::Hard,
            ids: Vec::new(),
            queries: Vec::new(),
        }
    }
}

impl DeleteQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = handler.into();
        self
    }

    pub fn commit_type(mut self, commit_type: CommitType) -> Self {
        self.commit_type = commit_type;
        self
    }

    pub fn ids<S: Into<String>, I: IntoIterator<Item = S>>(mut self, ids: I) -> Self {
        self.ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn queries<S: Into<String>, I: IntoIterator<Item = S>>(mut self, queries: I) -> Self {
        self.queries = queries.into_iter().map(Into::into).collect();
        self
    }

    /// `{"delete": ["id1", ..., {"query": "q"}, ...]}`
    pub fn to_body(&self) -> Value {
        let mut targets: Vec<Value> = self.ids.iter().map(|id| json!(id)).collect();
        targets.extend(self.queries.iter().map(|q| json!({ "query": q })));
        json!({ "delete": targets })
    }

    pub(crate) fn to_request(&self, collection: &str) -> SolrResult<SolrRequest> {
        if self.ids.is_empty() && self.queries.is_empty() {
            return Err(SolrError::ConfigError(
                "delete needs at least one id or query".to_string(),
            ));
        }
        let mut params = ParamList::new();
        self.commit_type.append_params(&mut params);
        let body = Bytes::from(serde_json::to_vec(&self.to_body())?);
        Ok(SolrRequest::post_json(
            format!("/solr/{}/{}", collection, self.handler),
            params,
            body,
        ))
    }
}
