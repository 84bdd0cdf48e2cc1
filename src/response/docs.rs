use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SolrResult;
use crate::response::path::{self, JsonPath};

/// Documents matching a query, the `response` (or group `doclist`) object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocsResponse {
    pub num_found: u64,
    pub start: u64,
    pub num_found_exact: Option<bool>,
    pub max_score: Option<f64>,
    pub docs: Vec<Value>,
}

impl DocsResponse {
    pub(crate) fn parse(value: &Value, at: &JsonPath) -> SolrResult<Self> {
        let object = path::as_object(value, at)?;
        let (num_found, num_found_path) = path::required(object, "numFound", at)?;
        let (start, start_path) = path::required(object, "start", at)?;
        let (docs, docs_path) = path::required(object, "docs", at)?;
        let num_found_exact = match path::optional(object, "numFoundExact", at) {
            Some((v, p)) => Some(path::as_bool(v, &p)?),
            None => None,
        };
        let max_score = match path::optional(object, "maxScore", at) {
            Some((v, p)) => Some(path::as_f64(v, &p)?),
            None => None,
        };
        let docs = path::as_array(docs, &docs_path)?
            .iter()
            .enumerate()
            .map(|(i, doc)| path::as_object(doc, &docs_path.index(i)).map(|_| doc.clone()))
            .collect::<SolrResult<Vec<_>>>()?;

        Ok(Self {
            num_found: path::as_u64(num_found, &num_found_path)?,
            start: path::as_u64(start, &start_path)?,
            num_found_exact,
            max_score,
            docs,
        })
    }

    /// Deserialize every document into `T`.
    pub fn get_docs<T: DeserializeOwned>(&self) -> SolrResult<Vec<T>> {
        self.docs
            .iter()
            .map(|doc| Ok(serde_json::from_value(doc.clone())?))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
