//! Query model: builders that serialize into Solr request parameters and bodies

pub mod admin;
pub mod components;
pub mod def_type;
pub mod index;
pub mod params;
pub mod select;

use crate::engine::SolrRequest;
use crate::error::SolrResult;

pub use def_type::{DefType, DismaxQuery, EdismaxQuery, LuceneQuery, QueryOperator};
pub use index::{CommitType, DeleteQuery, UpdateBatch, UpdateQuery};
pub use params::ParamList;
pub use select::{SelectQuery, CURSOR_MARK_START};

/// Any request that targets a single collection.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryRequest {
    Select(SelectQuery),
    Update(UpdateBatch),
    Delete(DeleteQuery),
}

impl QueryRequest {
    pub(crate) fn to_request(&self, collection: &str) -> SolrResult<SolrRequest> {
        match self {
            QueryRequest::Select(q) => q.to_request(collection),
            QueryRequest::Update(batch) => batch.to_request(collection),
            QueryRequest::Delete(q) => q.to_request(collection),
        }
    }
}

impl From<SelectQuery> for QueryRequest {
    fn from(query: SelectQuery) -> Self {
        QueryRequest::Select(query)
    }
}

impl From<UpdateBatch> for QueryRequest {
    fn from(batch: UpdateBatch) -> Self {
        QueryRequest::Update(batch)
    }
}

impl From<DeleteQuery> for QueryRequest {
    fn from(query: DeleteQuery) -> Self {
        QueryRequest::Delete(query)
    }
}
