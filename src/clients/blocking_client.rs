//! BlockingSolrCloudClient: synchronous façade over the async client
//!
//! Every call hands an owned future to the shared blocking runtime, so the
//! request logic lives in exactly one place.

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use super::async_client::AsyncSolrCloudClient;
use super::runtime::run_blocking;
use crate::error::SolrResult;
use crate::models::context::SolrServerContext;
use crate::queries::{DeleteQuery, QueryRequest, SelectQuery, UpdateQuery};
use crate::response::SolrResponse;

/// Blocking client for SolrCloud. Safe to share between threads; concurrent
/// calls do not serialize behind each other.
#[derive(Debug, Clone)]
pub struct BlockingSolrCloudClient {
    pub context: SolrServerContext,
}

impl BlockingSolrCloudClient {
    pub fn new(context: SolrServerContext) -> Self {
        Self { context }
    }

    fn inner(&self) -> AsyncSolrCloudClient {
        AsyncSolrCloudClient::new(self.context.clone())
    }

    pub fn execute(&self, collection: &str, query: impl Into<QueryRequest>) -> SolrResult<SolrResponse> {
        let client = self.inner();
        let collection = collection.to_string();
        let query = query.into();
        run_blocking(async move { client.execute(&collection, query).await })
    }

    pub fn select(&self, query: &SelectQuery, collection: &str) -> SolrResult<SolrResponse> {
        self.execute(collection, query.clone())
    }

    pub fn index<T: Serialize>(
        &self,
        query: &UpdateQuery,
        collection: &str,
        docs: &[T],
    ) -> SolrResult<SolrResponse> {
        let batch = query.with_documents(docs)?;
        self.execute(collection, batch)
    }

    pub fn delete(&self, query: &DeleteQuery, collection: &str) -> SolrResult<SolrResponse> {
        self.execute(collection, query.clone())
    }

    pub fn upload_config(&self, name: &str, path: impl AsRef<Path>) -> SolrResult<()> {
        let client = self.inner();
        let name = name.to_string();
        let path = path.as_ref().to_path_buf();
        run_blocking(async move { client.upload_config(&name, path).await })
    }

    pub fn get_configs(&self) -> SolrResult<Vec<String>> {
        let client = self.inner();
        run_blocking(async move { client.get_configs().await })
    }

    pub fn config_exists(&self, name: &str) -> SolrResult<bool> {
        Ok(self.get_configs()?.iter().any(|c| c == name))
    }

    pub fn delete_config(&self, name: &str) -> SolrResult<()> {
        let client = self.inner();
        let name = name.to_string();
        run_blocking(async move { client.delete_config(&name).await })
    }

    pub fn create_collection(
        &self,
        name: &str,
        config: &str,
        shards: usize,
        replication_factor: usize,
    ) -> SolrResult<()> {
        let client = self.inner();
        let name = name.to_string();
        let config = config.to_string();
        run_blocking(async move {
            client
                .create_collection(&name, &config, shards, replication_factor)
                .await
        })
    }

    pub fn get_collections(&self) -> SolrResult<Vec<String>> {
        let client = self.inner();
        run_blocking(async move { client.get_collections().await })
    }

    pub fn collection_exists(&self, name: &str) -> SolrResult<bool> {
        Ok(self.get_collections()?.iter().any(|c| c == name))
    }

    pub fn delete_collection(&self, name: &str) -> SolrResult<()> {
        let client = self.inner();
        let name = name.to_string();
        run_blocking(async move { client.delete_collection(&name).await })
    }

    pub fn create_alias<S: AsRef<str>>(&self, name: &str, collections: &[S]) -> SolrResult<()> {
        let client = self.inner();
        let name = name.to_string();
        let collections: Vec<String> = collections.iter().map(|c| c.as_ref().to_string()).collect();
        run_blocking(async move { client.create_alias(&name, &collections).await })
    }

    pub fn get_aliases(&self) -> SolrResult<IndexMap<String, Vec<String>>> {
        let client = self.inner();
        run_blocking(async move { client.get_aliases().await })
    }

    pub fn alias_exists(&self, name: &str) -> SolrResult<bool> {
        Ok(self.get_aliases()?.contains_key(name))
    }

    pub fn delete_alias(&self, name: &str) -> SolrResult<()> {
        let client = self.inner();
        let name = name.to_string();
        run_blocking(async move { client.delete_alias(&name).await })
    }
}

impl From<AsyncSolrCloudClient> for BlockingSolrCloudClient {
    fn from(client: AsyncSolrCloudClient) -> Self {
        Self::new(client.context)
    }
}
