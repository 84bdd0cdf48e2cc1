//! AsyncSolrCloudClient: non-blocking API over the execution engine

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::engine::{self, SolrRequest};
use crate::error::{SolrError, SolrResult};
use crate::models::context::SolrServerContext;
use crate::queries::admin;
use crate::queries::{DeleteQuery, QueryRequest, SelectQuery, UpdateQuery};
use crate::response::SolrResponse;

fn missing(key: &str) -> SolrError {
    SolrError::malformed(key, "missing required key")
}

/// Async client for SolrCloud.
///
/// # Example
/// ```no_run
/// use solrcloud::{AsyncSolrCloudClient, SelectQuery, SolrServerContextBuilder, SolrSingleServerHost};
///
/// # async fn run() -> solrcloud::SolrResult<()> {
/// let context = SolrServerContextBuilder::new(SolrSingleServerHost::new("http://localhost:8983")).build()?;
/// let client = AsyncSolrCloudClient::new(context);
/// let response = client
///     .select(&SelectQuery::new().fq(["id:example_document"]), "example_collection")
///     .await?;
/// let docs = response.get_docs_response().map(|d| d.num_found);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AsyncSolrCloudClient {
    pub context: SolrServerContext,
}

impl AsyncSolrCloudClient {
    pub fn new(context: SolrServerContext) -> Self {
        Self { context }
    }

    async fn send(&self, request: SolrRequest) -> SolrResult<SolrResponse> {
        engine::execute(&self.context, &request).await
    }

    /// Run any query against `collection`.
    pub async fn execute(
        &self,
        collection: &str,
        query: impl Into<QueryRequest>,
    ) -> SolrResult<SolrResponse> {
        let request = query.into().to_request(collection)?;
        self.send(request).await
    }

    pub async fn select(&self, query: &SelectQuery, collection: &str) -> SolrResult<SolrResponse> {
        self.send(query.to_request(collection)?).await
    }

    /// Index `docs`; each must serialize to a JSON object.
    pub async fn index<T: Serialize>(
        &self,
        query: &UpdateQuery,
        collection: &str,
        docs: &[T],
    ) -> SolrResult<SolrResponse> {
        let batch = query.with_documents(docs)?;
        self.send(batch.to_request(collection)?).await
    }

    pub async fn delete(&self, query: &DeleteQuery, collection: &str) -> SolrResult<SolrResponse> {
        self.send(query.to_request(collection)?).await
    }

    /// Upload a config set from a directory (zipped in memory) or a zip file.
    pub async fn upload_config(&self, name: &str, path: impl AsRef<Path>) -> SolrResult<()> {
        let path = path.as_ref().to_path_buf();
        let archive = tokio::task::spawn_blocking(move || admin::read_config_archive(&path))
            .await
            .map_err(|e| SolrError::RuntimeError(format!("config archive task failed: {}", e)))??;
        info!(config = name, bytes = archive.len(), "uploading config set");
        self.send(admin::upload_config(name, archive)).await?;
        Ok(())
    }

    pub async fn get_configs(&self) -> SolrResult<Vec<String>> {
        self.send(admin::list_configs())
            .await?
            .config_sets
            .ok_or_else(|| missing("configSets"))
    }

    pub async fn config_exists(&self, name: &str) -> SolrResult<bool> {
        Ok(self.get_configs().await?.iter().any(|c| c == name))
    }

    pub async fn delete_config(&self, name: &str) -> SolrResult<()> {
        self.send(admin::delete_config(name)).await?;
        Ok(())
    }

    pub async fn create_collection(
        &self,
        name: &str,
        config: &str,
        shards: usize,
        replication_factor: usize,
    ) -> SolrResult<()> {
        info!(collection = name, config, shards, replication_factor, "creating collection");
        self.send(admin::create_collection(name, config, shards, replication_factor))
            .await?;
        Ok(())
    }

    pub async fn get_collections(&self) -> SolrResult<Vec<String>> {
        self.send(admin::list_collections())
            .await?
            .collections
            .ok_or_else(|| missing("collections"))
    }

    pub async fn collection_exists(&self, name: &str) -> SolrResult<bool> {
        Ok(self.get_collections().await?.iter().any(|c| c == name))
    }

    pub async fn delete_collection(&self, name: &str) -> SolrResult<()> {
        self.send(admin::delete_collection(name)).await?;
        Ok(())
    }

    pub async fn create_alias<S: AsRef<str>>(&self, name: &str, collections: &[S]) -> SolrResult<()> {
        let collections: Vec<String> = collections.iter().map(|c| c.as_ref().to_string()).collect();
        self.send(admin::create_alias(name, &collections)).await?;
        Ok(())
    }

    /// Alias name to the collections it points at.
    pub async fn get_aliases(&self) -> SolrResult<IndexMap<String, Vec<String>>> {
        self.send(admin::list_aliases())
            .await?
            .aliases
            .ok_or_else(|| missing("aliases"))
    }

    pub async fn alias_exists(&self, name: &str) -> SolrResult<bool> {
        Ok(self.get_aliases().await?.contains_key(name))
    }

    pub async fn delete_alias(&self, name: &str) -> SolrResult<()> {
        self.send(admin::delete_alias(name)).await?;
        Ok(())
    }
}
