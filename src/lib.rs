//! SolrCloud client
//!
//! Async and blocking clients for Apache Solr running in SolrCloud mode.
//!
//! # Architecture
//!
//! - `hosts`: where a request may go (one node, a fixed list, or the live
//!   nodes a ZooKeeper ensemble reports)
//! - `queries`: select/update/delete builders plus facet, JSON facet,
//!   grouping and stats components
//! - `engine`: the single async request path with cross-host retry, the
//!   error classifier and per-attempt logging
//! - `response`: typed views over Solr's JSON
//! - `clients`: `AsyncSolrCloudClient` and its blocking twin
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use solrcloud::{
//!     AsyncSolrCloudClient, JsonFacetComponent, JsonQueryFacet, JsonStatFacet, LoggingPolicy,
//!     SelectQuery, SolrAuth, SolrServerContextBuilder, ZookeeperEnsembleConnector,
//! };
//! use std::time::Duration;
//!
//! # async fn run() -> solrcloud::SolrResult<()> {
//! let host = ZookeeperEnsembleConnector::new(["localhost:2181"], Duration::from_secs(15))
//!     .connect()
//!     .await?;
//! let context = SolrServerContextBuilder::new(host)
//!     .with_auth(SolrAuth::basic("solr", "SolrRocks"))
//!     .with_logging_policy(LoggingPolicy::Minimal)
//!     .build()?;
//! let client = AsyncSolrCloudClient::new(context);
//!
//! let query = SelectQuery::new().rows(0).json_facet(
//!     JsonFacetComponent::new().facet(
//!         "below_60",
//!         JsonQueryFacet::new("age:[0 TO 59]").facet("total_people", JsonStatFacet::new("sum(count)")),
//!     ),
//! );
//! let response = client.select(&query, "population").await?;
//! let total = response
//!     .get_json_facets()
//!     .and_then(|f| f.get_facet("below_60"))
//!     .and_then(|f| f.get_stat_f64("total_people"));
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod clients;
pub mod engine;
pub mod error;
pub mod hosts;
pub mod models;
pub mod queries;
pub mod response;

// ============================================================================
// Errors
// ============================================================================

pub use error::{HostAttempt, SolrError, SolrResult};

// ============================================================================
// Hosts and context
// ============================================================================

pub use hosts::{
    SolrHost, SolrMultipleServerHost, SolrSingleServerHost, ZookeeperEnsembleConnector,
    ZookeeperEnsembleHost,
};
pub use models::{ClientConfig, HostConfig, SolrAuth, SolrServerContext, SolrServerContextBuilder};

// ============================================================================
// Execution
// ============================================================================

pub use clients::{AsyncSolrCloudClient, BlockingSolrCloudClient};
pub use engine::logging::LoggingPolicy;
pub use engine::{execute, RequestBody, SolrRequest};

// ============================================================================
// Queries
// ============================================================================

pub use queries::components::{
    FacetSetComponent, FieldFacetComponent, FieldFacetEntry, FieldFacetMethod, FieldFacetSort,
    GroupFormatting, GroupingComponent, JsonFacetComponent, JsonFacetType, JsonQueryFacet,
    JsonStatFacet, JsonTermsFacet, PivotFacetComponent, StatsComponent,
};
pub use queries::{
    CommitType, DefType, DeleteQuery, DismaxQuery, EdismaxQuery, LuceneQuery, ParamList,
    QueryOperator, QueryRequest, SelectQuery, UpdateBatch, UpdateQuery, CURSOR_MARK_START,
};

// ============================================================================
// Responses
// ============================================================================

pub use response::{
    DocsResponse, FacetSetResult, FieldFacetCount, FieldGroupEntry, FieldGroupResult, FieldStats,
    GroupResult, GroupedResponse, JsonFacetNode, JsonFacetResult, PivotFacetResult,
    QueryGroupResult, ResponseHeader, ResultSet, SolrResponse, StatsResult,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
