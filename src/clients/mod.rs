//! Public clients

pub mod async_client;
pub mod blocking_client;
pub(crate) mod runtime;

pub use async_client::AsyncSolrCloudClient;
pub use blocking_client::BlockingSolrCloudClient;
