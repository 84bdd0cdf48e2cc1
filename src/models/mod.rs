//! Client settings: credentials, context and file configuration

pub mod auth;
pub mod config;
pub mod context;

pub use auth::SolrAuth;
pub use config::{ClientConfig, HostConfig};
pub use context::{SolrServerContext, SolrServerContextBuilder};
