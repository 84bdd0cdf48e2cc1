//! Immutable per-client settings shared by every request

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::engine::logging::LoggingPolicy;
use crate::error::{SolrError, SolrResult};
use crate::hosts::SolrHost;
use crate::models::auth::SolrAuth;

/// Host, credentials, logging policy and HTTP client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SolrServerContext {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    host: SolrHost,
    auth: SolrAuth,
    logging_policy: LoggingPolicy,
    client: Client,
}

impl SolrServerContext {
    pub fn host(&self) -> &SolrHost {
        &self.inner.host
    }

    pub fn auth(&self) -> &SolrAuth {
        &self.inner.auth
    }

    pub fn logging_policy(&self) -> LoggingPolicy {
        self.inner.logging_policy
    }

    pub fn client(&self) -> &Client {
        &self.inner.client
    }
}

/// Builder for [`SolrServerContext`].
///
/// # Example
/// ```
/// use solrcloud::{LoggingPolicy, SolrAuth, SolrServerContextBuilder, SolrSingleServerHost};
///
/// let context = SolrServerContextBuilder::new(SolrSingleServerHost::new("http://localhost:8983"))
///     .with_auth(SolrAuth::basic("solr", "SolrRocks"))
///     .with_logging_policy(LoggingPolicy::Off)
///     .build()
///     .unwrap();
/// assert_eq!(context.logging_policy(), LoggingPolicy::Off);
/// ```
#[derive(Debug)]
pub struct SolrServerContextBuilder {
    host: SolrHost,
    auth: SolrAuth,
    logging_policy: LoggingPolicy,
    client: Option<Client>,
    request_timeout: Option<Duration>,
}

impl SolrServerContextBuilder {
    pub fn new(host: impl Into<SolrHost>) -> Self {
        Self {
            host: host.into(),
            auth: SolrAuth::None,
            logging_policy: LoggingPolicy::default(),
            client: None,
            request_timeout: None,
        }
    }

    pub fn with_auth(mut self, auth: SolrAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_logging_policy(mut self, policy: LoggingPolicy) -> Self {
        self.logging_policy = policy;
        self
    }

    /// Use a preconfigured HTTP client. Its own settings win over `with_request_timeout`.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Overall timeout for each HTTP exchange.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> SolrResult<SolrServerContext> {
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.request_timeout {
                    builder = builder.timeout(timeout);
                }
                builder
                    .build()
                    .map_err(|e| SolrError::ConfigError(format!("failed to build HTTP client: {}", e)))?
            }
        };
        Ok(SolrServerContext {
            inner: Arc::new(ContextInner {
                host: self.host,
                auth: self.auth,
                logging_policy: self.logging_policy,
                client,
            }),
        })
    }
}
