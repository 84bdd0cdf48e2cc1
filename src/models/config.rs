//! File based client configuration

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::clients::runtime;
use crate::engine::logging::LoggingPolicy;
use crate::error::{SolrError, SolrResult};
use crate::hosts::{
    SolrHost, SolrMultipleServerHost, SolrSingleServerHost, ZookeeperEnsembleConnector,
};
use crate::models::auth::SolrAuth;
use crate::models::context::{SolrServerContext, SolrServerContextBuilder};

/// Host topology
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HostConfig {
    /// One Solr node
    Single { address: String },
    /// Solr nodes tried in order
    Multiple {
        addresses: Vec<String>,
        /// Per attempt timeout in milliseconds
        #[serde(default = "default_attempt_timeout_ms")]
        timeout_ms: u64,
    },
    /// ZooKeeper ensemble used to discover live Solr nodes
    Zookeeper {
        hosts: Vec<String>,
        /// Session establishment timeout in milliseconds
        #[serde(default = "default_attempt_timeout_ms")]
        timeout_ms: u64,
        #[serde(default)]
        chroot: Option<String>,
    },
}

fn default_attempt_timeout_ms() -> u64 {
    3000
}

/// Client configuration
///
/// ```yaml
/// host:
///   type: zookeeper
///   hosts: ["zk1:2181", "zk2:2181"]
///   timeout_ms: 5000
/// auth:
///   type: basic
///   username: solr
///   password: SolrRocks
/// logging:
///   mode: verbose
///   max_body_len: 512
/// request_timeout_ms: 10000
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientConfig {
    /// Where requests go
    pub host: HostConfig,
    /// Credentials sent with every request
    #[serde(default)]
    pub auth: SolrAuth,
    /// Request logging
    #[serde(default)]
    pub logging: LoggingPolicy,
    /// Overall HTTP timeout per exchange
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl ClientConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> SolrResult<Self> {
        let config: ClientConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> SolrResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Validate configuration
    pub fn validate(&self) -> SolrResult<()> {
        match &self.host {
            HostConfig::Single { address } if address.trim().is_empty() => Err(
                SolrError::ConfigError("single host address is empty".to_string()),
            ),
            HostConfig::Multiple { addresses, .. } if addresses.is_empty() => Err(
                SolrError::ConfigError("multiple host list is empty".to_string()),
            ),
            HostConfig::Zookeeper { hosts, .. } if hosts.is_empty() => Err(
                SolrError::ConfigError("zookeeper host list is empty".to_string()),
            ),
            _ => Ok(()),
        }
    }

    fn builder(&self, host: SolrHost) -> SolrServerContextBuilder {
        let mut builder = SolrServerContextBuilder::new(host)
            .with_auth(self.auth.clone())
            .with_logging_policy(self.logging);
        if let Some(ms) = self.request_timeout_ms {
            builder = builder.with_request_timeout(Duration::from_millis(ms));
        }
        builder
    }

    /// Build a context, opening the ZooKeeper session when one is configured.
    pub async fn connect(&self) -> SolrResult<SolrServerContext> {
        let host: SolrHost = match &self.host {
            HostConfig::Single { address } => SolrSingleServerHost::new(address).into(),
            HostConfig::Multiple {
                addresses,
                timeout_ms,
            } => SolrMultipleServerHost::new(addresses, Duration::from_millis(*timeout_ms)).into(),
            HostConfig::Zookeeper {
                hosts,
                timeout_ms,
                chroot,
            } => {
                let mut connector =
                    ZookeeperEnsembleConnector::new(hosts.clone(), Duration::from_millis(*timeout_ms));
                if let Some(chroot) = chroot {
                    connector = connector.chroot(chroot.clone());
                }
                connector.connect().await?.into()
            }
        };
        self.builder(host).build()
    }

    /// [`connect`](Self::connect) from synchronous code.
    pub fn connect_blocking(&self) -> SolrResult<SolrServerContext> {
        let config = self.clone();
        runtime::run_blocking(async move { config.connect().await })
    }
}
