//! Host resolution: which Solr base addresses a request may be sent to

pub mod live_nodes;
pub mod server;
pub mod zookeeper;

use std::time::Duration;

use crate::error::SolrResult;

pub use live_nodes::live_node_to_address;
pub use server::{normalize_address, SolrMultipleServerHost, SolrSingleServerHost};
pub use zookeeper::{ZookeeperEnsembleConnector, ZookeeperEnsembleHost};

/// Where requests go. Resolution yields at least one address or fails with
/// [`SolrError::NoHostsAvailable`](crate::SolrError::NoHostsAvailable).
#[derive(Debug, Clone)]
pub enum SolrHost {
    SingleServer(SolrSingleServerHost),
    MultipleServer(SolrMultipleServerHost),
    ZookeeperEnsemble(ZookeeperEnsembleHost),
}

impl SolrHost {
    /// Ordered candidate base addresses for one request.
    pub async fn resolve(&self) -> SolrResult<Vec<String>> {
        match self {
            SolrHost::SingleServer(host) => Ok(vec![host.address.clone()]),
            SolrHost::MultipleServer(host) => host.resolve(),
            SolrHost::ZookeeperEnsemble(host) => host.resolve().await,
        }
    }

    /// Bound applied to each individual attempt, if any.
    pub fn attempt_timeout(&self) -> Option<Duration> {
        match self {
            SolrHost::MultipleServer(host) => Some(host.timeout),
            _ => None,
        }
    }
}

impl From<SolrSingleServerHost> for SolrHost {
    fn from(host: SolrSingleServerHost) -> Self {
        SolrHost::SingleServer(host)
    }
}

impl From<SolrMultipleServerHost> for SolrHost {
    fn from(host: SolrMultipleServerHost) -> Self {
        SolrHost::MultipleServer(host)
    }
}

impl From<ZookeeperEnsembleHost> for SolrHost {
    fn from(host: ZookeeperEnsembleHost) -> Self {
        SolrHost::ZookeeperEnsemble(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_single_server_resolves_to_itself() {
        let host: SolrHost = SolrSingleServerHost::new("http://x").into();
        assert_eq!(host.resolve().await.unwrap(), vec!["http://x"]);
        assert_eq!(host.attempt_timeout(), None);
    }

    #[tokio::test]
    async fn test_multiple_server_timeout_is_per_attempt() {
        let host: SolrHost =
            SolrMultipleServerHost::new(["http://a", "http://b"], Duration::from_millis(250)).into();
        assert_eq!(host.resolve().await.unwrap().len(), 2);
        assert_eq!(host.attempt_timeout(), Some(Duration::from_millis(250)));
    }
}
