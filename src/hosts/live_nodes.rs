//! Live-node snapshot shared between the ZooKeeper watch path and request resolution

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use crate::error::{SolrError, SolrResult};

/// Map a `/live_nodes` child such as `10.0.0.5:8983_solr` to `http://10.0.0.5:8983`.
///
/// Everything after the first `_` is the URL-encoded context path, which the
/// request paths already carry.
pub fn live_node_to_address(node: &str, scheme: &str) -> String {
    let host_and_port = node.split_once('_').map(|(host, _)| host).unwrap_or(node);
    format!("{}://{}", scheme, host_and_port)
}

/// Atomically swapped list of base addresses plus a stale flag.
///
/// Writers mark the snapshot stale before a refresh is scheduled, so a reader
/// that observes the flag re-reads instead of trusting the old list.
pub(crate) struct LiveNodeSnapshot {
    addresses: ArcSwap<Vec<String>>,
    stale: Arc<AtomicBool>,
}

impl LiveNodeSnapshot {
    pub(crate) fn new() -> Self {
        Self {
            addresses: ArcSwap::from_pointee(Vec::new()),
            stale: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag handle for watch callbacks.
    pub(crate) fn stale_flag(&self) -> Arc<AtomicBool> {
        self.stale.clone()
    }

    pub(crate) fn mark_stale(&self) {
        self.stale.store(true, Ordering::Release);
    }

    /// Clear the stale flag, returning whether it was set.
    pub(crate) fn take_stale(&self) -> bool {
        self.stale.swap(false, Ordering::AcqRel)
    }

    /// Replace the snapshot with the given `/live_nodes` children.
    pub(crate) fn store_nodes(&self, nodes: &[String], scheme: &str) {
        let mut addresses: Vec<String> = nodes
            .iter()
            .map(|node| live_node_to_address(node, scheme))
            .collect();
        addresses.sort();
        addresses.dedup();
        debug!(live_nodes = addresses.len(), "storing live node snapshot");
        self.addresses.store(Arc::new(addresses));
    }

    pub(crate) fn current(&self) -> Arc<Vec<String>> {
        self.addresses.load_full()
    }

    /// Current addresses, re-reading through `reread` first if the snapshot is stale.
    pub(crate) async fn resolve_with<F, Fut>(&self, scheme: &str, reread: F) -> SolrResult<Vec<String>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SolrResult<Vec<String>>>,
    {
        if self.take_stale() {
            debug!("live node snapshot is stale, re-reading before resolving");
            match reread().await {
                Ok(nodes) => self.store_nodes(&nodes, scheme),
                Err(e) => {
                    self.mark_stale();
                    return Err(e);
                }
            }
        }
        let addresses = self.current();
        if addresses.is_empty() {
            return Err(SolrError::NoHostsAvailable);
        }
        Ok(addresses.as_ref().clone())
    }
}
