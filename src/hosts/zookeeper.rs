//! Solr node discovery through a ZooKeeper ensemble
//!
//! The session reads `/live_nodes`, `/aliases.json` and `/clusterprops.json`
//! once on connect and keeps watches armed afterwards. A watch callback only
//! marks the snapshot stale and posts a message; a refresher task does the
//! re-read and swaps the snapshot, so request resolution never waits on the
//! ZooKeeper event thread.
//!
//! An expired session is replaced by the refresher: it opens a new session
//! against the same ensemble and re-reads both nodes. Until that succeeds,
//! resolution fails with `EnsembleUnavailable`.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use zookeeper_async::{KeeperState, WatchedEvent, Watcher, ZkError, ZooKeeper};

use crate::clients::runtime;
use crate::error::{SolrError, SolrResult};
use crate::hosts::live_nodes::LiveNodeSnapshot;
use crate::response::{self, path::JsonPath};

const LIVE_NODES: &str = "/live_nodes";
const ALIASES: &str = "/aliases.json";
const CLUSTER_PROPS: &str = "/clusterprops.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchTarget {
    LiveNodes,
    Aliases,
    /// The session expired and must be re-established
    Session,
}

/// Connection settings for a ZooKeeper ensemble.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use solrcloud::{AsyncSolrCloudClient, SolrServerContextBuilder, ZookeeperEnsembleConnector};
///
/// # async fn run() -> solrcloud::SolrResult<()> {
/// let host = ZookeeperEnsembleConnector::new(["localhost:2181"], Duration::from_secs(3))
///     .connect()
///     .await?;
/// let client = AsyncSolrCloudClient::new(SolrServerContextBuilder::new(host).build()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZookeeperEnsembleConnector {
    pub hosts: Vec<String>,
    /// Upper bound for establishing the session and reading the initial state
    pub timeout: Duration,
    /// Optional chroot such as `/solr`
    pub chroot: Option<String>,
}

impl ZookeeperEnsembleConnector {
    pub fn new<S: Into<String>, I: IntoIterator<Item = S>>(hosts: I, timeout: Duration) -> Self {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            timeout,
            chroot: None,
        }
    }

    pub fn chroot(mut self, chroot: impl Into<String>) -> Self {
        self.chroot = Some(chroot.into());
        self
    }

    /// ZooKeeper connect string: `host1:2181,host2:2181/chroot`
    pub fn connect_string(&self) -> String {
        let hosts = self.hosts.join(",");
        match &self.chroot {
            Some(chroot) => format!("{}/{}", hosts, chroot.trim_matches('/')),
            None => hosts,
        }
    }

    pub async fn connect(self) -> SolrResult<ZookeeperEnsembleHost> {
        ZookeeperEnsembleHost::connect(self).await
    }

    /// Connect from synchronous code. The session lives on the shared blocking runtime.
    pub fn connect_blocking(self) -> SolrResult<ZookeeperEnsembleHost> {
        runtime::run_blocking(self.connect())
    }
}

/// Handle to a watched ZooKeeper session. Clones share the session, which is
/// closed when the last clone is dropped or [`close`](Self::close) is called.
#[derive(Clone)]
pub struct ZookeeperEnsembleHost {
    session: Arc<EnsembleSession>,
}

struct EnsembleSession {
    zk: ArcSwap<ZooKeeper>,
    connect_string: String,
    timeout: Duration,
    scheme: String,
    live_nodes: LiveNodeSnapshot,
    aliases: ArcSwap<IndexMap<String, Vec<String>>>,
    events: mpsc::UnboundedSender<WatchTarget>,
    refresher: std::sync::Mutex<Option<JoinHandle<()>>>,
}

/// Session level watcher: logs state changes, invalidates the snapshot on
/// expiry and asks the refresher for a new session.
struct SessionWatcher {
    stale: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<WatchTarget>,
}

impl Watcher for SessionWatcher {
    fn handle(&self, event: WatchedEvent) {
        if matches!(event.keeper_state, KeeperState::Expired) {
            warn!("ZooKeeper session expired, live node snapshot invalidated");
            self.stale.store(true, Ordering::Release);
            let _ = self.events.send(WatchTarget::Session);
        } else {
            debug!(?event, "ZooKeeper session event");
        }
    }
}

impl ZookeeperEnsembleHost {
    async fn connect(connector: ZookeeperEnsembleConnector) -> SolrResult<Self> {
        let connect_string = connector.connect_string();
        let timeout = connector.timeout;
        info!(ensemble = %connect_string, ?timeout, "connecting to ZooKeeper ensemble");

        match tokio::time::timeout(timeout, Self::open(connect_string.clone(), timeout)).await {
            Ok(result) => result,
            Err(_) => Err(SolrError::EnsembleTimeout {
                hosts: connect_string,
                timeout,
            }),
        }
    }

    async fn open(connect_string: String, timeout: Duration) -> SolrResult<Self> {
        let live_nodes = LiveNodeSnapshot::new();
        let (events, receiver) = mpsc::unbounded_channel();
        let watcher = SessionWatcher {
            stale: live_nodes.stale_flag(),
            events: events.clone(),
        };
        let zk = ZooKeeper::connect(&connect_string, timeout, watcher)
            .await
            .map_err(|e| unavailable(&connect_string, e))?;

        let scheme = read_url_scheme(&zk, &connect_string).await?;
        let session = Arc::new(EnsembleSession {
            zk: ArcSwap::from_pointee(zk),
            connect_string,
            timeout,
            scheme,
            live_nodes,
            aliases: ArcSwap::from_pointee(IndexMap::new()),
            events,
            refresher: std::sync::Mutex::new(None),
        });

        session.refresh(WatchTarget::LiveNodes).await?;
        session.refresh(WatchTarget::Aliases).await?;
        info!(
            ensemble = %session.connect_string,
            live_nodes = session.live_nodes.current().len(),
            "connected to ZooKeeper ensemble"
        );

        let refresher = tokio::spawn(run_refresher(
            Arc::downgrade(&session),
            receiver,
            |session: Arc<EnsembleSession>, target| async move { session.refresh(target).await },
        ));
        if let Ok(mut slot) = session.refresher.lock() {
            *slot = Some(refresher);
        }
        Ok(Self { session })
    }

    /// Candidate base addresses from the current live-node snapshot.
    pub async fn resolve(&self) -> SolrResult<Vec<String>> {
        let session = &self.session;
        session
            .live_nodes
            .resolve_with(&session.scheme, || async {
                session
                    .zk
                    .load_full()
                    .get_children(LIVE_NODES, false)
                    .await
                    .map_err(|e| unavailable(&session.connect_string, e))
            })
            .await
    }

    /// Collection aliases as last seen in `/aliases.json`.
    pub fn aliases(&self) -> IndexMap<String, Vec<String>> {
        self.session.aliases.load_full().as_ref().clone()
    }

    pub fn connect_string(&self) -> &str {
        &self.session.connect_string
    }

    /// Close the session now instead of waiting for the last clone to drop.
    pub async fn close(&self) -> SolrResult<()> {
        self.session.stop_refresher();
        self.session
            .zk
            .load_full()
            .close()
            .await
            .map_err(|e| unavailable(&self.session.connect_string, e))
    }
}

impl fmt::Debug for ZookeeperEnsembleHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZookeeperEnsembleHost")
            .field("ensemble", &self.session.connect_string)
            .field("scheme", &self.session.scheme)
            .field("live_nodes", &self.session.live_nodes.current())
            .finish()
    }
}

impl EnsembleSession {
    fn watch(&self, target: WatchTarget) -> impl Fn(WatchedEvent) + Send + Sync + 'static {
        watch_callback(self.live_nodes.stale_flag(), self.events.clone(), target)
    }

    /// Re-read one node and re-arm its watch, or replace an expired session.
    async fn refresh(&self, target: WatchTarget) -> SolrResult<()> {
        match target {
            WatchTarget::LiveNodes => self.refresh_live_nodes().await,
            WatchTarget::Aliases => self.refresh_aliases().await,
            WatchTarget::Session => {
                self.reconnect().await?;
                self.refresh_live_nodes().await?;
                self.refresh_aliases().await
            }
        }
    }

    async fn refresh_live_nodes(&self) -> SolrResult<()> {
        self.live_nodes.take_stale();
        let nodes = self
            .zk
            .load_full()
            .get_children_w(LIVE_NODES, self.watch(WatchTarget::LiveNodes))
            .await
            .map_err(|e| {
                self.live_nodes.mark_stale();
                unavailable(&self.connect_string, e)
            })?;
        self.live_nodes.store_nodes(&nodes, &self.scheme);
        Ok(())
    }

    async fn refresh_aliases(&self) -> SolrResult<()> {
        let aliases = match self
            .zk
            .load_full()
            .get_data_w(ALIASES, self.watch(WatchTarget::Aliases))
            .await
        {
            Ok((data, _)) => parse_aliases_json(&data)?,
            // No aliases were ever created; nothing to watch until Solr creates the node
            Err(ZkError::NoNode) => IndexMap::new(),
            Err(e) => return Err(unavailable(&self.connect_string, e)),
        };
        debug!(aliases = aliases.len(), "storing alias snapshot");
        self.aliases.store(Arc::new(aliases));
        Ok(())
    }

    async fn reconnect(&self) -> SolrResult<()> {
        info!(ensemble = %self.connect_string, "re-establishing expired ZooKeeper session");
        let watcher = SessionWatcher {
            stale: self.live_nodes.stale_flag(),
            events: self.events.clone(),
        };
        let connect = ZooKeeper::connect(&self.connect_string, self.timeout, watcher);
        let zk = match tokio::time::timeout(self.timeout, connect).await {
            Ok(result) => result.map_err(|e| unavailable(&self.connect_string, e))?,
            Err(_) => {
                return Err(SolrError::EnsembleTimeout {
                    hosts: self.connect_string.clone(),
                    timeout: self.timeout,
                })
            }
        };
        self.zk.store(Arc::new(zk));
        Ok(())
    }

    fn stop_refresher(&self) {
        if let Ok(mut slot) = self.refresher.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for EnsembleSession {
    fn drop(&mut self) {
        self.stop_refresher();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let zk = self.zk.load_full();
            let ensemble = self.connect_string.clone();
            handle.spawn(async move {
                if let Err(e) = zk.close().await {
                    debug!(%ensemble, error = ?e, "closing ZooKeeper session failed");
                }
            });
        }
    }
}

/// Callback for a one-shot data or child watch.
fn watch_callback(
    stale: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<WatchTarget>,
    target: WatchTarget,
) -> impl Fn(WatchedEvent) + Send + Sync + 'static {
    move |event: WatchedEvent| {
        debug!(?event, ?target, "ZooKeeper watch fired");
        if target == WatchTarget::LiveNodes {
            stale.store(true, Ordering::Release);
        }
        // The receiver only goes away when the session is being dropped
        let _ = events.send(target);
    }
}

/// Apply watch events until the channel closes or the owner is dropped.
async fn run_refresher<S, F, Fut>(
    owner: Weak<S>,
    mut events: mpsc::UnboundedReceiver<WatchTarget>,
    refresh: F,
) where
    F: Fn(Arc<S>, WatchTarget) -> Fut,
    Fut: Future<Output = SolrResult<()>>,
{
    while let Some(target) = events.recv().await {
        let Some(owner) = owner.upgrade() else {
            break;
        };
        match refresh(owner, target).await {
            Ok(()) => debug!(?target, "refreshed ZooKeeper snapshot"),
            Err(e) => warn!(?target, error = %e, "failed to refresh ZooKeeper snapshot"),
        }
    }
}

async fn read_url_scheme(zk: &ZooKeeper, connect_string: &str) -> SolrResult<String> {
    match zk.get_data(CLUSTER_PROPS, false).await {
        Ok((data, _)) => parse_url_scheme(&data),
        Err(ZkError::NoNode) => Ok("http".to_string()),
        Err(e) => Err(unavailable(connect_string, e)),
    }
}

fn unavailable(connect_string: &str, error: ZkError) -> SolrError {
    SolrError::EnsembleUnavailable {
        hosts: connect_string.to_string(),
        message: format!("{:?}", error),
    }
}

/// `urlScheme` from `/clusterprops.json`, `http` when unset.
fn parse_url_scheme(data: &[u8]) -> SolrResult<String> {
    if data.is_empty() {
        return Ok("http".to_string());
    }
    let props: Value = serde_json::from_slice(data)?;
    Ok(props
        .get("urlScheme")
        .and_then(Value::as_str)
        .unwrap_or("http")
        .to_string())
}

/// `{"collection": {"alias": "c1,c2"}}` from `/aliases.json`.
fn parse_aliases_json(data: &[u8]) -> SolrResult<IndexMap<String, Vec<String>>> {
    if data.is_empty() {
        return Ok(IndexMap::new());
    }
    let value: Value = serde_json::from_slice(data)?;
    match value.get("collection") {
        Some(collection) => {
            response::parse_aliases(collection, &JsonPath::root().key("aliases.json").key("collection"))
        }
        None => Ok(IndexMap::new()),
    }
}
