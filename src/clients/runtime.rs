//! Dedicated runtime that drives blocking calls

use std::future::Future;
use std::io;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};

use crate::error::{SolrError, SolrResult};

fn get_runtime() -> SolrResult<&'static Runtime> {
    static RT: OnceLock<io::Result<Runtime>> = OnceLock::new();
    RT.get_or_init(|| {
        Builder::new_multi_thread()
            .enable_all()
            .thread_name("solrcloud-blocking")
            .build()
    })
    .as_ref()
    .map_err(|e| SolrError::RuntimeError(format!("failed to start blocking runtime: {}", e)))
}

/// Run `future` on the shared runtime and park the calling thread until it finishes.
///
/// No lock is held while waiting, so any number of threads can wait at once.
/// Inside a multi-threaded tokio worker the wait is moved off the scheduler
/// with `block_in_place`.
pub(crate) fn run_blocking<F, T>(future: F) -> SolrResult<T>
where
    F: Future<Output = SolrResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let task = get_runtime()?.spawn(future);
    let joined = match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| futures::executor::block_on(task))
        }
        _ => futures::executor::block_on(task),
    };
    joined.map_err(|e| SolrError::RuntimeError(format!("blocking task failed: {}", e)))?
}
