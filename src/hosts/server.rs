//! Statically configured Solr hosts

use std::time::Duration;

use crate::error::{SolrError, SolrResult};

/// Trim a trailing `/` and default to `http://` when no scheme is given.
pub fn normalize_address(address: &str) -> String {
    let trimmed = address.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// A single Solr node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolrSingleServerHost {
    pub address: String,
}

impl SolrSingleServerHost {
    pub fn new(address: impl AsRef<str>) -> Self {
        Self {
            address: normalize_address(address.as_ref()),
        }
    }
}

/// Several Solr nodes tried in the configured order. `timeout` bounds each attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolrMultipleServerHost {
    pub addresses: Vec<String>,
    pub timeout: Duration,
}

impl SolrMultipleServerHost {
    pub fn new<S: AsRef<str>, I: IntoIterator<Item = S>>(addresses: I, timeout: Duration) -> Self {
        Self {
            addresses: addresses
                .into_iter()
                .map(|a| normalize_address(a.as_ref()))
                .collect(),
            timeout,
        }
    }

    pub(crate) fn resolve(&self) -> SolrResult<Vec<String>> {
        if self.addresses.is_empty() {
            return Err(SolrError::NoHostsAvailable);
        }
        Ok(self.addresses.clone())
    }
}
