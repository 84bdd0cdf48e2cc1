//! Error types for the SolrCloud client
//!
//! Every failure a request can end in maps onto one [`SolrError`] variant.
//! Transport failures are retried across hosts inside the engine and only
//! surface once every candidate has been tried, as
//! [`SolrError::AllHostsUnreachable`].

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// One failed transport attempt against a single host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAttempt {
    /// Base address that was tried
    pub host: String,
    /// Transport error, rendered
    pub error: String,
}

impl fmt::Display for HostAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.host, self.error)
    }
}

fn join_attempts(attempts: &[HostAttempt]) -> String {
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur when talking to SolrCloud
#[derive(Error, Debug)]
pub enum SolrError {
    /// Host resolution produced no candidate address
    #[error("No Solr hosts available")]
    NoHostsAvailable,

    /// The ZooKeeper session could not be established in time
    #[error("Timed out after {timeout:?} connecting to ZooKeeper ensemble {hosts}")]
    EnsembleTimeout { hosts: String, timeout: Duration },

    /// The ZooKeeper ensemble answered with an error
    #[error("ZooKeeper ensemble {hosts} unavailable: {message}")]
    EnsembleUnavailable { hosts: String, message: String },

    /// Every candidate host failed at the transport level
    #[error("All Solr hosts unreachable: {}", join_attempts(.attempts))]
    AllHostsUnreachable { attempts: Vec<HostAttempt> },

    /// Solr answered and reported an error
    #[error("Solr error {status} from {host}: {message}")]
    Solr {
        status: u16,
        host: String,
        message: String,
    },

    /// The server answered with something that is not a Solr response
    #[error("Unexpected response shape (status {status}) from {host}: {detail}")]
    UnexpectedResponseShape {
        status: u16,
        host: String,
        detail: String,
    },

    /// A Solr response was missing a key or had a key of the wrong type
    #[error("Malformed response at {path}: {detail}")]
    MalformedResponse { path: String, detail: String },

    /// Invalid client or query configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP transport error that was not retried
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// YAML configuration could not be read
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Config set archive could not be built
    #[error("Zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// The blocking runtime failed to drive a request
    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl SolrError {
    /// HTTP status attached to this error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            SolrError::Solr { status, .. } => Some(*status),
            SolrError::UnexpectedResponseShape { status, .. } => Some(*status),
            SolrError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn malformed(path: impl Into<String>, detail: impl Into<String>) -> Self {
        SolrError::MalformedResponse {
            path: path.into(),
            detail: detail.into(),
        }
    }
}

pub type SolrResult<T> = Result<T, SolrError>;
