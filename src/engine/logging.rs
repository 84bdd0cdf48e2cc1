//! Per-attempt request logging

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::{RequestBody, SolrRequest};
use crate::queries::select::params_to_json;

/// How much of each request attempt is logged, at `DEBUG` level.
///
/// Headers are never logged, so credentials never appear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum LoggingPolicy {
    Off,
    /// Method, target, elapsed time and outcome
    #[default]
    Minimal,
    /// Minimal plus parameters and up to `max_body_len` bytes of the body
    Verbose { max_body_len: usize },
}

/// What a single attempt ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttemptOutcome {
    Status(u16),
    TransportError(String),
}

fn truncate(body: &[u8], max_len: usize) -> String {
    if body.len() <= max_len {
        return String::from_utf8_lossy(body).into_owned();
    }
    format!(
        "{}... ({} of {} bytes)",
        String::from_utf8_lossy(&body[..max_len]),
        max_len,
        body.len()
    )
}

fn body_preview(body: &RequestBody, max_len: usize) -> String {
    match body {
        RequestBody::Empty => String::new(),
        RequestBody::Json(bytes) => truncate(bytes, max_len),
        RequestBody::Binary { bytes, content_type } => {
            format!("<{} bytes of {}>", bytes.len(), content_type)
        }
    }
}

pub(crate) fn log_attempt(
    policy: LoggingPolicy,
    request: &SolrRequest,
    host: &str,
    elapsed: Duration,
    outcome: &AttemptOutcome,
) {
    let target = format!("{}{}", host, request.path);
    let elapsed_ms = elapsed.as_millis() as u64;
    match (policy, outcome) {
        (LoggingPolicy::Off, _) => {}
        (LoggingPolicy::Minimal, AttemptOutcome::Status(status)) => {
            debug!(method = %request.method, %target, elapsed_ms, status, "Solr request");
        }
        (LoggingPolicy::Minimal, AttemptOutcome::TransportError(error)) => {
            debug!(method = %request.method, %target, elapsed_ms, %error, "Solr request failed");
        }
        (LoggingPolicy::Verbose { max_body_len }, outcome) => {
            let params = params_to_json(&request.params);
            let body = body_preview(&request.body, max_body_len);
            match outcome {
                AttemptOutcome::Status(status) => debug!(
                    method = %request.method, %target, elapsed_ms, status, %params, %body,
                    "Solr request"
                ),
                AttemptOutcome::TransportError(error) => debug!(
                    method = %request.method, %target, elapsed_ms, %error, %params, %body,
                    "Solr request failed"
                ),
            }
        }
    }
}
