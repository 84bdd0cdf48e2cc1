//! Execution engine: one async request path with cross-host retry
//!
//! Candidates come from the host resolver in order. A transport failure
//! moves on to the next candidate; any HTTP answer is classified and returned
//! as is, so a reachable server's 4xx/5xx is never retried elsewhere.

pub mod classify;
pub mod logging;

use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Url};

use crate::error::{HostAttempt, SolrError, SolrResult};
use crate::models::context::SolrServerContext;
use crate::queries::params::ParamList;
use crate::response::SolrResponse;
use logging::{log_attempt, AttemptOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Bytes),
    Binary {
        bytes: Bytes,
        content_type: &'static str,
    },
}

/// A request relative to any Solr base address.
#[derive(Debug, Clone, PartialEq)]
pub struct SolrRequest {
    pub method: Method,
    /// Path starting at `/solr/...`
    pub path: String,
    pub params: ParamList,
    pub body: RequestBody,
}

impl SolrRequest {
    pub fn get(path: impl Into<String>, params: ParamList) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            params,
            body: RequestBody::Empty,
        }
    }

    pub fn post_json(path: impl Into<String>, params: ParamList, body: Bytes) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            params,
            body: RequestBody::Json(body),
        }
    }

    pub fn post_binary(
        path: impl Into<String>,
        params: ParamList,
        body: Bytes,
        content_type: &'static str,
    ) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            params,
            body: RequestBody::Binary {
                bytes: body,
                content_type,
            },
        }
    }

    /// Full URL for one host, with `wt=json` appended.
    pub fn url(&self, host: &str) -> SolrResult<Url> {
        let base = format!("{}{}", host, self.path);
        Url::parse_with_params(&base, self.params.iter().chain([("wt", "json")]))
            .map_err(|e| SolrError::ConfigError(format!("invalid request URL {}: {}", base, e)))
    }

    fn build(&self, context: &SolrServerContext, host: &str) -> SolrResult<RequestBuilder> {
        let request = context.client().request(self.method.clone(), self.url(host)?);
        let request = match &self.body {
            RequestBody::Empty => request,
            RequestBody::Json(bytes) => request
                .header(CONTENT_TYPE, "application/json")
                .body(bytes.clone()),
            RequestBody::Binary {
                bytes,
                content_type,
            } => request.header(CONTENT_TYPE, *content_type).body(bytes.clone()),
        };
        Ok(context.auth().apply(request))
    }
}

/// Status, content type and body of an answer that reached us.
struct RawResponse {
    status: u16,
    content_type: Option<String>,
    body: Bytes,
}

enum AttemptError {
    /// Retry on the next host
    Transport(String),
    /// Request could not be built; retrying cannot help
    Fatal(SolrError),
}

async fn send(request: RequestBuilder) -> Result<RawResponse, AttemptError> {
    let classify_error = |e: reqwest::Error| {
        if e.is_builder() {
            AttemptError::Fatal(SolrError::HttpError(e))
        } else {
            AttemptError::Transport(e.to_string())
        }
    };
    let response = request.send().await.map_err(classify_error)?;
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = response.bytes().await.map_err(classify_error)?;
    Ok(RawResponse {
        status,
        content_type,
        body,
    })
}

async fn send_with_timeout(
    request: RequestBuilder,
    timeout: Option<Duration>,
) -> Result<RawResponse, AttemptError> {
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, send(request)).await {
            Ok(result) => result,
            Err(_) => Err(AttemptError::Transport(format!(
                "timed out after {}ms",
                limit.as_millis()
            ))),
        },
        None => send(request).await,
    }
}

/// Send `request` to the first candidate host that answers and parse the answer.
pub async fn execute(context: &SolrServerContext, request: &SolrRequest) -> SolrResult<SolrResponse> {
    let hosts = context.host().resolve().await?;
    let timeout = context.host().attempt_timeout();
    let policy = context.logging_policy();
    let mut attempts = Vec::with_capacity(hosts.len());

    for host in hosts {
        let builder = request.build(context, &host)?;
        let started = Instant::now();
        match send_with_timeout(builder, timeout).await {
            Ok(raw) => {
                log_attempt(policy, request, &host, started.elapsed(), &AttemptOutcome::Status(raw.status));
                return classify::classify(&host, raw.status, raw.content_type.as_deref(), &raw.body);
            }
            Err(AttemptError::Transport(error)) => {
                log_attempt(
                    policy,
                    request,
                    &host,
                    started.elapsed(),
                    &AttemptOutcome::TransportError(error.clone()),
                );
                attempts.push(HostAttempt { host, error });
            }
            Err(AttemptError::Fatal(e)) => return Err(e),
        }
    }
    Err(SolrError::AllHostsUnreachable { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_appends_wt_json() {
        let mut params = ParamList::new();
        params.push("q", "age:[0 TO 59]");
        params.push("fq", "interests:cars");
        let url = SolrRequest::get("/solr/population/select", params)
            .url("http://localhost:8983")
            .unwrap();
        assert_eq!(url.path(), "/solr/population/select");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "age:[0 TO 59]".to_string()),
                ("fq".to_string(), "interests:cars".to_string()),
                ("wt".to_string(), "json".to_string()),
            ]
        );
    }

    #[test]
    fn test_bad_host_is_config_error() {
        let err = SolrRequest::get("/solr/x/select", ParamList::new())
            .url("not a url")
            .unwrap_err();
        assert!(matches!(err, SolrError::ConfigError(_)));
    }
}
