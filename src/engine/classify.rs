//! Turn a raw HTTP answer into a [`SolrResponse`] or a typed error

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{SolrError, SolrResult};
use crate::response::{SolrResponse, SOLR_TOP_LEVEL_KEYS};

fn status_line(status: u16) -> String {
    match StatusCode::from_u16(status).ok().and_then(|s| s.canonical_reason()) {
        Some(reason) => format!("{} {}", status, reason),
        None => status.to_string(),
    }
}

fn error_message(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(|e| e.get("msg"))
        .and_then(Value::as_str)
        .map(String::from)
}

/// Classify a response that reached us. Never retries.
pub(crate) fn classify(
    host: &str,
    status: u16,
    content_type: Option<&str>,
    body: &[u8],
) -> SolrResult<SolrResponse> {
    let parsed = serde_json::from_slice::<Value>(body).ok();
    let content_type = content_type.unwrap_or("none");

    if status >= 400 {
        let raw = String::from_utf8_lossy(body).trim().to_string();
        let message = parsed
            .as_ref()
            .and_then(error_message)
            .or_else(|| (!raw.is_empty()).then_some(raw))
            .unwrap_or_else(|| status_line(status));
        return Err(SolrError::Solr {
            status,
            host: host.to_string(),
            message,
        });
    }

    let unexpected = |detail: String| SolrError::UnexpectedResponseShape {
        status,
        host: host.to_string(),
        detail,
    };

    if !(200..300).contains(&status) {
        return Err(unexpected(format!(
            "{} is not a Solr answer (content-type {})",
            status_line(status),
            content_type
        )));
    }

    let value = parsed.ok_or_else(|| {
        unexpected(format!("body is not JSON (content-type {})", content_type))
    })?;
    let object = value.as_object().ok_or_else(|| {
        unexpected(format!("JSON body is not an object (content-type {})", content_type))
    })?;

    if let Some(error) = object.get("error").filter(|e| e.is_object()) {
        let code = error
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(status);
        return Err(SolrError::Solr {
            status: code,
            host: host.to_string(),
            message: error_message(&value).unwrap_or_else(|| error.to_string()),
        });
    }

    if !SOLR_TOP_LEVEL_KEYS.iter().any(|key| object.contains_key(*key)) {
        return Err(unexpected(format!(
            "no Solr response keys in body (content-type {})",
            content_type
        )));
    }

    SolrResponse::from_value(&value)
}
