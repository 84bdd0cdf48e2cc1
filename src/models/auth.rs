//! Credentials attached to every request

use std::fmt;

use reqwest::RequestBuilder;
use serde::Deserialize;

/// Per-request authentication. Never logged; `Debug` redacts the password.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SolrAuth {
    #[default]
    None,
    Basic {
        username: String,
        password: Option<String>,
    },
}

impl SolrAuth {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        SolrAuth::Basic {
            username: username.into(),
            password: Some(password.into()),
        }
    }

    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            SolrAuth::None => request,
            SolrAuth::Basic { username, password } => request.basic_auth(username, password.as_ref()),
        }
    }
}

impl fmt::Debug for SolrAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolrAuth::None => write!(f, "None"),
            SolrAuth::Basic { username, password } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &password.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}
