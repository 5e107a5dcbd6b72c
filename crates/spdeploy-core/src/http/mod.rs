//! HTTP seam between the deployment pipeline and the network.
//!
//! The pipeline only talks to a [`SharePointTransport`]; the production
//! implementation is [`client::ReqwestTransport`]. Request headers travel as
//! a [`RequestHeaders`] value that is rebuilt, never mutated, as the run
//! gains the JSON content negotiation and the request digest.

pub mod client;
#[cfg(test)]
pub(crate) mod test_support;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

pub use client::ReqwestTransport;

/// Boxed future returned by the transport and authenticator seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub const ACCEPT: &str = "Accept";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const REQUEST_DIGEST: &str = "X-RequestDigest";

pub const JSON_CONTENT_TYPE: &str = "application/json;odata=nometadata";
pub const XML_CONTENT_TYPE: &str = "text/xml";

/// Errors from a single HTTP exchange.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid header '{0}'")]
    InvalidHeader(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl HttpError {
    /// True when the exchange completed but the body was not JSON.
    pub fn is_parse(&self) -> bool {
        matches!(self, HttpError::Json(_))
    }
}

/// Header set sent with every SharePoint request.
///
/// Entries are ordered by name.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    entries: BTreeMap<String, String>,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with `name` set to `value`, replacing any previous value.
    pub fn with(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(name.into(), value.into());
        Self { entries }
    }

    /// Accept and send OData JSON without metadata.
    pub fn with_json(&self) -> Self {
        self.with(ACCEPT, JSON_CONTENT_TYPE)
            .with(CONTENT_TYPE, JSON_CONTENT_TYPE)
    }

    pub fn with_digest(&self, digest: &str) -> Self {
        self.with(REQUEST_DIGEST, digest)
    }

    pub fn with_content_type(&self, content_type: &str) -> Self {
        self.with(CONTENT_TYPE, content_type)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// Header values carry cookies, tokens and the digest.
impl fmt::Debug for RequestHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Issues SharePoint requests and returns the parsed JSON body.
pub trait SharePointTransport: Send + Sync {
    fn get_json<'a>(
        &'a self,
        url: &'a str,
        headers: &'a RequestHeaders,
    ) -> BoxFuture<'a, Result<Value, HttpError>>;

    fn post_json<'a>(
        &'a self,
        url: &'a str,
        headers: &'a RequestHeaders,
        body: Option<String>,
    ) -> BoxFuture<'a, Result<Value, HttpError>>;
}
