//! Authentication against the target site.
//!
//! The pipeline only needs a header set that authorizes later requests, so
//! the protocol lives behind [`Authenticator`]. [`online::OnlineAuthenticator`]
//! implements SharePoint Online user-credential sign-in.

pub mod online;

use std::fmt;

use crate::http::{BoxFuture, RequestHeaders};

pub use online::OnlineAuthenticator;

/// Username and password handed to the authenticator.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication failed: {0}")]
    Rejected(String),

    #[error("authentication request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid site URL '{url}': {reason}")]
    InvalidSiteUrl { url: String, reason: String },

    #[error("unexpected authentication response: {0}")]
    Protocol(String),
}

/// Exchanges credentials for headers usable on subsequent requests.
pub trait Authenticator: Send + Sync {
    fn authenticate<'a>(
        &'a self,
        site_url: &'a str,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<RequestHeaders, AuthError>>;
}
