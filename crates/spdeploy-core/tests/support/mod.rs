//! In-memory SharePoint for pipeline tests.

#![allow(dead_code)]

use std::sync::Mutex;

use serde_json::{Value, json};

use spdeploy_core::auth::{AuthError, Authenticator, Credentials};
use spdeploy_core::config::DeployOptions;
use spdeploy_core::http::{BoxFuture, HttpError, RequestHeaders, SharePointTransport};

pub const SITE_URL: &str = "https://contoso.sharepoint.com/sites/apps";
pub const DIGEST: &str = "0xDIGEST,16 Oct 2026 08:00:00 -0000";
pub const SITE_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const WEB_ID: &str = "22222222-2222-2222-2222-222222222222";
pub const LIST_ID: &str = "33333333-3333-3333-3333-333333333333";

/// URL fragments identifying each endpoint.
pub const CONTEXTINFO: &str = "/_api/contextinfo";
pub const SITE: &str = "/_api/site?";
pub const GET_LIST: &str = "/_api/web/getList(";
pub const FILES: &str = "/_api/web/GetFolderByServerRelativeUrl(";
pub const PROCESS_QUERY: &str = "/_vti_bin/client.svc/ProcessQuery";

#[derive(Debug, Clone)]
pub enum MockResponse {
    Json(Value),
    Fail(String),
    Malformed,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub headers: RequestHeaders,
    pub body: Option<String>,
}

/// Routes requests by URL fragment; first match wins.
#[derive(Default)]
pub struct MockTransport {
    routes: Vec<(&'static str, MockResponse)>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every endpoint answers as a healthy app catalog would.
    pub fn healthy() -> Self {
        Self::new()
            .route(CONTEXTINFO, MockResponse::Json(json!({"FormDigestValue": DIGEST})))
            .route(SITE, MockResponse::Json(json!({"Id": SITE_ID})))
            .route(
                GET_LIST,
                MockResponse::Json(json!({"Id": LIST_ID, "ParentWeb": {"Id": WEB_ID}})),
            )
            .route(
                FILES,
                MockResponse::Json(json!({"ListItemAllFields": {"Id": 42, "owshiddenversion": 7}})),
            )
            .route(PROCESS_QUERY, MockResponse::Json(deployed_response(true)))
    }

    pub fn route(mut self, fragment: &'static str, response: MockResponse) -> Self {
        self.routes.push((fragment, response));
        self
    }

    /// Replace the response for `fragment`.
    pub fn with(mut self, fragment: &'static str, response: MockResponse) -> Self {
        self.routes.retain(|(f, _)| *f != fragment);
        self.routes.insert(0, (fragment, response));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, fragment: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.url.contains(fragment))
            .collect()
    }

    fn respond(
        &self,
        method: &'static str,
        url: &str,
        headers: &RequestHeaders,
        body: Option<String>,
    ) -> Result<Value, HttpError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });

        let response = self
            .routes
            .iter()
            .find(|(fragment, _)| url.contains(fragment))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| MockResponse::Fail(format!("no route for {url}")));

        match response {
            MockResponse::Json(value) => Ok(value),
            MockResponse::Fail(message) => Err(HttpError::Other(message)),
            MockResponse::Malformed => {
                Err(serde_json::from_str::<Value>("<html>").unwrap_err().into())
            }
        }
    }
}

impl SharePointTransport for MockTransport {
    fn get_json<'a>(
        &'a self,
        url: &'a str,
        headers: &'a RequestHeaders,
    ) -> BoxFuture<'a, Result<Value, HttpError>> {
        Box::pin(async move { self.respond("GET", url, headers, None) })
    }

    fn post_json<'a>(
        &'a self,
        url: &'a str,
        headers: &'a RequestHeaders,
        body: Option<String>,
    ) -> BoxFuture<'a, Result<Value, HttpError>> {
        Box::pin(async move { self.respond("POST", url, headers, body) })
    }
}

/// Hands out a fixed cookie header and remembers who asked.
#[derive(Default)]
pub struct StaticAuthenticator {
    pub reject: bool,
    pub seen: Mutex<Vec<(String, String)>>,
}

impl StaticAuthenticator {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }
}

impl Authenticator for StaticAuthenticator {
    fn authenticate<'a>(
        &'a self,
        site_url: &'a str,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<RequestHeaders, AuthError>> {
        Box::pin(async move {
            self.seen
                .lock()
                .unwrap()
                .push((site_url.to_string(), credentials.username.clone()));
            if self.reject {
                return Err(AuthError::Rejected("invalid username or password".to_string()));
            }
            Ok(RequestHeaders::new().with("Cookie", "FedAuth=fed; rtFa=rt"))
        })
    }
}

pub fn deployed_response(deployed: bool) -> Value {
    json!([
        {"SchemaVersion": "15.0.0.0", "LibraryVersion": "16.0.0.0", "ErrorInfo": null},
        6,
        {"IsClientSideSolutionCurrentVersionDeployed": deployed}
    ])
}

pub fn valid_options() -> DeployOptions {
    DeployOptions::new()
        .with_username("admin@contoso.onmicrosoft.com")
        .with_password("secret")
        .with_tenant("contoso")
        .with_site("sites/apps")
        .with_filename("solution.sppkg")
}
