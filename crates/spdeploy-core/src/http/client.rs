//! reqwest-backed SharePoint transport.

use reqwest::header::{CONTENT_LENGTH, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use super::{BoxFuture, HttpError, RequestHeaders, SharePointTransport};

/// Production transport. One client per run; connections are not shared
/// across deployments.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, HttpError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("spdeploy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        headers: &RequestHeaders,
    ) -> Result<Value, HttpError> {
        let response = request.headers(to_header_map(headers)?).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl SharePointTransport for ReqwestTransport {
    fn get_json<'a>(
        &'a self,
        url: &'a str,
        headers: &'a RequestHeaders,
    ) -> BoxFuture<'a, Result<Value, HttpError>> {
        Box::pin(async move { self.send(self.http.get(url), url, headers).await })
    }

    fn post_json<'a>(
        &'a self,
        url: &'a str,
        headers: &'a RequestHeaders,
        body: Option<String>,
    ) -> BoxFuture<'a, Result<Value, HttpError>> {
        Box::pin(async move {
            // IIS answers a POST without Content-Length with 411
            let request = match body {
                Some(body) => self.http.post(url).body(body),
                None => self.http.post(url).header(CONTENT_LENGTH, "0").body(""),
            };
            self.send(request, url, headers).await
        })
    }
}

pub(crate) fn to_header_map(headers: &RequestHeaders) -> Result<HeaderMap, HttpError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HttpError::InvalidHeader(name.to_string()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| HttpError::InvalidHeader(name.to_string()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
