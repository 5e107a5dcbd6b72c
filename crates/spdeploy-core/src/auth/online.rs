//! SharePoint Online user-credential authentication.
//!
//! Two round trips:
//! 1. POST a WS-Trust issue request with the username and password to the
//!    Microsoft security token service and read back the binary token.
//! 2. POST that token to the site's `/_forms/default.aspx?wa=wsignin1.0`
//!    endpoint and keep the `FedAuth` and `rtFa` cookies it sets.
//!
//! Federated (ADFS) realms are not handled; the STS answers them with a
//! fault that is surfaced as [`AuthError::Rejected`].

use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use reqwest::header::{CONTENT_TYPE, HeaderMap, SET_COOKIE};
use tracing::debug;
use url::Url;

use super::{AuthError, Authenticator, Credentials};
use crate::http::{BoxFuture, RequestHeaders};

const DEFAULT_STS_URL: &str = "https://login.microsoftonline.com/extSTS.srf";
const SIGN_IN_PATH: &str = "/_forms/default.aspx?wa=wsignin1.0";
const AUTH_COOKIES: [&str; 2] = ["FedAuth", "rtFa"];

/// WS-Trust issue request; every argument must already be XML-escaped.
fn token_request(sts: &str, endpoint: &str, username: &str, password: &str) -> String {
    format!(
        r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:a="http://www.w3.org/2005/08/addressing" xmlns:u="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd">
  <s:Header>
    <a:Action s:mustUnderstand="1">http://schemas.xmlsoap.org/ws/2005/02/trust/RST/Issue</a:Action>
    <a:ReplyTo><a:Address>http://www.w3.org/2005/08/addressing/anonymous</a:Address></a:ReplyTo>
    <a:To s:mustUnderstand="1">{sts}</a:To>
    <o:Security s:mustUnderstand="1" xmlns:o="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd">
      <o:UsernameToken>
        <o:Username>{username}</o:Username>
        <o:Password>{password}</o:Password>
      </o:UsernameToken>
    </o:Security>
  </s:Header>
  <s:Body>
    <t:RequestSecurityToken xmlns:t="http://schemas.xmlsoap.org/ws/2005/02/trust">
      <wsp:AppliesTo xmlns:wsp="http://schemas.xmlsoap.org/ws/2004/09/policy">
        <a:EndpointReference><a:Address>{endpoint}</a:Address></a:EndpointReference>
      </wsp:AppliesTo>
      <t:KeyType>http://schemas.xmlsoap.org/ws/2005/05/identity/NoProofKey</t:KeyType>
      <t:RequestType>http://schemas.xmlsoap.org/ws/2005/02/trust/Issue</t:RequestType>
      <t:TokenType>urn:oasis:names:tc:SAML:1.0:assertion</t:TokenType>
    </t:RequestSecurityToken>
  </s:Body>
</s:Envelope>"#
    )
}

/// Authenticates with a SharePoint Online username and password.
#[derive(Debug, Clone)]
pub struct OnlineAuthenticator {
    http: reqwest::Client,
    sts_url: String,
}

impl OnlineAuthenticator {
    pub fn new() -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("spdeploy/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            http,
            sts_url: DEFAULT_STS_URL.to_string(),
        })
    }

    /// Point the token request at another STS endpoint.
    pub fn with_sts_url(mut self, url: impl Into<String>) -> Self {
        self.sts_url = url.into();
        self
    }

    async fn request_token(
        &self,
        sign_in_url: &str,
        credentials: &Credentials,
    ) -> Result<SecurityToken, AuthError> {
        let body = token_request(
            &escape(self.sts_url.as_str()),
            &escape(sign_in_url),
            &escape(credentials.username.as_str()),
            &escape(credentials.password.as_str()),
        );

        let response = self
            .http
            .post(&self.sts_url)
            .header(CONTENT_TYPE, "application/soap+xml; charset=utf-8")
            .body(body)
            .send()
            .await?;
        let text = response.text().await?;

        parse_token_response(&text)
    }

    async fn sign_in(&self, sign_in_url: &str, token: &str) -> Result<String, AuthError> {
        let response = self
            .http
            .post(sign_in_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(token.to_string())
            .send()
            .await?;

        auth_cookie_header(response.headers()).ok_or_else(|| {
            AuthError::Rejected(format!(
                "sign-in at {} did not return the FedAuth and rtFa cookies (HTTP {})",
                sign_in_url,
                response.status().as_u16()
            ))
        })
    }
}

impl Authenticator for OnlineAuthenticator {
    fn authenticate<'a>(
        &'a self,
        site_url: &'a str,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<RequestHeaders, AuthError>> {
        Box::pin(async move {
            let sign_in_url = sign_in_url(site_url)?;
            debug!(user = %credentials.username, "requesting security token");

            let token = self.request_token(&sign_in_url, credentials).await?;
            if let Some(expires) = token.expires {
                debug!(%expires, "security token issued");
            }

            let cookie = self.sign_in(&sign_in_url, &token.value).await?;
            Ok(RequestHeaders::new().with("Cookie", cookie))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SecurityToken {
    value: String,
    expires: Option<DateTime<Utc>>,
}

fn sign_in_url(site_url: &str) -> Result<String, AuthError> {
    let url = Url::parse(site_url).map_err(|e| AuthError::InvalidSiteUrl {
        url: site_url.to_string(),
        reason: e.to_string(),
    })?;
    if url.host_str().is_none() {
        return Err(AuthError::InvalidSiteUrl {
            url: site_url.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(format!("{}{}", url.origin().ascii_serialization(), SIGN_IN_PATH))
}

fn parse_token_response(xml: &str) -> Result<SecurityToken, AuthError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut current: Option<Vec<u8>> = None;
    let mut token = None;
    let mut expires = None;
    let mut fault = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => current = Some(e.local_name().as_ref().to_vec()),
            Ok(Event::End(_)) => current = None,
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| AuthError::Protocol(e.to_string()))?
                    .into_owned();
                match current.as_deref() {
                    Some(b"BinarySecurityToken") => token = Some(text),
                    Some(b"Expires") if expires.is_none() => expires = Some(text),
                    Some(b"text") | Some(b"Text") if fault.is_none() => fault = Some(text),
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(AuthError::Protocol(e.to_string())),
        }
    }

    match (token, fault) {
        (Some(value), _) => Ok(SecurityToken {
            value,
            expires: expires
                .and_then(|e| DateTime::parse_from_rfc3339(&e).ok())
                .map(|e| e.with_timezone(&Utc)),
        }),
        (None, Some(fault)) => Err(AuthError::Rejected(fault)),
        (None, None) => Err(AuthError::Protocol(
            "security token missing from STS response".to_string(),
        )),
    }
}

fn auth_cookie_header(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<String> = AUTH_COOKIES
        .iter()
        .map(|name| {
            headers
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .filter_map(|cookie| cookie.split(';').next())
                .find(|pair| {
                    pair.split_once('=')
                        .is_some_and(|(key, value)| key.trim() == *name && !value.is_empty())
                })
                .map(|pair| pair.trim().to_string())
        })
        .collect::<Option<_>>()?;

    Some(pairs.join("; "))
}
