//! Form digest retrieval.

use serde_json::Value;

use super::contextinfo_url;
use crate::error::{DeployError, DeployStage};
use crate::http::{HttpError, RequestHeaders, SharePointTransport};

const TRANSPORT_FAILURE: &str = "failed to retrieve site and web ID";
const MISSING_DIGEST: &str = "digest value could not be retrieved";

/// POST `_api/contextinfo` and return `FormDigestValue`.
///
/// The caller adds the value to later requests as `X-RequestDigest`.
pub async fn fetch_digest(
    transport: &dyn SharePointTransport,
    site_url: &str,
    headers: &RequestHeaders,
) -> Result<String, DeployError> {
    let url = contextinfo_url(site_url);
    let body = transport
        .post_json(&url, headers, None)
        .await
        .map_err(|e| match e {
            HttpError::Json(e) => DeployError::Parse {
                stage: DeployStage::Digest,
                url: url.clone(),
                message: e.to_string(),
            },
            other => {
                tracing::debug!(error = %other, "contextinfo request failed");
                DeployError::transport(DeployStage::Digest, TRANSPORT_FAILURE)
            }
        })?;

    digest_from(&body)
        .map(str::to_string)
        .ok_or_else(|| DeployError::shape(DeployStage::Digest, MISSING_DIGEST))
}

fn digest_from(body: &Value) -> Option<&str> {
    body.get("FormDigestValue")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
}
