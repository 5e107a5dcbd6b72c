//! Site, app catalog and package lookups.
//!
//! Each lookup is a single GET through [`request_json`]; the three are
//! independent of each other and only need the digest-bearing headers.

use serde_json::Value;

use super::{FileInfo, WebAndList, app_catalog_list_url, file_info_url, site_id_url};
use crate::error::{DeployError, DeployStage};
use crate::http::{HttpError, RequestHeaders, SharePointTransport};

const MISSING_SITE_ID: &str = "site ID could not be retrieved";
const MISSING_WEB_AND_LIST_ID: &str = "web ID and list ID could not be retrieved";
const MISSING_FILE_INFO: &str = "file information could not be retrieved";

/// GET `url` and return the parsed JSON body.
///
/// Transport failures name the URL; a body that is not JSON is a parse
/// failure and is not retried or recovered.
pub async fn request_json(
    transport: &dyn SharePointTransport,
    stage: DeployStage,
    url: &str,
    headers: &RequestHeaders,
) -> Result<Value, DeployError> {
    transport.get_json(url, headers).await.map_err(|e| match e {
        HttpError::Json(e) => DeployError::Parse {
            stage,
            url: url.to_string(),
            message: e.to_string(),
        },
        other => DeployError::transport(stage, format!("request to {} failed: {}", url, other)),
    })
}

pub async fn fetch_site_id(
    transport: &dyn SharePointTransport,
    site_url: &str,
    headers: &RequestHeaders,
) -> Result<String, DeployError> {
    let body = request_json(
        transport,
        DeployStage::SiteId,
        &site_id_url(site_url),
        headers,
    )
    .await?;

    site_id_from(&body).ok_or_else(|| DeployError::shape(DeployStage::SiteId, MISSING_SITE_ID))
}

pub async fn fetch_web_and_list_id(
    transport: &dyn SharePointTransport,
    site_url: &str,
    site: &str,
    headers: &RequestHeaders,
) -> Result<WebAndList, DeployError> {
    let body = request_json(
        transport,
        DeployStage::WebAndListId,
        &app_catalog_list_url(site_url, site),
        headers,
    )
    .await?;

    web_and_list_from(&body)
        .ok_or_else(|| DeployError::shape(DeployStage::WebAndListId, MISSING_WEB_AND_LIST_ID))
}

pub async fn fetch_file_info(
    transport: &dyn SharePointTransport,
    site_url: &str,
    filename: &str,
    headers: &RequestHeaders,
) -> Result<FileInfo, DeployError> {
    let body = request_json(
        transport,
        DeployStage::FileInfo,
        &file_info_url(site_url, filename),
        headers,
    )
    .await?;

    file_info_from(&body).ok_or_else(|| DeployError::shape(DeployStage::FileInfo, MISSING_FILE_INFO))
}

pub(crate) fn site_id_from(body: &Value) -> Option<String> {
    non_empty_str(body.get("Id")?).map(str::to_string)
}

/// The list's own `Id` is the list ID; the expanded `ParentWeb.Id` is the web ID.
pub(crate) fn web_and_list_from(body: &Value) -> Option<WebAndList> {
    let list_id = non_empty_str(body.get("Id")?)?;
    let web_id = non_empty_str(body.get("ParentWeb")?.get("Id")?)?;
    Some(WebAndList {
        web_id: web_id.to_string(),
        list_id: list_id.to_string(),
    })
}

/// Both values must be present and non-zero. A genuine `owshiddenversion`
/// of 0 is therefore reported as missing.
pub(crate) fn file_info_from(body: &Value) -> Option<FileInfo> {
    let fields = body.get("ListItemAllFields")?;
    let item_id = non_zero(fields.get("Id")?)?;
    let hidden_version = non_zero(fields.get("owshiddenversion")?)?;
    Some(FileInfo {
        item_id,
        hidden_version,
    })
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

fn non_zero(value: &Value) -> Option<u64> {
    let number = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.filter(|n| *n != 0)
}
