//! ProcessQuery payload construction.
//!
//! The payload is a CSOM action script with `{token}` placeholders. Every
//! occurrence of a token is replaced; tokens the template does not use are
//! simply skipped.

use uuid::Uuid;

use crate::error::DeployError;
use crate::sharepoint::{FileInfo, SiteIdentity};

/// Built-in action script: marks the package item deployed and queries
/// `IsClientSideSolutionCurrentVersionDeployed`.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../assets/deploy-request.xml");

pub const RANDOM_ID_TOKEN: &str = "{randomId}";
pub const SITE_ID_TOKEN: &str = "{siteId}";
pub const WEB_ID_TOKEN: &str = "{webId}";
pub const LIST_ID_TOKEN: &str = "{listId}";
pub const ITEM_ID_TOKEN: &str = "{itemId}";
pub const FILE_VERSION_TOKEN: &str = "{fileVersion}";
pub const SKIP_FEATURE_DEPLOYMENT_TOKEN: &str = "{skipFeatureDeployment}";

/// Every token the builder substitutes.
pub const TOKENS: [&str; 7] = [
    RANDOM_ID_TOKEN,
    SITE_ID_TOKEN,
    WEB_ID_TOKEN,
    LIST_ID_TOKEN,
    ITEM_ID_TOKEN,
    FILE_VERSION_TOKEN,
    SKIP_FEATURE_DEPLOYMENT_TOKEN,
];

/// Substitute the resolved identifiers into `template`.
///
/// A fresh random identifier is generated per call and shared by every
/// `{randomId}` occurrence.
pub fn build_payload(
    template: &str,
    identity: &SiteIdentity,
    file: &FileInfo,
    skip_feature_deployment: bool,
) -> Result<String, DeployError> {
    build_payload_with_id(
        template,
        &Uuid::new_v4().to_string(),
        identity,
        file,
        skip_feature_deployment,
    )
}

/// Same as [`build_payload`] with a caller-chosen random identifier.
pub fn build_payload_with_id(
    template: &str,
    random_id: &str,
    identity: &SiteIdentity,
    file: &FileInfo,
    skip_feature_deployment: bool,
) -> Result<String, DeployError> {
    if template.is_empty() {
        return Err(DeployError::Template(
            "deployment template is empty".to_string(),
        ));
    }

    Ok(template
        .replace(RANDOM_ID_TOKEN, random_id)
        .replace(SITE_ID_TOKEN, &identity.site_id)
        .replace(WEB_ID_TOKEN, &identity.web_id)
        .replace(LIST_ID_TOKEN, &identity.list_id)
        .replace(ITEM_ID_TOKEN, &file.item_id.to_string())
        .replace(FILE_VERSION_TOKEN, &file.hidden_version.to_string())
        .replace(
            SKIP_FEATURE_DEPLOYMENT_TOKEN,
            if skip_feature_deployment { "true" } else { "false" },
        ))
}
