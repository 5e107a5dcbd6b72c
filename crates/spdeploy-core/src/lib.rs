//! spdeploy Core Library
//!
//! Deploys a packaged solution that already sits in a SharePoint app
//! catalog: authenticates, resolves the site, catalog and package
//! identifiers, and flips the package's deployment state through the CSOM
//! `ProcessQuery` endpoint.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod payload;
pub mod pipeline;
pub mod sharepoint;
pub mod site;

use config::DeployOptions;

/// Validate `options` and run one deployment attempt with the default template.
pub async fn deploy(
    options: DeployOptions,
    authenticator: &dyn auth::Authenticator,
    transport: &dyn http::SharePointTransport,
) -> Result<(), error::DeployError> {
    pipeline::DeployPipeline::new(authenticator, transport)
        .run(options)
        .await
}

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        ConfigError, DeployOptions, DeploymentConfig, Profile, ProfileFile, ProfileStore,
        SiteHost,
    };

    // Authentication
    pub use crate::auth::{AuthError, Authenticator, Credentials, OnlineAuthenticator};

    // Transport
    pub use crate::http::{HttpError, ReqwestTransport, RequestHeaders, SharePointTransport};

    // Pipeline
    pub use crate::error::{DeployError, DeployStage};
    pub use crate::pipeline::{DeployPipeline, PipelineStage};
    pub use crate::sharepoint::{FileInfo, SiteIdentity};
    pub use crate::site::resolve_site_url;
}
