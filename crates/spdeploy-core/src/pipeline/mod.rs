//! Deployment pipeline.
//!
//! A run moves strictly forward through [`PipelineStage`]s. The first
//! failing stage ends the run in [`PipelineStage::Failed`] with that stage's
//! error; nothing is retried, skipped or rolled back.

use std::borrow::Cow;
use std::fmt;

use tracing::{debug, info};

use crate::auth::{Authenticator, Credentials};
use crate::config::{DeployOptions, DeploymentConfig};
use crate::error::DeployError;
use crate::http::SharePointTransport;
use crate::payload::{DEFAULT_TEMPLATE, build_payload};
use crate::sharepoint::{
    SiteIdentity, fetch_digest, fetch_file_info, fetch_site_id, fetch_web_and_list_id,
    invoke_deploy,
};
use crate::site::resolve_site_url;

/// Emit a stage-boundary line: `info` in verbose mode, `debug` otherwise.
macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            info!($($arg)+);
        } else {
            debug!($($arg)+);
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Validating,
    ResolvingUrl,
    Authenticating,
    FetchingDigest,
    ResolvingMetadata,
    BuildingPayload,
    Deploying,
    Succeeded,
    Failed,
}

impl PipelineStage {
    /// The stage that follows on success; `None` for terminal stages.
    pub fn next(self) -> Option<Self> {
        use PipelineStage::*;
        match self {
            Validating => Some(ResolvingUrl),
            ResolvingUrl => Some(Authenticating),
            Authenticating => Some(FetchingDigest),
            FetchingDigest => Some(ResolvingMetadata),
            ResolvingMetadata => Some(BuildingPayload),
            BuildingPayload => Some(Deploying),
            Deploying => Some(Succeeded),
            Succeeded | Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Succeeded | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineStage::Validating => "validating configuration",
            PipelineStage::ResolvingUrl => "resolving site URL",
            PipelineStage::Authenticating => "authenticating",
            PipelineStage::FetchingDigest => "retrieving request digest",
            PipelineStage::ResolvingMetadata => "resolving site, list and file metadata",
            PipelineStage::BuildingPayload => "building deployment request",
            PipelineStage::Deploying => "deploying solution",
            PipelineStage::Succeeded => "deployment succeeded",
            PipelineStage::Failed => "deployment failed",
        };
        f.write_str(label)
    }
}

type StageObserver<'a> = Box<dyn Fn(PipelineStage) + Send + Sync + 'a>;

/// Runs one deployment attempt against a site.
pub struct DeployPipeline<'a> {
    authenticator: &'a dyn Authenticator,
    transport: &'a dyn SharePointTransport,
    template: Cow<'a, str>,
    observer: Option<StageObserver<'a>>,
}

impl<'a> DeployPipeline<'a> {
    pub fn new(
        authenticator: &'a dyn Authenticator,
        transport: &'a dyn SharePointTransport,
    ) -> Self {
        Self {
            authenticator,
            transport,
            template: Cow::Borrowed(DEFAULT_TEMPLATE),
            observer: None,
        }
    }

    /// Replace the built-in ProcessQuery template.
    pub fn with_template(mut self, template: impl Into<Cow<'a, str>>) -> Self {
        self.template = template.into();
        self
    }

    /// Called on every stage transition, terminal stages included.
    pub fn with_observer(mut self, observer: impl Fn(PipelineStage) + Send + Sync + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Validate `options`, then deploy.
    pub async fn run(&self, options: DeployOptions) -> Result<(), DeployError> {
        self.enter(PipelineStage::Validating, false);
        let config = DeploymentConfig::new(options).map_err(|e| self.fail(false, e.into()))?;
        self.deploy(&config).await
    }

    /// Deploy with an already validated configuration.
    pub async fn deploy(&self, config: &DeploymentConfig) -> Result<(), DeployError> {
        let verbose = config.verbose();
        match self.execute(config).await {
            Ok(()) => {
                self.enter(PipelineStage::Succeeded, verbose);
                Ok(())
            }
            Err(e) => Err(self.fail(verbose, e)),
        }
    }

    async fn execute(&self, config: &DeploymentConfig) -> Result<(), DeployError> {
        let verbose = config.verbose();

        self.enter(PipelineStage::ResolvingUrl, verbose);
        let site_url = resolve_site_url(config);
        progress!(verbose, site_url = %site_url, "site URL resolved");

        self.enter(PipelineStage::Authenticating, verbose);
        let credentials = Credentials::new(config.username(), config.password());
        let headers = self
            .authenticator
            .authenticate(&site_url, &credentials)
            .await?
            .with_json();

        self.enter(PipelineStage::FetchingDigest, verbose);
        let digest = fetch_digest(self.transport, &site_url, &headers).await?;
        let headers = headers.with_digest(&digest);

        self.enter(PipelineStage::ResolvingMetadata, verbose);
        let (site_id, web_and_list, file) = tokio::try_join!(
            fetch_site_id(self.transport, &site_url, &headers),
            fetch_web_and_list_id(self.transport, &site_url, config.site(), &headers),
            fetch_file_info(self.transport, &site_url, config.filename(), &headers),
        )?;
        let identity = SiteIdentity {
            site_id,
            web_id: web_and_list.web_id,
            list_id: web_and_list.list_id,
        };
        progress!(
            verbose,
            site_id = %identity.site_id,
            web_id = %identity.web_id,
            list_id = %identity.list_id,
            item_id = file.item_id,
            version = file.hidden_version,
            "metadata resolved"
        );

        self.enter(PipelineStage::BuildingPayload, verbose);
        let payload = build_payload(
            &self.template,
            &identity,
            &file,
            config.skip_feature_deployment(),
        )?;

        self.enter(PipelineStage::Deploying, verbose);
        invoke_deploy(self.transport, &site_url, &headers, payload).await
    }

    fn enter(&self, stage: PipelineStage, verbose: bool) {
        progress!(verbose, stage = ?stage, "{}", stage);
        if let Some(observer) = &self.observer {
            observer(stage);
        }
    }

    fn fail(&self, verbose: bool, error: DeployError) -> DeployError {
        progress!(verbose, error = %error, "{}", PipelineStage::Failed);
        if let Some(observer) = &self.observer {
            observer(PipelineStage::Failed);
        }
        error
    }
}
