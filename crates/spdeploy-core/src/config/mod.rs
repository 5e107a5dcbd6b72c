//! Deployment configuration
//!
//! Raw options are collected from flags, environment and profiles into a
//! [`DeployOptions`], then validated into an immutable [`DeploymentConfig`]
//! before any network activity happens.

pub mod parser;
pub mod paths;
pub mod profile;
pub mod store;

pub use parser::{parse_profiles, parse_profiles_str};
pub use paths::{discover_profile_path, global_profile_path};
pub use profile::{Profile, ProfileFile};
pub use store::ProfileStore;

/// Validation failures, reported for the first missing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("username is required")]
    MissingUsername,
    #[error("password is required")]
    MissingPassword,
    #[error("tenant or hostname is required")]
    MissingTenantOrHostname,
    #[error("site is required")]
    MissingSite,
    #[error("filename is required")]
    MissingFilename,
}

/// Raw, unvalidated deployment options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOptions {
    pub username: Option<String>,
    pub password: Option<String>,
    pub tenant: Option<String>,
    pub hostname: Option<String>,
    pub site: Option<String>,
    pub filename: Option<String>,
    /// Defaults to `true` when absent
    pub skip_feature_deployment: Option<bool>,
    /// Defaults to `false` when absent
    pub verbose: Option<bool>,
}

impl DeployOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Set the hostname, including its scheme (e.g. `https://contoso.sharepoint.com`)
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_skip_feature_deployment(mut self, skip: bool) -> Self {
        self.skip_feature_deployment = Some(skip);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Fill every unset field from `fallback`, keeping values already present.
    ///
    /// Tenant and hostname form one slot: if either is set here, neither is
    /// taken from `fallback`.
    pub fn or(self, fallback: DeployOptions) -> Self {
        let (tenant, hostname) = if self.tenant.is_some() || self.hostname.is_some() {
            (self.tenant, self.hostname)
        } else {
            (fallback.tenant, fallback.hostname)
        };
        Self {
            username: self.username.or(fallback.username),
            password: self.password.or(fallback.password),
            tenant,
            hostname,
            site: self.site.or(fallback.site),
            filename: self.filename.or(fallback.filename),
            skip_feature_deployment: self
                .skip_feature_deployment
                .or(fallback.skip_feature_deployment),
            verbose: self.verbose.or(fallback.verbose),
        }
    }
}

/// Where the site lives: a tenant name or an explicit hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteHost {
    /// `contoso` resolves to `https://contoso.sharepoint.com`
    Tenant(String),
    /// Used verbatim, scheme included
    Hostname(String),
}

/// Validated deployment configuration. Immutable once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    username: String,
    password: String,
    host: SiteHost,
    site: String,
    filename: String,
    skip_feature_deployment: bool,
    verbose: bool,
}

impl DeploymentConfig {
    /// Apply defaults and validate.
    ///
    /// Fields are checked in a fixed order: username, password,
    /// tenant/hostname, site, filename. Blank values count as missing;
    /// present values are stored as given.
    pub fn new(options: DeployOptions) -> Result<Self, ConfigError> {
        let username = non_blank(options.username).ok_or(ConfigError::MissingUsername)?;
        let password = options
            .password
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingPassword)?;

        let host = match (non_blank(options.hostname), non_blank(options.tenant)) {
            (Some(hostname), _) => SiteHost::Hostname(hostname),
            (None, Some(tenant)) => SiteHost::Tenant(tenant),
            (None, None) => return Err(ConfigError::MissingTenantOrHostname),
        };

        let site = non_blank(options.site).ok_or(ConfigError::MissingSite)?;
        let filename = non_blank(options.filename).ok_or(ConfigError::MissingFilename)?;

        Ok(Self {
            username,
            password,
            host,
            site,
            filename,
            skip_feature_deployment: options.skip_feature_deployment.unwrap_or(true),
            verbose: options.verbose.unwrap_or(false),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn host(&self) -> &SiteHost {
        &self.host
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn skip_feature_deployment(&self) -> bool {
        self.skip_feature_deployment
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

impl std::fmt::Debug for DeploymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("site", &self.site)
            .field("filename", &self.filename)
            .field("skip_feature_deployment", &self.skip_feature_deployment)
            .field("verbose", &self.verbose)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
