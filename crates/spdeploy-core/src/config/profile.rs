//! Deployment profile schema (spdeploy.toml)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::DeployOptions;

/// Name used when no profile is requested.
pub const DEFAULT_PROFILE: &str = "default";

/// Contents of a profile file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileFile {
    /// Named profiles, `[profile.<name>]`
    #[serde(default)]
    pub profile: BTreeMap<String, Profile>,
}

/// A named set of deployment defaults. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub username: Option<String>,
    /// Accepted for completeness; prefer SPDEPLOY_PASSWORD or the prompt
    pub password: Option<String>,
    pub tenant: Option<String>,
    pub hostname: Option<String>,
    pub site: Option<String>,
    pub filename: Option<String>,
    pub skip_feature_deployment: Option<bool>,
    pub verbose: Option<bool>,
}

impl ProfileFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profile.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profile.keys().map(String::as_str)
    }

    /// Check structural constraints that TOML typing cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, profile) in &self.profile {
            if name.trim().is_empty() {
                anyhow::bail!("Profile names cannot be empty");
            }
            if profile.tenant.is_some() && profile.hostname.is_some() {
                anyhow::bail!(
                    "Profile '{}' sets both tenant and hostname; keep only one",
                    name
                );
            }
        }
        Ok(())
    }
}

impl From<Profile> for DeployOptions {
    fn from(profile: Profile) -> Self {
        DeployOptions {
            username: profile.username,
            password: profile.password,
            tenant: profile.tenant,
            hostname: profile.hostname,
            site: profile.site,
            filename: profile.filename,
            skip_feature_deployment: profile.skip_feature_deployment,
            verbose: profile.verbose,
        }
    }
}
