//! Profile store for loading spdeploy.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::paths::discover_profile_path;
use super::profile::{DEFAULT_PROFILE, Profile, ProfileFile};
use super::{DeployOptions, parser};

#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: Option<PathBuf>,
    explicit: bool,
}

impl ProfileStore {
    /// Discover the profile file from the current directory and the user config dir.
    pub fn discover() -> anyhow::Result<Self> {
        let global_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("spdeploy");
        let project_root = std::env::current_dir()?;

        Ok(Self::from_paths(&project_root, &global_dir))
    }

    pub fn from_paths(project_root: &Path, global_dir: &Path) -> Self {
        Self {
            path: discover_profile_path(project_root, global_dir),
            explicit: false,
        }
    }

    /// Use an explicit file; it must exist when loaded.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            explicit: true,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> anyhow::Result<ProfileFile> {
        match &self.path {
            Some(path) if self.explicit || path.exists() => parser::parse_profiles(path),
            _ => Ok(ProfileFile::new()),
        }
    }

    /// Options for the named profile, or for `default` when `name` is `None`.
    ///
    /// A missing `default` profile yields empty options; a missing named
    /// profile is an error.
    pub fn options(&self, name: Option<&str>) -> anyhow::Result<DeployOptions> {
        let file = self.load()?;
        match name {
            Some(name) => {
                let profile = file.get(name).cloned().with_context(|| {
                    format!(
                        "Profile '{}' not found{}",
                        name,
                        self.path
                            .as_ref()
                            .map(|p| format!(" in {}", p.display()))
                            .unwrap_or_default()
                    )
                })?;
                Ok(profile.into())
            }
            None => Ok(file
                .get(DEFAULT_PROFILE)
                .cloned()
                .unwrap_or_else(Profile::default)
                .into()),
        }
    }
}
