//! Deployment error types.

use std::fmt;

use crate::auth::AuthError;
use crate::config::ConfigError;

/// Network-facing step a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeployStage {
    Digest,
    SiteId,
    WebAndListId,
    FileInfo,
    Deploy,
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployStage::Digest => "digest",
            DeployStage::SiteId => "site id",
            DeployStage::WebAndListId => "web and list id",
            DeployStage::FileInfo => "file info",
            DeployStage::Deploy => "deploy",
        };
        f.write_str(name)
    }
}

/// Errors produced by a deployment run.
///
/// `Transport` and `Shape` display exactly the descriptive message of the
/// failing step, so callers printing the error see the same text regardless
/// of which variant carried it.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{message}")]
    Transport { stage: DeployStage, message: String },

    #[error("{message}")]
    Shape { stage: DeployStage, message: String },

    #[error("invalid JSON response from {url}: {message}")]
    Parse {
        stage: DeployStage,
        url: String,
        message: String,
    },

    #[error("{0}")]
    Template(String),
}

impl DeployError {
    pub(crate) fn transport(stage: DeployStage, message: impl Into<String>) -> Self {
        DeployError::Transport {
            stage,
            message: message.into(),
        }
    }

    pub(crate) fn shape(stage: DeployStage, message: impl Into<String>) -> Self {
        DeployError::Shape {
            stage,
            message: message.into(),
        }
    }

    /// The network step that failed, if the failure happened on the wire.
    pub fn stage(&self) -> Option<DeployStage> {
        match self {
            DeployError::Transport { stage, .. }
            | DeployError::Shape { stage, .. }
            | DeployError::Parse { stage, .. } => Some(*stage),
            DeployError::Config(_) | DeployError::Auth(_) | DeployError::Template(_) => None,
        }
    }
}
