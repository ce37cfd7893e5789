//! Deployment error types.

use thiserror::Error;

use crate::deploy::types::DeployStage;
use crate::site::GeneratorError;

/// A failed deployment, tagged with the stage that stopped it.
#[derive(Debug, Error)]
pub enum DeployError {
    /// the generator failed (GENERATE)
    #[error("GENERATE failed: {0}")]
    Build(#[from] GeneratorError),

    /// a version-control stage failed
    #[error("{stage} failed: {source}")]
    Git {
        stage: DeployStage,
        #[source]
        source: git2::Error,
    },
}

impl DeployError {
    pub(crate) fn git(stage: DeployStage, source: git2::Error) -> Self {
        DeployError::Git { stage, source }
    }

    /// the stage that failed
    pub fn stage(&self) -> DeployStage {
        match self {
            DeployError::Build(_) => DeployStage::Generate,
            DeployError::Git { stage, .. } => *stage,
        }
    }

    /// check if the failure looks like bad credentials
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            DeployError::Git { source, .. } if source.code() == git2::ErrorCode::Auth
                || source.class() == git2::ErrorClass::Http && source.message().contains("401")
        )
    }
}

/// result type alias for deployments
pub type DeployResult<T> = Result<T, DeployError>;
