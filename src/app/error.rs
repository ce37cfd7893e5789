//! Aggregate error for the caller-facing facade.

use thiserror::Error;

use crate::config::ConfigError;
use crate::content::StoreError;
use crate::deploy::DeployError;
use crate::index::QueryError;
use crate::settings::SettingsError;
use crate::site::{GeneratorError, SiteError};

/// Every failure an application operation can report.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("index error: {0}")]
    Index(#[from] QueryError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("site error: {0}")]
    Site(#[from] SiteError),

    #[error("generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("deploy error: {0}")]
    Deploy(#[from] DeployError),

    /// the remote refused the stored username or token
    #[error("github credentials were rejected, check username and token: {0}")]
    CredentialsRejected(DeployError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("cannot encode response: {0}")]
    Json(#[from] serde_json::Error),

    /// publishing needs username, token, email and repository
    #[error("github settings are incomplete")]
    IncompleteSettings,

    #[error("no preview is running")]
    NoPreview,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
