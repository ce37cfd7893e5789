//! Site-level error types: generator runs, configuration and assets.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from running the external site generator.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// the generator binary could not be started
    #[error("cannot start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// the generator ran and exited unsuccessfully
    #[error("build failed: `{command}` exited with {}: {stderr}", code_display(.code))]
    Build {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// scaffolding the site tree failed
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn code_display(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "a signal".to_string(),
    }
}

/// result type alias for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Errors from the site configuration document and site assets.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse site configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot encode site configuration: {0}")]
    Encode(#[from] toml::ser::Error),

    /// asset paths must stay inside the site directory
    #[error("invalid asset path: {0:?}")]
    InvalidAssetPath(String),
}

impl SiteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SiteError::Io {
            path: path.into(),
            source,
        }
    }
}

/// result type alias for site configuration operations
pub type SiteResult<T> = Result<T, SiteError>;
