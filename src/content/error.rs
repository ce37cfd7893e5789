//! Document store error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::content::types::ArticleId;
use crate::index::QueryError;

/// Errors from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// reading the index failed
    #[error("index query failed: {0}")]
    Query(#[from] QueryError),

    /// a save could not be persisted
    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),

    /// the content file does not exist
    #[error("article not found: {0}")]
    NotFound(ArticleId),

    /// the id is neither `about` nor a positive integer
    #[error("invalid article id: {0:?}")]
    InvalidId(String),

    /// file-system failure outside the save path (reads, image copies)
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a save did not reach disk.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// the index insert or update failed; the file was not touched
    #[error("index write for article {id} failed: {source}")]
    Index {
        id: String,
        #[source]
        source: QueryError,
    },

    /// the content file could not be written
    #[error("cannot write {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// metadata could not be serialized
    #[error("cannot encode front matter: {0}")]
    Encode(#[from] toml::ser::Error),
}

impl StoreError {
    /// check if this error means the article doesn't exist
    pub fn is_not_found(&self) -> bool {
        match self {
            StoreError::NotFound(_) => true,
            StoreError::Persistence(PersistenceError::Index { source, .. }) => {
                source.is_not_found()
            }
            _ => false,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// result type alias for document store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(StoreError::NotFound(ArticleId::Post(1)).is_not_found());

        let missing = StoreError::Persistence(PersistenceError::Index {
            id: "5".into(),
            source: QueryError::MissingRecord(5),
        });
        assert!(missing.is_not_found());

        assert!(!StoreError::InvalidId("x".into()).is_not_found());
    }
}
