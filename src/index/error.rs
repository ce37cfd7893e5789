//! Index layer error types.

use thiserror::Error;

/// Errors raised while reading from or writing to the article index.
#[derive(Debug, Error)]
pub enum QueryError {
    /// error from the underlying SQLite driver
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// the index file could not be opened
    #[error("cannot open index at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// an update targeted a record that does not exist
    #[error("no index record with id {0}")]
    MissingRecord(i64),
}

impl QueryError {
    /// check if this error means the record simply wasn't there
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            QueryError::MissingRecord(_) | QueryError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        )
    }
}

/// result type alias for index operations
pub type QueryResult<T> = Result<T, QueryError>;
