//! Article index: the SQLite projection used for listing and search.
//!
//! [`mapper`] holds the shape-agnostic row mapping used by every read;
//! [`ArticleIndex`] owns the connection and the `t_article` table.

mod db;
mod error;
pub mod mapper;
mod record;
mod schema;

pub use db::ArticleIndex;
pub use error::{QueryError, QueryResult};
pub use mapper::{query_as, FieldBinding, FromRow, Setter};
pub use record::{ArticleRecord, RecordFields};
