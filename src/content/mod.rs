//! Content documents: front-matter files plus their index projection.

mod error;
pub mod front_matter;
mod store;
mod types;

pub use error::{PersistenceError, StoreError, StoreResult};
pub use front_matter::{Decoded, Layout, Split};
pub use store::DocumentStore;
pub use types::{now_timestamp, Article, ArticleId, Metadata, TIME_FORMAT};
