//! Core content types: article identity and front-matter metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::content::error::StoreError;

/// Timestamp format used in front matter and in the index.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time in [`TIME_FORMAT`].
pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIME_FORMAT).to_string()
}

/// Identity of a content document.
///
/// Common posts are keyed by their index id. The about page is a singleton
/// with a reserved id and never has an index record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArticleId {
    /// the reserved `about` page
    About,
    /// a post backed by an index record
    Post(i64),
}

impl ArticleId {
    /// the reserved id of the about page
    pub const ABOUT: &'static str = "about";

    /// index id, `None` for the about page
    pub fn post_id(&self) -> Option<i64> {
        match self {
            ArticleId::About => None,
            ArticleId::Post(id) => Some(*id),
        }
    }

    /// check if this is the singleton about page
    pub fn is_about(&self) -> bool {
        matches!(self, ArticleId::About)
    }
}

impl FromStr for ArticleId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == Self::ABOUT {
            return Ok(ArticleId::About);
        }
        // ids end up in paths, so only plain positive integers are accepted
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(StoreError::InvalidId(s.to_string()));
        }
        match s.parse::<i64>() {
            Ok(id) if id > 0 => Ok(ArticleId::Post(id)),
            _ => Err(StoreError::InvalidId(s.to_string())),
        }
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleId::About => write!(f, "{}", Self::ABOUT),
            ArticleId::Post(id) => write!(f, "{}", id),
        }
    }
}

impl Serialize for ArticleId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Front-matter metadata embedded at the head of every content file.
///
/// Keys are written lowercase; capitalized keys (`Title`, `Tags`, ...) from
/// older files are accepted on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "Tags")]
    pub tags: Vec<String>,
    #[serde(alias = "Description")]
    pub description: String,
    /// creation date, supplied by the author
    #[serde(alias = "Date")]
    pub date: String,
    /// recomputed on every save
    #[serde(alias = "Lastmod")]
    pub lastmod: String,
}

/// A decoded content document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Article {
    pub meta: Metadata,
    pub content: String,
}
