//! The searchable projection of an article.

use serde::{Deserialize, Serialize};

use crate::index::mapper::{FieldBinding, FromRow};

/// One row of the article index.
///
/// The index is never the source of truth for content; it only backs
/// listing and search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub id: i64,
    pub title: String,
    /// tags joined with `,`
    pub tags: String,
    pub create_time: String,
    pub update_time: String,
}

static ARTICLE_RECORD_BINDINGS: &[FieldBinding<ArticleRecord>] = &[
    FieldBinding::integer("Id", |r: &mut ArticleRecord, v| r.id = v),
    FieldBinding::text("Title", |r: &mut ArticleRecord, v| r.title = v),
    FieldBinding::text("Tags", |r: &mut ArticleRecord, v| r.tags = v),
    FieldBinding::text("CreateTime", |r: &mut ArticleRecord, v| r.create_time = v),
    FieldBinding::text("UpdateTime", |r: &mut ArticleRecord, v| r.update_time = v),
];

impl FromRow for ArticleRecord {
    fn bindings() -> &'static [FieldBinding<Self>] {
        ARTICLE_RECORD_BINDINGS
    }
}

impl ArticleRecord {
    /// Split the joined tag column back into individual tags.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Column values written on insert or update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields {
    pub title: String,
    pub tags: String,
    /// only used on insert; updates never move the creation time
    pub create_time: String,
    pub update_time: String,
}

impl RecordFields {
    /// Join a tag sequence into the stored column format.
    pub fn join_tags<S: AsRef<str>>(tags: &[S]) -> String {
        tags.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",")
    }
}
