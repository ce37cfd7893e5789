//! The hybrid document store.
//!
//! Content files under the site tree are authoritative; the SQLite index is a
//! projection kept for listing and search. Every save writes the index first
//! and only touches the file once the index write succeeded, so a failed
//! index write never leaves a file the index doesn't know about.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::content::error::{PersistenceError, StoreError, StoreResult};
use crate::content::front_matter;
use crate::content::types::{now_timestamp, Article, ArticleId, Metadata};
use crate::index::{ArticleIndex, ArticleRecord, RecordFields};
use crate::site::{SiteLayout, IMAGE_PREFIX};

/// Owns the content tree and the article index.
pub struct DocumentStore {
    index: ArticleIndex,
    layout: SiteLayout,
}

impl DocumentStore {
    /// Create a store over an opened index and a site directory.
    pub fn new(index: ArticleIndex, layout: SiteLayout) -> Self {
        Self { index, layout }
    }

    pub fn index(&self) -> &ArticleIndex {
        &self.index
    }

    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    /// List indexed articles, most recently updated first.
    ///
    /// A non-empty `search` keeps only records whose title or tags contain it.
    pub fn list(&self, search: &str) -> StoreResult<Vec<ArticleRecord>> {
        let records = self.index.list(search)?;
        debug!(search, count = records.len(), "article list");
        Ok(records)
    }

    /// Save an article and return its id.
    ///
    /// `lastmod` is stamped with the current time. Without an id a new index
    /// record is created; with a post id the existing record is updated. The
    /// about page never touches the index.
    pub fn save(&self, id: Option<ArticleId>, mut meta: Metadata, body: &str) -> StoreResult<ArticleId> {
        let now = now_timestamp();
        meta.lastmod = now.clone();
        if meta.date.is_empty() {
            meta.date = now;
        }

        let id = self.write_index(id, &meta)?;
        let path = self.write_file(id, &meta, body)?;

        info!(%id, path = %path.display(), "article saved");
        Ok(id)
    }

    fn write_index(&self, id: Option<ArticleId>, meta: &Metadata) -> StoreResult<ArticleId> {
        let fields = RecordFields {
            title: meta.title.clone(),
            tags: RecordFields::join_tags(&meta.tags),
            create_time: meta.date.clone(),
            update_time: meta.lastmod.clone(),
        };

        match id {
            Some(ArticleId::About) => Ok(ArticleId::About),
            Some(ArticleId::Post(n)) => {
                self.index.update(n, &fields).map_err(|source| PersistenceError::Index {
                    id: n.to_string(),
                    source,
                })?;
                Ok(ArticleId::Post(n))
            }
            None => {
                let n = self.index.insert(&fields).map_err(|source| PersistenceError::Index {
                    id: "new".to_string(),
                    source,
                })?;
                Ok(ArticleId::Post(n))
            }
        }
    }

    fn write_file(&self, id: ArticleId, meta: &Metadata, body: &str) -> StoreResult<PathBuf> {
        let document = front_matter::render(meta, body).map_err(PersistenceError::from)?;

        let dir = self.layout.article_dir(id);
        fs::create_dir_all(&dir).map_err(|source| PersistenceError::File {
            path: dir.clone(),
            source,
        })?;

        let path = self.layout.article_file(id);
        fs::write(&path, document).map_err(|source| PersistenceError::File {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Load and decode an article.
    pub fn read(&self, id: ArticleId) -> StoreResult<Article> {
        let path = self.layout.article_file(id);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound(id)),
            Err(e) => return Err(StoreError::io(path, e)),
        };

        let decoded = front_matter::decode(&text);
        if !decoded.meta_parsed {
            warn!(%id, "article front matter unreadable");
        }
        Ok(Article {
            meta: decoded.meta,
            content: decoded.body,
        })
    }

    /// Remove articles from the index, then delete their directories.
    ///
    /// The index rows go in one batch; if that fails nothing on disk is
    /// touched. Directory deletion afterwards is best effort: missing
    /// directories are fine and other failures are only logged. The about
    /// page cannot be removed and is skipped.
    ///
    /// Returns the number of index rows deleted.
    pub fn remove(&self, ids: &[ArticleId]) -> StoreResult<usize> {
        let post_ids: Vec<i64> = ids.iter().filter_map(ArticleId::post_id).collect();
        if post_ids.len() != ids.len() {
            warn!("about page cannot be removed, skipping it");
        }

        let removed = self.index.delete(&post_ids)?;

        for n in post_ids {
            let dir = self.layout.article_dir(ArticleId::Post(n));
            match fs::remove_dir_all(&dir) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(id = n, "no content directory to delete");
                }
                Err(e) => warn!(id = n, error = %e, "cannot delete content directory"),
            }
        }

        info!(removed, "articles removed");
        Ok(removed)
    }

    /// Copy an image file into the article's image directory.
    ///
    /// Returns the site path to embed in the body.
    pub fn attach_image(&self, id: ArticleId, source: &Path) -> StoreResult<String> {
        let (local, site) = self.next_image_path(id)?;
        fs::copy(source, &local).map_err(|e| StoreError::io(source, e))?;
        info!(%id, from = %source.display(), to = %site, "image attached");
        Ok(site)
    }

    /// Store an in-memory image in the article's image directory.
    pub fn attach_image_bytes(&self, id: ArticleId, bytes: &[u8]) -> StoreResult<String> {
        let (local, site) = self.next_image_path(id)?;
        fs::write(&local, bytes).map_err(|e| StoreError::io(&local, e))?;
        info!(%id, size = bytes.len(), to = %site, "image attached");
        Ok(site)
    }

    /// Create the image directory and pick an unused timestamp file name.
    fn next_image_path(&self, id: ArticleId) -> StoreResult<(PathBuf, String)> {
        let dir = self.layout.image_dir(id);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let now = chrono::Utc::now();
        let mut stamp = now
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1000));
        loop {
            let name = format!("{}.png", stamp);
            let local = dir.join(&name);
            if !local.exists() {
                let site = format!("{}/{}/{}", IMAGE_PREFIX, id, name);
                return Ok((local, site));
            }
            stamp += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::QueryError;
    use tempfile::TempDir;

    fn setup() -> (TempDir, DocumentStore) {
        let dir = TempDir::new().unwrap();
        let index = ArticleIndex::open_in_memory().unwrap();
        let store = DocumentStore::new(index, SiteLayout::new(dir.path().join("site")));
        (dir, store)
    }

    fn meta(title: &str, tags: &[&str]) -> Metadata {
        Metadata {
            title: title.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: String::new(),
            date: "2024-01-01 10:00:00".to_string(),
            lastmod: String::new(),
        }
    }

    fn break_index(store: &DocumentStore) {
        store
            .index()
            .with_conn(|conn| Ok(conn.execute_batch("DROP TABLE t_article")?))
            .unwrap();
    }

    #[test]
    fn test_save_new_and_read() {
        let (_dir, store) = setup();
        let id = store.save(None, meta("First Post", &["a", "b"]), "hello").unwrap();
        assert!(matches!(id, ArticleId::Post(_)));

        let article = store.read(id).unwrap();
        assert_eq!(article.meta.title, "First Post");
        assert_eq!(article.meta.tags, vec!["a", "b"]);
        assert_eq!(article.meta.date, "2024-01-01 10:00:00");
        assert!(!article.meta.lastmod.is_empty());
        assert_eq!(article.content, "hello");

        let records = store.list("").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tags, "a,b");
        assert_eq!(records[0].create_time, "2024-01-01 10:00:00");
        assert_eq!(records[0].update_time, article.meta.lastmod);
    }

    #[test]
    fn test_save_same_id_twice_updates() {
        let (_dir, store) = setup();
        let id = store.save(None, meta("v1", &["x"]), "one").unwrap();

        let again = store.save(Some(id), meta("v2", &["y"]), "two").unwrap();
        assert_eq!(again, id);
        store.save(Some(id), meta("v2", &["y"]), "two").unwrap();

        assert_eq!(store.index().count().unwrap(), 1);
        let records = store.list("").unwrap();
        assert_eq!(records[0].title, "v2");

        let post_dir = store.layout().article_dir(id);
        let entries: Vec<_> = fs::read_dir(&post_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.read(id).unwrap().content, "two");
    }

    #[test]
    fn test_save_stamps_lastmod() {
        let (_dir, store) = setup();
        let mut m = meta("t", &[]);
        m.lastmod = "1970-01-01 00:00:00".into();
        let id = store.save(None, m, "").unwrap();
        assert_ne!(store.read(id).unwrap().meta.lastmod, "1970-01-01 00:00:00");
    }

    #[test]
    fn test_save_about_skips_index() {
        let (_dir, store) = setup();
        let id = store.save(Some(ArticleId::About), meta("About me", &["me"]), "bio").unwrap();
        assert_eq!(id, ArticleId::About);
        assert_eq!(store.index().count().unwrap(), 0);

        // works even when the index is unusable
        break_index(&store);
        store.save(Some(ArticleId::About), meta("About me", &[]), "bio v2").unwrap();

        let article = store.read(ArticleId::About).unwrap();
        assert_eq!(article.content, "bio v2");
        assert!(store.layout().article_file(ArticleId::About).exists());
    }

    #[test]
    fn test_index_failure_leaves_file_untouched() {
        let (_dir, store) = setup();
        let id = store.save(None, meta("keep", &[]), "original").unwrap();
        let path = store.layout().article_file(id);
        let before = fs::read_to_string(&path).unwrap();

        break_index(&store);

        let result = store.save(Some(id), meta("changed", &[]), "overwritten");
        assert!(matches!(
            result,
            Err(StoreError::Persistence(PersistenceError::Index { .. }))
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);

        let result = store.save(None, meta("new", &[]), "new body");
        assert!(result.is_err());
        let post_dirs: Vec<_> = fs::read_dir(store.layout().post_root()).unwrap().collect();
        assert_eq!(post_dirs.len(), 1);
    }

    #[test]
    fn test_update_unknown_id_writes_nothing() {
        let (_dir, store) = setup();
        let result = store.save(Some(ArticleId::Post(77)), meta("ghost", &[]), "boo");
        let err = result.unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(
            err,
            StoreError::Persistence(PersistenceError::Index {
                source: QueryError::MissingRecord(77),
                ..
            })
        ));
        assert!(!store.layout().article_file(ArticleId::Post(77)).exists());
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (_dir, store) = setup();
        let result = store.read(ArticleId::Post(12));
        assert!(matches!(result, Err(StoreError::NotFound(ArticleId::Post(12)))));
    }

    #[test]
    fn test_read_malformed_file() {
        let (_dir, store) = setup();
        let path = store.layout().article_file(ArticleId::Post(5));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "+++\nline a\nline b").unwrap();

        let article = store.read(ArticleId::Post(5)).unwrap();
        assert_eq!(article.meta, Metadata::default());
        assert_eq!(article.content, "line a\nline b");
    }

    #[test]
    fn test_list_filters_and_orders() {
        let (_dir, store) = setup();
        let a = store.save(None, meta("Rust tips", &["code"]), "").unwrap();
        let b = store.save(None, meta("Bread", &["food"]), "").unwrap();
        let c = store.save(None, meta("Pasta", &["food", "Rust"]), "").unwrap();

        // saved in the same second, newest id first
        let all: Vec<ArticleId> =
            store.list("").unwrap().iter().map(|r| ArticleId::Post(r.id)).collect();
        assert_eq!(all, vec![c, b, a]);

        let rust: Vec<ArticleId> =
            store.list("Rust").unwrap().iter().map(|r| ArticleId::Post(r.id)).collect();
        assert_eq!(rust, vec![c, a]);

        assert!(store.list("rust").unwrap().is_empty());
    }

    #[test]
    fn test_remove_with_missing_file() {
        let (_dir, store) = setup();
        let three = store.save(None, meta("three", &[]), "3").unwrap();
        let four = store.save(None, meta("four", &[]), "4").unwrap();
        let keep = store.save(None, meta("keep", &[]), "k").unwrap();
        fs::remove_dir_all(store.layout().article_dir(four)).unwrap();

        let removed = store.remove(&[three, four]).unwrap();
        assert_eq!(removed, 2);

        let remaining = store.list("").unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(ArticleId::Post(remaining[0].id), keep);
        assert!(!store.layout().article_dir(three).exists());
        assert!(store.layout().article_dir(keep).exists());
    }

    #[test]
    fn test_remove_index_failure_keeps_files() {
        let (_dir, store) = setup();
        let id = store.save(None, meta("stay", &[]), "").unwrap();
        break_index(&store);

        assert!(matches!(store.remove(&[id]), Err(StoreError::Query(_))));
        assert!(store.layout().article_file(id).exists());
    }

    #[test]
    fn test_remove_skips_about() {
        let (_dir, store) = setup();
        store.save(Some(ArticleId::About), meta("about", &[]), "").unwrap();
        assert_eq!(store.remove(&[ArticleId::About]).unwrap(), 0);
        assert!(store.layout().article_file(ArticleId::About).exists());
    }

    #[test]
    fn test_attach_image() {
        let (dir, store) = setup();
        let source = dir.path().join("pic.png");
        fs::write(&source, b"\x89PNG fake").unwrap();

        let id = ArticleId::Post(9);
        let first = store.attach_image(id, &source).unwrap();
        let second = store.attach_image(id, &source).unwrap();

        assert!(first.starts_with("/static/images/9/"));
        assert!(first.ends_with(".png"));
        assert_ne!(first, second);

        let local = store.layout().root().join(first.trim_start_matches('/'));
        assert_eq!(fs::read(local).unwrap(), b"\x89PNG fake");
    }

    #[test]
    fn test_attach_missing_image_fails() {
        let (dir, store) = setup();
        let result = store.attach_image(ArticleId::Post(1), &dir.path().join("nope.png"));
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_attach_image_bytes() {
        let (_dir, store) = setup();
        let site = store.attach_image_bytes(ArticleId::About, &[1, 2, 3]).unwrap();
        assert!(site.starts_with("/static/images/about/"));
        let local = store.layout().root().join(site.trim_start_matches('/'));
        assert_eq!(fs::read(local).unwrap(), vec![1, 2, 3]);
    }
}
