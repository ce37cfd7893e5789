//! SQLite-backed article index.
//!
//! Wraps a single `rusqlite::Connection` behind a mutex so callers on
//! different threads are serialized. All reads go through the generic
//! row mapper.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection};

use crate::index::error::{QueryError, QueryResult};
use crate::index::mapper::query_as;
use crate::index::record::{ArticleRecord, RecordFields};
use crate::index::schema::SCHEMA;

const LIST_ALL: &str = "SELECT * FROM t_article ORDER BY update_time DESC, id DESC";

// instr() is case-sensitive where LIKE is not
const LIST_MATCHING: &str = "SELECT * FROM t_article \
     WHERE instr(title, ?1) > 0 OR instr(tags, ?1) > 0 \
     ORDER BY update_time DESC, id DESC";

/// The secondary, searchable index over articles.
pub struct ArticleIndex {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl ArticleIndex {
    /// Open (creating if needed) the index file at `path`.
    pub fn open(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| QueryError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::with_connection(conn, Some(path.to_path_buf()))
    }

    /// Open a throwaway index that lives only in memory.
    pub fn open_in_memory() -> QueryResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, None)
    }

    fn with_connection(conn: Connection, path: Option<PathBuf>) -> QueryResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Location of the index file, `None` for in-memory indexes.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> QueryResult<T>
    where
        F: FnOnce(&Connection) -> QueryResult<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// List records, newest update first.
    ///
    /// An empty `search` returns everything; otherwise only records whose
    /// title or tags contain `search`.
    pub fn list(&self, search: &str) -> QueryResult<Vec<ArticleRecord>> {
        self.with_conn(|conn| {
            if search.is_empty() {
                query_as(conn, LIST_ALL, [])
            } else {
                query_as(conn, LIST_MATCHING, [search])
            }
        })
    }

    /// Fetch a single record.
    pub fn get(&self, id: i64) -> QueryResult<Option<ArticleRecord>> {
        self.with_conn(|conn| {
            let mut records: Vec<ArticleRecord> =
                query_as(conn, "SELECT * FROM t_article WHERE id = ?1", [id])?;
            Ok(records.pop())
        })
    }

    /// Insert a new record and return its allocated id.
    pub fn insert(&self, fields: &RecordFields) -> QueryResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO t_article (title, tags, create_time, update_time) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    fields.title,
                    fields.tags,
                    fields.create_time,
                    fields.update_time,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Update title, tags and update time of an existing record.
    ///
    /// Fails with [`QueryError::MissingRecord`] when no row has `id`.
    pub fn update(&self, id: i64, fields: &RecordFields) -> QueryResult<()> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE t_article SET title = ?1, tags = ?2, update_time = ?3 WHERE id = ?4",
                params![
                    fields.title,
                    fields.tags,
                    fields.update_time,
                    id,
                ],
            )?;
            if changed == 0 {
                return Err(QueryError::MissingRecord(id));
            }
            Ok(())
        })
    }

    /// Delete every record in `ids` with one statement.
    ///
    /// Returns the number of rows removed; ids without a row are ignored.
    pub fn delete(&self, ids: &[i64]) -> QueryResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!("DELETE FROM t_article WHERE id IN ({})", placeholders);

        self.with_conn(|conn| Ok(conn.execute(&sql, params_from_iter(ids.iter()))?))
    }

    /// Number of indexed articles.
    pub fn count(&self) -> QueryResult<usize> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM t_article", [], |row| row.get(0))?;
            Ok(n as usize)
        })
    }
}
