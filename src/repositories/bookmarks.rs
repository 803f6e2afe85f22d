//! SQLite-backed bookmark repository.
//!
//! Folders are implicit: a named folder exists while at least one bookmark
//! carries its title in the `folder` column, and the empty string is the
//! root. This keeps the two-level tree invariant enforceable in SQL alone.

use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rusqlite::{params, Connection};
use tokio::task;

use super::BookmarkRepository;
use crate::types::bookmark::{Bookmark, BookmarkEntry, Folder};
use crate::types::errors::RepositoryError;

pub struct SqliteBookmarkRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBookmarkRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<BookmarkEntry> {
        let folder: String = row.get(2)?;
        Ok(BookmarkEntry {
            url: row.get(0)?,
            title: row.get(1)?,
            folder: Folder::from_title(&folder),
            position: row.get::<_, i64>(3)? as u32,
        })
    }

    /// Runs a closure against the shared connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, RepositoryError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| RepositoryError::Database("connection lock poisoned".to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| RepositoryError::Database(format!("blocking task failed: {}", e)))?
    }
}

#[async_trait]
impl BookmarkRepository for SqliteBookmarkRepository {
    async fn bookmarks_from_folder_sorted(
        &self,
        folder: &Folder,
    ) -> Result<Vec<Bookmark>, RepositoryError> {
        let folder_title = folder.title().to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT url, title, folder, position FROM bookmarks \
                     WHERE folder = ?1 ORDER BY position, title",
                )
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

            let rows = stmt
                .query_map(params![folder_title], Self::row_to_entry)
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

            let mut results = Vec::new();
            for row in rows {
                results.push(Bookmark::Entry(
                    row.map_err(|e| RepositoryError::Database(e.to_string()))?,
                ));
            }
            Ok(results)
        })
        .await
    }

    async fn folders_sorted(&self) -> Result<Vec<Bookmark>, RepositoryError> {
        Ok(self
            .folder_names()
            .await?
            .into_iter()
            .map(|title| Bookmark::Folder(Folder::Entry { title }))
            .collect())
    }

    async fn folder_names(&self) -> Result<Vec<String>, RepositoryError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT DISTINCT folder FROM bookmarks \
                     WHERE folder != '' ORDER BY folder",
                )
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

            let mut names = Vec::new();
            for row in rows {
                names.push(row.map_err(|e| RepositoryError::Database(e.to_string()))?);
            }
            Ok(names)
        })
        .await
    }

    async fn is_bookmark(&self, url: &str) -> Result<bool, RepositoryError> {
        let url = url.to_string();
        self.with_conn(move |conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM bookmarks WHERE url = ?1",
                    params![url],
                    |row| row.get(0),
                )
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
            Ok(count > 0)
        })
        .await
    }

    async fn find_bookmark_for_url(
        &self,
        url: &str,
    ) -> Result<Option<BookmarkEntry>, RepositoryError> {
        let url = url.to_string();
        self.with_conn(move |conn| {
            let result = conn.query_row(
                "SELECT url, title, folder, position FROM bookmarks WHERE url = ?1",
                params![url],
                Self::row_to_entry,
            );
            match result {
                Ok(entry) => Ok(Some(entry)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(RepositoryError::Database(e.to_string())),
            }
        })
        .await
    }

    async fn add_bookmark_if_not_exists(
        &self,
        entry: BookmarkEntry,
    ) -> Result<bool, RepositoryError> {
        self.with_conn(move |conn| {
            let exists: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM bookmarks WHERE url = ?1",
                    params![entry.url],
                    |row| row.get(0),
                )
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
            if exists > 0 {
                return Ok(false);
            }

            let position: i64 = conn
                .query_row(
                    "SELECT COALESCE(MAX(position), -1) + 1 FROM bookmarks WHERE folder = ?1",
                    params![entry.folder.title()],
                    |row| row.get(0),
                )
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

            conn.execute(
                "INSERT INTO bookmarks (url, title, folder, position, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.url,
                    entry.title,
                    entry.folder.title(),
                    position,
                    Self::now()
                ],
            )
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
            Ok(true)
        })
        .await
    }

    async fn edit_bookmark(
        &self,
        old: BookmarkEntry,
        new: BookmarkEntry,
    ) -> Result<(), RepositoryError> {
        self.with_conn(move |conn| {
            conn.execute(
                "UPDATE bookmarks SET url = ?1, title = ?2, folder = ?3 WHERE url = ?4",
                params![new.url, new.title, new.folder.title(), old.url],
            )
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn delete_bookmark(&self, entry: BookmarkEntry) -> Result<bool, RepositoryError> {
        self.with_conn(move |conn| {
            let affected = conn
                .execute("DELETE FROM bookmarks WHERE url = ?1", params![entry.url])
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
            Ok(affected > 0)
        })
        .await
    }

    async fn rename_folder(
        &self,
        old_title: &str,
        new_title: &str,
    ) -> Result<(), RepositoryError> {
        let (old_title, new_title) = (old_title.to_string(), new_title.to_string());
        self.with_conn(move |conn| {
            conn.execute(
                "UPDATE bookmarks SET folder = ?1 WHERE folder = ?2",
                params![new_title, old_title],
            )
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn delete_folder(&self, title: &str) -> Result<(), RepositoryError> {
        // Dissolving a folder moves its entries to the root rather than
        // deleting them.
        self.rename_folder(title, "").await
    }
}
