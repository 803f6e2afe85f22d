//! SQLite-backed downloads repository.

use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rusqlite::{params, Connection};
use tokio::task;
use uuid::Uuid;

use super::DownloadsRepository;
use crate::types::download::DownloadEntry;
use crate::types::errors::RepositoryError;

pub struct SqliteDownloadsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDownloadsRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<DownloadEntry> {
        Ok(DownloadEntry {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            content_size: row.get(3)?,
        })
    }

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
impl DownloadsRepository for SqliteDownloadsRepository {
    async fn add_if_not_exists(&self, entry: DownloadEntry) -> Result<bool, RepositoryError> {
        self.with_conn(move |conn| {
            let exists: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM downloads WHERE url = ?1",
                    params![entry.url],
                    |row| row.get(0),
                )
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
            if exists > 0 {
                return Ok(false);
            }

            let id = if entry.id.is_empty() {
                Uuid::new_v4().to_string()
            } else {
                entry.id.clone()
            };
            conn.execute(
                "INSERT INTO downloads (id, url, title, content_size, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, entry.url, entry.title, entry.content_size, Self::now()],
            )
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
            Ok(true)
        })
        .await
    }

    async fn find_download_for_url(
        &self,
        url: &str,
    ) -> Result<Option<DownloadEntry>, RepositoryError> {
        let url = url.to_string();
        self.with_conn(move |conn| {
            let result = conn.query_row(
                "SELECT id, url, title, content_size FROM downloads WHERE url = ?1",
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

    async fn all_downloads_sorted(&self) -> Result<Vec<DownloadEntry>, RepositoryError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, url, title, content_size FROM downloads \
                     ORDER BY created_at DESC, url",
                )
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

            let rows = stmt
                .query_map([], Self::row_to_entry)
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

            let mut results = Vec::new();
            for row in rows {
                results.push(row.map_err(|e| RepositoryError::Database(e.to_string()))?);
            }
            Ok(results)
        })
        .await
    }

    async fn delete_download(&self, url: &str) -> Result<(), RepositoryError> {
        let url = url.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM downloads WHERE url = ?1", params![url])
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn delete_all_downloads(&self) -> Result<(), RepositoryError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM downloads", [])
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }
}
