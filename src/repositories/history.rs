//! SQLite-backed history repository.
//!
//! Recording a visit upserts by url: a known page gets its visit count
//! bumped and its title refreshed, an unknown page gets a fresh row.

use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rusqlite::{params, Connection};
use tokio::task;
use uuid::Uuid;

use super::HistoryRepository;
use crate::types::errors::RepositoryError;
use crate::types::history::HistoryEntry;

pub struct SqliteHistoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHistoryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<HistoryEntry> {
        Ok(HistoryEntry {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            last_visited: row.get(3)?,
            visit_count: row.get(4)?,
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

    fn collect_entries(
        conn: &Connection,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(args, Self::row_to_entry)
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| RepositoryError::Database(e.to_string()))?);
        }
        Ok(results)
    }
}

#[async_trait]
impl HistoryRepository for SqliteHistoryRepository {
    async fn visit(&self, url: &str, title: &str) -> Result<(), RepositoryError> {
        let (url, title) = (url.to_string(), title.to_string());
        self.with_conn(move |conn| {
            let now = Self::now();
            let affected = conn
                .execute(
                    "UPDATE history SET visit_count = visit_count + 1, \
                     last_visited = ?1, title = ?2 WHERE url = ?3",
                    params![now, title, url],
                )
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

            if affected == 0 {
                let id = Uuid::new_v4().to_string();
                conn.execute(
                    "INSERT INTO history (id, url, title, last_visited, visit_count) \
                     VALUES (?1, ?2, ?3, ?4, 1)",
                    params![id, url, title, now],
                )
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
            }
            Ok(())
        })
        .await
    }

    async fn find_entries_containing(
        &self,
        query: &str,
    ) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let pattern = format!("%{}%", query);
        self.with_conn(move |conn| {
            Self::collect_entries(
                conn,
                "SELECT id, url, title, last_visited, visit_count FROM history \
                 WHERE title LIKE ?1 OR url LIKE ?2 ORDER BY last_visited DESC LIMIT 5",
                &[&pattern as &dyn rusqlite::ToSql, &pattern],
            )
        })
        .await
    }

    async fn last_hundred_visited(&self) -> Result<Vec<HistoryEntry>, RepositoryError> {
        self.with_conn(|conn| {
            Self::collect_entries(
                conn,
                "SELECT id, url, title, last_visited, visit_count FROM history \
                 ORDER BY last_visited DESC LIMIT 100",
                &[],
            )
        })
        .await
    }

    async fn delete_entry(&self, url: &str) -> Result<(), RepositoryError> {
        let url = url.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM history WHERE url = ?1", params![url])
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn delete_all(&self) -> Result<(), RepositoryError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM history", [])
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }
}
