//! SQLite connection management for Lantern.
//!
//! Provides the [`Database`] struct that wraps a shared `rusqlite::Connection`
//! and automatically runs schema migrations on open.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use super::migrations;

/// Shared handle to the browser database connection.
///
/// Repositories run their statements on the blocking thread pool, so the
/// connection is shared behind an `Arc<Mutex<_>>`; a clone of that handle is
/// what [`Database::connection`] hands out.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) a SQLite database at the given path and runs
    /// migrations.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        migrations::run_all(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory SQLite database and runs migrations.
    ///
    /// Useful for testing — the database is discarded when the last handle
    /// is dropped.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        migrations::run_all(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Returns a shared handle to the underlying connection for the
    /// repositories and stores to run queries against.
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }
}
