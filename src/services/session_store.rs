//! Persistence of frozen tab sessions across process death.
//!
//! The frozen tab list is serialized to JSON, encrypted with AES-256-GCM,
//! and stored as a single latest blob in the `sessions` table. Restoring
//! consumes the blob so a crash loop cannot replay stale tabs forever.

use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rusqlite::{params, Connection};
use tokio::task;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::services::crypto::CryptoService;
use crate::types::errors::SessionError;
use crate::types::session::{EncryptedData, FrozenTab};

/// Internal session encryption key derived from a fixed identifier.
/// In production this would use a machine-specific identifier.
const SESSION_KEY_PASSPHRASE: &str = "lantern-session-key-v1";
const SESSION_KEY_SALT: &[u8] = b"lantern-session";

/// Store of frozen tab sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists the frozen tab list, replacing any previous snapshot.
    async fn save(&self, tabs: Vec<FrozenTab>) -> Result<(), SessionError>;

    /// Reads and consumes the latest snapshot, if any.
    async fn restore(&self) -> Result<Option<Vec<FrozenTab>>, SessionError>;

    /// Discards any persisted snapshot.
    async fn clear(&self) -> Result<(), SessionError>;
}

/// Session store backed by SQLite + [`CryptoService`].
pub struct SqliteSessionStore {
    conn: Arc<Mutex<Connection>>,
    crypto: CryptoService,
    encryption_key: Zeroizing<Vec<u8>>,
}

impl SqliteSessionStore {
    /// Creates a new store, deriving the internal encryption key on
    /// construction.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Result<Self, SessionError> {
        let crypto = CryptoService::new();
        let encryption_key = crypto
            .derive_key(SESSION_KEY_PASSPHRASE, SESSION_KEY_SALT)
            .map_err(|e| SessionError::Crypto(e.to_string()))?;

        Ok(Self {
            conn,
            crypto,
            encryption_key: Zeroizing::new(encryption_key),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, SessionError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, SessionError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| SessionError::Database("connection lock poisoned".to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| SessionError::Database(format!("blocking task failed: {}", e)))?
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn save(&self, tabs: Vec<FrozenTab>) -> Result<(), SessionError> {
        let json =
            serde_json::to_vec(&tabs).map_err(|e| SessionError::Serialization(e.to_string()))?;
        let encrypted = self
            .crypto
            .encrypt(&json, &self.encryption_key)
            .map_err(|e| SessionError::Crypto(e.to_string()))?;

        let id = Uuid::new_v4().to_string();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        self.with_conn(move |conn| {
            // Only the latest snapshot matters.
            conn.execute("DELETE FROM sessions", [])
                .map_err(|e| SessionError::Database(e.to_string()))?;
            conn.execute(
                "INSERT INTO sessions (id, encrypted_data, iv, auth_tag, timestamp) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, encrypted.ciphertext, encrypted.iv, encrypted.auth_tag, timestamp],
            )
            .map_err(|e| SessionError::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn restore(&self) -> Result<Option<Vec<FrozenTab>>, SessionError> {
        let row = self
            .with_conn(|conn| {
                let result = conn.query_row(
                    "SELECT encrypted_data, iv, auth_tag FROM sessions \
                     ORDER BY timestamp DESC LIMIT 1",
                    [],
                    |row| {
                        Ok((
                            row.get::<_, Vec<u8>>(0)?,
                            row.get::<_, Vec<u8>>(1)?,
                            row.get::<_, Vec<u8>>(2)?,
                        ))
                    },
                );
                match result {
                    Ok(row) => {
                        conn.execute("DELETE FROM sessions", [])
                            .map_err(|e| SessionError::Database(e.to_string()))?;
                        Ok(Some(row))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(SessionError::Database(e.to_string())),
                }
            })
            .await?;

        let Some((ciphertext, iv, auth_tag)) = row else {
            return Ok(None);
        };

        let encrypted = EncryptedData {
            ciphertext,
            iv,
            auth_tag,
        };
        let json = self
            .crypto
            .decrypt(&encrypted, &self.encryption_key)
            .map_err(|e| SessionError::Crypto(e.to_string()))?;
        let tabs: Vec<FrozenTab> =
            serde_json::from_slice(&json).map_err(|e| SessionError::Serialization(e.to_string()))?;

        Ok(Some(tabs))
    }

    async fn clear(&self) -> Result<(), SessionError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM sessions", [])
                .map_err(|e| SessionError::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }
}
