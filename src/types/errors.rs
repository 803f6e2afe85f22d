use std::fmt;

use crate::types::TabId;

// === TabError ===

/// Errors related to tab registry operations.
#[derive(Debug)]
pub enum TabError {
    /// No live session with the given ID.
    NotFound(TabId),
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabError::NotFound(id) => write!(f, "Tab not found: {}", id),
        }
    }
}

impl std::error::Error for TabError {}

// === RepositoryError ===

/// Errors surfaced by the bookmark, history, and download stores.
#[derive(Debug)]
pub enum RepositoryError {
    /// Database operation failed.
    Database(String),
    /// The record addressed by the operation does not exist.
    NotFound(String),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::Database(msg) => write!(f, "Repository database error: {}", msg),
            RepositoryError::NotFound(what) => write!(f, "Record not found: {}", what),
        }
    }
}

impl std::error::Error for RepositoryError {}

// === CryptoError ===

/// Errors related to cryptographic operations.
#[derive(Debug)]
pub enum CryptoError {
    /// Failed to derive encryption key from a passphrase.
    KeyDerivation(String),
    /// Encryption operation failed.
    Encryption(String),
    /// Decryption operation failed.
    Decryption(String),
    /// Failed to generate random bytes.
    RandomGeneration(String),
    /// The provided key is invalid.
    InvalidKey(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::KeyDerivation(msg) => write!(f, "Key derivation failed: {}", msg),
            CryptoError::Encryption(msg) => write!(f, "Encryption failed: {}", msg),
            CryptoError::Decryption(msg) => write!(f, "Decryption failed: {}", msg),
            CryptoError::RandomGeneration(msg) => {
                write!(f, "Random generation failed: {}", msg)
            }
            CryptoError::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
        }
    }
}

impl std::error::Error for CryptoError {}

// === SessionError ===

/// Errors related to freezing and thawing tab sessions.
#[derive(Debug)]
pub enum SessionError {
    /// Failed to serialize or deserialize the frozen tab list.
    Serialization(String),
    /// Database operation failed.
    Database(String),
    /// Cryptographic operation failed during freeze/thaw.
    Crypto(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Serialization(msg) => {
                write!(f, "Session serialization error: {}", msg)
            }
            SessionError::Database(msg) => write!(f, "Session database error: {}", msg),
            SessionError::Crypto(msg) => write!(f, "Session crypto error: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

// === PageError ===

/// Errors related to generating the internal HTML pages.
#[derive(Debug)]
pub enum PageError {
    /// Writing or removing the page artifact failed.
    Io(String),
    /// Fetching the data behind the page failed.
    Data(String),
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::Io(msg) => write!(f, "Page I/O error: {}", msg),
            PageError::Data(msg) => write!(f, "Page data error: {}", msg),
        }
    }
}

impl std::error::Error for PageError {}

// === ActionError ===

/// Errors produced by the user-action dispatch surface.
#[derive(Debug)]
pub enum ActionError {
    /// The action variant is recognized but deliberately not supported by
    /// this core (e.g. incognito tabs).
    Unsupported(&'static str),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Unsupported(what) => write!(f, "Unsupported action: {}", what),
        }
    }
}

impl std::error::Error for ActionError {}
