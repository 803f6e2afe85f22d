use serde::{Deserialize, Serialize};

/// A completed or recorded download shown on the downloads page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadEntry {
    pub id: String,
    pub url: String,
    pub title: String,
    pub content_size: i64,
}

/// A download request crossing the boundary to the download subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDownload {
    pub url: String,
    pub user_agent: Option<String>,
    pub content_disposition: Option<String>,
    pub mime_type: Option<String>,
    /// Size in bytes, 0 if unknown.
    pub content_length: u64,
}
