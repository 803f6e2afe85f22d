//! Asynchronous persistent stores the browser core depends on.
//!
//! The synchronizer only ever sees these traits; the SQLite implementations
//! below run every statement on the blocking thread pool so repository work
//! never stalls the main context.

pub mod bookmarks;
pub mod downloads;
pub mod history;

use async_trait::async_trait;

use crate::types::bookmark::{Bookmark, BookmarkEntry, Folder};
use crate::types::download::DownloadEntry;
use crate::types::errors::RepositoryError;
use crate::types::history::HistoryEntry;

pub use bookmarks::SqliteBookmarkRepository;
pub use downloads::SqliteDownloadsRepository;
pub use history::SqliteHistoryRepository;

/// CRUD and query store for bookmarks and their folders.
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Entries filed directly in `folder`, sorted by position then title.
    async fn bookmarks_from_folder_sorted(
        &self,
        folder: &Folder,
    ) -> Result<Vec<Bookmark>, RepositoryError>;

    /// All named folders, sorted by title. Folders only exist at root level.
    async fn folders_sorted(&self) -> Result<Vec<Bookmark>, RepositoryError>;

    /// Titles of all named folders, sorted.
    async fn folder_names(&self) -> Result<Vec<String>, RepositoryError>;

    /// Whether a bookmark for exactly this url exists.
    async fn is_bookmark(&self, url: &str) -> Result<bool, RepositoryError>;

    /// The bookmark entry for this url, if any.
    async fn find_bookmark_for_url(
        &self,
        url: &str,
    ) -> Result<Option<BookmarkEntry>, RepositoryError>;

    /// Adds the entry unless one with the same url already exists.
    /// Returns whether a row was inserted.
    async fn add_bookmark_if_not_exists(
        &self,
        entry: BookmarkEntry,
    ) -> Result<bool, RepositoryError>;

    /// Replaces `old` (matched by url) with `new`.
    async fn edit_bookmark(
        &self,
        old: BookmarkEntry,
        new: BookmarkEntry,
    ) -> Result<(), RepositoryError>;

    /// Deletes the entry matching the url. Returns whether a row was removed.
    async fn delete_bookmark(&self, entry: BookmarkEntry) -> Result<bool, RepositoryError>;

    /// Renames a folder on every entry filed under it.
    async fn rename_folder(&self, old_title: &str, new_title: &str)
        -> Result<(), RepositoryError>;

    /// Dissolves a folder, moving its entries to the root.
    async fn delete_folder(&self, title: &str) -> Result<(), RepositoryError>;
}

/// Store of recorded page visits.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Records a visit, bumping the count for an already-known url.
    async fn visit(&self, url: &str, title: &str) -> Result<(), RepositoryError>;

    /// Entries whose url or title contains the query, most recent first.
    async fn find_entries_containing(
        &self,
        query: &str,
    ) -> Result<Vec<HistoryEntry>, RepositoryError>;

    /// The most recent hundred visits, used to build the history page.
    async fn last_hundred_visited(&self) -> Result<Vec<HistoryEntry>, RepositoryError>;

    /// Removes the entry for the url; absent urls complete silently.
    async fn delete_entry(&self, url: &str) -> Result<(), RepositoryError>;

    /// Clears the whole visit log.
    async fn delete_all(&self) -> Result<(), RepositoryError>;
}

/// Store of recorded downloads.
#[async_trait]
pub trait DownloadsRepository: Send + Sync {
    /// Records a download unless its url is already known.
    async fn add_if_not_exists(&self, entry: DownloadEntry) -> Result<bool, RepositoryError>;

    /// The download record for this url, if any.
    async fn find_download_for_url(
        &self,
        url: &str,
    ) -> Result<Option<DownloadEntry>, RepositoryError>;

    /// All downloads, most recent first, used to build the downloads page.
    async fn all_downloads_sorted(&self) -> Result<Vec<DownloadEntry>, RepositoryError>;

    /// Removes the record for the url; absent urls complete silently.
    async fn delete_download(&self, url: &str) -> Result<(), RepositoryError>;

    /// Clears every download record.
    async fn delete_all_downloads(&self) -> Result<(), RepositoryError>;
}
