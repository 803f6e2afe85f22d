//! Classification of special internal urls.
//!
//! The browser serves a handful of pages itself — bookmarks, history,
//! downloads, and the start page — as generated `file://` artifacts. These
//! urls must not be shared, bookmarked, recorded in history, or naively
//! reloaded.

/// Root bookmark page artifact. Folder pages use `<folder>-bookmarks.html`.
pub const BOOKMARKS_FILENAME: &str = "bookmarks.html";
pub const HISTORY_FILENAME: &str = "history.html";
pub const DOWNLOADS_FILENAME: &str = "downloads.html";
pub const START_PAGE_FILENAME: &str = "homepage.html";

const FILE_SCHEME: &str = "file://";

pub fn is_bookmark_url(url: &str) -> bool {
    url.starts_with(FILE_SCHEME) && url.ends_with(BOOKMARKS_FILENAME)
}

pub fn is_history_url(url: &str) -> bool {
    url.starts_with(FILE_SCHEME) && url.ends_with(HISTORY_FILENAME)
}

pub fn is_downloads_url(url: &str) -> bool {
    url.starts_with(FILE_SCHEME) && url.ends_with(DOWNLOADS_FILENAME)
}

pub fn is_start_page_url(url: &str) -> bool {
    url.starts_with(FILE_SCHEME) && url.ends_with(START_PAGE_FILENAME)
}

/// Whether the url is served by the browser itself rather than the network.
pub fn is_special_url(url: &str) -> bool {
    is_bookmark_url(url) || is_history_url(url) || is_downloads_url(url) || is_start_page_url(url)
}

/// Extracts the folder title from a folder bookmark-page url
/// (`.../<folder>-bookmarks.html`), or `None` for the root page.
pub fn folder_title_from_bookmark_url(url: &str) -> Option<String> {
    if !is_bookmark_url(url) {
        return None;
    }
    let filename = url.rsplit('/').next()?;
    let stem = filename.strip_suffix(BOOKMARKS_FILENAME)?;
    let folder = stem.strip_suffix('-')?;
    if folder.is_empty() {
        None
    } else {
        Some(folder.to_string())
    }
}
