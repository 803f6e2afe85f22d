//! Generators for the browser's internal HTML pages.
//!
//! Each factory renders its page into the data directory and returns the
//! `file://` url to load. The bookmark factory emits one page per folder in
//! addition to the root page, so folder links on the root page resolve to
//! real artifacts whose filename encodes the folder title.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::browser::urls;
use crate::repositories::{BookmarkRepository, DownloadsRepository, HistoryRepository};
use crate::types::bookmark::{Bookmark, Folder};
use crate::types::errors::PageError;

/// Minimal folder glyph inlined into bookmark pages as a data uri.
const FOLDER_ICON_SVG: &[u8] =
    b"<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'>\
      <path d='M10 4H4a2 2 0 0 0-2 2v12a2 2 0 0 0 2 2h16a2 2 0 0 0 2-2V8a2 2 0 0 0-2-2h-8z'/>\
      </svg>";

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn page_shell(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head>\
         <body><h1>{}</h1><ul>{}</ul></body></html>",
        escape_html(title),
        escape_html(title),
        body
    )
}

async fn write_page(path: &Path, html: &str) -> Result<String, PageError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PageError::Io(e.to_string()))?;
    }
    tokio::fs::write(path, html)
        .await
        .map_err(|e| PageError::Io(e.to_string()))?;
    Ok(file_url(path))
}

async fn remove_page(path: &Path) -> Result<(), PageError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PageError::Io(e.to_string())),
    }
}

/// Builds the bookmark pages: the root page plus one page per folder.
pub struct BookmarkPageFactory {
    dir: PathBuf,
    bookmarks: Arc<dyn BookmarkRepository>,
}

impl BookmarkPageFactory {
    pub fn new(dir: PathBuf, bookmarks: Arc<dyn BookmarkRepository>) -> Self {
        Self { dir, bookmarks }
    }

    fn folder_path(&self, title: &str) -> PathBuf {
        self.dir
            .join(format!("{}-{}", title, urls::BOOKMARKS_FILENAME))
    }

    fn render(&self, title: &str, items: &[Bookmark]) -> String {
        let folder_icon = format!(
            "data:image/svg+xml;base64,{}",
            BASE64.encode(FOLDER_ICON_SVG)
        );
        let body: String = items
            .iter()
            .map(|item| match item {
                Bookmark::Entry(entry) => format!(
                    "<li><a href=\"{}\">{}</a></li>",
                    escape_html(&entry.url),
                    escape_html(&entry.title)
                ),
                Bookmark::Folder(folder) => format!(
                    "<li><img src=\"{}\" alt=\"\"><a href=\"{}\">{}</a></li>",
                    folder_icon,
                    file_url(&self.folder_path(folder.title())),
                    escape_html(folder.title())
                ),
            })
            .collect();
        page_shell(title, &body)
    }

    /// Regenerates the root page and every folder page; returns the root url.
    pub async fn build_page(&self) -> Result<String, PageError> {
        let mut root_items = self
            .bookmarks
            .bookmarks_from_folder_sorted(&Folder::Root)
            .await
            .map_err(|e| PageError::Data(e.to_string()))?;
        let folders = self
            .bookmarks
            .folders_sorted()
            .await
            .map_err(|e| PageError::Data(e.to_string()))?;
        root_items.extend(folders.iter().cloned());

        for item in &folders {
            if let Bookmark::Folder(named @ Folder::Entry { .. }) = item {
                let items = self
                    .bookmarks
                    .bookmarks_from_folder_sorted(named)
                    .await
                    .map_err(|e| PageError::Data(e.to_string()))?;
                let html = self.render(named.title(), &items);
                write_page(&self.folder_path(named.title()), &html).await?;
            }
        }

        let html = self.render("Bookmarks", &root_items);
        write_page(&self.dir.join(urls::BOOKMARKS_FILENAME), &html).await
    }

    /// Removes the root page and any folder pages.
    pub async fn delete_pages(&self) -> Result<(), PageError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(PageError::Io(e.to_string())),
        };
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| PageError::Io(e.to_string()))?
        {
            let name = entry.file_name();
            if name.to_string_lossy().ends_with(urls::BOOKMARKS_FILENAME) {
                remove_page(&entry.path()).await?;
            }
        }
        Ok(())
    }
}

/// Builds the history page from the most recent visits.
pub struct HistoryPageFactory {
    dir: PathBuf,
    history: Arc<dyn HistoryRepository>,
}

impl HistoryPageFactory {
    pub fn new(dir: PathBuf, history: Arc<dyn HistoryRepository>) -> Self {
        Self { dir, history }
    }

    pub async fn build_page(&self) -> Result<String, PageError> {
        let entries = self
            .history
            .last_hundred_visited()
            .await
            .map_err(|e| PageError::Data(e.to_string()))?;
        let body: String = entries
            .iter()
            .map(|entry| {
                format!(
                    "<li><a href=\"{}\">{}</a></li>",
                    escape_html(&entry.url),
                    escape_html(if entry.title.is_empty() {
                        &entry.url
                    } else {
                        &entry.title
                    })
                )
            })
            .collect();
        write_page(
            &self.dir.join(urls::HISTORY_FILENAME),
            &page_shell("History", &body),
        )
        .await
    }

    pub async fn delete_page(&self) -> Result<(), PageError> {
        remove_page(&self.dir.join(urls::HISTORY_FILENAME)).await
    }
}

/// Builds the downloads page from the download records.
pub struct DownloadPageFactory {
    dir: PathBuf,
    downloads: Arc<dyn DownloadsRepository>,
}

impl DownloadPageFactory {
    pub fn new(dir: PathBuf, downloads: Arc<dyn DownloadsRepository>) -> Self {
        Self { dir, downloads }
    }

    pub async fn build_page(&self) -> Result<String, PageError> {
        let entries = self
            .downloads
            .all_downloads_sorted()
            .await
            .map_err(|e| PageError::Data(e.to_string()))?;
        let body: String = entries
            .iter()
            .map(|entry| {
                format!(
                    "<li><a href=\"{}\">{}</a> ({} bytes)</li>",
                    escape_html(&entry.url),
                    escape_html(&entry.title),
                    entry.content_size
                )
            })
            .collect();
        write_page(
            &self.dir.join(urls::DOWNLOADS_FILENAME),
            &page_shell("Downloads", &body),
        )
        .await
    }

    pub async fn delete_page(&self) -> Result<(), PageError> {
        remove_page(&self.dir.join(urls::DOWNLOADS_FILENAME)).await
    }
}

/// Builds the static start page.
pub struct HomePageFactory {
    dir: PathBuf,
}

impl HomePageFactory {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub async fn build_page(&self) -> Result<String, PageError> {
        let html = "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
                    <title>Start</title></head>\
                    <body><form><input type=\"search\" autofocus></form></body></html>";
        write_page(&self.dir.join(urls::START_PAGE_FILENAME), html).await
    }
}

/// The full set of page factories handed to the registry and synchronizer.
pub struct PageFactories {
    pub bookmark: BookmarkPageFactory,
    pub history: HistoryPageFactory,
    pub download: DownloadPageFactory,
    pub home: HomePageFactory,
}

impl PageFactories {
    pub fn new(
        dir: PathBuf,
        bookmarks: Arc<dyn BookmarkRepository>,
        history: Arc<dyn HistoryRepository>,
        downloads: Arc<dyn DownloadsRepository>,
    ) -> Self {
        Self {
            bookmark: BookmarkPageFactory::new(dir.clone(), bookmarks),
            history: HistoryPageFactory::new(dir.clone(), history),
            download: DownloadPageFactory::new(dir.clone(), downloads),
            home: HomePageFactory::new(dir),
        }
    }
}
