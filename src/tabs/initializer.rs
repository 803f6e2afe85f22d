//! Declarative descriptions of how a new tab gets its first content.

use crate::services::pages::PageFactories;
use crate::types::errors::PageError;
use crate::types::session::FrozenTab;

/// How a freshly created tab is initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabInitializer {
    /// Load the generated start page.
    Home,
    /// Load an arbitrary url.
    Url(String),
    /// Build and load the generated history page.
    HistoryPage,
    /// Build and load the generated downloads page.
    DownloadsPage,
    /// Build and load the generated bookmarks page.
    BookmarksPage,
    /// Leave the tab blank (used by the panic flow).
    NoOp,
    /// Rehydrate a frozen tab; its url is seeded, not loaded.
    Restore(FrozenTab),
}

impl TabInitializer {
    /// Resolves the initializer to the url the tab should load, building the
    /// backing page artifact where one is needed. `None` means no load is
    /// issued (blank tabs, restored tabs which seed their state directly).
    pub async fn resolve(&self, pages: &PageFactories) -> Result<Option<String>, PageError> {
        match self {
            TabInitializer::Home => pages.home.build_page().await.map(Some),
            TabInitializer::Url(url) => Ok(Some(url.clone())),
            TabInitializer::HistoryPage => pages.history.build_page().await.map(Some),
            TabInitializer::DownloadsPage => pages.download.build_page().await.map(Some),
            TabInitializer::BookmarksPage => pages.bookmark.build_page().await.map(Some),
            TabInitializer::NoOp => Ok(None),
            TabInitializer::Restore(_) => Ok(None),
        }
    }
}
