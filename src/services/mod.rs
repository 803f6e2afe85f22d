pub mod crypto;
pub mod pages;
pub mod session_store;

pub use pages::{
    BookmarkPageFactory, DownloadPageFactory, HistoryPageFactory, HomePageFactory, PageFactories,
};
pub use session_store::{SessionStore, SqliteSessionStore};
