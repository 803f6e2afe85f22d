//! Shared harness for the integration tests: recording view/navigator
//! doubles and a fully wired synchronizer over an in-memory database.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use lantern::browser::contract::{Navigator, Renderer, UiConfiguration};
use lantern::browser::search::SearchEngineProvider;
use lantern::browser::Synchronizer;
use lantern::database::Database;
use lantern::repositories::{
    BookmarkRepository, DownloadsRepository, HistoryRepository, SqliteBookmarkRepository,
    SqliteDownloadsRepository, SqliteHistoryRepository,
};
use lantern::services::pages::PageFactories;
use lantern::services::session_store::{SessionStore, SqliteSessionStore};
use lantern::tabs::{NavigationCommand, TabRegistry};
use lantern::types::actions::LongPress;
use lantern::types::bookmark::BookmarkEntry;
use lantern::types::download::{DownloadEntry, PendingDownload};
use lantern::types::history::HistoryEntry;
use lantern::types::ssl::SslCertificateInfo;
use lantern::types::view_state::ViewState;
use lantern::types::TabId;

#[derive(Default)]
pub struct ViewLog {
    pub states: Mutex<Vec<ViewState>>,
    pub dialogs: Mutex<Vec<String>>,
}

impl ViewLog {
    pub fn state_count(&self) -> usize {
        self.states.lock().unwrap().len()
    }

    pub fn dialogs(&self) -> Vec<String> {
        self.dialogs.lock().unwrap().clone()
    }

    pub fn has_dialog(&self, prefix: &str) -> bool {
        self.dialogs().iter().any(|d| d.starts_with(prefix))
    }
}

pub struct RecordingView(pub Arc<ViewLog>);

impl Renderer for RecordingView {
    fn render_state(&self, state: &ViewState) {
        self.0.states.lock().unwrap().push(state.clone());
    }

    fn show_add_bookmark_dialog(&self, _title: &str, url: &str, _folders: &[String]) {
        self.0
            .dialogs
            .lock()
            .unwrap()
            .push(format!("add-bookmark:{}", url));
    }

    fn show_edit_bookmark_dialog(&self, _title: &str, url: &str, _folder: &str, _folders: &[String]) {
        self.0
            .dialogs
            .lock()
            .unwrap()
            .push(format!("edit-bookmark:{}", url));
    }

    fn show_edit_folder_dialog(&self, title: &str) {
        self.0
            .dialogs
            .lock()
            .unwrap()
            .push(format!("edit-folder:{}", title));
    }

    fn show_find_in_page_dialog(&self) {
        self.0.dialogs.lock().unwrap().push("find-dialog".to_string());
    }

    fn show_link_long_press_dialog(&self, _long_press: &LongPress) {
        self.0
            .dialogs
            .lock()
            .unwrap()
            .push("link-long-press".to_string());
    }

    fn show_image_long_press_dialog(&self, _long_press: &LongPress) {
        self.0
            .dialogs
            .lock()
            .unwrap()
            .push("image-long-press".to_string());
    }

    fn show_ssl_dialog(&self, _certificate: &SslCertificateInfo) {
        self.0.dialogs.lock().unwrap().push("ssl-dialog".to_string());
    }

    fn show_close_browser_dialog(&self, id: TabId) {
        self.0
            .dialogs
            .lock()
            .unwrap()
            .push(format!("close-browser:{}", id));
    }

    fn show_bookmark_options_dialog(&self, bookmark: &BookmarkEntry) {
        self.0
            .dialogs
            .lock()
            .unwrap()
            .push(format!("bookmark-options:{}", bookmark.url));
    }

    fn show_folder_options_dialog(&self, folder_title: &str) {
        self.0
            .dialogs
            .lock()
            .unwrap()
            .push(format!("folder-options:{}", folder_title));
    }

    fn show_download_options_dialog(&self, download: &DownloadEntry) {
        self.0
            .dialogs
            .lock()
            .unwrap()
            .push(format!("download-options:{}", download.url));
    }

    fn show_history_options_dialog(&self, entry: &HistoryEntry) {
        self.0
            .dialogs
            .lock()
            .unwrap()
            .push(format!("history-options:{}", entry.url));
    }

    fn open_bookmark_drawer(&self) {
        self.0
            .dialogs
            .lock()
            .unwrap()
            .push("open-bookmark-drawer".to_string());
    }

    fn close_bookmark_drawer(&self) {
        self.0
            .dialogs
            .lock()
            .unwrap()
            .push("close-bookmark-drawer".to_string());
    }

    fn open_tab_drawer(&self) {
        self.0
            .dialogs
            .lock()
            .unwrap()
            .push("open-tab-drawer".to_string());
    }

    fn close_tab_drawer(&self) {
        self.0
            .dialogs
            .lock()
            .unwrap()
            .push("close-tab-drawer".to_string());
    }
}

#[derive(Default)]
pub struct NavigatorLog {
    pub calls: Mutex<Vec<String>>,
    pub downloads: Mutex<Vec<PendingDownload>>,
}

impl NavigatorLog {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }
}

pub struct RecordingNavigator(pub Arc<NavigatorLog>);

impl Navigator for RecordingNavigator {
    fn open_settings(&self) {
        self.0.calls.lock().unwrap().push("settings".to_string());
    }

    fn open_reader_mode(&self, url: &str) {
        self.0.calls.lock().unwrap().push(format!("reader:{}", url));
    }

    fn share_page(&self, url: &str, _title: Option<&str>) {
        self.0.calls.lock().unwrap().push(format!("share:{}", url));
    }

    fn copy_page_link(&self, url: &str) {
        self.0.calls.lock().unwrap().push(format!("copy:{}", url));
    }

    fn close_browser(&self) {
        self.0.calls.lock().unwrap().push("close-browser".to_string());
    }

    fn add_to_home_screen(&self, url: &str, _title: &str, _favicon: Option<&str>) {
        self.0
            .calls
            .lock()
            .unwrap()
            .push(format!("add-to-home:{}", url));
    }

    fn background_browser(&self) {
        self.0.calls.lock().unwrap().push("background".to_string());
    }

    fn download(&self, pending: PendingDownload) {
        self.0.downloads.lock().unwrap().push(pending);
    }
}

pub struct TestBrowser {
    pub synchronizer: Synchronizer,
    pub view: Arc<ViewLog>,
    pub navigator: Arc<NavigatorLog>,
    pub bookmarks: Arc<dyn BookmarkRepository>,
    pub history: Arc<dyn HistoryRepository>,
    pub downloads: Arc<dyn DownloadsRepository>,
    pub session_store: Arc<dyn SessionStore>,
    pub pages: Arc<PageFactories>,
}

/// Wires a synchronizer over an in-memory database, with generated pages
/// landing under `page_dir`. Not yet attached.
pub fn build_browser(page_dir: &Path, initial_url: Option<String>) -> TestBrowser {
    let db = Database::open_in_memory().expect("in-memory database");

    let bookmarks: Arc<dyn BookmarkRepository> =
        Arc::new(SqliteBookmarkRepository::new(db.connection()));
    let history: Arc<dyn HistoryRepository> =
        Arc::new(SqliteHistoryRepository::new(db.connection()));
    let downloads: Arc<dyn DownloadsRepository> =
        Arc::new(SqliteDownloadsRepository::new(db.connection()));
    let session_store: Arc<dyn SessionStore> =
        Arc::new(SqliteSessionStore::new(db.connection()).expect("session store"));
    let pages = Arc::new(PageFactories::new(
        page_dir.to_path_buf(),
        Arc::clone(&bookmarks),
        Arc::clone(&history),
        Arc::clone(&downloads),
    ));

    let registry = TabRegistry::new(Arc::clone(&pages), Arc::clone(&session_store));
    let view = Arc::new(ViewLog::default());
    let navigator = Arc::new(NavigatorLog::default());

    let synchronizer = Synchronizer::new(
        registry,
        Arc::new(RecordingNavigator(Arc::clone(&navigator))),
        Arc::clone(&bookmarks),
        Arc::clone(&history),
        Arc::clone(&downloads),
        Arc::clone(&pages),
        SearchEngineProvider::default(),
        UiConfiguration::default(),
        initial_url,
    );

    TestBrowser {
        synchronizer,
        view,
        navigator,
        bookmarks,
        history,
        downloads,
        session_store,
        pages,
    }
}

/// Builds, attaches, and settles a browser: the steady post-attach state.
pub async fn attached_browser(page_dir: &Path, initial_url: Option<String>) -> TestBrowser {
    let mut browser = build_browser(page_dir, initial_url);
    let view = Arc::clone(&browser.view);
    browser.synchronizer.attach(Box::new(RecordingView(view))).await;
    browser.synchronizer.settle().await;
    browser
}

/// Drains every buffered navigation command from a receiver.
pub fn drain_commands(
    rx: &mut tokio::sync::broadcast::Receiver<NavigationCommand>,
) -> Vec<NavigationCommand> {
    let mut commands = Vec::new();
    while let Ok(command) = rx.try_recv() {
        commands.push(command);
    }
    commands
}
