//! One live tab: a wrapper around a content-loading surface.
//!
//! The session owns a `watch` channel per navigation signal, so every
//! subscriber is seeded with the last known value the moment it subscribes.
//! Navigation commands are forwarded to the embedding content engine through
//! a broadcast stream; the engine (or a test) drives the signal setters as
//! the page actually loads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio::sync::{broadcast, watch};

use crate::tabs::initializer::TabInitializer;
use crate::types::download::PendingDownload;
use crate::types::session::FrozenTab;
use crate::types::ssl::{SslCertificateInfo, SslState};
use crate::types::TabId;

/// A navigation command emitted toward the content engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationCommand {
    Load(String),
    Reload,
    Stop,
    GoBack,
    GoForward,
    Find(String),
    FindNext,
    FindPrevious,
    ClearFindMatches,
}

/// A page's request to open the platform file chooser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChooserRequest {
    /// Accepted mime types, as given by the page.
    pub accept: String,
}

const EVENT_CHANNEL_CAPACITY: usize = 16;

pub struct TabSession {
    id: TabId,
    url: watch::Sender<String>,
    title: watch::Sender<String>,
    favicon: watch::Sender<Option<String>>,
    progress: watch::Sender<u8>,
    ssl: watch::Sender<SslState>,
    can_go_back: watch::Sender<bool>,
    can_go_forward: watch::Sender<bool>,
    find_query: watch::Sender<String>,
    ssl_certificate: Mutex<Option<SslCertificateInfo>>,
    foreground: AtomicBool,
    destroyed: AtomicBool,
    commands: broadcast::Sender<NavigationCommand>,
    downloads: broadcast::Sender<PendingDownload>,
    window_opens: broadcast::Sender<TabInitializer>,
    window_closes: broadcast::Sender<TabId>,
    file_choosers: broadcast::Sender<FileChooserRequest>,
}

impl TabSession {
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            url: watch::channel(String::new()).0,
            title: watch::channel("New Tab".to_string()).0,
            favicon: watch::channel(None).0,
            progress: watch::channel(100).0,
            ssl: watch::channel(SslState::None).0,
            can_go_back: watch::channel(false).0,
            can_go_forward: watch::channel(false).0,
            find_query: watch::channel(String::new()).0,
            ssl_certificate: Mutex::new(None),
            foreground: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            commands: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            downloads: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            window_opens: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            window_closes: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
            file_choosers: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    // Navigation

    /// Starts loading `url`. The url signal updates immediately; progress and
    /// security reset and are driven by the engine from here.
    pub fn load_url(&self, url: &str) {
        let _ = self.commands.send(NavigationCommand::Load(url.to_string()));
        self.url.send_replace(url.to_string());
        self.progress.send_replace(0);
        self.ssl.send_replace(SslState::None);
        self.find_query.send_replace(String::new());
    }

    pub fn reload(&self) {
        let _ = self.commands.send(NavigationCommand::Reload);
    }

    pub fn stop_loading(&self) {
        let _ = self.commands.send(NavigationCommand::Stop);
    }

    pub fn go_back(&self) {
        let _ = self.commands.send(NavigationCommand::GoBack);
    }

    pub fn go_forward(&self) {
        let _ = self.commands.send(NavigationCommand::GoForward);
    }

    pub fn find(&self, query: &str) {
        let _ = self
            .commands
            .send(NavigationCommand::Find(query.to_string()));
        self.find_query.send_replace(query.to_string());
    }

    pub fn find_next(&self) {
        let _ = self.commands.send(NavigationCommand::FindNext);
    }

    pub fn find_previous(&self) {
        let _ = self.commands.send(NavigationCommand::FindPrevious);
    }

    pub fn clear_find_matches(&self) {
        let _ = self.commands.send(NavigationCommand::ClearFindMatches);
        self.find_query.send_replace(String::new());
    }

    // Current signal values

    pub fn url(&self) -> String {
        self.url.borrow().clone()
    }

    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    pub fn favicon(&self) -> Option<String> {
        self.favicon.borrow().clone()
    }

    pub fn loading_progress(&self) -> u8 {
        *self.progress.borrow()
    }

    pub fn ssl_state(&self) -> SslState {
        *self.ssl.borrow()
    }

    pub fn can_go_back(&self) -> bool {
        *self.can_go_back.borrow()
    }

    pub fn can_go_forward(&self) -> bool {
        *self.can_go_forward.borrow()
    }

    pub fn find_query(&self) -> String {
        self.find_query.borrow().clone()
    }

    pub fn ssl_certificate_info(&self) -> Option<SslCertificateInfo> {
        self.ssl_certificate.lock().ok().and_then(|c| c.clone())
    }

    // Signal subscriptions — each receiver starts seeded with the current value.

    pub fn url_changes(&self) -> watch::Receiver<String> {
        self.url.subscribe()
    }

    pub fn title_changes(&self) -> watch::Receiver<String> {
        self.title.subscribe()
    }

    pub fn favicon_changes(&self) -> watch::Receiver<Option<String>> {
        self.favicon.subscribe()
    }

    pub fn progress_changes(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    pub fn ssl_changes(&self) -> watch::Receiver<SslState> {
        self.ssl.subscribe()
    }

    pub fn can_go_back_changes(&self) -> watch::Receiver<bool> {
        self.can_go_back.subscribe()
    }

    pub fn can_go_forward_changes(&self) -> watch::Receiver<bool> {
        self.can_go_forward.subscribe()
    }

    pub fn find_query_changes(&self) -> watch::Receiver<String> {
        self.find_query.subscribe()
    }

    // One-shot event streams

    pub fn commands(&self) -> broadcast::Receiver<NavigationCommand> {
        self.commands.subscribe()
    }

    pub fn download_requests(&self) -> broadcast::Receiver<PendingDownload> {
        self.downloads.subscribe()
    }

    pub fn create_window_requests(&self) -> broadcast::Receiver<TabInitializer> {
        self.window_opens.subscribe()
    }

    pub fn close_window_requests(&self) -> broadcast::Receiver<TabId> {
        self.window_closes.subscribe()
    }

    pub fn file_chooser_requests(&self) -> broadcast::Receiver<FileChooserRequest> {
        self.file_choosers.subscribe()
    }

    // Engine-side setters — called by the embedding content surface.

    pub fn set_url(&self, url: &str) {
        self.url.send_replace(url.to_string());
    }

    pub fn set_title(&self, title: &str) {
        self.title.send_replace(title.to_string());
    }

    pub fn set_favicon(&self, favicon: Option<String>) {
        self.favicon.send_replace(favicon);
    }

    pub fn set_progress(&self, progress: u8) {
        self.progress.send_replace(progress.min(100));
    }

    pub fn set_ssl_state(&self, state: SslState) {
        self.ssl.send_replace(state);
    }

    pub fn set_ssl_certificate(&self, info: Option<SslCertificateInfo>) {
        if let Ok(mut cert) = self.ssl_certificate.lock() {
            *cert = info;
        }
    }

    pub fn set_can_go_back(&self, can: bool) {
        self.can_go_back.send_replace(can);
    }

    pub fn set_can_go_forward(&self, can: bool) {
        self.can_go_forward.send_replace(can);
    }

    pub fn request_download(&self, download: PendingDownload) {
        let _ = self.downloads.send(download);
    }

    pub fn request_new_window(&self, initializer: TabInitializer) {
        let _ = self.window_opens.send(initializer);
    }

    pub fn request_close_window(&self) {
        let _ = self.window_closes.send(self.id);
    }

    pub fn request_file_chooser(&self, request: FileChooserRequest) {
        let _ = self.file_choosers.send(request);
    }

    // Lifecycle

    pub fn is_foreground(&self) -> bool {
        self.foreground.load(Ordering::SeqCst)
    }

    pub fn set_foreground(&self, foreground: bool) {
        self.foreground.store(foreground, Ordering::SeqCst);
    }

    /// Seeds the session from a frozen record without issuing a load command;
    /// the page is fetched lazily when the engine attaches.
    pub fn restore_from(&self, frozen: &FrozenTab) {
        self.url.send_replace(frozen.url.clone());
        self.title.send_replace(frozen.title.clone());
    }

    /// Serializes the session for persistence across process death.
    pub fn freeze(&self) -> FrozenTab {
        FrozenTab {
            url: self.url(),
            title: self.title(),
        }
    }

    /// Marks the session dead. Only the registry calls this.
    pub(crate) fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}
