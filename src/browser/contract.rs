//! The boundaries the synchronizer talks across: the rendering view and the
//! platform navigator.

use crate::types::actions::LongPress;
use crate::types::bookmark::BookmarkEntry;
use crate::types::download::{DownloadEntry, PendingDownload};
use crate::types::history::HistoryEntry;
use crate::types::ssl::SslCertificateInfo;
use crate::types::view_state::ViewState;
use crate::types::TabId;

/// The view. `render_state` receives full snapshots and is expected to diff
/// against the previous one; everything else is a one-shot imperative call.
pub trait Renderer: Send + Sync {
    fn render_state(&self, state: &ViewState);

    fn show_add_bookmark_dialog(&self, title: &str, url: &str, folders: &[String]);

    fn show_edit_bookmark_dialog(&self, title: &str, url: &str, folder: &str, folders: &[String]);

    fn show_edit_folder_dialog(&self, title: &str);

    fn show_find_in_page_dialog(&self);

    fn show_link_long_press_dialog(&self, long_press: &LongPress);

    fn show_image_long_press_dialog(&self, long_press: &LongPress);

    fn show_ssl_dialog(&self, certificate: &SslCertificateInfo);

    fn show_close_browser_dialog(&self, id: TabId);

    fn show_bookmark_options_dialog(&self, bookmark: &BookmarkEntry);

    fn show_folder_options_dialog(&self, folder_title: &str);

    fn show_download_options_dialog(&self, download: &DownloadEntry);

    fn show_history_options_dialog(&self, entry: &HistoryEntry);

    fn open_bookmark_drawer(&self);

    fn close_bookmark_drawer(&self);

    fn open_tab_drawer(&self);

    fn close_tab_drawer(&self);
}

/// OS-level actions performed outside the browser core.
pub trait Navigator: Send + Sync {
    fn open_settings(&self);

    fn open_reader_mode(&self, url: &str);

    fn share_page(&self, url: &str, title: Option<&str>);

    fn copy_page_link(&self, url: &str);

    fn close_browser(&self);

    fn add_to_home_screen(&self, url: &str, title: &str, favicon: Option<&str>);

    fn background_browser(&self);

    fn download(&self, pending: PendingDownload);
}

/// How the tab list is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabDisplay {
    /// Tabs live in a slide-out drawer; the count button opens it.
    Drawer,
    /// Tabs are always visible; the count button does nothing.
    Desktop,
}

/// Static presentation configuration handed to the synchronizer.
#[derive(Debug, Clone, Copy)]
pub struct UiConfiguration {
    pub tab_display: TabDisplay,
}

impl Default for UiConfiguration {
    fn default() -> Self {
        Self {
            tab_display: TabDisplay::Drawer,
        }
    }
}

/// What the hosting shell should do after an action completes. The core
/// never terminates the process itself; the panic flow signals intent here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Continue,
    TerminateProcess,
}
