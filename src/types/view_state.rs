use crate::types::bookmark::Bookmark;
use crate::types::ssl::SslState;
use crate::types::TabId;

/// Lightweight summary of one tab shown in the tab list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabViewState {
    pub id: TabId,
    pub icon: Option<String>,
    pub title: String,
    pub is_selected: bool,
}

/// Immutable snapshot of everything the view renders.
///
/// Replaced wholesale on every update; the renderer is expected to diff
/// against the previous snapshot. At most one tab summary is selected, and
/// `is_bookmarked` is only meaningful while the displayed url is not a
/// special internal page.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub display_url: String,
    /// True when the refresh affordance should show "reload" rather than "stop".
    pub is_refresh: bool,
    pub ssl_state: SslState,
    /// Load progress, 0..=100.
    pub progress: u8,
    pub tabs: Vec<TabViewState>,
    pub is_forward_enabled: bool,
    pub is_back_enabled: bool,
    /// Contents of the bookmark folder currently browsed in the drawer.
    pub bookmarks: Vec<Bookmark>,
    pub is_bookmarked: bool,
    pub is_bookmark_enabled: bool,
    pub is_root_folder: bool,
    pub find_in_page: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            display_url: String::new(),
            is_refresh: true,
            ssl_state: SslState::None,
            progress: 0,
            tabs: Vec::new(),
            is_forward_enabled: false,
            is_back_enabled: false,
            bookmarks: Vec::new(),
            is_bookmarked: false,
            is_bookmark_enabled: true,
            is_root_folder: true,
            find_in_page: String::new(),
        }
    }
}
