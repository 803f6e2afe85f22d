//! User-intent enumerations dispatched by the synchronizer.
//!
//! Every dispatch over these types is an exhaustive `match`, so adding a
//! variant forces every handler to take a position on it. Variants the core
//! deliberately does not support are rejected with
//! [`ActionError::Unsupported`](crate::types::errors::ActionError) rather
//! than silently ignored.

/// Externally delivered top-level intents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Open `url` in a new foreground tab (deep link, share target).
    LoadUrl(String),
    /// Emergency data wipe followed by process exit.
    Panic,
}

/// Overflow-menu selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSelection {
    NewTab,
    NewIncognitoTab,
    Share,
    History,
    Downloads,
    Find,
    CopyLink,
    AddToHome,
    Bookmarks,
    AddBookmark,
    Reader,
    Settings,
    Back,
    Forward,
}

/// Keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCombo {
    CtrlF,
    CtrlT,
    CtrlW,
    CtrlQ,
    CtrlR,
    CtrlTab,
    CtrlShiftTab,
    Search,
    Alt0,
    Alt1,
    Alt2,
    Alt3,
    Alt4,
    Alt5,
    Alt6,
    Alt7,
    Alt8,
    Alt9,
}

/// What the user's finger landed on during a page long-press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitCategory {
    Link,
    Image,
    Unknown,
}

/// A long-press hit result reported by the content surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongPress {
    pub target_url: Option<String>,
    pub hit_category: HitCategory,
}

/// Choices offered by the close-tab dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTabEvent {
    CloseCurrent,
    CloseOthers,
    CloseAll,
}

/// Choices offered by the link long-press dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkLongPressEvent {
    NewTab,
    BackgroundTab,
    IncognitoTab,
    Share,
    CopyLink,
}

/// Choices offered by the image long-press dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLongPressEvent {
    NewTab,
    BackgroundTab,
    IncognitoTab,
    Share,
    CopyLink,
    Download,
}

/// Choices offered by the bookmark options dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkOptionEvent {
    NewTab,
    BackgroundTab,
    IncognitoTab,
    Share,
    CopyLink,
    Remove,
    Edit,
}

/// Choices offered by the folder options dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderOptionEvent {
    Rename,
    Remove,
}

/// Choices offered by the download options dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOptionEvent {
    Delete,
    DeleteAll,
}

/// Choices offered by the history options dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOptionEvent {
    NewTab,
    BackgroundTab,
    IncognitoTab,
    Share,
    CopyLink,
    Remove,
}

/// A clicked search suggestion. Url extraction is total: every variant
/// carries something loadable, so an impossible suggestion cannot be
/// constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// A bookmarked page; loads the bookmark's url.
    Bookmark { url: String },
    /// A previously visited page; loads the recorded url.
    History { url: String },
    /// A search-engine completion; the text itself is searched.
    SearchQuery { query: String },
}

impl Suggestion {
    /// The text handed to the search pipeline when the suggestion is picked.
    pub fn into_query(self) -> String {
        match self {
            Suggestion::Bookmark { url } => url,
            Suggestion::History { url } => url,
            Suggestion::SearchQuery { query } => query,
        }
    }
}
