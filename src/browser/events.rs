//! Completions marshalled from worker tasks back onto the main context.
//!
//! Subscription tasks never touch synchronizer state directly; they post one
//! of these and the synchronizer folds it in while draining its event queue.
//! Events from a disposed subscription set are identified by their stamped
//! generation and dropped.

use std::sync::Arc;

use crate::tabs::session::TabSession;
use crate::types::download::PendingDownload;
use crate::types::ssl::SslState;
use crate::types::TabId;

/// The combined latest values of every signal channel of the active tab.
#[derive(Debug, Clone)]
pub(crate) struct ActiveTabSnapshot {
    pub tab_id: TabId,
    pub ssl_state: SslState,
    pub title: String,
    pub url: String,
    pub progress: u8,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub is_bookmarked: bool,
    pub is_special: bool,
    pub find_query: String,
}

pub(crate) enum Event {
    /// The registry's tab set changed structurally.
    TabsListChanged { tabs: Vec<Arc<TabSession>> },
    /// A combined emission from the active tab's multiplexed subscription.
    ActiveTabState {
        generation: u64,
        snapshot: ActiveTabSnapshot,
    },
    /// A background per-tab listener observed a title/favicon change.
    TabMetadata {
        generation: u64,
        id: TabId,
        title: String,
        favicon: Option<String>,
        url: String,
    },
    /// The active tab requested a download.
    DownloadRequested {
        generation: u64,
        download: PendingDownload,
    },
}
