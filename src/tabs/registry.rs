//! The model side of the browser: the ordered collection of live tabs.
//!
//! The registry is the sole owner of tab sessions — it creates, destroys,
//! freezes, and thaws them. Everyone else holds borrowed `Arc` handles and
//! asks the registry for mutations. Structural changes (create/delete) are
//! published through a `watch` stream; in-place signal changes are observed
//! per tab instead.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::services::pages::PageFactories;
use crate::services::session_store::SessionStore;
use crate::tabs::initializer::TabInitializer;
use crate::tabs::session::TabSession;
use crate::types::errors::TabError;
use crate::types::session::FrozenTab;
use crate::types::TabId;

pub struct TabRegistry {
    tabs: Vec<Arc<TabSession>>,
    next_id: TabId,
    foreground_id: Option<TabId>,
    changes: watch::Sender<Vec<Arc<TabSession>>>,
    pages: Arc<PageFactories>,
    session_store: Arc<dyn SessionStore>,
}

impl TabRegistry {
    pub fn new(pages: Arc<PageFactories>, session_store: Arc<dyn SessionStore>) -> Self {
        Self {
            tabs: Vec::new(),
            next_id: 1,
            foreground_id: None,
            changes: watch::channel(Vec::new()).0,
            pages,
            session_store,
        }
    }

    /// Creates a new session from the initializer, appends it, and publishes
    /// the change. Page-building failures leave the tab blank rather than
    /// failing creation.
    pub async fn create_tab(&mut self, initializer: TabInitializer) -> Arc<TabSession> {
        let id = self.next_id;
        self.next_id += 1;

        let tab = Arc::new(TabSession::new(id));
        if let TabInitializer::Restore(frozen) = &initializer {
            tab.restore_from(frozen);
        }
        match initializer.resolve(&self.pages).await {
            Ok(Some(url)) => tab.load_url(&url),
            Ok(None) => {}
            Err(e) => warn!(tab = id, error = %e, "tab initializer failed, leaving tab blank"),
        }

        self.tabs.push(Arc::clone(&tab));
        self.publish();
        tab
    }

    /// Marks the session with `id` as the only foregrounded one.
    pub fn select_tab(&mut self, id: TabId) -> Result<Arc<TabSession>, TabError> {
        let selected = self
            .tabs
            .iter()
            .find(|t| t.id() == id)
            .cloned()
            .ok_or(TabError::NotFound(id))?;
        for tab in &self.tabs {
            tab.set_foreground(tab.id() == id);
        }
        self.foreground_id = Some(id);
        Ok(selected)
    }

    /// Removes and destroys the session. Deleting an absent id completes
    /// silently.
    pub async fn delete_tab(&mut self, id: TabId) {
        let Some(index) = self.tabs.iter().position(|t| t.id() == id) else {
            return;
        };
        let tab = self.tabs.remove(index);
        tab.destroy();
        if self.foreground_id == Some(id) {
            self.foreground_id = None;
        }
        self.publish();
    }

    /// Removes every session. Used by the panic flow and close-all.
    pub async fn delete_all_tabs(&mut self) {
        for tab in self.tabs.drain(..) {
            tab.destroy();
        }
        self.foreground_id = None;
        self.publish();
    }

    /// Restores previously frozen sessions. `None` means a fresh start.
    pub async fn initialize_tabs(&mut self) -> Option<Vec<Arc<TabSession>>> {
        let frozen = match self.session_store.restore().await {
            Ok(Some(frozen)) if !frozen.is_empty() => frozen,
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "failed to restore frozen tabs");
                return None;
            }
        };

        let mut restored = Vec::with_capacity(frozen.len());
        for tab in frozen {
            restored
                .push(self.create_tab(TabInitializer::Restore(tab)).await);
        }
        Some(restored)
    }

    /// The current ordered tab list.
    pub fn tabs_list(&self) -> &[Arc<TabSession>] {
        &self.tabs
    }

    pub fn foreground_id(&self) -> Option<TabId> {
        self.foreground_id
    }

    /// Stream of the tab list after every structural mutation. The receiver
    /// is seeded with the current list.
    pub fn tabs_list_changes(&self) -> watch::Receiver<Vec<Arc<TabSession>>> {
        self.changes.subscribe()
    }

    /// Serializes all sessions for persistence across process death. The
    /// write is dispatched to the store; the caller does not wait on it.
    pub fn freeze(&self) {
        let frozen: Vec<FrozenTab> = self.tabs.iter().map(|t| t.freeze()).collect();
        let store = Arc::clone(&self.session_store);
        tokio::spawn(async move {
            if let Err(e) = store.save(frozen).await {
                warn!(error = %e, "failed to freeze tabs");
            }
        });
    }

    /// Clears transient privacy-sensitive state (the frozen session blob)
    /// without destroying live sessions. Used by the panic flow.
    pub fn clean(&self) {
        let store = Arc::clone(&self.session_store);
        tokio::spawn(async move {
            if let Err(e) = store.clear().await {
                warn!(error = %e, "failed to clean session state");
            }
        });
    }

    fn publish(&self) {
        self.changes.send_replace(self.tabs.clone());
    }
}
