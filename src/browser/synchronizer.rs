//! The presenter: folds tab signals into view state and routes user intents.
//!
//! All state lives on one logical main context. Worker tasks (signal
//! subscriptions, repository queries) post completions through the event
//! channel and the owner drains it via [`Synchronizer::run`] or
//! [`Synchronizer::settle`]; nothing else touches `view_state`,
//! `current_tab`, or `current_folder`.
//!
//! Subscription lifetimes fall into three classes, each with its own
//! cancellation set: attach-wide subscriptions, the per-tab background
//! listeners (rebuilt wholesale on every tab-set change), and the active
//! tab's multiplexed subscription (at most one alive; disposed strictly
//! before a successor is built).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::browser::contract::{Directive, Navigator, Renderer, TabDisplay, UiConfiguration};
use crate::browser::events::{ActiveTabSnapshot, Event};
use crate::browser::search::{smart_url_filter, SearchBoxModel, SearchEngineProvider};
use crate::browser::subscriptions::SubscriptionSet;
use crate::browser::urls;
use crate::repositories::{BookmarkRepository, DownloadsRepository, HistoryRepository};
use crate::services::pages::PageFactories;
use crate::tabs::{TabInitializer, TabRegistry, TabSession};
use crate::types::actions::{
    Action, BookmarkOptionEvent, CloseTabEvent, DownloadOptionEvent, FolderOptionEvent,
    HistoryOptionEvent, HitCategory, ImageLongPressEvent, KeyCombo, LinkLongPressEvent, LongPress,
    MenuSelection, Suggestion,
};
use crate::types::bookmark::{Bookmark, BookmarkEntry, Folder};
use crate::types::download::{DownloadEntry, PendingDownload};
use crate::types::errors::ActionError;
use crate::types::history::HistoryEntry;
use crate::types::ssl::SslState;
use crate::types::view_state::{TabViewState, ViewState};
use crate::types::TabId;

/// How long [`Synchronizer::settle`] waits for a further event before
/// declaring the queue quiescent.
const SETTLE_WINDOW: Duration = Duration::from_millis(50);

pub struct Synchronizer {
    model: TabRegistry,
    navigator: Arc<dyn Navigator>,
    bookmarks: Arc<dyn BookmarkRepository>,
    history: Arc<dyn HistoryRepository>,
    downloads: Arc<dyn DownloadsRepository>,
    pages: Arc<PageFactories>,
    search_box: SearchBoxModel,
    search_engine: SearchEngineProvider,
    ui: UiConfiguration,
    initial_url: Option<String>,

    view: Option<Box<dyn Renderer>>,
    view_state: ViewState,
    current_tab: Option<Arc<TabSession>>,
    current_folder: Folder,
    search_focused: bool,

    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
    subscriptions: SubscriptionSet,
    tab_listeners: SubscriptionSet,
    active_subscription: SubscriptionSet,
    multiplex_generation: u64,
    listener_generation: u64,
}

impl Synchronizer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        model: TabRegistry,
        navigator: Arc<dyn Navigator>,
        bookmarks: Arc<dyn BookmarkRepository>,
        history: Arc<dyn HistoryRepository>,
        downloads: Arc<dyn DownloadsRepository>,
        pages: Arc<PageFactories>,
        search_engine: SearchEngineProvider,
        ui: UiConfiguration,
        initial_url: Option<String>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            model,
            navigator,
            bookmarks,
            history,
            downloads,
            pages,
            search_box: SearchBoxModel::new(),
            search_engine,
            ui,
            initial_url,
            view: None,
            view_state: ViewState::default(),
            current_tab: None,
            current_folder: Folder::Root,
            search_focused: false,
            events_tx,
            events_rx,
            subscriptions: SubscriptionSet::new(),
            tab_listeners: SubscriptionSet::new(),
            active_subscription: SubscriptionSet::new(),
            multiplex_generation: 0,
            listener_generation: 0,
        }
    }

    // === Observers ===

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    pub fn current_tab_id(&self) -> Option<TabId> {
        self.current_tab.as_ref().map(|t| t.id())
    }

    pub fn current_folder(&self) -> &Folder {
        &self.current_folder
    }

    pub fn model(&self) -> &TabRegistry {
        &self.model
    }

    /// Monotonic count of multiplexed subscriptions built so far. A same-tab
    /// reselect does not bump it.
    pub fn multiplex_generation(&self) -> u64 {
        self.multiplex_generation
    }

    // === Attach / detach ===

    /// Attaches the view and brings the engine to its steady state: the
    /// current snapshot is pushed immediately, root bookmarks and the tab
    /// list stream are subscribed, frozen tabs (plus any pending deep-link
    /// url) are restored, and the last resulting tab is foregrounded. An
    /// empty restoration falls back to a single home-page tab.
    pub async fn attach(&mut self, view: Box<dyn Renderer>) {
        debug!("view attached");
        view.render_state(&self.view_state);
        self.view = Some(view);

        self.current_folder = Folder::Root;
        match self.bookmarks_and_folders(Folder::Root).await {
            Ok(list) => {
                let mut state = self.view_state.clone();
                state.bookmarks = list;
                state.is_root_folder = true;
                self.update_state(state);
            }
            Err(e) => warn!(error = %e, "failed to load root bookmarks"),
        }

        let mut changes = self.model.tabs_list_changes();
        let events = self.events_tx.clone();
        self.subscriptions.spawn(async move {
            loop {
                let tabs = changes.borrow_and_update().clone();
                if events.send(Event::TabsListChanged { tabs }).is_err() {
                    break;
                }
                if changes.changed().await.is_err() {
                    break;
                }
            }
        });

        let mut restored = self.model.initialize_tabs().await.unwrap_or_default();
        if let Some(url) = self.initial_url.take() {
            restored.push(self.model.create_tab(TabInitializer::Url(url)).await);
        }
        if restored.is_empty() {
            restored.push(self.model.create_tab(TabInitializer::Home).await);
        }
        if let Some(last) = restored.last() {
            let id = last.id();
            match self.model.select_tab(id) {
                Ok(tab) => self.select_tab(Some(tab)),
                Err(e) => warn!(error = %e, "restored tab vanished before selection"),
            }
        }
    }

    /// Detaches the view, cancels every subscription the synchronizer holds,
    /// and asks the registry to persist its sessions. Idempotent, and safe
    /// to call without a completed attach.
    pub fn detach(&mut self) {
        debug!("view detached");
        self.view = None;
        self.subscriptions.cancel_all();
        self.tab_listeners.cancel_all();
        self.active_subscription.cancel_all();
        self.model.freeze();
    }

    // === Event pump ===

    /// Drains marshalled completions forever. Hosts with their own loop can
    /// call [`Synchronizer::settle`] instead.
    pub async fn run(&mut self) {
        while let Some(event) = self.events_rx.recv().await {
            self.handle_event(event);
        }
    }

    /// Drains marshalled completions until the queue stays quiet for a short
    /// window. Used after driving actions to bring the view state current.
    pub async fn settle(&mut self) {
        loop {
            match tokio::time::timeout(SETTLE_WINDOW, self.events_rx.recv()).await {
                Ok(Some(event)) => self.handle_event(event),
                Ok(None) => break,
                Err(_) => break,
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::TabsListChanged { tabs } => {
                let summaries = tabs
                    .iter()
                    .map(|tab| TabViewState {
                        id: tab.id(),
                        icon: tab.favicon(),
                        title: tab.title(),
                        is_selected: tab.is_foreground(),
                    })
                    .collect();
                let mut state = self.view_state.clone();
                state.tabs = summaries;
                self.update_state(state);

                // Membership changed, not just content: rebuild the whole
                // listener set so no listener for a removed tab survives.
                self.listener_generation += 1;
                self.tab_listeners.cancel_all();
                for tab in &tabs {
                    self.spawn_meta_listener(tab);
                }
            }
            Event::ActiveTabState {
                generation,
                snapshot,
            } => {
                if generation != self.multiplex_generation {
                    return;
                }
                self.apply_active_tab_snapshot(snapshot);
            }
            Event::TabMetadata {
                generation,
                id,
                title,
                favicon,
                url,
            } => {
                if generation != self.listener_generation {
                    return;
                }
                let mut state = self.view_state.clone();
                for tab in &mut state.tabs {
                    if tab.id == id {
                        tab.title = title.clone();
                        tab.icon = favicon.clone();
                    }
                }
                self.update_state(state);

                if !url.is_empty() && !urls::is_special_url(&url) {
                    let history = Arc::clone(&self.history);
                    tokio::spawn(async move {
                        if let Err(e) = history.visit(&url, &title).await {
                            warn!(error = %e, "failed to record visit");
                        }
                    });
                }
            }
            Event::DownloadRequested {
                generation,
                download,
            } => {
                if generation != self.multiplex_generation {
                    return;
                }
                self.navigator.download(download);
            }
        }
    }

    fn apply_active_tab_snapshot(&mut self, snapshot: ActiveTabSnapshot) {
        let mut state = self.view_state.clone();
        state.display_url = self.search_box.display_content(
            &snapshot.url,
            Some(&snapshot.title),
            snapshot.progress < 100,
        );
        state.is_refresh = snapshot.progress == 100;
        state.ssl_state = snapshot.ssl_state;
        state.progress = snapshot.progress;
        for tab in &mut state.tabs {
            tab.is_selected = tab.id == snapshot.tab_id;
        }
        state.is_forward_enabled = snapshot.can_go_forward;
        state.is_back_enabled = snapshot.can_go_back;
        state.is_bookmarked = snapshot.is_bookmarked;
        state.is_bookmark_enabled = !snapshot.is_special;
        state.find_in_page = snapshot.find_query;
        self.update_state(state);
    }

    // === Active tab switching ===

    /// Switches the foreground tab. `None` publishes the terminal no-tab
    /// state. The previous multiplexed subscription is always disposed
    /// before a new one is built.
    fn select_tab(&mut self, tab: Option<Arc<TabSession>>) {
        if self.current_tab.as_ref().map(|t| t.id()) == tab.as_ref().map(|t| t.id()) {
            return;
        }
        if let Some(previous) = &self.current_tab {
            previous.set_foreground(false);
        }
        self.current_tab = tab.clone();

        let Some(tab) = tab else {
            self.active_subscription.cancel_all();
            self.multiplex_generation += 1;
            let mut state = self.view_state.clone();
            state.display_url = self.search_box.display_content("", None, false);
            state.is_forward_enabled = false;
            state.is_back_enabled = false;
            state.ssl_state = SslState::None;
            state.progress = 100;
            for summary in &mut state.tabs {
                summary.is_selected = false;
            }
            state.find_in_page.clear();
            self.update_state(state);
            return;
        };

        tab.set_foreground(true);
        self.active_subscription.cancel_all();
        self.multiplex_generation += 1;
        self.spawn_multiplex(&tab);
        self.spawn_download_forwarder(&tab);
    }

    /// Combines all of the tab's signal channels into full snapshots. Each
    /// channel is seeded with its last known value, so the first combined
    /// emission happens immediately; afterwards any single change re-emits
    /// the full combination.
    fn spawn_multiplex(&mut self, tab: &Arc<TabSession>) {
        let generation = self.multiplex_generation;
        let events = self.events_tx.clone();
        let bookmarks = Arc::clone(&self.bookmarks);
        let tab = Arc::clone(tab);
        self.active_subscription.spawn(async move {
            let mut ssl_rx = tab.ssl_changes();
            let mut title_rx = tab.title_changes();
            let mut url_rx = tab.url_changes();
            let mut progress_rx = tab.progress_changes();
            let mut back_rx = tab.can_go_back_changes();
            let mut forward_rx = tab.can_go_forward_changes();
            let mut find_rx = tab.find_query_changes();
            loop {
                let url = url_rx.borrow_and_update().clone();
                let is_bookmarked = match bookmarks.is_bookmark(&url).await {
                    Ok(is_bookmarked) => is_bookmarked,
                    Err(e) => {
                        warn!(error = %e, "bookmark lookup failed");
                        false
                    }
                };
                let snapshot = ActiveTabSnapshot {
                    tab_id: tab.id(),
                    ssl_state: *ssl_rx.borrow_and_update(),
                    title: title_rx.borrow_and_update().clone(),
                    progress: *progress_rx.borrow_and_update(),
                    can_go_back: *back_rx.borrow_and_update(),
                    can_go_forward: *forward_rx.borrow_and_update(),
                    find_query: find_rx.borrow_and_update().clone(),
                    is_bookmarked,
                    is_special: urls::is_special_url(&url),
                    url,
                };
                if events
                    .send(Event::ActiveTabState {
                        generation,
                        snapshot,
                    })
                    .is_err()
                {
                    break;
                }
                tokio::select! {
                    _ = ssl_rx.changed() => {}
                    _ = title_rx.changed() => {}
                    _ = url_rx.changed() => {}
                    _ = progress_rx.changed() => {}
                    _ = back_rx.changed() => {}
                    _ = forward_rx.changed() => {}
                    _ = find_rx.changed() => {}
                }
            }
        });
    }

    fn spawn_download_forwarder(&mut self, tab: &Arc<TabSession>) {
        let generation = self.multiplex_generation;
        let events = self.events_tx.clone();
        let mut requests = tab.download_requests();
        self.active_subscription.spawn(async move {
            loop {
                match requests.recv().await {
                    Ok(download) => {
                        if events
                            .send(Event::DownloadRequested {
                                generation,
                                download,
                            })
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Watches one tab's title and favicon for the tab list and for history
    /// recording, regardless of which tab is foregrounded.
    fn spawn_meta_listener(&mut self, tab: &Arc<TabSession>) {
        let generation = self.listener_generation;
        let events = self.events_tx.clone();
        let tab = Arc::clone(tab);
        self.tab_listeners.spawn(async move {
            let mut title_rx = tab.title_changes();
            let mut favicon_rx = tab.favicon_changes();
            let mut last: Option<(String, Option<String>)> = None;
            loop {
                let title = title_rx.borrow_and_update().clone();
                let favicon = favicon_rx.borrow_and_update().clone();
                let current = (title.clone(), favicon.clone());
                if last.as_ref() != Some(&current) {
                    last = Some(current);
                    let event = Event::TabMetadata {
                        generation,
                        id: tab.id(),
                        title,
                        favicon,
                        url: tab.url(),
                    };
                    if events.send(event).is_err() {
                        break;
                    }
                }
                tokio::select! {
                    _ = title_rx.changed() => {}
                    _ = favicon_rx.changed() => {}
                }
            }
        });
    }

    // === Top-level actions ===

    pub async fn on_action(&mut self, action: Action) -> Directive {
        match action {
            Action::LoadUrl(url) => {
                self.create_tab_and_select(TabInitializer::Url(url), true)
                    .await;
                Directive::Continue
            }
            Action::Panic => self.panic_clean().await,
        }
    }

    /// Emergency wipe. Every step is dispatched in order; failures are
    /// ignored because the hosting shell terminates the process on the
    /// returned directive regardless of their outcome.
    async fn panic_clean(&mut self) -> Directive {
        let tab = self.model.create_tab(TabInitializer::NoOp).await;
        if let Ok(tab) = self.model.select_tab(tab.id()) {
            self.select_tab(Some(tab));
        }
        self.model.clean();
        if let Err(e) = self.pages.bookmark.delete_pages().await {
            debug!(error = %e, "panic: bookmark page cleanup failed");
        }
        if let Err(e) = self.pages.history.delete_page().await {
            debug!(error = %e, "panic: history page cleanup failed");
        }
        self.model.delete_all_tabs().await;
        self.navigator.close_browser();
        Directive::TerminateProcess
    }

    // === Menu / keys ===

    pub async fn on_menu_click(&mut self, selection: MenuSelection) -> Result<(), ActionError> {
        match selection {
            MenuSelection::NewTab => {
                self.on_new_tab_click().await;
                Ok(())
            }
            MenuSelection::NewIncognitoTab => Err(ActionError::Unsupported("incognito tab")),
            MenuSelection::Share => {
                if let Some(tab) = &self.current_tab {
                    let url = tab.url();
                    if !urls::is_special_url(&url) {
                        self.navigator.share_page(&url, Some(&tab.title()));
                    }
                }
                Ok(())
            }
            MenuSelection::History => {
                self.create_tab_and_select(TabInitializer::HistoryPage, true)
                    .await;
                Ok(())
            }
            MenuSelection::Downloads => {
                self.create_tab_and_select(TabInitializer::DownloadsPage, true)
                    .await;
                Ok(())
            }
            MenuSelection::Find => {
                if let Some(view) = &self.view {
                    view.show_find_in_page_dialog();
                }
                Ok(())
            }
            MenuSelection::CopyLink => {
                if let Some(tab) = &self.current_tab {
                    let url = tab.url();
                    if !urls::is_special_url(&url) {
                        self.navigator.copy_page_link(&url);
                    }
                }
                Ok(())
            }
            MenuSelection::AddToHome => {
                if let Some(tab) = &self.current_tab {
                    let url = tab.url();
                    if !urls::is_special_url(&url) {
                        self.navigator
                            .add_to_home_screen(&url, &tab.title(), tab.favicon().as_deref());
                    }
                }
                Ok(())
            }
            MenuSelection::Bookmarks => {
                // A freshly opened drawer always starts at the root folder.
                self.on_bookmark_menu_click().await;
                if let Some(view) = &self.view {
                    view.open_bookmark_drawer();
                }
                Ok(())
            }
            MenuSelection::AddBookmark => {
                let bookmarkable = self
                    .current_tab
                    .as_ref()
                    .map(|t| !urls::is_special_url(&t.url()))
                    .unwrap_or(false);
                if bookmarkable {
                    self.show_add_bookmark_dialog().await;
                }
                Ok(())
            }
            MenuSelection::Reader => {
                if let Some(tab) = &self.current_tab {
                    let url = tab.url();
                    if !urls::is_special_url(&url) {
                        self.navigator.open_reader_mode(&url);
                    }
                }
                Ok(())
            }
            MenuSelection::Settings => {
                self.navigator.open_settings();
                Ok(())
            }
            MenuSelection::Back => {
                self.on_back_click().await;
                Ok(())
            }
            MenuSelection::Forward => {
                self.on_forward_click();
                Ok(())
            }
        }
    }

    pub async fn on_key_combo(&mut self, combo: KeyCombo) -> Result<(), ActionError> {
        match combo {
            KeyCombo::CtrlF => {
                if let Some(view) = &self.view {
                    view.show_find_in_page_dialog();
                }
                Ok(())
            }
            KeyCombo::CtrlT => {
                self.on_new_tab_click().await;
                Ok(())
            }
            KeyCombo::CtrlW => {
                if let Some(current) = self.current_tab_id() {
                    if let Some(index) =
                        self.view_state.tabs.iter().position(|t| t.id == current)
                    {
                        self.on_tab_close(index).await;
                    }
                }
                Ok(())
            }
            KeyCombo::CtrlQ => {
                self.on_tab_menu_click();
                Ok(())
            }
            KeyCombo::CtrlR => {
                self.on_refresh_or_stop_click().await;
                Ok(())
            }
            KeyCombo::CtrlTab => {
                self.cycle_tab(1);
                Ok(())
            }
            KeyCombo::CtrlShiftTab => {
                self.cycle_tab(-1);
                Ok(())
            }
            KeyCombo::Search => Err(ActionError::Unsupported("search box focus key")),
            KeyCombo::Alt0 => Err(ActionError::Unsupported("tab slot zero")),
            KeyCombo::Alt1 => {
                self.select_tab_at(0);
                Ok(())
            }
            KeyCombo::Alt2 => {
                self.select_tab_at(1);
                Ok(())
            }
            KeyCombo::Alt3 => {
                self.select_tab_at(2);
                Ok(())
            }
            KeyCombo::Alt4 => {
                self.select_tab_at(3);
                Ok(())
            }
            KeyCombo::Alt5 => {
                self.select_tab_at(4);
                Ok(())
            }
            KeyCombo::Alt6 => {
                self.select_tab_at(5);
                Ok(())
            }
            KeyCombo::Alt7 => {
                self.select_tab_at(6);
                Ok(())
            }
            KeyCombo::Alt8 => {
                self.select_tab_at(7);
                Ok(())
            }
            KeyCombo::Alt9 => {
                let last = self.view_state.tabs.len().saturating_sub(1);
                self.select_tab_at(last);
                Ok(())
            }
        }
    }

    fn select_tab_at(&mut self, index: usize) {
        let Some(id) = self.view_state.tabs.get(index).map(|t| t.id) else {
            return;
        };
        if let Ok(tab) = self.model.select_tab(id) {
            self.select_tab(Some(tab));
        }
    }

    fn cycle_tab(&mut self, step: isize) {
        let len = self.view_state.tabs.len() as isize;
        if len == 0 {
            return;
        }
        let index = self
            .current_tab_id()
            .and_then(|id| self.view_state.tabs.iter().position(|t| t.id == id))
            .unwrap_or(0) as isize;
        let next = ((index + step) % len + len) % len;
        self.select_tab_at(next as usize);
    }

    // === Tab list interactions ===

    pub fn on_tab_click(&mut self, index: usize) {
        let Some(id) = self.view_state.tabs.get(index).map(|t| t.id) else {
            return;
        };
        if let Ok(tab) = self.model.select_tab(id) {
            self.select_tab(Some(tab));
        }
        if let Some(view) = &self.view {
            view.close_tab_drawer();
        }
    }

    pub fn on_tab_long_click(&mut self, index: usize) {
        let Some(id) = self.view_state.tabs.get(index).map(|t| t.id) else {
            return;
        };
        if let Some(view) = &self.view {
            view.show_close_browser_dialog(id);
        }
    }

    /// Closes the tab at `index`. The replacement for a closed active tab is
    /// chosen against the pre-close order (left neighbor, else right
    /// neighbor, else none) and applied after the delete completes.
    pub async fn on_tab_close(&mut self, index: usize) {
        let Some(closed) = self.view_state.tabs.get(index).map(|t| t.id) else {
            return;
        };
        let next = next_selected(&self.view_state.tabs, index);
        let need_select = Some(closed) == self.current_tab_id();

        self.model.delete_tab(closed).await;

        if need_select {
            match next.and_then(|id| self.model.select_tab(id).ok()) {
                Some(tab) => self.select_tab(Some(tab)),
                None => self.select_tab(None),
            }
        }
    }

    pub fn on_tab_count_view_click(&mut self) {
        if self.ui.tab_display == TabDisplay::Drawer {
            if let Some(view) = &self.view {
                view.open_tab_drawer();
            }
        }
    }

    pub fn on_tab_menu_click(&mut self) {
        if let Some(tab) = &self.current_tab {
            if let Some(view) = &self.view {
                view.show_close_browser_dialog(tab.id());
            }
        }
    }

    pub async fn on_close_browser_event(&mut self, id: TabId, event: CloseTabEvent) {
        match event {
            CloseTabEvent::CloseCurrent => {
                if let Some(index) = self.view_state.tabs.iter().position(|t| t.id == id) {
                    self.on_tab_close(index).await;
                }
            }
            CloseTabEvent::CloseOthers => {
                let others: Vec<TabId> = self
                    .model
                    .tabs_list()
                    .iter()
                    .map(|t| t.id())
                    .filter(|other| *other != id)
                    .collect();
                for other in others {
                    self.model.delete_tab(other).await;
                }
            }
            CloseTabEvent::CloseAll => {
                // Close-all is completion-gated: the browser only closes
                // once every session is gone.
                self.model.delete_all_tabs().await;
                self.navigator.close_browser();
            }
        }
    }

    // === Navigation ===

    pub async fn on_back_click(&mut self) {
        if self.current_folder != Folder::Root {
            self.on_bookmark_menu_click().await;
            return;
        }
        match &self.current_tab {
            Some(tab) if tab.can_go_back() => tab.go_back(),
            None => self.navigator.close_browser(),
            Some(_) => self.navigator.background_browser(),
        }
    }

    pub fn on_forward_click(&mut self) {
        if let Some(tab) = &self.current_tab {
            if tab.can_go_forward() {
                tab.go_forward();
            }
        }
    }

    pub async fn on_home_click(&mut self) {
        if let Some(tab) = self.current_tab.clone() {
            self.load_tab_from_initializer(&tab, TabInitializer::Home)
                .await;
        }
    }

    pub async fn on_new_tab_click(&mut self) {
        self.create_tab_and_select(TabInitializer::Home, true).await;
    }

    pub async fn on_refresh_or_stop_click(&mut self) {
        if self.search_focused {
            let mut state = self.view_state.clone();
            state.display_url.clear();
            self.update_state(state);
            return;
        }
        let Some(tab) = self.current_tab.clone() else {
            return;
        };
        if tab.loading_progress() != 100 {
            tab.stop_loading();
        } else {
            self.reload().await;
        }
    }

    /// Reloads the current page. Internal pages are rebuilt rather than
    /// naively refreshed: the bookmarks page regenerates its artifacts
    /// before reloading, while the history and downloads pages reload
    /// through their initializers.
    async fn reload(&mut self) {
        let Some(tab) = self.current_tab.clone() else {
            return;
        };
        let url = tab.url();
        if urls::is_bookmark_url(&url) {
            match self.pages.bookmark.build_page().await {
                Ok(_) => tab.reload(),
                Err(e) => warn!(error = %e, "failed to rebuild bookmark page"),
            }
        } else if urls::is_downloads_url(&url) {
            self.load_tab_from_initializer(&tab, TabInitializer::DownloadsPage)
                .await;
        } else if urls::is_history_url(&url) {
            self.load_tab_from_initializer(&tab, TabInitializer::HistoryPage)
                .await;
        } else {
            tab.reload();
        }
    }

    // === Search ===

    pub fn on_search_focus_changed(&mut self, focused: bool) {
        self.search_focused = focused;
        let mut state = self.view_state.clone();
        if focused {
            state.ssl_state = SslState::None;
            state.is_refresh = false;
        } else {
            let progress = self
                .current_tab
                .as_ref()
                .map(|t| t.loading_progress())
                .unwrap_or(0);
            state.ssl_state = self
                .current_tab
                .as_ref()
                .map(|t| t.ssl_state())
                .unwrap_or(SslState::None);
            state.is_refresh = progress == 100;
            state.display_url = self.search_box.display_content(
                &self
                    .current_tab
                    .as_ref()
                    .map(|t| t.url())
                    .unwrap_or_default(),
                self.current_tab.as_ref().map(|t| t.title()).as_deref(),
                progress < 100,
            );
        }
        self.update_state(state);
    }

    pub fn on_search(&mut self, query: &str) {
        if query.is_empty() {
            return;
        }
        if let Some(tab) = &self.current_tab {
            tab.stop_loading();
        }
        let url = smart_url_filter(query, &self.search_engine);
        let progress = self
            .current_tab
            .as_ref()
            .map(|t| t.loading_progress())
            .unwrap_or(0);
        let mut state = self.view_state.clone();
        state.display_url = self.search_box.display_content(
            &url,
            self.current_tab.as_ref().map(|t| t.title()).as_deref(),
            progress < 100,
        );
        self.update_state(state);
        if let Some(tab) = &self.current_tab {
            tab.load_url(&url);
        }
    }

    pub fn on_suggestion_clicked(&mut self, suggestion: Suggestion) {
        self.on_search(&suggestion.into_query());
    }

    // === Find in page ===

    pub fn on_find_in_page(&mut self, query: &str) {
        if let Some(tab) = &self.current_tab {
            tab.find(query);
        }
        let mut state = self.view_state.clone();
        state.find_in_page = query.to_string();
        self.update_state(state);
    }

    pub fn on_find_next(&mut self) {
        if let Some(tab) = &self.current_tab {
            tab.find_next();
        }
    }

    pub fn on_find_previous(&mut self) {
        if let Some(tab) = &self.current_tab {
            tab.find_previous();
        }
    }

    pub fn on_find_dismiss(&mut self) {
        if let Some(tab) = &self.current_tab {
            tab.clear_find_matches();
        }
        let mut state = self.view_state.clone();
        state.find_in_page.clear();
        self.update_state(state);
    }

    pub fn on_ssl_icon_click(&mut self) {
        if let Some(certificate) = self
            .current_tab
            .as_ref()
            .and_then(|t| t.ssl_certificate_info())
        {
            if let Some(view) = &self.view {
                view.show_ssl_dialog(&certificate);
            }
        }
    }

    // === Bookmarks ===

    /// Handles a click on the bookmark list. Entries load in the current
    /// tab; folders become the browsed folder. The root sentinel is never
    /// rendered as a clickable row, so reaching it is a contract violation.
    pub async fn on_bookmark_click(&mut self, index: usize) {
        let Some(bookmark) = self.view_state.bookmarks.get(index).cloned() else {
            return;
        };
        match bookmark {
            Bookmark::Entry(entry) => {
                if let Some(tab) = &self.current_tab {
                    tab.load_url(&entry.url);
                }
                if let Some(view) = &self.view {
                    view.close_bookmark_drawer();
                }
            }
            Bookmark::Folder(Folder::Root) => {
                panic!("root folder cannot appear in the bookmark list")
            }
            Bookmark::Folder(folder @ Folder::Entry { .. }) => {
                self.current_folder = folder;
                self.refresh_bookmarks_with_root_flag(false).await;
            }
        }
    }

    pub fn on_bookmark_long_click(&mut self, index: usize) {
        let Some(bookmark) = self.view_state.bookmarks.get(index).cloned() else {
            return;
        };
        match bookmark {
            Bookmark::Entry(entry) => {
                if let Some(view) = &self.view {
                    view.show_bookmark_options_dialog(&entry);
                }
            }
            Bookmark::Folder(Folder::Root) => {
                panic!("root folder cannot appear in the bookmark list")
            }
            Bookmark::Folder(Folder::Entry { title }) => {
                if let Some(view) = &self.view {
                    view.show_folder_options_dialog(&title);
                }
            }
        }
    }

    /// Returns the bookmark drawer to the root folder.
    pub async fn on_bookmark_menu_click(&mut self) {
        if self.current_folder != Folder::Root {
            self.current_folder = Folder::Root;
            self.refresh_bookmarks_with_root_flag(true).await;
        }
    }

    /// Toggles the bookmark state of the current page: a bookmarked page is
    /// un-bookmarked, anything else prompts the add dialog.
    pub async fn on_star_click(&mut self) {
        let Some(tab) = self.current_tab.clone() else {
            return;
        };
        let url = tab.url();
        if urls::is_special_url(&url) {
            return;
        }
        match self.bookmarks.is_bookmark(&url).await {
            Ok(true) => {
                let entry = BookmarkEntry {
                    url,
                    title: tab.title(),
                    position: 0,
                    folder: Folder::Root,
                };
                match self.bookmarks.delete_bookmark(entry).await {
                    Ok(_) => self.refresh_bookmarks().await,
                    Err(e) => warn!(error = %e, "failed to delete bookmark"),
                }
            }
            Ok(false) => self.show_add_bookmark_dialog().await,
            Err(e) => warn!(error = %e, "bookmark lookup failed"),
        }
    }

    async fn show_add_bookmark_dialog(&mut self) {
        match self.bookmarks.folder_names().await {
            Ok(folders) => {
                let title = self
                    .current_tab
                    .as_ref()
                    .map(|t| t.title())
                    .unwrap_or_default();
                let url = self
                    .current_tab
                    .as_ref()
                    .map(|t| t.url())
                    .unwrap_or_default();
                if let Some(view) = &self.view {
                    view.show_add_bookmark_dialog(&title, &url, &folders);
                }
            }
            Err(e) => warn!(error = %e, "failed to load folder names"),
        }
    }

    pub async fn on_bookmark_confirmed(&mut self, title: &str, url: &str, folder: &str) {
        let entry = BookmarkEntry {
            url: url.to_string(),
            title: title.to_string(),
            position: 0,
            folder: Folder::from_title(folder),
        };
        match self.bookmarks.add_bookmark_if_not_exists(entry).await {
            Ok(_) => self.refresh_bookmarks().await,
            Err(e) => warn!(error = %e, "failed to add bookmark"),
        }
    }

    pub async fn on_bookmark_edit_confirmed(&mut self, title: &str, url: &str, folder: &str) {
        let old = BookmarkEntry {
            url: url.to_string(),
            title: String::new(),
            position: 0,
            folder: Folder::Root,
        };
        let new = BookmarkEntry {
            url: url.to_string(),
            title: title.to_string(),
            position: 0,
            folder: Folder::from_title(folder),
        };
        match self.bookmarks.edit_bookmark(old, new).await {
            Ok(()) => {
                self.refresh_bookmarks().await;
                self.reload_if_displaying(urls::is_bookmark_url).await;
            }
            Err(e) => warn!(error = %e, "failed to edit bookmark"),
        }
    }

    pub async fn on_folder_rename_confirmed(&mut self, old_title: &str, new_title: &str) {
        match self.bookmarks.rename_folder(old_title, new_title).await {
            Ok(()) => {
                if self.current_folder.title() == old_title {
                    self.current_folder = Folder::from_title(new_title);
                }
                self.refresh_bookmarks().await;
                self.reload_if_displaying(urls::is_bookmark_url).await;
            }
            Err(e) => warn!(error = %e, "failed to rename folder"),
        }
    }

    pub async fn on_bookmark_option_click(
        &mut self,
        bookmark: BookmarkEntry,
        option: BookmarkOptionEvent,
    ) -> Result<(), ActionError> {
        match option {
            BookmarkOptionEvent::NewTab => {
                self.create_tab_and_select(TabInitializer::Url(bookmark.url), true)
                    .await;
                Ok(())
            }
            BookmarkOptionEvent::BackgroundTab => {
                self.create_tab_and_select(TabInitializer::Url(bookmark.url), false)
                    .await;
                Ok(())
            }
            BookmarkOptionEvent::IncognitoTab => Err(ActionError::Unsupported("incognito tab")),
            BookmarkOptionEvent::Share => {
                self.navigator
                    .share_page(&bookmark.url, Some(&bookmark.title));
                Ok(())
            }
            BookmarkOptionEvent::CopyLink => {
                self.navigator.copy_page_link(&bookmark.url);
                Ok(())
            }
            BookmarkOptionEvent::Remove => {
                match self.bookmarks.delete_bookmark(bookmark).await {
                    Ok(_) => {
                        self.refresh_bookmarks().await;
                        self.reload_if_displaying(urls::is_bookmark_url).await;
                    }
                    Err(e) => warn!(error = %e, "failed to delete bookmark"),
                }
                Ok(())
            }
            BookmarkOptionEvent::Edit => {
                match self.bookmarks.folder_names().await {
                    Ok(folders) => {
                        if let Some(view) = &self.view {
                            view.show_edit_bookmark_dialog(
                                &bookmark.title,
                                &bookmark.url,
                                bookmark.folder.title(),
                                &folders,
                            );
                        }
                    }
                    Err(e) => warn!(error = %e, "failed to load folder names"),
                }
                Ok(())
            }
        }
    }

    pub async fn on_folder_option_click(&mut self, folder: &Folder, option: FolderOptionEvent) {
        let Folder::Entry { title } = folder else {
            panic!("root folder cannot be renamed or removed");
        };
        match option {
            FolderOptionEvent::Rename => {
                if let Some(view) = &self.view {
                    view.show_edit_folder_dialog(title);
                }
            }
            FolderOptionEvent::Remove => match self.bookmarks.delete_folder(title).await {
                Ok(()) => {
                    if self.current_folder.title() == *title {
                        // The browsed folder no longer exists.
                        self.current_folder = Folder::Root;
                        self.refresh_bookmarks_with_root_flag(true).await;
                    } else {
                        self.refresh_bookmarks().await;
                    }
                    self.reload_if_displaying(urls::is_bookmark_url).await;
                }
                Err(e) => warn!(error = %e, "failed to delete folder"),
            },
        }
    }

    // === Downloads / history options ===

    pub async fn on_download_option_click(
        &mut self,
        download: &DownloadEntry,
        option: DownloadOptionEvent,
    ) {
        let result = match option {
            DownloadOptionEvent::Delete => self.downloads.delete_download(&download.url).await,
            DownloadOptionEvent::DeleteAll => self.downloads.delete_all_downloads().await,
        };
        match result {
            Ok(()) => self.reload_if_displaying(urls::is_downloads_url).await,
            Err(e) => warn!(error = %e, "download mutation failed"),
        }
    }

    pub async fn on_history_option_click(
        &mut self,
        entry: &HistoryEntry,
        option: HistoryOptionEvent,
    ) -> Result<(), ActionError> {
        match option {
            HistoryOptionEvent::NewTab => {
                self.create_tab_and_select(TabInitializer::Url(entry.url.clone()), true)
                    .await;
                Ok(())
            }
            HistoryOptionEvent::BackgroundTab => {
                self.create_tab_and_select(TabInitializer::Url(entry.url.clone()), false)
                    .await;
                Ok(())
            }
            HistoryOptionEvent::IncognitoTab => Err(ActionError::Unsupported("incognito tab")),
            HistoryOptionEvent::Share => {
                self.navigator.share_page(&entry.url, Some(&entry.title));
                Ok(())
            }
            HistoryOptionEvent::CopyLink => {
                self.navigator.copy_page_link(&entry.url);
                Ok(())
            }
            HistoryOptionEvent::Remove => {
                match self.history.delete_entry(&entry.url).await {
                    Ok(()) => self.reload_if_displaying(urls::is_history_url).await,
                    Err(e) => warn!(error = %e, "failed to delete history entry"),
                }
                Ok(())
            }
        }
    }

    // === Long presses ===

    /// Routes a page long-press. On internal pages the target identifies a
    /// stored record and opens its options dialog; on normal pages the hit
    /// category decides which long-press dialog appears.
    pub async fn on_page_long_press(&mut self, id: TabId, long_press: LongPress) {
        let page_url = self
            .model
            .tabs_list()
            .iter()
            .find(|t| t.id() == id)
            .map(|t| t.url());

        if let Some(page_url) = page_url {
            if urls::is_special_url(&page_url) {
                let Some(target) = long_press.target_url.clone() else {
                    return;
                };
                if urls::is_bookmark_url(&page_url) {
                    if urls::is_bookmark_url(&target) {
                        if let Some(title) = urls::folder_title_from_bookmark_url(&target) {
                            if let Some(view) = &self.view {
                                view.show_folder_options_dialog(&title);
                            }
                        }
                    } else {
                        match self.bookmarks.find_bookmark_for_url(&target).await {
                            Ok(Some(entry)) => {
                                if let Some(view) = &self.view {
                                    view.show_bookmark_options_dialog(&entry);
                                }
                            }
                            Ok(None) => {}
                            Err(e) => warn!(error = %e, "bookmark lookup failed"),
                        }
                    }
                } else if urls::is_downloads_url(&page_url) {
                    match self.downloads.find_download_for_url(&target).await {
                        Ok(Some(entry)) => {
                            if let Some(view) = &self.view {
                                view.show_download_options_dialog(&entry);
                            }
                        }
                        Ok(None) => {}
                        Err(e) => warn!(error = %e, "download lookup failed"),
                    }
                } else if urls::is_history_url(&page_url) {
                    match self.history.find_entries_containing(&target).await {
                        Ok(entries) => {
                            let entry = entries
                                .into_iter()
                                .next()
                                .unwrap_or_else(|| HistoryEntry::bare(&target));
                            if let Some(view) = &self.view {
                                view.show_history_options_dialog(&entry);
                            }
                        }
                        Err(e) => warn!(error = %e, "history lookup failed"),
                    }
                }
                return;
            }
        }

        match long_press.hit_category {
            HitCategory::Image => {
                if let Some(view) = &self.view {
                    view.show_image_long_press_dialog(&long_press);
                }
            }
            HitCategory::Link => {
                if let Some(view) = &self.view {
                    view.show_link_long_press_dialog(&long_press);
                }
            }
            HitCategory::Unknown => {}
        }
    }

    pub async fn on_link_long_press_event(
        &mut self,
        long_press: &LongPress,
        event: LinkLongPressEvent,
    ) -> Result<(), ActionError> {
        match event {
            LinkLongPressEvent::NewTab => {
                if let Some(url) = long_press.target_url.clone() {
                    self.create_tab_and_select(TabInitializer::Url(url), true)
                        .await;
                }
                Ok(())
            }
            LinkLongPressEvent::BackgroundTab => {
                if let Some(url) = long_press.target_url.clone() {
                    self.create_tab_and_select(TabInitializer::Url(url), false)
                        .await;
                }
                Ok(())
            }
            LinkLongPressEvent::IncognitoTab => Err(ActionError::Unsupported("incognito tab")),
            LinkLongPressEvent::Share => {
                if let Some(url) = &long_press.target_url {
                    self.navigator.share_page(url, None);
                }
                Ok(())
            }
            LinkLongPressEvent::CopyLink => {
                if let Some(url) = &long_press.target_url {
                    self.navigator.copy_page_link(url);
                }
                Ok(())
            }
        }
    }

    pub async fn on_image_long_press_event(
        &mut self,
        long_press: &LongPress,
        event: ImageLongPressEvent,
    ) -> Result<(), ActionError> {
        match event {
            ImageLongPressEvent::NewTab => {
                if let Some(url) = long_press.target_url.clone() {
                    self.create_tab_and_select(TabInitializer::Url(url), true)
                        .await;
                }
                Ok(())
            }
            ImageLongPressEvent::BackgroundTab => {
                if let Some(url) = long_press.target_url.clone() {
                    self.create_tab_and_select(TabInitializer::Url(url), false)
                        .await;
                }
                Ok(())
            }
            ImageLongPressEvent::IncognitoTab => Err(ActionError::Unsupported("incognito tab")),
            ImageLongPressEvent::Share => {
                if let Some(url) = &long_press.target_url {
                    self.navigator.share_page(url, None);
                }
                Ok(())
            }
            ImageLongPressEvent::CopyLink => {
                if let Some(url) = &long_press.target_url {
                    self.navigator.copy_page_link(url);
                }
                Ok(())
            }
            ImageLongPressEvent::Download => {
                self.navigator.download(PendingDownload {
                    url: long_press.target_url.clone().unwrap_or_default(),
                    user_agent: None,
                    content_disposition: Some("attachment".to_string()),
                    mime_type: None,
                    content_length: 0,
                });
                Ok(())
            }
        }
    }

    // === Helpers ===

    async fn create_tab_and_select(&mut self, initializer: TabInitializer, should_select: bool) {
        let tab = self.model.create_tab(initializer).await;
        if should_select {
            if let Ok(tab) = self.model.select_tab(tab.id()) {
                self.select_tab(Some(tab));
            }
        }
    }

    async fn load_tab_from_initializer(&self, tab: &Arc<TabSession>, initializer: TabInitializer) {
        match initializer.resolve(&self.pages).await {
            Ok(Some(url)) => tab.load_url(&url),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "tab initializer failed"),
        }
    }

    /// Entries of `folder`, concatenated with the folder list when browsing
    /// the root (folders only exist at root level).
    async fn bookmarks_and_folders(
        &self,
        folder: Folder,
    ) -> Result<Vec<Bookmark>, crate::types::errors::RepositoryError> {
        let mut list = self.bookmarks.bookmarks_from_folder_sorted(&folder).await?;
        if folder == Folder::Root {
            list.extend(self.bookmarks.folders_sorted().await?);
        }
        Ok(list)
    }

    /// Refetches the browsed folder and republishes the bookmark list.
    /// Called only after a mutation's completion.
    async fn refresh_bookmarks(&mut self) {
        match self.bookmarks_and_folders(self.current_folder.clone()).await {
            Ok(list) => {
                let mut state = self.view_state.clone();
                state.bookmarks = list;
                self.update_state(state);
            }
            Err(e) => warn!(error = %e, "failed to refresh bookmarks"),
        }
    }

    async fn refresh_bookmarks_with_root_flag(&mut self, is_root: bool) {
        match self.bookmarks_and_folders(self.current_folder.clone()).await {
            Ok(list) => {
                let mut state = self.view_state.clone();
                state.bookmarks = list;
                state.is_root_folder = is_root;
                self.update_state(state);
            }
            Err(e) => warn!(error = %e, "failed to refresh bookmarks"),
        }
    }

    async fn reload_if_displaying(&mut self, classify: fn(&str) -> bool) {
        let displaying = self
            .current_tab
            .as_ref()
            .map(|t| classify(&t.url()))
            .unwrap_or(false);
        if displaying {
            self.reload().await;
        }
    }

    /// Replaces the snapshot and pushes it to the view if one is attached.
    /// The state advances even while detached, so a re-attach renders the
    /// latest truth.
    fn update_state(&mut self, state: ViewState) {
        self.view_state = state;
        if let Some(view) = &self.view {
            view.render_state(&self.view_state);
        }
    }
}

/// The replacement for a closed tab at `removed`: its left neighbor, else
/// its right neighbor, else none.
fn next_selected(tabs: &[TabViewState], removed: usize) -> Option<TabId> {
    if removed > 0 {
        tabs.get(removed - 1).map(|t| t.id)
    } else {
        tabs.get(removed + 1).map(|t| t.id)
    }
}
