//! Headless shell for the Lantern browser core.
//!
//! Wires the SQLite-backed stores and the synchronizer together and drives
//! them from a line-based prompt. The shell owns process termination: the
//! core only ever signals intent through [`Directive`].

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lantern::browser::contract::{Directive, Navigator, Renderer, UiConfiguration};
use lantern::browser::search::SearchEngineProvider;
use lantern::browser::Synchronizer;
use lantern::database::Database;
use lantern::repositories::{
    BookmarkRepository, DownloadsRepository, HistoryRepository, SqliteBookmarkRepository,
    SqliteDownloadsRepository, SqliteHistoryRepository,
};
use lantern::services::pages::PageFactories;
use lantern::services::session_store::SqliteSessionStore;
use lantern::tabs::TabRegistry;
use lantern::types::actions::{Action, LongPress, MenuSelection};
use lantern::types::bookmark::BookmarkEntry;
use lantern::types::download::{DownloadEntry, PendingDownload};
use lantern::types::history::HistoryEntry;
use lantern::types::ssl::SslCertificateInfo;
use lantern::types::view_state::ViewState;
use lantern::types::TabId;

/// Renders snapshots as compact console lines and dialogs as prompts.
struct ConsoleView;

impl Renderer for ConsoleView {
    fn render_state(&self, state: &ViewState) {
        let selected = state
            .tabs
            .iter()
            .position(|t| t.is_selected)
            .map(|i| i.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "[{}] progress={}% tabs={} selected={} back={} forward={} bookmarked={}",
            state.display_url,
            state.progress,
            state.tabs.len(),
            selected,
            state.is_back_enabled,
            state.is_forward_enabled,
            state.is_bookmarked,
        );
    }

    fn show_add_bookmark_dialog(&self, title: &str, url: &str, folders: &[String]) {
        println!("dialog: add bookmark '{}' <{}> folders={:?}", title, url, folders);
    }

    fn show_edit_bookmark_dialog(&self, title: &str, url: &str, folder: &str, _folders: &[String]) {
        println!("dialog: edit bookmark '{}' <{}> in '{}'", title, url, folder);
    }

    fn show_edit_folder_dialog(&self, title: &str) {
        println!("dialog: edit folder '{}'", title);
    }

    fn show_find_in_page_dialog(&self) {
        println!("dialog: find in page");
    }

    fn show_link_long_press_dialog(&self, long_press: &LongPress) {
        println!("dialog: link options {:?}", long_press.target_url);
    }

    fn show_image_long_press_dialog(&self, long_press: &LongPress) {
        println!("dialog: image options {:?}", long_press.target_url);
    }

    fn show_ssl_dialog(&self, certificate: &SslCertificateInfo) {
        println!(
            "dialog: certificate issued to {} by {}",
            certificate.issued_to, certificate.issued_by
        );
    }

    fn show_close_browser_dialog(&self, id: TabId) {
        println!("dialog: close tab {}?", id);
    }

    fn show_bookmark_options_dialog(&self, bookmark: &BookmarkEntry) {
        println!("dialog: bookmark options for <{}>", bookmark.url);
    }

    fn show_folder_options_dialog(&self, folder_title: &str) {
        println!("dialog: folder options for '{}'", folder_title);
    }

    fn show_download_options_dialog(&self, download: &DownloadEntry) {
        println!("dialog: download options for <{}>", download.url);
    }

    fn show_history_options_dialog(&self, entry: &HistoryEntry) {
        println!("dialog: history options for <{}>", entry.url);
    }

    fn open_bookmark_drawer(&self) {
        println!("drawer: bookmarks open");
    }

    fn close_bookmark_drawer(&self) {
        println!("drawer: bookmarks closed");
    }

    fn open_tab_drawer(&self) {
        println!("drawer: tabs open");
    }

    fn close_tab_drawer(&self) {
        println!("drawer: tabs closed");
    }
}

/// Logs platform actions instead of performing them.
struct ShellNavigator;

impl Navigator for ShellNavigator {
    fn open_settings(&self) {
        info!("navigator: open settings");
    }

    fn open_reader_mode(&self, url: &str) {
        info!(url, "navigator: reader mode");
    }

    fn share_page(&self, url: &str, title: Option<&str>) {
        info!(url, ?title, "navigator: share page");
    }

    fn copy_page_link(&self, url: &str) {
        info!(url, "navigator: copy link");
    }

    fn close_browser(&self) {
        info!("navigator: close browser");
    }

    fn add_to_home_screen(&self, url: &str, title: &str, _favicon: Option<&str>) {
        info!(url, title, "navigator: add to home screen");
    }

    fn background_browser(&self) {
        info!("navigator: background browser");
    }

    fn download(&self, pending: PendingDownload) {
        info!(url = %pending.url, "navigator: download requested");
    }
}

const HELP: &str = "commands:
  open <url or query>   load in the current tab
  tab                   open a new home tab
  tabs                  list tabs
  switch <index>        foreground the tab at index
  close <index>         close the tab at index
  back | forward | home | reload
  find <text>           find in page
  star                  toggle bookmark for the current page
  bookmarks             open the bookmark drawer
  panic                 emergency wipe and exit
  quit";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let data_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("lantern-data"));
    let initial_url = args.next();

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("cannot create data dir {}: {}", data_dir.display(), e);
        process::exit(1);
    }

    let db = match Database::open(data_dir.join("lantern.db")) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("cannot open database: {}", e);
            process::exit(1);
        }
    };

    let bookmarks: Arc<dyn BookmarkRepository> =
        Arc::new(SqliteBookmarkRepository::new(db.connection()));
    let history: Arc<dyn HistoryRepository> =
        Arc::new(SqliteHistoryRepository::new(db.connection()));
    let downloads: Arc<dyn DownloadsRepository> =
        Arc::new(SqliteDownloadsRepository::new(db.connection()));
    let session_store = match SqliteSessionStore::new(db.connection()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("cannot initialize session store: {}", e);
            process::exit(1);
        }
    };
    let pages = Arc::new(PageFactories::new(
        data_dir.join("pages"),
        Arc::clone(&bookmarks),
        Arc::clone(&history),
        Arc::clone(&downloads),
    ));

    let registry = TabRegistry::new(Arc::clone(&pages), session_store);
    let mut synchronizer = Synchronizer::new(
        registry,
        Arc::new(ShellNavigator),
        bookmarks,
        history,
        downloads,
        pages,
        SearchEngineProvider::default(),
        UiConfiguration::default(),
        initial_url,
    );

    synchronizer.attach(Box::new(ConsoleView)).await;
    synchronizer.settle().await;

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        match command {
            "" => {}
            "help" => println!("{}", HELP),
            "open" if !rest.is_empty() => synchronizer.on_search(rest),
            "tab" => synchronizer.on_new_tab_click().await,
            "tabs" => {
                for (index, tab) in synchronizer.view_state().tabs.iter().enumerate() {
                    let marker = if tab.is_selected { "*" } else { " " };
                    println!("{} {}: {} (#{})", marker, index, tab.title, tab.id);
                }
            }
            "switch" => {
                if let Ok(index) = rest.parse::<usize>() {
                    synchronizer.on_tab_click(index);
                }
            }
            "close" => {
                if let Ok(index) = rest.parse::<usize>() {
                    synchronizer.on_tab_close(index).await;
                }
            }
            "back" => synchronizer.on_back_click().await,
            "forward" => synchronizer.on_forward_click(),
            "home" => synchronizer.on_home_click().await,
            "reload" => synchronizer.on_refresh_or_stop_click().await,
            "find" => synchronizer.on_find_in_page(rest),
            "star" => synchronizer.on_star_click().await,
            "bookmarks" => {
                let _ = synchronizer.on_menu_click(MenuSelection::Bookmarks).await;
            }
            "panic" => {
                if synchronizer.on_action(Action::Panic).await == Directive::TerminateProcess {
                    process::exit(1);
                }
            }
            "quit" => break,
            other => println!("unknown command '{}' (try 'help')", other),
        }
        synchronizer.settle().await;
    }

    synchronizer.detach();
}
