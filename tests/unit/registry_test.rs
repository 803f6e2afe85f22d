#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{build_browser, TestBrowser};
use lantern::tabs::{TabInitializer, TabRegistry};
use lantern::types::session::FrozenTab;

/// A registry wired to the same stores as the given browser harness.
fn registry_of(browser: &TestBrowser) -> TabRegistry {
    TabRegistry::new(
        Arc::clone(&browser.pages),
        Arc::clone(&browser.session_store),
    )
}

#[tokio::test]
async fn create_tab_assigns_unique_ids_and_publishes_the_list() {
    let dir = tempfile::tempdir().unwrap();
    let browser = build_browser(dir.path(), None);
    let mut registry = registry_of(&browser);
    let mut changes = registry.tabs_list_changes();
    assert!(changes.borrow_and_update().is_empty());

    let first = registry
        .create_tab(TabInitializer::Url("https://one.example".to_string()))
        .await;
    let second = registry
        .create_tab(TabInitializer::Url("https://two.example".to_string()))
        .await;

    assert_ne!(first.id(), second.id());
    assert!(changes.has_changed().unwrap());
    assert_eq!(changes.borrow_and_update().len(), 2);
    assert_eq!(registry.tabs_list().len(), 2);
}

#[tokio::test]
async fn select_tab_marks_exactly_one_session_foreground() {
    let dir = tempfile::tempdir().unwrap();
    let browser = build_browser(dir.path(), None);
    let mut registry = registry_of(&browser);

    let first = registry.create_tab(TabInitializer::NoOp).await;
    let second = registry.create_tab(TabInitializer::NoOp).await;

    registry.select_tab(first.id()).unwrap();
    assert!(first.is_foreground());
    assert!(!second.is_foreground());

    registry.select_tab(second.id()).unwrap();
    assert!(!first.is_foreground());
    assert!(second.is_foreground());
    assert_eq!(registry.foreground_id(), Some(second.id()));
}

#[tokio::test]
async fn selecting_an_unknown_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    let browser = build_browser(dir.path(), None);
    let mut registry = registry_of(&browser);

    assert!(registry.select_tab(99).is_err());
}

#[tokio::test]
async fn deleting_an_absent_tab_completes_silently() {
    let dir = tempfile::tempdir().unwrap();
    let browser = build_browser(dir.path(), None);
    let mut registry = registry_of(&browser);

    registry.create_tab(TabInitializer::NoOp).await;
    registry.delete_tab(99).await;
    assert_eq!(registry.tabs_list().len(), 1);
}

#[tokio::test]
async fn deleting_a_tab_destroys_it_and_clears_foreground() {
    let dir = tempfile::tempdir().unwrap();
    let browser = build_browser(dir.path(), None);
    let mut registry = registry_of(&browser);

    let tab = registry.create_tab(TabInitializer::NoOp).await;
    registry.select_tab(tab.id()).unwrap();
    registry.delete_tab(tab.id()).await;

    assert!(registry.tabs_list().is_empty());
    assert!(tab.is_destroyed());
    assert_eq!(registry.foreground_id(), None);
}

#[tokio::test]
async fn delete_all_tabs_empties_the_registry() {
    let dir = tempfile::tempdir().unwrap();
    let browser = build_browser(dir.path(), None);
    let mut registry = registry_of(&browser);

    registry.create_tab(TabInitializer::NoOp).await;
    registry.create_tab(TabInitializer::NoOp).await;
    registry.delete_all_tabs().await;

    assert!(registry.tabs_list().is_empty());
}

#[tokio::test]
async fn freeze_then_initialize_restores_the_same_tabs() {
    let dir = tempfile::tempdir().unwrap();
    let browser = build_browser(dir.path(), None);
    let mut registry = registry_of(&browser);

    registry
        .create_tab(TabInitializer::Url("https://one.example".to_string()))
        .await;
    registry
        .create_tab(TabInitializer::Url("https://two.example".to_string()))
        .await;
    registry.freeze();
    tokio::time::sleep(Duration::from_millis(80)).await;

    let mut thawed = registry_of(&browser);
    let restored = thawed.initialize_tabs().await.unwrap();

    assert_eq!(restored.len(), 2);
    assert_eq!(restored[0].url(), "https://one.example");
    assert_eq!(restored[1].url(), "https://two.example");
}

#[tokio::test]
async fn initialize_tabs_with_an_empty_store_is_a_fresh_start() {
    let dir = tempfile::tempdir().unwrap();
    let browser = build_browser(dir.path(), None);
    let mut registry = registry_of(&browser);

    assert!(registry.initialize_tabs().await.is_none());
}

#[tokio::test]
async fn restored_tabs_are_seeded_without_a_load() {
    let dir = tempfile::tempdir().unwrap();
    let browser = build_browser(dir.path(), None);
    let mut registry = registry_of(&browser);

    let frozen = FrozenTab {
        url: "https://frozen.example".to_string(),
        title: "Frozen".to_string(),
    };
    let tab = registry.create_tab(TabInitializer::Restore(frozen)).await;

    assert_eq!(tab.url(), "https://frozen.example");
    assert_eq!(tab.title(), "Frozen");
    // A real load would have reset the progress signal.
    assert_eq!(tab.loading_progress(), 100);
}
