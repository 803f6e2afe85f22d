use lantern::tabs::{NavigationCommand, TabSession};
use lantern::types::download::PendingDownload;
use lantern::types::session::FrozenTab;
use lantern::types::ssl::SslState;

#[tokio::test]
async fn subscriptions_are_seeded_with_the_last_known_value() {
    let tab = TabSession::new(1);
    tab.set_title("Seeded");
    tab.set_progress(42);

    // Subscribing after the fact still observes the current values.
    assert_eq!(*tab.title_changes().borrow(), "Seeded");
    assert_eq!(*tab.progress_changes().borrow(), 42);
}

#[tokio::test]
async fn load_url_resets_progress_and_security_and_emits_a_command() {
    let tab = TabSession::new(1);
    tab.set_progress(100);
    tab.set_ssl_state(SslState::Valid);
    let mut commands = tab.commands();

    tab.load_url("https://example.com");

    assert_eq!(tab.url(), "https://example.com");
    assert_eq!(tab.loading_progress(), 0);
    assert_eq!(tab.ssl_state(), SslState::None);
    assert_eq!(
        commands.try_recv().unwrap(),
        NavigationCommand::Load("https://example.com".to_string())
    );
}

#[tokio::test]
async fn url_changes_notify_subscribers() {
    let tab = TabSession::new(1);
    let mut urls = tab.url_changes();
    assert_eq!(*urls.borrow_and_update(), "");

    tab.load_url("https://example.com");
    assert!(urls.has_changed().unwrap());
    assert_eq!(*urls.borrow_and_update(), "https://example.com");
}

#[tokio::test]
async fn find_tracks_the_query_and_clear_resets_it() {
    let tab = TabSession::new(1);
    let mut commands = tab.commands();

    tab.find("needle");
    assert_eq!(tab.find_query(), "needle");
    assert_eq!(
        commands.try_recv().unwrap(),
        NavigationCommand::Find("needle".to_string())
    );

    tab.clear_find_matches();
    assert_eq!(tab.find_query(), "");
}

#[tokio::test]
async fn progress_is_clamped_to_one_hundred() {
    let tab = TabSession::new(1);
    tab.set_progress(250);
    assert_eq!(tab.loading_progress(), 100);
}

#[tokio::test]
async fn foreground_flag_toggles() {
    let tab = TabSession::new(1);
    assert!(!tab.is_foreground());
    tab.set_foreground(true);
    assert!(tab.is_foreground());
    tab.set_foreground(false);
    assert!(!tab.is_foreground());
}

#[tokio::test]
async fn freeze_captures_url_and_title() {
    let tab = TabSession::new(7);
    tab.load_url("https://example.com");
    tab.set_title("Example");

    assert_eq!(
        tab.freeze(),
        FrozenTab {
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
        }
    );
}

#[tokio::test]
async fn download_requests_reach_subscribers() {
    let tab = TabSession::new(1);
    let mut requests = tab.download_requests();

    let pending = PendingDownload {
        url: "https://example.com/file.bin".to_string(),
        user_agent: Some("lantern".to_string()),
        content_disposition: Some("attachment".to_string()),
        mime_type: None,
        content_length: 1024,
    };
    tab.request_download(pending.clone());

    assert_eq!(requests.try_recv().unwrap(), pending);
}

#[tokio::test]
async fn events_sent_with_no_subscriber_are_dropped_silently() {
    let tab = TabSession::new(1);
    // No receiver exists; this must not panic or block.
    tab.request_download(PendingDownload {
        url: "https://example.com/file.bin".to_string(),
        user_agent: None,
        content_disposition: None,
        mime_type: None,
        content_length: 0,
    });
    tab.reload();
}
