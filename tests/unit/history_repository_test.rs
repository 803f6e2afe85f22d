use lantern::database::Database;
use lantern::repositories::{HistoryRepository, SqliteHistoryRepository};

fn repo() -> SqliteHistoryRepository {
    let db = Database::open_in_memory().unwrap();
    SqliteHistoryRepository::new(db.connection())
}

#[tokio::test]
async fn a_first_visit_inserts_an_entry() {
    let repo = repo();
    repo.visit("https://example.com", "Example").await.unwrap();

    let entries = repo.last_hundred_visited().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].url, "https://example.com");
    assert_eq!(entries[0].title, "Example");
    assert_eq!(entries[0].visit_count, 1);
}

#[tokio::test]
async fn revisiting_bumps_the_count_and_refreshes_the_title() {
    let repo = repo();
    repo.visit("https://example.com", "Example").await.unwrap();
    repo.visit("https://example.com", "Example Domain")
        .await
        .unwrap();

    let entries = repo.last_hundred_visited().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].visit_count, 2);
    assert_eq!(entries[0].title, "Example Domain");
}

#[tokio::test]
async fn search_matches_title_and_url() {
    let repo = repo();
    repo.visit("https://rust-lang.org", "Rust").await.unwrap();
    repo.visit("https://example.com", "Example").await.unwrap();

    let by_title = repo.find_entries_containing("Rust").await.unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].url, "https://rust-lang.org");

    let by_url = repo.find_entries_containing("example.com").await.unwrap();
    assert_eq!(by_url.len(), 1);

    assert!(repo.find_entries_containing("absent").await.unwrap().is_empty());
}

#[tokio::test]
async fn search_caps_results_at_five() {
    let repo = repo();
    for i in 0..8 {
        repo.visit(&format!("https://site{}.example", i), "Site")
            .await
            .unwrap();
    }

    let results = repo.find_entries_containing("Site").await.unwrap();
    assert_eq!(results.len(), 5);
}

#[tokio::test]
async fn deleting_an_entry_by_url() {
    let repo = repo();
    repo.visit("https://example.com", "Example").await.unwrap();
    repo.delete_entry("https://example.com").await.unwrap();

    assert!(repo.last_hundred_visited().await.unwrap().is_empty());

    // Absent urls complete silently.
    repo.delete_entry("https://absent.example").await.unwrap();
}

#[tokio::test]
async fn delete_all_clears_the_log() {
    let repo = repo();
    repo.visit("https://one.example", "One").await.unwrap();
    repo.visit("https://two.example", "Two").await.unwrap();
    repo.delete_all().await.unwrap();

    assert!(repo.last_hundred_visited().await.unwrap().is_empty());
}
