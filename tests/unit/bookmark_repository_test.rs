use lantern::database::Database;
use lantern::repositories::{BookmarkRepository, SqliteBookmarkRepository};
use lantern::types::bookmark::{Bookmark, BookmarkEntry, Folder};

fn repo() -> SqliteBookmarkRepository {
    let db = Database::open_in_memory().unwrap();
    SqliteBookmarkRepository::new(db.connection())
}

fn entry(url: &str, title: &str, folder: Folder) -> BookmarkEntry {
    BookmarkEntry {
        url: url.to_string(),
        title: title.to_string(),
        position: 0,
        folder,
    }
}

fn work() -> Folder {
    Folder::Entry {
        title: "work".to_string(),
    }
}

#[tokio::test]
async fn added_bookmarks_come_back_in_insertion_order() {
    let repo = repo();
    assert!(repo
        .add_bookmark_if_not_exists(entry("https://b.example", "B", Folder::Root))
        .await
        .unwrap());
    assert!(repo
        .add_bookmark_if_not_exists(entry("https://a.example", "A", Folder::Root))
        .await
        .unwrap());

    let list = repo.bookmarks_from_folder_sorted(&Folder::Root).await.unwrap();
    assert_eq!(list.len(), 2);
    assert!(matches!(&list[0], Bookmark::Entry(e) if e.url == "https://b.example"));
    assert!(matches!(&list[1], Bookmark::Entry(e) if e.url == "https://a.example"));
}

#[tokio::test]
async fn adding_the_same_url_twice_is_rejected() {
    let repo = repo();
    assert!(repo
        .add_bookmark_if_not_exists(entry("https://a.example", "A", Folder::Root))
        .await
        .unwrap());
    assert!(!repo
        .add_bookmark_if_not_exists(entry("https://a.example", "Again", Folder::Root))
        .await
        .unwrap());

    let list = repo.bookmarks_from_folder_sorted(&Folder::Root).await.unwrap();
    assert_eq!(list.len(), 1);
    assert!(matches!(&list[0], Bookmark::Entry(e) if e.title == "A"));
}

#[tokio::test]
async fn folders_exist_while_a_bookmark_names_them() {
    let repo = repo();
    repo.add_bookmark_if_not_exists(entry("https://a.example", "A", work()))
        .await
        .unwrap();
    repo.add_bookmark_if_not_exists(entry("https://b.example", "B", Folder::Root))
        .await
        .unwrap();

    assert_eq!(repo.folder_names().await.unwrap(), vec!["work"]);
    let folders = repo.folders_sorted().await.unwrap();
    assert_eq!(folders.len(), 1);
    assert!(matches!(
        &folders[0],
        Bookmark::Folder(Folder::Entry { title }) if title == "work"
    ));
}

#[tokio::test]
async fn folder_queries_are_scoped_to_the_folder() {
    let repo = repo();
    repo.add_bookmark_if_not_exists(entry("https://a.example", "A", work()))
        .await
        .unwrap();
    repo.add_bookmark_if_not_exists(entry("https://b.example", "B", Folder::Root))
        .await
        .unwrap();

    let filed = repo.bookmarks_from_folder_sorted(&work()).await.unwrap();
    assert_eq!(filed.len(), 1);
    assert!(matches!(&filed[0], Bookmark::Entry(e) if e.url == "https://a.example"));

    let root = repo.bookmarks_from_folder_sorted(&Folder::Root).await.unwrap();
    assert_eq!(root.len(), 1);
    assert!(matches!(&root[0], Bookmark::Entry(e) if e.url == "https://b.example"));
}

#[tokio::test]
async fn lookup_by_url() {
    let repo = repo();
    repo.add_bookmark_if_not_exists(entry("https://a.example", "A", Folder::Root))
        .await
        .unwrap();

    assert!(repo.is_bookmark("https://a.example").await.unwrap());
    assert!(!repo.is_bookmark("https://other.example").await.unwrap());

    let found = repo
        .find_bookmark_for_url("https://a.example")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.title, "A");
    assert!(repo
        .find_bookmark_for_url("https://other.example")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn editing_moves_a_bookmark_between_folders() {
    let repo = repo();
    repo.add_bookmark_if_not_exists(entry("https://a.example", "A", Folder::Root))
        .await
        .unwrap();

    repo.edit_bookmark(
        entry("https://a.example", "", Folder::Root),
        entry("https://a.example", "A2", work()),
    )
    .await
    .unwrap();

    assert!(repo
        .bookmarks_from_folder_sorted(&Folder::Root)
        .await
        .unwrap()
        .is_empty());
    let filed = repo.bookmarks_from_folder_sorted(&work()).await.unwrap();
    assert!(matches!(&filed[0], Bookmark::Entry(e) if e.title == "A2"));
}

#[tokio::test]
async fn delete_reports_whether_a_row_was_removed() {
    let repo = repo();
    repo.add_bookmark_if_not_exists(entry("https://a.example", "A", Folder::Root))
        .await
        .unwrap();

    assert!(repo
        .delete_bookmark(entry("https://a.example", "A", Folder::Root))
        .await
        .unwrap());
    assert!(!repo
        .delete_bookmark(entry("https://a.example", "A", Folder::Root))
        .await
        .unwrap());
}

#[tokio::test]
async fn renaming_a_folder_carries_its_entries() {
    let repo = repo();
    repo.add_bookmark_if_not_exists(entry("https://a.example", "A", work()))
        .await
        .unwrap();

    repo.rename_folder("work", "archive").await.unwrap();

    assert_eq!(repo.folder_names().await.unwrap(), vec!["archive"]);
    let moved = repo
        .bookmarks_from_folder_sorted(&Folder::Entry {
            title: "archive".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(moved.len(), 1);
}

#[tokio::test]
async fn deleting_a_folder_moves_its_entries_to_root() {
    let repo = repo();
    repo.add_bookmark_if_not_exists(entry("https://a.example", "A", work()))
        .await
        .unwrap();

    repo.delete_folder("work").await.unwrap();

    assert!(repo.folder_names().await.unwrap().is_empty());
    let root = repo.bookmarks_from_folder_sorted(&Folder::Root).await.unwrap();
    assert_eq!(root.len(), 1);
    assert!(matches!(&root[0], Bookmark::Entry(e) if e.url == "https://a.example"));
}
