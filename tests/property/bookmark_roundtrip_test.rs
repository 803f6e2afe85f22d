//! Bookmark round-trip properties: adding the same entry twice never
//! duplicates it, and the folder tree keeps its fixed two-level shape.

use lantern::database::Database;
use lantern::repositories::{BookmarkRepository, SqliteBookmarkRepository};
use lantern::types::bookmark::{Bookmark, BookmarkEntry, Folder};
use proptest::prelude::*;

fn arb_folder() -> impl Strategy<Value = Folder> {
    prop_oneof![
        Just(Folder::Root),
        Just(Folder::Entry {
            title: "work".to_string()
        }),
        Just(Folder::Entry {
            title: "reading".to_string()
        }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn adding_twice_yields_exactly_one_entry(
        host in "[a-z]{1,10}",
        title in "[A-Za-z ]{0,16}",
        folder in arb_folder(),
    ) {
        let url = format!("https://{}.example", host);
        let entry = BookmarkEntry {
            url: url.clone(),
            title,
            position: 0,
            folder: folder.clone(),
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let db = Database::open_in_memory().unwrap();
            let repo = SqliteBookmarkRepository::new(db.connection());

            prop_assert!(repo.add_bookmark_if_not_exists(entry.clone()).await.unwrap());
            prop_assert!(!repo.add_bookmark_if_not_exists(entry.clone()).await.unwrap());

            let list = repo.bookmarks_from_folder_sorted(&folder).await.unwrap();
            let occurrences = list
                .iter()
                .filter(|b| matches!(b, Bookmark::Entry(e) if e.url == url))
                .count();
            prop_assert_eq!(occurrences, 1);

            // Every entry in a folder listing names that folder.
            for item in &list {
                if let Bookmark::Entry(e) = item {
                    prop_assert_eq!(&e.folder, &folder);
                }
            }
            Ok(())
        })?;
    }

    #[test]
    fn the_folder_list_never_contains_the_root_sentinel(
        hosts in prop::collection::vec("[a-z]{1,10}", 1..6),
        folder in arb_folder(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let db = Database::open_in_memory().unwrap();
            let repo = SqliteBookmarkRepository::new(db.connection());

            for host in &hosts {
                let entry = BookmarkEntry {
                    url: format!("https://{}.example", host),
                    title: host.clone(),
                    position: 0,
                    folder: folder.clone(),
                };
                repo.add_bookmark_if_not_exists(entry).await.unwrap();
            }

            for item in repo.folders_sorted().await.unwrap() {
                let is_folder_entry = matches!(item, Bookmark::Folder(Folder::Entry { .. }));
                prop_assert!(is_folder_entry);
            }
            Ok(())
        })?;
    }
}
