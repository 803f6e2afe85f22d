use serde::{Deserialize, Serialize};

/// A folder in the bookmark tree.
///
/// The tree has a fixed depth of two: the unnamed root holds named folders
/// and loose entries, and named folders hold only entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Folder {
    /// The singleton root folder. Cannot be removed or renamed.
    Root,
    /// A named folder living directly under the root.
    Entry { title: String },
}

impl Folder {
    /// The folder's display title. The root folder has the empty title.
    pub fn title(&self) -> &str {
        match self {
            Folder::Root => "",
            Folder::Entry { title } => title,
        }
    }

    /// Maps a folder title back to a [`Folder`], treating the empty string
    /// as the root folder.
    pub fn from_title(title: &str) -> Folder {
        if title.is_empty() {
            Folder::Root
        } else {
            Folder::Entry {
                title: title.to_string(),
            }
        }
    }
}

/// A saved bookmark entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkEntry {
    pub url: String,
    pub title: String,
    pub position: u32,
    pub folder: Folder,
}

/// An item in a rendered bookmark list: either a page entry or a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bookmark {
    Entry(BookmarkEntry),
    Folder(Folder),
}
