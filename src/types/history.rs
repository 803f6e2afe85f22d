use serde::{Deserialize, Serialize};

/// A recorded page visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub url: String,
    pub title: String,
    pub last_visited: i64,
    pub visit_count: i64,
}

impl HistoryEntry {
    /// A bare entry for a url that has no stored record yet, used when the
    /// history page surfaces a link the store does not know about.
    pub fn bare(url: &str) -> Self {
        Self {
            id: String::new(),
            url: url.to_string(),
            title: String::new(),
            last_visited: 0,
            visit_count: 0,
        }
    }
}
