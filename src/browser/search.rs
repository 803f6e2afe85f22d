//! Search-box display formatting and query-to-url routing.

use crate::browser::urls;

/// Formats what the search box shows for the current page.
pub struct SearchBoxModel;

impl SearchBoxModel {
    pub fn new() -> Self {
        Self
    }

    /// The text displayed in the search box. Internal pages show their name
    /// instead of their artifact path; loading pages show the raw url so the
    /// user sees where they are going.
    pub fn display_content(&self, url: &str, _title: Option<&str>, is_loading: bool) -> String {
        if urls::is_bookmark_url(url) {
            return "Bookmarks".to_string();
        }
        if urls::is_history_url(url) {
            return "History".to_string();
        }
        if urls::is_downloads_url(url) {
            return "Downloads".to_string();
        }
        if urls::is_start_page_url(url) {
            return String::new();
        }
        if is_loading {
            return url.to_string();
        }
        trim_display_url(url)
    }
}

impl Default for SearchBoxModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Strips the scheme and a leading `www.` for display.
fn trim_display_url(url: &str) -> String {
    let trimmed = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    trimmed.strip_prefix("www.").unwrap_or(trimmed).to_string()
}

/// Supplies the query url of the configured search engine.
#[derive(Debug, Clone)]
pub struct SearchEngineProvider {
    query_url: String,
}

impl SearchEngineProvider {
    pub fn new(query_url: &str) -> Self {
        Self {
            query_url: query_url.to_string(),
        }
    }

    pub fn query_url(&self) -> &str {
        &self.query_url
    }
}

impl Default for SearchEngineProvider {
    fn default() -> Self {
        Self::new("https://duckduckgo.com/?q=")
    }
}

/// Routes raw search-box input: input that already looks like a url is
/// normalized and loaded directly, everything else goes to the search engine.
pub fn smart_url_filter(query: &str, engine: &SearchEngineProvider) -> String {
    let q = query.trim();
    if !q.contains(' ') {
        if q.starts_with("http://")
            || q.starts_with("https://")
            || q.starts_with("file://")
            || q.starts_with("about:")
        {
            return q.to_string();
        }
        if q.contains('.') && !q.starts_with('.') && !q.ends_with('.') {
            return format!("https://{}", q);
        }
    }
    format!("{}{}", engine.query_url(), percent_encode(q))
}

/// Minimal query-string percent encoding; unreserved characters pass through.
fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
