use crate::models::BookmarkRecord;

/// Records carrying `selected_tag` (when set and non-empty) whose title, url
/// or any tag contains `query` case-insensitively. Order is preserved.
pub fn filter_view(
    bookmarks: &[BookmarkRecord],
    selected_tag: Option<&str>,
    query: &str,
) -> Vec<BookmarkRecord> {
    let tag = selected_tag.filter(|t| !t.is_empty());
    let query = query.to_lowercase();
    bookmarks
        .iter()
        .filter(|b| tag.map_or(true, |t| b.has_tag(t)))
        .filter(|b| query.is_empty() || matches_query(b, &query))
        .cloned()
        .collect()
}

fn matches_query(bookmark: &BookmarkRecord, lowered: &str) -> bool {
    bookmark.title.to_lowercase().contains(lowered)
        || bookmark.url.to_lowercase().contains(lowered)
        || bookmark
            .tags
            .iter()
            .any(|t| t.to_lowercase().contains(lowered))
}
