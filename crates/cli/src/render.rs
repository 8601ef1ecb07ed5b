//! Plain-text and JSON renditions of the view.

use tagmark_core::models::BookmarkRecord;
use tagmark_core::picker::PickerContext;
use tagmark_core::state::ViewState;

/// First two tags, then `+N` for the rest; `-` when untagged.
pub fn tag_badges(tags: &[String]) -> String {
    if tags.is_empty() {
        return "[-]".to_string();
    }
    let mut out: Vec<String> = tags.iter().take(2).map(|t| format!("[{t}]")).collect();
    if tags.len() > 2 {
        out.push(format!("+{}", tags.len() - 2));
    }
    out.join(" ")
}

fn added(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn bookmark_line(b: &BookmarkRecord) -> String {
    format!(
        "{:>6}  {}  <{}>  {}  {}",
        b.id,
        b.title,
        b.url,
        tag_badges(&b.tags),
        added(b.date_added)
    )
}

pub fn header(view: &ViewState) -> String {
    format!("{} bookmarks", view.filtered().len())
}

pub fn list(view: &ViewState) -> String {
    if !view.is_loaded() {
        return "Loading bookmarks...".to_string();
    }
    let mut lines = vec![header(view)];
    if view.filtered().is_empty() {
        lines.push(if view.has_filters() {
            "No bookmarks match your filters".to_string()
        } else {
            "No bookmarks found".to_string()
        });
    } else {
        lines.extend(view.filtered().iter().map(bookmark_line));
    }
    lines.join("\n")
}

pub fn sidebar(view: &ViewState) -> String {
    let mark = |active: bool| if active { "*" } else { " " };
    let mut lines = vec![format!(
        "{} All Bookmarks",
        mark(view.selected_tag().is_none())
    )];
    for (tag, n) in view.sidebar() {
        lines.push(format!(
            "{} {tag} ({n})",
            mark(view.selected_tag() == Some(tag.as_str()))
        ));
    }
    lines.join("\n")
}

pub fn picker(ctx: &PickerContext) -> String {
    let mut lines = vec![format!("Edit tags for: {}", ctx.bookmark.title)];
    for (i, entry) in ctx.entries.iter().enumerate() {
        let check = if entry.selected { " ✓" } else { "" };
        lines.push(format!("  {}. {}{check}", i + 1, entry.tag));
    }
    if let Some(name) = &ctx.create {
        lines.push(format!("  {}. + Create \"{name}\"", ctx.entries.len() + 1));
    }
    lines.join("\n")
}

pub fn summary_line(view: &ViewState) -> String {
    format!(
        "{} bookmarks, {} tags",
        view.bookmarks().len(),
        view.tags().len()
    )
}

pub fn bookmarks_json(records: &[BookmarkRecord]) -> serde_json::Value {
    serde_json::to_value(records).unwrap_or_default()
}

pub fn tags_json(view: &ViewState) -> serde_json::Value {
    let tags: Vec<serde_json::Value> = view
        .tags()
        .iter()
        .map(|t| {
            serde_json::json!({
                "tag": t,
                "count": view.vocabulary().count(t),
            })
        })
        .collect();
    serde_json::Value::Array(tags)
}
