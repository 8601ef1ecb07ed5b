//! Tag picker contents and the popover seam.
//!
//! How a picker is drawn is up to the front end. It receives a
//! [`PickerContext`] through [`TagPopover::open`] and reports the user's
//! pick back as a [`PickerChoice`], which the reconciler applies.

use crate::models::BookmarkRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct PickerEntry {
    pub tag: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickerContext {
    pub bookmark: BookmarkRecord,
    pub query: String,
    pub entries: Vec<PickerEntry>,
    /// Offered when the query names a tag that does not exist yet.
    pub create: Option<String>,
}

impl PickerContext {
    /// `tags` in display order; entries keep that order.
    pub fn build(tags: &[String], bookmark: &BookmarkRecord, query: &str) -> Self {
        let name = query.trim();
        let lowered = name.to_lowercase();
        let entries = tags
            .iter()
            .filter(|t| t.to_lowercase().contains(&lowered))
            .map(|t| PickerEntry {
                tag: t.clone(),
                selected: bookmark.has_tag(t),
            })
            .collect();
        let create = (!name.is_empty() && !tags.iter().any(|t| t == name)).then(|| name.to_string());
        Self {
            bookmark: bookmark.clone(),
            query: query.to_string(),
            entries,
            create,
        }
    }

    /// Choice for the `n`th visible row, counting the create row last.
    pub fn choice_at(&self, n: usize) -> Option<PickerChoice> {
        if let Some(entry) = self.entries.get(n) {
            return Some(PickerChoice::Select(entry.tag.clone()));
        }
        if n == self.entries.len() {
            return self.create.clone().map(PickerChoice::Create);
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerChoice {
    /// Toggle an existing tag.
    Select(String),
    /// Make a new tag and file the bookmark under it.
    Create(String),
}

pub trait TagPopover {
    /// Show the picker next to `anchor` (a front-end handle, e.g. a row id).
    fn open(&mut self, anchor: &str, context: PickerContext);
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark() -> BookmarkRecord {
        BookmarkRecord {
            id: "7".into(),
            title: "Tokio".into(),
            url: "https://tokio.rs".into(),
            date_added: 0,
            parent_id: "10".into(),
            tags: vec!["Rust".into()],
            favicon: String::new(),
        }
    }

    fn tags() -> Vec<String> {
        vec!["Rust".into(), "News".into(), "rustacean".into()]
    }

    #[test]
    fn lists_matching_tags_with_selection() {
        let ctx = PickerContext::build(&tags(), &bookmark(), "rus");
        let shown: Vec<_> = ctx.entries.iter().map(|e| (e.tag.as_str(), e.selected)).collect();
        assert_eq!(shown, vec![("Rust", true), ("rustacean", false)]);
        assert_eq!(ctx.create.as_deref(), Some("rus"));
    }

    #[test]
    fn no_create_offer_for_existing_or_empty_query() {
        assert!(PickerContext::build(&tags(), &bookmark(), "News").create.is_none());
        let all = PickerContext::build(&tags(), &bookmark(), "");
        assert_eq!(all.entries.len(), 3);
        assert!(all.create.is_none());
        assert!(PickerContext::build(&tags(), &bookmark(), "   ").create.is_none());
    }

    #[test]
    fn surrounding_spaces_do_not_hide_an_existing_tag() {
        let ctx = PickerContext::build(&tags(), &bookmark(), " News ");
        assert!(ctx.create.is_none());
        assert_eq!(ctx.entries.len(), 1);
        assert_eq!(ctx.choice_at(0), Some(PickerChoice::Select("News".into())));
    }

    #[test]
    fn rows_map_to_choices() {
        let ctx = PickerContext::build(&tags(), &bookmark(), "rus");
        assert_eq!(ctx.choice_at(0), Some(PickerChoice::Select("Rust".into())));
        assert_eq!(ctx.choice_at(2), Some(PickerChoice::Create("rus".into())));
        assert_eq!(ctx.choice_at(3), None);
    }
}
