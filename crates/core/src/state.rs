//! View state: the full list, the ranked tags and the derived filtered list.
//!
//! Every setter recomputes the filtered list so it can never go stale.

use crate::flatten::Flattened;
use crate::models::{sort_newest_first, BookmarkRecord, TagVocabulary};
use crate::ranker::rank;
use crate::search::filter_view;

#[derive(Debug, Default)]
pub struct ViewState {
    bookmarks: Vec<BookmarkRecord>,
    vocabulary: TagVocabulary,
    tags: Vec<String>,
    selected_tag: Option<String>,
    query: String,
    filtered: Vec<BookmarkRecord>,
    loaded: bool,
}

impl ViewState {
    /// Swap in a fresh flatten result. Selection and query survive.
    pub fn replace(&mut self, flattened: Flattened) {
        let Flattened {
            mut bookmarks,
            vocabulary,
            ..
        } = flattened;
        sort_newest_first(&mut bookmarks);
        self.tags = rank(&vocabulary);
        self.vocabulary = vocabulary;
        self.bookmarks = bookmarks;
        self.loaded = true;
        self.refilter();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    pub fn clear_query(&mut self) {
        self.set_query(String::new());
    }

    /// `None` or an empty name shows all bookmarks.
    pub fn select_tag(&mut self, tag: Option<String>) {
        self.selected_tag = tag.filter(|t| !t.is_empty());
        self.refilter();
    }

    /// Optimistic local removal; the next reload settles the vocabulary.
    pub fn remove(&mut self, id: &str) -> Option<BookmarkRecord> {
        let pos = self.bookmarks.iter().position(|b| b.id == id)?;
        let removed = self.bookmarks.remove(pos);
        self.refilter();
        Some(removed)
    }

    pub fn insert(&mut self, record: BookmarkRecord) {
        self.bookmarks.push(record);
        sort_newest_first(&mut self.bookmarks);
        self.refilter();
    }

    pub fn find(&self, id: &str) -> Option<&BookmarkRecord> {
        self.bookmarks.iter().find(|b| b.id == id)
    }

    pub fn bookmarks(&self) -> &[BookmarkRecord] {
        &self.bookmarks
    }

    pub fn filtered(&self) -> &[BookmarkRecord] {
        &self.filtered
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn vocabulary(&self) -> &TagVocabulary {
        &self.vocabulary
    }

    pub fn selected_tag(&self) -> Option<&str> {
        self.selected_tag.as_deref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn has_filters(&self) -> bool {
        self.selected_tag.is_some() || !self.query.is_empty()
    }

    /// Ranked tags with how many current bookmarks carry each one.
    pub fn sidebar(&self) -> Vec<(String, usize)> {
        self.tags
            .iter()
            .map(|tag| {
                let n = self.bookmarks.iter().filter(|b| b.has_tag(tag)).count();
                (tag.clone(), n)
            })
            .collect()
    }

    fn refilter(&mut self) {
        self.filtered = filter_view(&self.bookmarks, self.selected_tag.as_deref(), &self.query);
    }
}
