use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub id: String,
    pub title: String,
    pub url: String,
    /// Milliseconds since the unix epoch.
    pub date_added: i64,
    pub parent_id: String,
    /// Folder path from the root down to the bookmark, derived at flatten time.
    pub tags: Vec<String>,
    pub favicon: String,
}

impl BookmarkRecord {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Tag name to number of occurrences across all records. Absent means zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TagVocabulary(BTreeMap<String, usize>);

impl TagVocabulary {
    pub fn from_records(records: &[BookmarkRecord]) -> Self {
        let mut counts = BTreeMap::new();
        for tag in records.iter().flat_map(|r| r.tags.iter()) {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
        Self(counts)
    }

    pub fn count(&self, tag: &str) -> usize {
        self.0.get(tag).copied().unwrap_or(0)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, usize)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }
}

/// Newest first by `date_added`; ties keep their current order.
pub fn sort_newest_first(records: &mut [BookmarkRecord]) {
    records.sort_by(|a, b| b.date_added.cmp(&a.date_added));
}
