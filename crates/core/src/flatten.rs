//! Tree flattener: external bookmark tree to flat records plus tag vocabulary.

use crate::config::{AppConfig, TagConfig};
use crate::favicon::FaviconSource;
use crate::models::{BookmarkRecord, TagVocabulary};
use providers::TreeNode;
use tracing::debug;

const UNTITLED: &str = "Untitled";

/// Decides which folder names become tags. Generic containers such as
/// "Bookmarks bar" or "Imported from Firefox" are skipped but still walked.
#[derive(Debug, Clone)]
pub struct TagPathFilter {
    ignore_ci: Vec<String>,
    ignore: Vec<String>,
}

impl Default for TagPathFilter {
    fn default() -> Self {
        Self::from_config(&TagConfig::default())
    }
}

impl TagPathFilter {
    pub fn from_config(cfg: &TagConfig) -> Self {
        Self {
            ignore_ci: cfg
                .ignore_containing_ci
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            ignore: cfg.ignore_containing.clone(),
        }
    }

    pub fn keeps(&self, folder: &str) -> bool {
        if folder.is_empty() {
            return false;
        }
        let lower = folder.to_lowercase();
        !self.ignore_ci.iter().any(|m| lower.contains(m.as_str()))
            && !self.ignore.iter().any(|m| folder.contains(m.as_str()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Flattened {
    /// Traversal order; callers sort.
    pub bookmarks: Vec<BookmarkRecord>,
    pub vocabulary: TagVocabulary,
    /// Ids of records whose url failed to parse.
    pub malformed: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Flattener {
    filter: TagPathFilter,
    favicons: FaviconSource,
}

impl Flattener {
    pub fn new(filter: TagPathFilter, favicons: FaviconSource) -> Self {
        Self { filter, favicons }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(
            TagPathFilter::from_config(&cfg.tags),
            FaviconSource::new(&cfg.favicon.service, cfg.favicon.size),
        )
    }

    pub fn filter(&self) -> &TagPathFilter {
        &self.filter
    }

    pub fn flatten(&self, root: &TreeNode) -> Flattened {
        let mut out = Flattened::default();
        let mut path = Vec::new();
        if root.is_folder() {
            for child in &root.children {
                self.visit(child, &root.id, &mut path, &mut out);
            }
        } else {
            self.visit(root, "", &mut path, &mut out);
        }
        out.vocabulary = TagVocabulary::from_records(&out.bookmarks);
        out
    }

    fn visit(&self, node: &TreeNode, parent: &str, path: &mut Vec<String>, out: &mut Flattened) {
        if let Some(url) = &node.url {
            let record = self.record(node, url, parent, path, &mut out.malformed);
            out.bookmarks.push(record);
            return;
        }
        let tagged = self.filter.keeps(&node.title);
        if tagged {
            path.push(node.title.clone());
        }
        for child in &node.children {
            self.visit(child, &node.id, path, out);
        }
        if tagged {
            path.pop();
        }
    }

    fn record(
        &self,
        node: &TreeNode,
        url: &str,
        parent: &str,
        path: &[String],
        malformed: &mut Vec<String>,
    ) -> BookmarkRecord {
        let favicon = self.favicons.derive(url).unwrap_or_else(|err| {
            debug!(id = %node.id, url, error = %err, "malformed bookmark url");
            malformed.push(node.id.clone());
            String::new()
        });
        let title = if node.title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            node.title.clone()
        };
        BookmarkRecord {
            id: node.id.clone(),
            title,
            url: url.to_string(),
            date_added: node.date_added,
            parent_id: node.parent_id.clone().unwrap_or_else(|| parent.to_string()),
            tags: path.to_vec(),
            favicon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bm(id: &str, parent: &str, title: &str, url: &str) -> TreeNode {
        TreeNode::bookmark(id, parent, title, url, id.parse().unwrap_or(0))
    }

    fn sample_tree() -> TreeNode {
        TreeNode::folder("0", None, "").with_children(vec![
            TreeNode::folder("1", Some("0"), "Bookmarks bar").with_children(vec![
                TreeNode::folder("10", Some("1"), "Work").with_children(vec![
                    bm("11", "10", "X", "https://x.com"),
                    TreeNode::folder("12", Some("10"), "Work").with_children(vec![bm(
                        "13",
                        "12",
                        "Deep",
                        "https://deep.example/a",
                    )]),
                ]),
                bm("14", "1", "  ", "https://untitled.example"),
            ]),
            TreeNode::folder("2", Some("0"), "Other bookmarks").with_children(vec![
                TreeNode::folder("20", Some("2"), "Imported from Firefox").with_children(vec![
                    TreeNode::folder("21", Some("20"), "Rust")
                        .with_children(vec![bm("22", "21", "Book", "not a url")]),
                ]),
                TreeNode::folder("23", Some("2"), "Empty"),
            ]),
        ])
    }

    #[test]
    fn one_record_per_url_node() {
        let flat = Flattener::default().flatten(&sample_tree());
        let mut ids: Vec<_> = flat.bookmarks.iter().map(|b| b.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["11", "13", "14", "22"]);
    }

    #[test]
    fn tags_follow_folder_path_without_generic_containers() {
        let flat = Flattener::default().flatten(&sample_tree());
        let by_id = |id: &str| flat.bookmarks.iter().find(|b| b.id == id).unwrap();
        assert_eq!(by_id("11").tags, vec!["Work"]);
        assert_eq!(by_id("13").tags, vec!["Work", "Work"]);
        assert!(by_id("14").tags.is_empty());
        assert_eq!(by_id("22").tags, vec!["Rust"]);
        assert_eq!(by_id("13").parent_id, "12");
    }

    #[test]
    fn vocabulary_counts_every_occurrence() {
        let flat = Flattener::default().flatten(&sample_tree());
        assert_eq!(flat.vocabulary.count("Work"), 3);
        assert_eq!(flat.vocabulary.count("Rust"), 1);
        assert!(!flat.vocabulary.contains("Empty"));
        let tag_total: usize = flat.bookmarks.iter().map(|b| b.tags.len()).sum();
        assert_eq!(flat.vocabulary.total(), tag_total);
    }

    #[test]
    fn blank_titles_and_bad_urls_degrade_per_record() {
        let flat = Flattener::default().flatten(&sample_tree());
        let untitled = flat.bookmarks.iter().find(|b| b.id == "14").unwrap();
        assert_eq!(untitled.title, "Untitled");
        assert_eq!(
            untitled.favicon,
            "https://www.google.com/s2/favicons?domain=untitled.example&sz=16"
        );
        let broken = flat.bookmarks.iter().find(|b| b.id == "22").unwrap();
        assert_eq!(broken.favicon, "");
        assert_eq!(flat.malformed, vec!["22".to_string()]);
    }

    #[test]
    fn marker_rules_are_case_aware() {
        let filter = TagPathFilter::default();
        assert!(!filter.keeps("Bookmarks bar"));
        assert!(!filter.keeps("Mobile BOOKMARKS"));
        assert!(!filter.keeps("Imported (2)"));
        assert!(filter.keeps("imported"));
        assert!(filter.keeps("Work"));
        assert!(!filter.keeps(""));
    }
}
