//! Platform abstractions for the external bookmark tree.
//!
//! The tree is owned by the browser (or a stand-in). Everything here either
//! reads a snapshot of it or issues a single point mutation against it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod chrome;
pub mod memory;
pub mod tree;

/// Well-known id of the container new folders and untagged bookmarks go to.
pub const DEFAULT_ROOT_ID: &str = "1";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("node not found: {0}")]
    NotFound(String),
    #[error("node is not a folder: {0}")]
    NotAFolder(String),
    #[error("cannot move {node} into {parent}")]
    InvalidMove { node: String, parent: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bookmark file format: {0}")]
    Format(String),
    #[error("{0} rejected by platform")]
    Injected(PlatformOp),
}

/// The write/read calls a platform exposes; used in logs and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformOp {
    ReadTree,
    CreateFolder,
    MoveNode,
    RemoveNode,
    CreateBookmark,
}

impl std::fmt::Display for PlatformOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlatformOp::ReadTree => "read_tree",
            PlatformOp::CreateFolder => "create_folder",
            PlatformOp::MoveNode => "move_node",
            PlatformOp::RemoveNode => "remove_node",
            PlatformOp::CreateBookmark => "create_bookmark",
        };
        f.write_str(name)
    }
}

/// One node of the external tree. Folders have no url; bookmarks have no children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    pub parent_id: Option<String>,
    pub title: String,
    pub url: Option<String>,
    /// Milliseconds since the unix epoch.
    pub date_added: i64,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn folder(id: &str, parent_id: Option<&str>, title: &str) -> Self {
        Self {
            id: id.to_string(),
            parent_id: parent_id.map(str::to_string),
            title: title.to_string(),
            url: None,
            date_added: 0,
            children: Vec::new(),
        }
    }

    pub fn bookmark(id: &str, parent_id: &str, title: &str, url: &str, date_added: i64) -> Self {
        Self {
            id: id.to_string(),
            parent_id: Some(parent_id.to_string()),
            title: title.to_string(),
            url: Some(url.to_string()),
            date_added,
            children: Vec::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }
}

#[async_trait::async_trait]
pub trait BookmarkPlatform: Send + Sync {
    /// Snapshot of the whole tree, rooted at the platform's invisible root.
    async fn read_tree(&self) -> Result<TreeNode, ProviderError>;
    async fn create_folder(&self, parent_id: &str, title: &str) -> Result<String, ProviderError>;
    async fn move_node(&self, node_id: &str, new_parent_id: &str) -> Result<(), ProviderError>;
    async fn remove_node(&self, node_id: &str) -> Result<(), ProviderError>;
    async fn create_bookmark(
        &self,
        parent_id: &str,
        title: &str,
        url: &str,
    ) -> Result<String, ProviderError>;
}
