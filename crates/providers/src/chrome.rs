//! Chromium `Bookmarks` profile file as a platform.
//!
//! Every call re-reads the file so edits made by the browser in the meantime
//! are picked up. Writes go through a temp file and a rename.

use crate::tree::BookmarkTree;
use crate::{BookmarkPlatform, ProviderError, TreeNode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Milliseconds between 1601-01-01 (WebKit epoch) and 1970-01-01.
const WEBKIT_EPOCH_OFFSET_MS: i64 = 11_644_473_600_000;
const ROOT_ID: &str = "0";

#[derive(Debug, Serialize, Deserialize)]
struct BookmarkFile {
    #[serde(default, skip_serializing)]
    checksum: Option<String>,
    roots: Roots,
    #[serde(default = "default_version")]
    version: u32,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Roots {
    bookmark_bar: FileNode,
    other: FileNode,
    synced: FileNode,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FileNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<FileNode>>,
    #[serde(default)]
    date_added: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_modified: Option<String>,
    #[serde(default)]
    guid: String,
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn default_version() -> u32 {
    1
}

/// Fields of the file the shared tree does not model; carried through writes.
#[derive(Debug, Default)]
struct NodeMeta {
    guid: String,
    date_modified: Option<String>,
    extra: Map<String, Value>,
}

impl NodeMeta {
    fn fresh() -> Self {
        Self {
            guid: uuid::Uuid::new_v4().to_string(),
            ..Self::default()
        }
    }
}

struct Loaded {
    tree: BookmarkTree,
    meta: HashMap<String, NodeMeta>,
    permanent: [String; 3],
    version: u32,
    file_extra: Map<String, Value>,
    roots_extra: Map<String, Value>,
}

impl Loaded {
    fn from_file(file: BookmarkFile) -> Self {
        let mut meta = HashMap::new();
        let Roots {
            bookmark_bar,
            other,
            synced,
            extra: roots_extra,
        } = file.roots;
        let permanent = [
            bookmark_bar.id.clone(),
            other.id.clone(),
            synced.id.clone(),
        ];
        let children = [bookmark_bar, other, synced]
            .into_iter()
            .map(|n| from_file_node(n, ROOT_ID, &mut meta))
            .collect();
        let root = TreeNode::folder(ROOT_ID, None, "").with_children(children);
        Self {
            tree: BookmarkTree::new(root),
            meta,
            permanent,
            version: file.version,
            file_extra: file.extra,
            roots_extra,
        }
    }

    fn into_file(self) -> Result<BookmarkFile, ProviderError> {
        let Loaded {
            tree,
            mut meta,
            permanent,
            version,
            file_extra,
            roots_extra,
        } = self;
        let mut root = tree.into_root();
        let mut take = |id: &str| -> Result<FileNode, ProviderError> {
            let pos = root
                .children
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| ProviderError::Format(format!("permanent folder {id} missing")))?;
            Ok(to_file_node(root.children.remove(pos), &mut meta))
        };
        let roots = Roots {
            bookmark_bar: take(&permanent[0])?,
            other: take(&permanent[1])?,
            synced: take(&permanent[2])?,
            extra: roots_extra,
        };
        Ok(BookmarkFile {
            checksum: None,
            roots,
            version,
            extra: file_extra,
        })
    }

    /// The invisible root and the three permanent folders cannot be moved or
    /// removed, and nothing may be added directly under the root.
    fn guard(&self, node_id: Option<&str>, parent_id: Option<&str>) -> Result<(), ProviderError> {
        let node_locked = node_id
            .map(|id| id == ROOT_ID || self.permanent.iter().any(|p| p == id))
            .unwrap_or(false);
        if node_locked || parent_id == Some(ROOT_ID) {
            return Err(ProviderError::InvalidMove {
                node: node_id.unwrap_or_default().to_string(),
                parent: parent_id.unwrap_or_default().to_string(),
            });
        }
        Ok(())
    }
}

fn from_file_node(node: FileNode, parent_id: &str, meta: &mut HashMap<String, NodeMeta>) -> TreeNode {
    let FileNode {
        children,
        date_added,
        date_modified,
        guid,
        id,
        name,
        kind,
        url,
        extra,
    } = node;
    let children = children
        .unwrap_or_default()
        .into_iter()
        .map(|c| from_file_node(c, &id, meta))
        .collect();
    meta.insert(
        id.clone(),
        NodeMeta {
            guid,
            date_modified,
            extra,
        },
    );
    TreeNode {
        id,
        parent_id: Some(parent_id.to_string()),
        title: name,
        url: if kind == "url" { url } else { None },
        date_added: webkit_to_unix_ms(&date_added),
        children,
    }
}

fn to_file_node(node: TreeNode, meta: &mut HashMap<String, NodeMeta>) -> FileNode {
    let mut m = meta.remove(&node.id).unwrap_or_else(NodeMeta::fresh);
    if m.guid.is_empty() {
        m.guid = NodeMeta::fresh().guid;
    }
    let is_folder = node.is_folder();
    let children = if is_folder {
        Some(
            node.children
                .into_iter()
                .map(|c| to_file_node(c, meta))
                .collect(),
        )
    } else {
        None
    };
    FileNode {
        children,
        date_added: unix_ms_to_webkit(node.date_added),
        date_modified: m.date_modified,
        guid: m.guid,
        id: node.id,
        name: node.title,
        kind: if is_folder { "folder" } else { "url" }.to_string(),
        url: node.url,
        extra: m.extra,
    }
}

/// Chromium stores microseconds since 1601 as a decimal string.
pub fn webkit_to_unix_ms(raw: &str) -> i64 {
    raw.trim()
        .parse::<i64>()
        .map(|us| us / 1000 - WEBKIT_EPOCH_OFFSET_MS)
        .unwrap_or(0)
}

pub fn unix_ms_to_webkit(ms: i64) -> String {
    ((ms + WEBKIT_EPOCH_OFFSET_MS) * 1000).to_string()
}

pub struct ChromeFilePlatform {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ChromeFilePlatform {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Loaded, ProviderError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let file: BookmarkFile =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::Format(e.to_string()))?;
        Ok(Loaded::from_file(file))
    }

    async fn store(&self, loaded: Loaded) -> Result<(), ProviderError> {
        let file = loaded.into_file()?;
        let bytes =
            serde_json::to_vec_pretty(&file).map_err(|e| ProviderError::Format(e.to_string()))?;
        let tmp = self.path.with_extension("tagmark.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "bookmark file written");
        Ok(())
    }

    async fn mutate<T: Send>(
        &self,
        f: impl FnOnce(&mut Loaded) -> Result<T, ProviderError> + Send,
    ) -> Result<T, ProviderError> {
        let _guard = self.lock.lock().await;
        let mut loaded = self.load().await?;
        let out = f(&mut loaded)?;
        self.store(loaded).await?;
        Ok(out)
    }
}

#[async_trait::async_trait]
impl BookmarkPlatform for ChromeFilePlatform {
    async fn read_tree(&self) -> Result<TreeNode, ProviderError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.tree.into_root())
    }

    async fn create_folder(&self, parent_id: &str, title: &str) -> Result<String, ProviderError> {
        let now = chrono::Utc::now().timestamp_millis();
        self.mutate(|l| {
            l.guard(None, Some(parent_id))?;
            l.tree.create_folder(parent_id, title, now)
        })
        .await
    }

    async fn move_node(&self, node_id: &str, new_parent_id: &str) -> Result<(), ProviderError> {
        self.mutate(|l| {
            l.guard(Some(node_id), Some(new_parent_id))?;
            l.tree.move_node(node_id, new_parent_id)
        })
        .await
    }

    async fn remove_node(&self, node_id: &str) -> Result<(), ProviderError> {
        self.mutate(|l| {
            l.guard(Some(node_id), None)?;
            l.tree.remove_node(node_id).map(|_| ())
        })
        .await
    }

    async fn create_bookmark(
        &self,
        parent_id: &str,
        title: &str,
        url: &str,
    ) -> Result<String, ProviderError> {
        let now = chrono::Utc::now().timestamp_millis();
        self.mutate(|l| {
            l.guard(None, Some(parent_id))?;
            l.tree.create_bookmark(parent_id, title, url, now)
        })
        .await
    }
}
