use crate::tree::BookmarkTree;
use crate::{BookmarkPlatform, PlatformOp, ProviderError, TreeNode};
use std::collections::HashSet;
use tokio::sync::Mutex;

/// In-process platform. Used by tests and the `memory` provider setting.
#[derive(Debug)]
pub struct MemoryPlatform {
    tree: Mutex<BookmarkTree>,
    failing: Mutex<HashSet<PlatformOp>>,
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new(BookmarkTree::chrome_layout())
    }
}

impl MemoryPlatform {
    pub fn new(tree: BookmarkTree) -> Self {
        Self {
            tree: Mutex::new(tree),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Make every subsequent call of `op` fail until [`MemoryPlatform::recover`].
    pub async fn fail_on(&self, op: PlatformOp) {
        self.failing.lock().await.insert(op);
    }

    pub async fn recover(&self, op: PlatformOp) {
        self.failing.lock().await.remove(&op);
    }

    pub async fn snapshot(&self) -> BookmarkTree {
        self.tree.lock().await.clone()
    }

    async fn check(&self, op: PlatformOp) -> Result<(), ProviderError> {
        if self.failing.lock().await.contains(&op) {
            return Err(ProviderError::Injected(op));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl BookmarkPlatform for MemoryPlatform {
    async fn read_tree(&self) -> Result<TreeNode, ProviderError> {
        self.check(PlatformOp::ReadTree).await?;
        Ok(self.tree.lock().await.root().clone())
    }

    async fn create_folder(&self, parent_id: &str, title: &str) -> Result<String, ProviderError> {
        self.check(PlatformOp::CreateFolder).await?;
        let now = chrono::Utc::now().timestamp_millis();
        self.tree.lock().await.create_folder(parent_id, title, now)
    }

    async fn move_node(&self, node_id: &str, new_parent_id: &str) -> Result<(), ProviderError> {
        self.check(PlatformOp::MoveNode).await?;
        self.tree.lock().await.move_node(node_id, new_parent_id)
    }

    async fn remove_node(&self, node_id: &str) -> Result<(), ProviderError> {
        self.check(PlatformOp::RemoveNode).await?;
        self.tree.lock().await.remove_node(node_id).map(|_| ())
    }

    async fn create_bookmark(
        &self,
        parent_id: &str,
        title: &str,
        url: &str,
    ) -> Result<String, ProviderError> {
        self.check(PlatformOp::CreateBookmark).await?;
        let now = chrono::Utc::now().timestamp_millis();
        self.tree
            .lock()
            .await
            .create_bookmark(parent_id, title, url, now)
    }
}
