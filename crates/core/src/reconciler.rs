//! Mutation reconciler: user actions in, platform calls out.
//!
//! The platform is the source of truth. After every successful tag edit the
//! view is rebuilt from a fresh read; after any failure it is rebuilt from
//! whatever the platform now reports, and left at the last good state when
//! even that read fails.

use crate::config::AppConfig;
use crate::flatten::Flattener;
use crate::picker::PickerChoice;
use crate::state::ViewState;
use crate::undo::{PendingDeletion, UndoBuffer};
use providers::{BookmarkPlatform, PlatformOp, ProviderError, TreeNode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unknown bookmark: {0}")]
    UnknownBookmark(String),
    #[error(transparent)]
    External(#[from] ProviderError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Done, but not as asked; the view was resynced from the platform.
    Conflict(String),
    /// Nothing to do.
    Noop,
}

pub struct Reconciler {
    platform: Arc<dyn BookmarkPlatform>,
    flattener: Flattener,
    root_id: String,
    view: ViewState,
    undo: UndoBuffer,
}

impl Reconciler {
    pub fn new(
        platform: Arc<dyn BookmarkPlatform>,
        flattener: Flattener,
        root_id: &str,
        undo_window: Duration,
    ) -> Self {
        Self {
            platform,
            flattener,
            root_id: root_id.to_string(),
            view: ViewState::default(),
            undo: UndoBuffer::new(undo_window),
        }
    }

    pub fn from_config(platform: Arc<dyn BookmarkPlatform>, cfg: &AppConfig) -> Self {
        Self::new(
            platform,
            Flattener::from_config(cfg),
            &cfg.platform.root_id,
            Duration::from_secs(cfg.undo.window_secs),
        )
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Search text and tag selection live here; they never touch the platform.
    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn undo_window(&self) -> Duration {
        self.undo.window()
    }

    pub async fn pending_deletion(&self) -> Option<PendingDeletion> {
        self.undo.pending().await
    }

    /// Full re-flatten from the platform.
    pub async fn reload(&mut self) -> Result<(), ReconcileError> {
        let tree = match self.platform.read_tree().await {
            Ok(tree) => tree,
            Err(err) => {
                warn!(error = %err, "reading bookmark tree failed, keeping last known view");
                return Err(err.into());
            }
        };
        let flattened = self.flattener.flatten(&tree);
        if !flattened.malformed.is_empty() {
            warn!(count = flattened.malformed.len(), "bookmarks with malformed urls");
        }
        debug!(
            bookmarks = flattened.bookmarks.len(),
            tags = flattened.vocabulary.len(),
            "view rebuilt"
        );
        self.view.replace(flattened);
        Ok(())
    }

    /// Removes the bookmark from the view at once and from the platform,
    /// keeping a snapshot for [`Reconciler::undo_delete`]. The undo slot is
    /// only armed once the platform confirms the removal.
    pub async fn delete_bookmark(&mut self, id: &str) -> Result<Outcome, ReconcileError> {
        let record = self
            .view
            .remove(id)
            .ok_or_else(|| ReconcileError::UnknownBookmark(id.to_string()))?;
        if let Err(err) = self.platform.remove_node(id).await {
            // Restored first so a failed resync still shows the bookmark.
            self.view.insert(record);
            return Err(self.resync_after(PlatformOp::RemoveNode, id, err).await);
        }
        info!(id, "bookmark removed");
        if let Some(forfeited) = self.undo.arm(PendingDeletion::of(record)).await {
            debug!(id = %forfeited.record.id, "previous deletion can no longer be undone");
        }
        Ok(Outcome::Applied)
    }

    /// Recreates the pending deletion. The slot is cleared only after the
    /// platform accepts the bookmark, so a failed attempt can be retried
    /// within what is left of the window.
    pub async fn undo_delete(&mut self) -> Result<Outcome, ReconcileError> {
        let Some(pending) = self.undo.pending().await else {
            return Ok(Outcome::Noop);
        };
        let original = if pending.original_parent_id.is_empty() {
            self.root_id.clone()
        } else {
            pending.original_parent_id.clone()
        };
        let (title, url) = (pending.record.title.as_str(), pending.record.url.as_str());

        let (new_id, parent) = match self.platform.create_bookmark(&original, title, url).await {
            Ok(id) => (id, original.clone()),
            Err(ProviderError::NotFound(_)) if original != self.root_id => {
                warn!(parent = %original, "original folder is gone, restoring to root container");
                match self.platform.create_bookmark(&self.root_id, title, url).await {
                    Ok(id) => (id, self.root_id.clone()),
                    Err(err) => {
                        let target = self.root_id.clone();
                        return Err(self.resync_after(PlatformOp::CreateBookmark, &target, err).await);
                    }
                }
            }
            Err(err) => {
                return Err(self.resync_after(PlatformOp::CreateBookmark, &original, err).await);
            }
        };
        self.undo.take().await;

        info!(old = %pending.record.id, new = %new_id, parent = %parent, "bookmark restored");
        let mut restored = pending.record;
        restored.id = new_id;
        restored.parent_id = parent.clone();
        self.view.insert(restored);

        if parent != original {
            // Snapshot tags no longer match where the bookmark landed.
            let _ = self.reload().await;
            return Ok(Outcome::Conflict(format!(
                "folder {original} no longer exists, restored to {parent}"
            )));
        }
        Ok(Outcome::Applied)
    }

    /// Toggles `tag` on the bookmark. Removing a tag moves the bookmark to the
    /// root container, which drops every folder-derived tag at once.
    pub async fn assign_tag(&mut self, id: &str, tag: &str) -> Result<Outcome, ReconcileError> {
        let record = self
            .view
            .find(id)
            .cloned()
            .ok_or_else(|| ReconcileError::UnknownBookmark(id.to_string()))?;

        if !record.has_tag(tag) {
            self.check_tag_name(tag)?;
        }

        if record.has_tag(tag) {
            let root = self.root_id.clone();
            if let Err(err) = self.platform.move_node(id, &root).await {
                return Err(self.resync_after(PlatformOp::MoveNode, id, err).await);
            }
            info!(id, tag, "tag removed, bookmark moved to root container");
        } else {
            let folder = match self.ensure_tag_folder(tag).await {
                Ok(folder) => folder,
                Err((op, err)) => return Err(self.resync_after(op, tag, err).await),
            };
            if let Err(err) = self.platform.move_node(id, &folder).await {
                return Err(self.resync_after(PlatformOp::MoveNode, id, err).await);
            }
            info!(id, tag, folder = %folder, "tag assigned");
        }

        self.reload().await?;
        Ok(Outcome::Applied)
    }

    /// New top-level folder named `name`, with the bookmark moved into it.
    /// Existing names belong to [`Reconciler::assign_tag`].
    pub async fn create_tag(&mut self, id: &str, name: &str) -> Result<Outcome, ReconcileError> {
        let name = name.trim();
        self.check_tag_name(name)?;
        if self.view.vocabulary().contains(name) {
            return Err(ReconcileError::InvalidRequest(format!(
                "tag {name:?} already exists"
            )));
        }
        if self.view.find(id).is_none() {
            return Err(ReconcileError::UnknownBookmark(id.to_string()));
        }

        let root = self.root_id.clone();
        let folder = match self.platform.create_folder(&root, name).await {
            Ok(folder) => folder,
            Err(err) => return Err(self.resync_after(PlatformOp::CreateFolder, name, err).await),
        };
        if let Err(err) = self.platform.move_node(id, &folder).await {
            return Err(self.resync_after(PlatformOp::MoveNode, id, err).await);
        }
        info!(id, tag = name, folder = %folder, "tag created");

        self.reload().await?;
        Ok(Outcome::Applied)
    }

    /// Applies what the user picked in a tag popover.
    pub async fn apply_choice(
        &mut self,
        id: &str,
        choice: PickerChoice,
    ) -> Result<Outcome, ReconcileError> {
        match choice {
            PickerChoice::Select(tag) => self.assign_tag(id, &tag).await,
            PickerChoice::Create(name) => self.create_tag(id, &name).await,
        }
    }

    /// Folder names the flattener skips would never show up as tags.
    fn check_tag_name(&self, name: &str) -> Result<(), ReconcileError> {
        if name.trim().is_empty() {
            return Err(ReconcileError::InvalidRequest("tag name is empty".into()));
        }
        if !self.flattener.filter().keeps(name) {
            return Err(ReconcileError::InvalidRequest(format!(
                "{name:?} is a container name and cannot be used as a tag"
            )));
        }
        Ok(())
    }

    /// Reuses a top-level folder titled `tag`, creating one when absent.
    async fn ensure_tag_folder(&self, tag: &str) -> Result<String, (PlatformOp, ProviderError)> {
        let tree = self
            .platform
            .read_tree()
            .await
            .map_err(|e| (PlatformOp::ReadTree, e))?;
        let container = find_node(&tree, &self.root_id).ok_or_else(|| {
            (
                PlatformOp::ReadTree,
                ProviderError::NotFound(self.root_id.clone()),
            )
        })?;
        if let Some(existing) = container
            .children
            .iter()
            .find(|c| c.is_folder() && c.title == tag)
        {
            return Ok(existing.id.clone());
        }
        self.platform
            .create_folder(&self.root_id, tag)
            .await
            .map_err(|e| (PlatformOp::CreateFolder, e))
    }

    async fn resync_after(
        &mut self,
        op: PlatformOp,
        target: &str,
        err: ProviderError,
    ) -> ReconcileError {
        warn!(%op, subject = target, error = %err, "platform call failed, resyncing view");
        // A failed read is logged inside reload and leaves the view as it was.
        let _ = self.reload().await;
        err.into()
    }
}

fn find_node<'a>(node: &'a TreeNode, id: &str) -> Option<&'a TreeNode> {
    if node.id == id {
        return Some(node);
    }
    node.children.iter().find_map(|c| find_node(c, id))
}
