//! Mutable in-process bookmark tree shared by the memory and file platforms.

use crate::{ProviderError, TreeNode};

#[derive(Debug, Clone)]
pub struct BookmarkTree {
    root: TreeNode,
    next_id: u64,
}

impl BookmarkTree {
    pub fn new(root: TreeNode) -> Self {
        let next_id = max_numeric_id(&root) + 1;
        Self { root, next_id }
    }

    /// Empty tree shaped like a Chromium profile: invisible root `0` holding
    /// the bookmarks bar (`1`), other bookmarks (`2`) and mobile bookmarks (`3`).
    pub fn chrome_layout() -> Self {
        let root = TreeNode::folder("0", None, "").with_children(vec![
            TreeNode::folder("1", Some("0"), "Bookmarks bar"),
            TreeNode::folder("2", Some("0"), "Other bookmarks"),
            TreeNode::folder("3", Some("0"), "Mobile bookmarks"),
        ]);
        Self::new(root)
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn into_root(self) -> TreeNode {
        self.root
    }

    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        find_in(&self.root, id)
    }

    pub fn create_folder(
        &mut self,
        parent_id: &str,
        title: &str,
        now_ms: i64,
    ) -> Result<String, ProviderError> {
        let id = self.allocate_id();
        let mut node = TreeNode::folder(&id, Some(parent_id), title);
        node.date_added = now_ms;
        self.insert(parent_id, node)?;
        Ok(id)
    }

    pub fn create_bookmark(
        &mut self,
        parent_id: &str,
        title: &str,
        url: &str,
        now_ms: i64,
    ) -> Result<String, ProviderError> {
        let id = self.allocate_id();
        let node = TreeNode::bookmark(&id, parent_id, title, url, now_ms);
        self.insert(parent_id, node)?;
        Ok(id)
    }

    pub fn move_node(&mut self, node_id: &str, new_parent_id: &str) -> Result<(), ProviderError> {
        let node = self
            .find(node_id)
            .ok_or_else(|| ProviderError::NotFound(node_id.to_string()))?;
        if node.parent_id.is_none() || find_in(node, new_parent_id).is_some() {
            return Err(ProviderError::InvalidMove {
                node: node_id.to_string(),
                parent: new_parent_id.to_string(),
            });
        }
        self.ensure_folder(new_parent_id)?;

        let mut node = detach(&mut self.root, node_id)
            .ok_or_else(|| ProviderError::NotFound(node_id.to_string()))?;
        node.parent_id = Some(new_parent_id.to_string());
        self.insert(new_parent_id, node)
    }

    /// Removes a node together with its subtree.
    pub fn remove_node(&mut self, node_id: &str) -> Result<TreeNode, ProviderError> {
        if self.root.id == node_id {
            return Err(ProviderError::InvalidMove {
                node: node_id.to_string(),
                parent: String::new(),
            });
        }
        detach(&mut self.root, node_id).ok_or_else(|| ProviderError::NotFound(node_id.to_string()))
    }

    fn insert(&mut self, parent_id: &str, node: TreeNode) -> Result<(), ProviderError> {
        self.ensure_folder(parent_id)?;
        let parent = find_in_mut(&mut self.root, parent_id)
            .ok_or_else(|| ProviderError::NotFound(parent_id.to_string()))?;
        parent.children.push(node);
        Ok(())
    }

    fn ensure_folder(&self, id: &str) -> Result<(), ProviderError> {
        match self.find(id) {
            None => Err(ProviderError::NotFound(id.to_string())),
            Some(node) if !node.is_folder() => Err(ProviderError::NotAFolder(id.to_string())),
            Some(_) => Ok(()),
        }
    }

    fn allocate_id(&mut self) -> String {
        let id = self.next_id;
        self.next_id += 1;
        id.to_string()
    }
}

fn find_in<'a>(node: &'a TreeNode, id: &str) -> Option<&'a TreeNode> {
    if node.id == id {
        return Some(node);
    }
    node.children.iter().find_map(|c| find_in(c, id))
}

fn find_in_mut<'a>(node: &'a mut TreeNode, id: &str) -> Option<&'a mut TreeNode> {
    if node.id == id {
        return Some(node);
    }
    node.children.iter_mut().find_map(|c| find_in_mut(c, id))
}

fn detach(node: &mut TreeNode, id: &str) -> Option<TreeNode> {
    if let Some(pos) = node.children.iter().position(|c| c.id == id) {
        return Some(node.children.remove(pos));
    }
    node.children.iter_mut().find_map(|c| detach(c, id))
}

fn max_numeric_id(node: &TreeNode) -> u64 {
    let own = node.id.parse::<u64>().unwrap_or(0);
    node.children
        .iter()
        .map(max_numeric_id)
        .fold(own, u64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_continue_after_highest_existing() {
        let root = TreeNode::folder("0", None, "").with_children(vec![TreeNode::folder(
            "1",
            Some("0"),
            "Bookmarks bar",
        )
        .with_children(vec![TreeNode::bookmark("41", "1", "X", "https://x.com", 1)])]);
        let mut tree = BookmarkTree::new(root);
        let id = tree.create_folder("1", "Work", 5).unwrap();
        assert_eq!(id, "42");
    }

    #[test]
    fn move_reparents_and_rejects_cycles() {
        let mut tree = BookmarkTree::chrome_layout();
        let work = tree.create_folder("1", "Work", 0).unwrap();
        let inner = tree.create_folder(&work, "Inner", 0).unwrap();
        let bm = tree.create_bookmark("2", "X", "https://x.com", 0).unwrap();

        tree.move_node(&bm, &inner).unwrap();
        assert_eq!(tree.find(&bm).unwrap().parent_id.as_deref(), Some(inner.as_str()));
        assert!(tree.find("2").unwrap().children.is_empty());

        assert!(matches!(
            tree.move_node(&work, &inner),
            Err(ProviderError::InvalidMove { .. })
        ));
        let loose = tree.create_bookmark("2", "Y", "https://y.com", 0).unwrap();
        assert!(matches!(
            tree.move_node(&work, &loose),
            Err(ProviderError::NotAFolder(_))
        ));
    }

    #[test]
    fn remove_takes_subtree_but_not_root() {
        let mut tree = BookmarkTree::chrome_layout();
        let work = tree.create_folder("1", "Work", 0).unwrap();
        let bm = tree.create_bookmark(&work, "X", "https://x.com", 0).unwrap();
        let removed = tree.remove_node(&work).unwrap();
        assert_eq!(removed.children.len(), 1);
        assert!(tree.find(&bm).is_none());
        assert!(tree.remove_node("0").is_err());
        assert!(matches!(tree.remove_node("999"), Err(ProviderError::NotFound(_))));
    }
}
