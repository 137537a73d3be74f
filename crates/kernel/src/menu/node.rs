//! Menu tree node.

use serde::{Deserialize, Serialize};

/// Icons available to navigation entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconName {
    LayoutDashboard,
    Home,
    BarChart,
    Settings,
    FileText,
    FolderOpen,
    List,
    Plus,
    Shield,
    Users,
    Key,
}

/// A navigation entry and its children.
///
/// `access_key` is a literal pattern string and is not derived from `path`,
/// so static nodes may be nested deeper than derived access keys are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    pub id: String,
    pub title: String,
    /// Navigable path, always starting with `/`.
    pub path: String,
    pub icon: IconName,
    /// Access pattern a role must satisfy to see this entry.
    pub access_key: String,
    #[serde(default)]
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    /// Create a leaf node.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        path: impl Into<String>,
        icon: IconName,
        access_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            path: path.into(),
            icon,
            access_key: access_key.into(),
            children: Vec::new(),
        }
    }

    /// Attach children, replacing any existing ones.
    pub fn with_children(mut self, children: Vec<MenuNode>) -> Self {
        self.children = children;
        self
    }

    /// Find the node in this subtree navigating to `path`.
    pub fn find_by_path(&self, path: &str) -> Option<&MenuNode> {
        if self.path == path {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_by_path(path))
    }

    /// Return the first node in this subtree whose path does not start with `/`.
    pub(crate) fn first_invalid_path(&self) -> Option<&str> {
        if !self.path.starts_with('/') {
            return Some(&self.path);
        }
        self.children
            .iter()
            .find_map(MenuNode::first_invalid_path)
    }
}
