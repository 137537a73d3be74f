//! Render model for navigation menus.

use serde::Serialize;

use super::{IconName, MenuNode};

/// A menu entry annotated for the current request path.
#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub id: String,
    pub title: String,
    pub path: String,
    pub icon: IconName,
    /// The current path is this entry or below it.
    pub active: bool,
    pub children: Vec<NavItem>,
}

impl NavItem {
    /// Annotate already-filtered menus for rendering at `current_path`.
    pub fn build(menus: &[MenuNode], current_path: &str) -> Vec<NavItem> {
        menus
            .iter()
            .map(|menu| NavItem {
                id: menu.id.clone(),
                title: menu.title.clone(),
                path: menu.path.clone(),
                icon: menu.icon,
                active: is_active_path(current_path, &menu.path),
                children: NavItem::build(&menu.children, current_path),
            })
            .collect()
    }
}

/// Whether `current` is `menu_path` or one of its sub-paths.
pub fn is_active_path(current: &str, menu_path: &str) -> bool {
    match current.strip_prefix(menu_path) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}
