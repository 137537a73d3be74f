//! Role-based menu tree pruning.

use crate::access::matches_pattern;

use super::MenuNode;

/// Derive the part of a menu tree visible to the given access patterns.
///
/// Children are filtered first. A node survives when its own `access_key`
/// matches a pattern, or when at least one of its children survived; in the
/// latter case it is kept as a waypoint to the accessible descendant. A kept
/// node carries only its surviving children. Sibling order is preserved and
/// the input is left untouched.
pub fn filter_menus_by_access<S: AsRef<str>>(menus: &[MenuNode], patterns: &[S]) -> Vec<MenuNode> {
    menus
        .iter()
        .filter_map(|menu| filter_node(menu, patterns))
        .collect()
}

fn filter_node<S: AsRef<str>>(menu: &MenuNode, patterns: &[S]) -> Option<MenuNode> {
    let children = filter_menus_by_access(&menu.children, patterns);

    if children.is_empty() && !matches_pattern(&menu.access_key, patterns) {
        return None;
    }

    Some(MenuNode {
        id: menu.id.clone(),
        title: menu.title.clone(),
        path: menu.path.clone(),
        icon: menu.icon,
        access_key: menu.access_key.clone(),
        children,
    })
}
