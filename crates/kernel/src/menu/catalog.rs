//! Aggregated menu definitions.
//!
//! Each feature area declares its own static menu tree. The catalog collects
//! them in display order and may be extended with definitions read from a
//! JSON file at startup.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::{IconName, MenuNode, filter_menus_by_access};

/// Dashboard area menu.
pub fn dashboard_menu() -> MenuNode {
    MenuNode::new(
        "dashboard",
        "Dashboard",
        "/dashboard",
        IconName::LayoutDashboard,
        "dashboard",
    )
    .with_children(vec![
        MenuNode::new(
            "dashboard-home",
            "Home",
            "/dashboard/home",
            IconName::Home,
            "dashboard.home",
        ),
        MenuNode::new(
            "dashboard-analytics",
            "Analytics",
            "/dashboard/analytics",
            IconName::BarChart,
            "dashboard.analytics",
        )
        .with_children(vec![MenuNode::new(
            "dashboard-analytics-reports",
            "Reports",
            "/dashboard/analytics/reports",
            IconName::FileText,
            "dashboard.analytics.reports",
        )]),
        MenuNode::new(
            "dashboard-settings",
            "Settings",
            "/dashboard/settings",
            IconName::Settings,
            "dashboard.settings",
        ),
    ])
}

/// Administration area menu.
pub fn admin_menu() -> MenuNode {
    MenuNode::new("admin", "Administration", "/admin", IconName::Shield, "admin").with_children(
        vec![
            MenuNode::new(
                "admin-users",
                "Users",
                "/admin/users",
                IconName::Users,
                "admin.users",
            ),
            MenuNode::new(
                "admin-roles",
                "Roles",
                "/admin/roles",
                IconName::Key,
                "admin.roles",
            ),
        ],
    )
}

/// All menu trees known to the application.
#[derive(Debug, Clone)]
pub struct MenuCatalog {
    menus: Vec<MenuNode>,
}

impl MenuCatalog {
    /// Catalog containing only the built-in feature menus.
    pub fn builtin() -> Self {
        Self {
            menus: vec![dashboard_menu(), admin_menu()],
        }
    }

    /// Catalog with the given menus, in order.
    pub fn from_menus(menus: Vec<MenuNode>) -> Self {
        Self { menus }
    }

    /// Append menus from a JSON array of menu trees.
    ///
    /// Trees containing a path that does not start with `/` are skipped with
    /// a warning. Returns the number of trees added. A document that fails to
    /// parse adds nothing.
    pub fn extend_from_json(&mut self, source: &str, json: &str) -> usize {
        let menus = match serde_json::from_str::<Vec<MenuNode>>(json) {
            Ok(menus) => menus,
            Err(e) => {
                warn!(source = %source, error = %e, "failed to parse menu definitions");
                return 0;
            }
        };

        let mut seen: HashSet<String> = HashSet::new();
        for menu in &self.menus {
            collect_ids(menu, &mut seen);
        }

        let mut added = 0;
        for menu in menus {
            if let Some(path) = menu.first_invalid_path() {
                warn!(
                    source = %source,
                    menu = %menu.id,
                    path = %path,
                    "skipping menu with a path not starting with '/'"
                );
                continue;
            }

            let mut ids = HashSet::new();
            collect_ids(&menu, &mut ids);
            if let Some(duplicate) = ids.iter().find(|id| seen.contains(*id)) {
                warn!(source = %source, menu = %menu.id, id = %duplicate, "duplicate menu id");
            }
            seen.extend(ids);

            self.menus.push(menu);
            added += 1;
        }

        debug!(source = %source, added, total = self.menus.len(), "extended menu catalog");
        added
    }

    /// Append menus read from a JSON file.
    pub fn extend_from_file(&mut self, path: &Path) -> Result<usize> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read menu file {}", path.display()))?;
        Ok(self.extend_from_json(&path.display().to_string(), &json))
    }

    /// All menu trees.
    pub fn menus(&self) -> &[MenuNode] {
        &self.menus
    }

    /// The menus visible to the given access patterns.
    pub fn visible_to<S: AsRef<str>>(&self, patterns: &[S]) -> Vec<MenuNode> {
        filter_menus_by_access(&self.menus, patterns)
    }

    /// The menu entry for a page path, searching every tree.
    pub fn find_by_path(&self, path: &str) -> Option<&MenuNode> {
        self.menus.iter().find_map(|menu| menu.find_by_path(path))
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }
}

impl Default for MenuCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn collect_ids(menu: &MenuNode, out: &mut HashSet<String>) {
    out.insert(menu.id.clone());
    for child in &menu.children {
        collect_ids(child, out);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn count_nodes(menu: &MenuNode) -> usize {
        1 + menu.children.iter().map(count_nodes).sum::<usize>()
    }

    #[test]
    fn builtin_paths_are_absolute_and_ids_unique() {
        let catalog = MenuCatalog::builtin();
        let mut ids = HashSet::new();
        let mut count = 0;
        for menu in catalog.menus() {
            assert!(menu.first_invalid_path().is_none());
            collect_ids(menu, &mut ids);
            count += count_nodes(menu);
        }
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn builtin_order_is_dashboard_then_admin() {
        let catalog = MenuCatalog::builtin();
        let ids: Vec<_> = catalog.menus().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["dashboard", "admin"]);
    }

    #[test]
    fn extend_from_json_appends_valid_trees() {
        let mut catalog = MenuCatalog::builtin();
        let json = r#"[
            {"id": "student", "title": "Students", "path": "/student", "icon": "Users",
             "accessKey": "student",
             "children": [
                {"id": "student-list", "title": "List", "path": "/student/list",
                 "icon": "List", "accessKey": "student.list"}
             ]},
            {"id": "broken", "title": "Broken", "path": "broken", "icon": "List",
             "accessKey": "broken"}
        ]"#;

        assert_eq!(catalog.extend_from_json("test", json), 1);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.menus()[2].id, "student");
    }

    #[test]
    fn extend_from_json_ignores_garbage() {
        let mut catalog = MenuCatalog::builtin();
        assert_eq!(catalog.extend_from_json("test", "not json"), 0);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn find_by_path_searches_nested_entries() {
        let catalog = MenuCatalog::builtin();
        let reports = catalog.find_by_path("/dashboard/analytics/reports").unwrap();
        assert_eq!(reports.id, "dashboard-analytics-reports");
        assert!(catalog.find_by_path("/dashboard/missing").is_none());
    }

    #[test]
    fn visible_to_filters_across_areas() {
        let catalog = MenuCatalog::builtin();
        let visible = catalog.visible_to(&["admin.roles"]);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "admin");
        assert_eq!(visible[0].children.len(), 1);
        assert_eq!(visible[0].children[0].id, "admin-roles");
    }
}
