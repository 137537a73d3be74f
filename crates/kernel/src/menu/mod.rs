//! Navigation menus gated by page access.
//!
//! Menus are static trees declared per feature area and aggregated into a
//! [`MenuCatalog`]. Each render derives the subset a role may see with
//! [`filter_menus_by_access`]; the source tree is never modified.

mod catalog;
mod filter;
mod nav;
mod node;

pub use catalog::{MenuCatalog, admin_menu, dashboard_menu};
pub use filter::filter_menus_by_access;
pub use nav::{NavItem, is_active_path};
pub use node::{IconName, MenuNode};
