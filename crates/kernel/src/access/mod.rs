//! Hierarchical page access.
//!
//! Pages are addressed by dot-delimited access keys derived from their URL
//! (`/dashboard/home` -> `dashboard.home`). Roles grant access patterns of
//! the same shape; a pattern covers itself and everything beneath it.

mod key;
mod pattern;

pub use key::{MAX_ACCESS_KEY_DEPTH, path_to_access_key};
pub use pattern::matches_pattern;
