//! HTTP middleware components.
//!
//! Session restore runs for every request; the route guard runs for private
//! pages only.

pub mod route_guard;
pub mod session;

pub use route_guard::route_guard;
pub use session::{load_session, restore_snapshot};
