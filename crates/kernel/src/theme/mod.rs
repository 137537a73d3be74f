//! Theme engine and template rendering.
//!
//! Pages are rendered with Tera from templates compiled into the binary.

mod engine;

pub use engine::{PageChrome, ThemeEngine};
