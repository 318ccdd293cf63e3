//! Content domain module.
//!
//! Business rules for the managed content collection, implemented as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;

pub use item::{ContentItem, ContentPatch, ContentStatus, NewContent};
