//! `quillgate-core` — shared identifiers and error types.
//!
//! This crate contains no IO and no HTTP concerns.

pub mod error;
pub mod id;

pub use error::{DomainError, StoreError};
pub use id::{AuditLogId, ContentId, UserId};
