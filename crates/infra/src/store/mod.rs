//! Persistence seams for users and content.
//!
//! The audit log seam ([`quillgate_audit::AuditLog`]) lives with the audit
//! domain; its adapters live here next to the others.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use quillgate_auth::{Role, User};
use quillgate_content::ContentItem;
use quillgate_core::{ContentId, StoreError, UserId};

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::{InMemoryAuditLog, InMemoryContentStore, InMemoryUserStore};
#[cfg(feature = "postgres")]
pub use postgres::{migrate, PostgresAuditLog, PostgresContentStore, PostgresUserStore};

/// User records. Emails are unique (case-insensitive; stored normalized).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; `StoreError::Conflict` if the email is taken.
    async fn insert(&self, user: User) -> Result<(), StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Look up by email; the argument is normalized before comparison.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Users for the given ids; unknown ids are skipped.
    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError>;

    /// Set the role and return the updated record, `None` if absent.
    async fn update_role(
        &self,
        id: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: UserId) -> Result<bool, StoreError>;
}

/// Content items.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert(&self, item: ContentItem) -> Result<(), StoreError>;

    async fn get(&self, id: ContentId) -> Result<Option<ContentItem>, StoreError>;

    /// All items, newest first.
    async fn list(&self) -> Result<Vec<ContentItem>, StoreError>;

    /// Replace an existing item; `StoreError::NotFound` if absent.
    async fn update(&self, item: ContentItem) -> Result<(), StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: ContentId) -> Result<bool, StoreError>;
}
