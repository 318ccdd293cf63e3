use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use quillgate_auth::Role;
use quillgate_core::{StoreError, UserId};

use crate::{AuditEntry, LogFilter, PageRequest};

/// Append-only persistence for audit entries.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<(), StoreError>;

    /// Entries matching `filter`, newest first, sliced by `page`, plus the
    /// total number of matches across all pages.
    async fn query(
        &self,
        filter: &LogFilter,
        page: PageRequest,
    ) -> Result<(Vec<AuditEntry>, u64), StoreError>;

    /// All entries created at or after `since`.
    async fn entries_since(&self, since: DateTime<Utc>) -> Result<Vec<AuditEntry>, StoreError>;
}

/// Public profile of an actor, joined onto log views and statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Resolves actor ids to their current profile.
///
/// Ids that no longer resolve (deleted users) are simply absent from the map.
#[async_trait]
pub trait ActorDirectory: Send + Sync {
    async fn actors(&self, ids: &[UserId]) -> Result<HashMap<UserId, ActorSummary>, StoreError>;
}
