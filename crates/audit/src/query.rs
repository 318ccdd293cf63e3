//! Read side of the audit log (admin only; gating happens upstream).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use quillgate_core::{AuditLogId, StoreError, UserId};

use crate::stats::compute_stats;
use crate::{
    ActorDirectory, ActorSummary, AuditAction, AuditEntry, AuditLog, AuditMetadata, LogStats,
    PageRequest, Pagination, StatsWindow,
};

/// Exact-match filters; `None` means "any".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub action: Option<AuditAction>,
    pub actor_id: Option<UserId>,
}

impl LogFilter {
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.action.is_none_or(|a| a == entry.action)
            && self.actor_id.is_none_or(|id| id == entry.actor_id)
    }
}

/// An entry joined with its actor's current profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogView {
    pub id: AuditLogId,
    pub actor_id: UserId,
    /// `None` when the actor has since been deleted.
    pub actor: Option<ActorSummary>,
    pub action: AuditAction,
    pub meta: AuditMetadata,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogPage {
    pub logs: Vec<LogView>,
    pub pagination: Pagination,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct LogQueryService {
    log: Arc<dyn AuditLog>,
    directory: Arc<dyn ActorDirectory>,
}

impl LogQueryService {
    pub fn new(log: Arc<dyn AuditLog>, directory: Arc<dyn ActorDirectory>) -> Self {
        Self { log, directory }
    }

    /// One page of entries, newest first.
    #[tracing::instrument(skip(self), err)]
    pub async fn list(&self, filter: LogFilter, page: PageRequest) -> Result<LogPage, QueryError> {
        let (entries, total) = self.log.query(&filter, page).await?;

        let ids = distinct_actors(&entries);
        let actors = self.directory.actors(&ids).await?;

        let logs = entries
            .into_iter()
            .map(|e| LogView {
                id: e.id,
                actor_id: e.actor_id,
                actor: actors.get(&e.actor_id).cloned(),
                action: e.action,
                meta: e.metadata,
                created_at: e.created_at,
            })
            .collect();

        Ok(LogPage {
            logs,
            pagination: page.describe(total),
        })
    }

    /// Aggregate statistics for the trailing `window` ending at `now`.
    #[tracing::instrument(skip(self), err)]
    pub async fn stats(&self, window: StatsWindow, now: DateTime<Utc>) -> Result<LogStats, QueryError> {
        let entries = self.log.entries_since(window.start(now)).await?;
        let ids = distinct_actors(&entries);
        let actors = self.directory.actors(&ids).await?;
        Ok(compute_stats(&entries, &actors, window))
    }
}

fn distinct_actors(entries: &[AuditEntry]) -> Vec<UserId> {
    let mut ids: Vec<UserId> = entries.iter().map(|e| e.actor_id).collect();
    ids.sort();
    ids.dedup();
    ids
}
