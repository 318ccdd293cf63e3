//! Best-effort audit recording.
//!
//! The audit trail is not transactional with the operation it describes: an
//! append failure is reported through `tracing` and swallowed, so it can never
//! change the caller's result. Detached appends may become visible to readers
//! after the response that triggered them has been sent.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;

use quillgate_core::UserId;

use crate::{AuditAction, AuditEntry, AuditLog, AuditMetadata};

#[derive(Clone)]
pub struct AuditRecorder {
    log: Arc<dyn AuditLog>,
}

impl core::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuditRecorder").finish_non_exhaustive()
    }
}

impl AuditRecorder {
    pub fn new(log: Arc<dyn AuditLog>) -> Self {
        Self { log }
    }

    /// Append an entry and wait for the store to answer.
    ///
    /// Used by handlers that record richer metadata after the business
    /// operation; failures are logged, never returned.
    pub async fn record(&self, actor_id: UserId, action: AuditAction, metadata: AuditMetadata) {
        append_or_report(self.log.as_ref(), AuditEntry::new(actor_id, action, metadata, Utc::now())).await;
    }

    /// Append an entry on a detached task (fire-and-forget).
    ///
    /// The returned handle may be dropped; it exists so tests can wait for the
    /// append to settle.
    pub fn record_detached(
        &self,
        actor_id: UserId,
        action: AuditAction,
        metadata: AuditMetadata,
    ) -> JoinHandle<()> {
        let log = Arc::clone(&self.log);
        let entry = AuditEntry::new(actor_id, action, metadata, Utc::now());
        tokio::spawn(async move {
            append_or_report(log.as_ref(), entry).await;
        })
    }
}

async fn append_or_report(log: &dyn AuditLog, entry: AuditEntry) {
    let action = entry.action;
    let actor_id = entry.actor_id;
    if let Err(e) = log.append(entry).await {
        tracing::error!(%actor_id, %action, error = %e, "failed to append audit entry");
    }
}
