use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quillgate_core::{AuditLogId, UserId};

use crate::AuditAction;

/// Free-form, schema-less key/value bag attached to an entry.
pub type AuditMetadata = serde_json::Map<String, serde_json::Value>;

/// An immutable record of an actor performing a recognised action.
///
/// Entries are append-only: nothing in the system updates or deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: AuditLogId,
    pub actor_id: UserId,
    pub action: AuditAction,
    #[serde(rename = "meta", default)]
    pub metadata: AuditMetadata,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(actor_id: UserId, action: AuditAction, metadata: AuditMetadata, now: DateTime<Utc>) -> Self {
        Self {
            id: AuditLogId::new(),
            actor_id,
            action,
            metadata,
            created_at: now,
        }
    }
}
