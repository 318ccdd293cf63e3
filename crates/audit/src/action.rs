use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of auditable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    UserLogin,
    UserLogout,
    UserCreated,
    UserUpdated,
    UserDeleted,
    ContentCreated,
    ContentUpdated,
    ContentDeleted,
    RoleChanged,
    LogsViewed,
    ContentListViewed,
    UserListViewed,
}

impl AuditAction {
    pub const ALL: [AuditAction; 12] = [
        AuditAction::UserLogin,
        AuditAction::UserLogout,
        AuditAction::UserCreated,
        AuditAction::UserUpdated,
        AuditAction::UserDeleted,
        AuditAction::ContentCreated,
        AuditAction::ContentUpdated,
        AuditAction::ContentDeleted,
        AuditAction::RoleChanged,
        AuditAction::LogsViewed,
        AuditAction::ContentListViewed,
        AuditAction::UserListViewed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserLogin => "user_login",
            AuditAction::UserLogout => "user_logout",
            AuditAction::UserCreated => "user_created",
            AuditAction::UserUpdated => "user_updated",
            AuditAction::UserDeleted => "user_deleted",
            AuditAction::ContentCreated => "content_created",
            AuditAction::ContentUpdated => "content_updated",
            AuditAction::ContentDeleted => "content_deleted",
            AuditAction::RoleChanged => "role_changed",
            AuditAction::LogsViewed => "logs_viewed",
            AuditAction::ContentListViewed => "content_list_viewed",
            AuditAction::UserListViewed => "user_list_viewed",
        }
    }
}

impl core::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown audit action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for AuditAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}
