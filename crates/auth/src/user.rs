//! User (principal) records and the rules that guard their lifecycle.
//!
//! # Invariants
//! - Emails are stored trimmed and lower-cased; uniqueness is enforced by the store.
//! - The credential hash is write-only: it is never serialized outward.
//! - An actor can neither change their own role nor delete their own account.

use chrono::{DateTime, Utc};
use serde::Serialize;

use quillgate_core::{DomainError, UserId};

use crate::{Role, RoleParseError};

/// Stored user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
}

pub const REQUIRED_FIELDS_MESSAGE: &str = "Email, password, and name are required.";
pub const ELEVATED_ROLE_MESSAGE: &str = "Only the viewer role can be requested at registration.";

/// Canonical form of an email address (trimmed, lower-cased).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl NewUser {
    pub fn new(
        email: &str,
        name: &str,
        role: Role,
        password_hash: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let email = normalize_email(email);
        let name = name.trim().to_string();
        let password_hash = password_hash.into();
        if email.is_empty() || name.is_empty() || password_hash.is_empty() {
            return Err(DomainError::validation(REQUIRED_FIELDS_MESSAGE));
        }
        Ok(Self {
            email,
            name,
            role,
            password_hash,
        })
    }

    pub fn into_user(self, id: UserId, now: DateTime<Utc>) -> User {
        User {
            id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            role: self.role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Resolve the role requested at self-registration.
///
/// Absent means `viewer`. Registration is public, so elevated roles are refused
/// here; they can only be granted later by an admin.
pub fn registration_role(requested: Option<&str>) -> Result<Role, DomainError> {
    let role = match requested {
        None => return Ok(Role::default()),
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|e: RoleParseError| DomainError::validation(e.to_string()))?,
    };
    if role != Role::Viewer {
        return Err(DomainError::validation(ELEVATED_ROLE_MESSAGE));
    }
    Ok(role)
}

/// Operations an actor may never perform on their own account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfAction {
    ChangeRole,
    Delete,
}

impl SelfAction {
    pub fn refusal(&self) -> &'static str {
        match self {
            SelfAction::ChangeRole => "Cannot change your own role.",
            SelfAction::Delete => "Cannot delete your own account.",
        }
    }
}

/// Reject `action` when the actor targets themself.
pub fn ensure_not_self(actor: UserId, target: UserId, action: SelfAction) -> Result<(), DomainError> {
    if actor == target {
        return Err(DomainError::validation(action.refusal()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let u = NewUser::new("  Alice@Example.COM ", " Alice ", Role::Viewer, "$hash").unwrap();
        assert_eq!(u.email, "alice@example.com");
        assert_eq!(u.name, "Alice");
    }

    #[test]
    fn blank_fields_are_rejected() {
        let err = NewUser::new("   ", "Alice", Role::Viewer, "$hash").unwrap_err();
        assert_eq!(err, DomainError::validation(REQUIRED_FIELDS_MESSAGE));
        assert!(NewUser::new("a@b.c", "  ", Role::Viewer, "$hash").is_err());
    }

    #[test]
    fn hash_is_never_serialized() {
        let user = NewUser::new("a@b.c", "A", Role::Editor, "$argon2id$secret")
            .unwrap()
            .into_user(UserId::new(), Utc::now());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("secret"));
        assert_eq!(json["role"], "editor");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn registration_role_defaults_to_viewer() {
        assert_eq!(registration_role(None).unwrap(), Role::Viewer);
        assert_eq!(registration_role(Some("viewer")).unwrap(), Role::Viewer);
    }

    #[test]
    fn registration_refuses_elevated_and_unknown_roles() {
        assert_eq!(
            registration_role(Some("admin")).unwrap_err(),
            DomainError::validation(ELEVATED_ROLE_MESSAGE)
        );
        assert_eq!(
            registration_role(Some("root")).unwrap_err(),
            DomainError::validation("Invalid role. Must be admin, editor, or viewer.")
        );
    }

    #[test]
    fn self_actions_are_refused() {
        let me = UserId::new();
        let other = UserId::new();
        assert!(ensure_not_self(me, other, SelfAction::ChangeRole).is_ok());
        assert_eq!(
            ensure_not_self(me, me, SelfAction::ChangeRole).unwrap_err(),
            DomainError::validation("Cannot change your own role.")
        );
        assert_eq!(
            ensure_not_self(me, me, SelfAction::Delete).unwrap_err(),
            DomainError::validation("Cannot delete your own account.")
        );
    }
}
