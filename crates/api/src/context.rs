use quillgate_auth::{Principal, Role};
use quillgate_core::UserId;

/// Principal context for a request (the resolved, authenticated user).
///
/// Inserted into request extensions by the authentication gate and read by
/// the authorization gate, the audit wrapper and handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> UserId {
        self.principal.id
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }

    pub fn email(&self) -> &str {
        &self.principal.email
    }
}
