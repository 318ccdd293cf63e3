use serde::Serialize;
use thiserror::Error;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// No principal has been bound to the request.
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: role '{0}' is not permitted")]
    Forbidden(Role),
}

/// Fixed set of roles admitted by a route.
///
/// Built once when routes are registered. Membership is a flat containment
/// check: listing `admin` does not imply `editor` or vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RolePolicy {
    permitted: &'static [Role],
}

impl RolePolicy {
    pub const ADMIN_ONLY: RolePolicy = RolePolicy::new(&[Role::Admin]);
    pub const EDITORS: RolePolicy = RolePolicy::new(&[Role::Editor, Role::Admin]);

    pub const fn new(permitted: &'static [Role]) -> Self {
        Self { permitted }
    }

    pub fn permitted(&self) -> &'static [Role] {
        self.permitted
    }

    pub fn admits(&self, role: Role) -> bool {
        self.permitted.contains(&role)
    }
}

/// Authorize an (optionally) bound principal against a route policy.
///
/// - No IO
/// - No panics
pub fn authorize(principal: Option<&Principal>, policy: &RolePolicy) -> Result<(), AuthzError> {
    let principal = principal.ok_or(AuthzError::Unauthenticated)?;
    if policy.admits(principal.role) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(principal.role))
    }
}
