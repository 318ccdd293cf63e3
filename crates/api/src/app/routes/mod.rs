use axum::{
    middleware::from_fn_with_state,
    routing::MethodRouter,
    Router,
};

use quillgate_audit::{AuditAction, AuditRecorder};
use quillgate_auth::RolePolicy;

use crate::middleware::{audit_action, auth_middleware, require_roles, AuditState, AuthState};

pub mod auth;
pub mod content;
pub mod logs;
pub mod system;
pub mod users;

/// Shared gate state, handed to each area's router when it is registered.
#[derive(Clone)]
pub struct Gates {
    pub auth: AuthState,
    pub recorder: AuditRecorder,
}

impl Gates {
    /// Require a valid credential on every route currently in `router`.
    pub fn authenticated(&self, router: Router) -> Router {
        router.route_layer(from_fn_with_state(self.auth.clone(), auth_middleware))
    }

    /// Record `action` after a successful response from `route`.
    pub fn audited(&self, route: MethodRouter, action: AuditAction) -> MethodRouter {
        route.route_layer(from_fn_with_state(
            AuditState::new(self.recorder.clone(), action),
            audit_action,
        ))
    }
}

/// Restrict `route` to `policy`. Applied outside the audit wrapper so that a
/// rejected request never records anything.
pub fn restricted(route: MethodRouter, policy: RolePolicy) -> MethodRouter {
    route.route_layer(from_fn_with_state(policy, require_roles))
}

/// Router for all API endpoints except `/health`.
pub fn router(gates: &Gates) -> Router {
    Router::new()
        .nest("/auth", auth::router(gates))
        .nest("/users", users::router(gates))
        .nest("/content", content::router(gates))
        .nest("/logs", logs::router(gates))
}
