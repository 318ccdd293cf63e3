//! User administration (admin only).

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Path},
    middleware::from_fn_with_state,
    routing::{delete, get, patch},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use quillgate_audit::AuditAction;
use quillgate_auth::{ensure_not_self, Role, RolePolicy, SelfAction};
use quillgate_core::UserId;

use crate::app::dto::{json_body, metadata, RoleChangeRequest};
use crate::app::errors::ApiError;
use crate::app::routes::Gates;
use crate::app::AppServices;
use crate::context::PrincipalContext;
use crate::middleware::require_roles;

pub const USER_NOT_FOUND: &str = "User not found.";

pub fn router(gates: &Gates) -> Router {
    let router = Router::new()
        .route("/", gates.audited(get(list_users), AuditAction::UserListViewed))
        .route("/:id/role", patch(change_role))
        .route("/:id", delete(delete_user))
        .route_layer(from_fn_with_state(RolePolicy::ADMIN_ONLY, require_roles));
    gates.authenticated(router)
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse().map_err(|_| ApiError::bad_request("Invalid user id."))
}

/// GET /users
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Value>, ApiError> {
    let users = services.users.list().await?;
    Ok(Json(json!({ "users": users })))
}

/// PATCH /users/:id/role
pub async fn change_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<RoleChangeRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let target_id = parse_user_id(&id)?;
    ensure_not_self(ctx.user_id(), target_id, SelfAction::ChangeRole)?;

    let req = json_body(payload)?;
    let role = req
        .role
        .unwrap_or_default()
        .parse::<Role>()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let target = services
        .users
        .get(target_id)
        .await?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;
    let old_role = target.role;

    let updated = services
        .users
        .update_role(target_id, role, Utc::now())
        .await?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;

    services
        .recorder
        .record(
            ctx.user_id(),
            AuditAction::RoleChanged,
            metadata(json!({
                "targetUserId": updated.id,
                "targetUserEmail": updated.email,
                "oldRole": old_role,
                "newRole": updated.role,
            })),
        )
        .await;

    Ok(Json(json!({ "message": "User role updated successfully", "user": updated })))
}

/// DELETE /users/:id
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let target_id = parse_user_id(&id)?;
    ensure_not_self(ctx.user_id(), target_id, SelfAction::Delete)?;

    let target = services
        .users
        .get(target_id)
        .await?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;

    // Recorded before deletion while the target's details are still at hand.
    services
        .recorder
        .record(
            ctx.user_id(),
            AuditAction::UserDeleted,
            metadata(json!({
                "targetUserId": target.id,
                "targetUserEmail": target.email,
                "targetUserRole": target.role,
            })),
        )
        .await;

    if !services.users.delete(target_id).await? {
        return Err(ApiError::NotFound(USER_NOT_FOUND));
    }

    Ok(Json(json!({ "message": "User deleted successfully" })))
}
