//! Audit log listing and statistics (admin only).

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Json, Query},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use chrono::Utc;

use quillgate_audit::{AuditAction, LogFilter, LogPage, LogStats, PageRequest, StatsWindow};
use quillgate_auth::RolePolicy;
use quillgate_core::UserId;

use crate::app::dto::{present, query_params, LogsQuery, StatsQuery};
use crate::app::errors::ApiError;
use crate::app::routes::Gates;
use crate::app::AppServices;
use crate::middleware::require_roles;

pub fn router(gates: &Gates) -> Router {
    let router = Router::new()
        .route("/", gates.audited(get(list_logs), AuditAction::LogsViewed))
        .route("/stats", get(log_stats))
        .route_layer(from_fn_with_state(RolePolicy::ADMIN_ONLY, require_roles));
    gates.authenticated(router)
}

/// GET /logs?page&limit&action&actorId
pub async fn list_logs(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<Json<LogPage>, ApiError> {
    let q = query_params(query)?;
    let page = PageRequest::new(q.page, q.limit)?;

    // Blank filters mean "no filter".
    let action = present(q.action)
        .map(|a| a.parse::<AuditAction>())
        .transpose()
        .map_err(|_| ApiError::bad_request("Invalid action filter."))?;
    let actor_id = present(q.actor_id)
        .map(|id| id.parse::<UserId>())
        .transpose()
        .map_err(|_| ApiError::bad_request("Invalid actorId filter."))?;

    let logs = services.logs.list(LogFilter { action, actor_id }, page).await?;
    Ok(Json(logs))
}

/// GET /logs/stats?days
pub async fn log_stats(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<LogStats>, ApiError> {
    let q = query_params(query)?;
    let window = StatsWindow::new(q.days).map_err(|e| ApiError::bad_request(format!("{e}.")))?;
    let stats = services.logs.stats(window, Utc::now()).await?;
    Ok(Json(stats))
}
