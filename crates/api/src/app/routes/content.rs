//! Content items. Reads are open to any authenticated role; writes need
//! editor or admin.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Path},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use quillgate_audit::AuditAction;
use quillgate_auth::RolePolicy;
use quillgate_content::{ContentItem, ContentPatch, NewContent};
use quillgate_core::{ContentId, StoreError, UserId};

use crate::app::dto::{json_body, ContentRequest};
use crate::app::errors::ApiError;
use crate::app::routes::{restricted, Gates};
use crate::app::AppServices;
use crate::context::PrincipalContext;

pub const CONTENT_NOT_FOUND: &str = "Content not found.";

pub fn router(gates: &Gates) -> Router {
    let collection = gates
        .audited(get(list_content), AuditAction::ContentListViewed)
        .merge(restricted(
            gates.audited(post(create_content), AuditAction::ContentCreated),
            RolePolicy::EDITORS,
        ));

    let item = get(get_content)
        .merge(restricted(
            gates.audited(patch(update_content), AuditAction::ContentUpdated),
            RolePolicy::EDITORS,
        ))
        .merge(restricted(
            gates.audited(delete(delete_content), AuditAction::ContentDeleted),
            RolePolicy::EDITORS,
        ));

    gates.authenticated(Router::new().route("/", collection).route("/:id", item))
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// A content item with its author's current profile (`null` once deleted).
#[derive(Debug, Clone, Serialize)]
pub struct ContentView {
    #[serde(flatten)]
    pub item: ContentItem,
    pub author: Option<AuthorSummary>,
}

async fn with_authors(
    services: &AppServices,
    items: Vec<ContentItem>,
) -> Result<Vec<ContentView>, ApiError> {
    let mut ids: Vec<UserId> = items.iter().map(|c| c.author_id).collect();
    ids.sort();
    ids.dedup();

    let authors: HashMap<UserId, AuthorSummary> = services
        .users
        .get_many(&ids)
        .await?
        .into_iter()
        .map(|u| {
            (
                u.id,
                AuthorSummary {
                    id: u.id,
                    name: u.name,
                    email: u.email,
                },
            )
        })
        .collect();

    Ok(items
        .into_iter()
        .map(|item| ContentView {
            author: authors.get(&item.author_id).cloned(),
            item,
        })
        .collect())
}

async fn view(services: &AppServices, item: ContentItem) -> Result<ContentView, ApiError> {
    let mut views = with_authors(services, vec![item.clone()]).await?;
    Ok(views.pop().unwrap_or(ContentView { item, author: None }))
}

fn parse_content_id(raw: &str) -> Result<ContentId, ApiError> {
    raw.parse().map_err(|_| ApiError::bad_request("Invalid content id."))
}

/// GET /content
pub async fn list_content(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Value>, ApiError> {
    let items = services.content.list().await?;
    let content = with_authors(&services, items).await?;
    Ok(Json(json!({ "content": content })))
}

/// GET /content/:id
pub async fn get_content(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_content_id(&id)?;
    let item = services
        .content
        .get(id)
        .await?
        .ok_or(ApiError::NotFound(CONTENT_NOT_FOUND))?;
    Ok(Json(json!({ "content": view(&services, item).await? })))
}

/// POST /content
pub async fn create_content(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let req = json_body(payload)?;
    let item = NewContent::parse(req.title.as_deref(), req.body.as_deref(), req.status.as_deref())?
        .into_item(ContentId::new(), ctx.user_id(), Utc::now());

    services.content.insert(item.clone()).await?;
    tracing::info!(content_id = %item.id, author_id = %item.author_id, "content created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Content created successfully",
            "content": view(&services, item).await?,
        })),
    ))
}

/// PATCH /content/:id
pub async fn update_content(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_content_id(&id)?;
    let req = json_body(payload)?;

    let mut item = services
        .content
        .get(id)
        .await?
        .ok_or(ApiError::NotFound(CONTENT_NOT_FOUND))?;

    let patch = ContentPatch::parse(req.title.as_deref(), req.body.as_deref(), req.status.as_deref())?;
    patch.apply(&mut item, Utc::now());

    match services.content.update(item.clone()).await {
        Ok(()) => {}
        Err(StoreError::NotFound) => return Err(ApiError::NotFound(CONTENT_NOT_FOUND)),
        Err(e) => return Err(e.into()),
    }

    Ok(Json(json!({
        "message": "Content updated successfully",
        "content": view(&services, item).await?,
    })))
}

/// DELETE /content/:id
pub async fn delete_content(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_content_id(&id)?;
    if !services.content.delete(id).await? {
        return Err(ApiError::NotFound(CONTENT_NOT_FOUND));
    }
    Ok(Json(json!({ "message": "Content deleted successfully" })))
}
