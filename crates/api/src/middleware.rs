//! Request gates: authentication, role authorization, and the audit wrapper.
//!
//! Order on a protected route is always authenticate -> require_roles ->
//! audit_action -> handler. Each gate short-circuits with an `ApiError`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{OriginalUri, Query, Request, State},
    http::{Method, Uri},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use serde_json::Value;

use quillgate_audit::{AuditAction, AuditMetadata, AuditRecorder};
use quillgate_auth::{authorize, AuthzError, RolePolicy, TokenCodec, TokenError};
use quillgate_infra::{PrincipalResolver, ResolveError};

use crate::app::errors::{ApiError, BODY_TOO_LARGE};
use crate::context::PrincipalContext;
use crate::cookies::read_auth_cookie;

pub const NO_TOKEN: &str = "Access denied. No token provided.";
pub const INVALID_TOKEN: &str = "Invalid token.";
pub const TOKEN_EXPIRED: &str = "Token expired.";
pub const USER_NOT_FOUND: &str = "Invalid token. User not found.";
pub const AUTH_REQUIRED: &str = "Authentication required.";
pub const INSUFFICIENT_PERMISSIONS: &str = "Access denied. Insufficient permissions.";

/// Largest request body the audit wrapper will buffer (matches axum's default
/// body limit for extractors).
pub const MAX_AUDITED_BODY: usize = 2 * 1024 * 1024;

const REDACTED: &str = "[REDACTED]";

#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<TokenCodec>,
    pub resolver: PrincipalResolver,
}

/// Verify the credential cookie and bind the resolved principal.
///
/// Expiry is decided from the credential alone, before the user lookup.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = read_auth_cookie(req.headers()).ok_or(ApiError::Unauthorized(NO_TOKEN))?;

    let user_id = state.codec.verify(token, Utc::now()).map_err(|e| match e {
        TokenError::Expired => ApiError::Unauthorized(TOKEN_EXPIRED),
        TokenError::Malformed => ApiError::Unauthorized(INVALID_TOKEN),
        other => ApiError::internal(other),
    })?;

    let principal = match state.resolver.resolve(user_id).await {
        Ok(p) => p,
        Err(ResolveError::NotFound) => return Err(ApiError::Unauthorized(USER_NOT_FOUND)),
        Err(e) => return Err(e.into()),
    };

    req.extensions_mut().insert(PrincipalContext::new(principal));
    Ok(next.run(req).await)
}

/// Admit the request only if the bound principal's role is in `policy`.
pub async fn require_roles(
    State(policy): State<RolePolicy>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let decision = authorize(
        req.extensions().get::<PrincipalContext>().map(PrincipalContext::principal),
        &policy,
    );

    match decision {
        Ok(()) => Ok(next.run(req).await),
        Err(AuthzError::Unauthenticated) => Err(ApiError::Unauthorized(AUTH_REQUIRED)),
        Err(AuthzError::Forbidden(role)) => {
            tracing::debug!(%role, permitted = ?policy.permitted(), "role not permitted");
            Err(ApiError::Forbidden(INSUFFICIENT_PERMISSIONS))
        }
    }
}

#[derive(Clone)]
pub struct AuditState {
    pub recorder: AuditRecorder,
    pub action: AuditAction,
}

impl AuditState {
    pub fn new(recorder: AuditRecorder, action: AuditAction) -> Self {
        Self { recorder, action }
    }
}

/// Record `action` for the bound principal once the handler has produced a
/// response with a status below 400.
///
/// The request body is buffered so it can be attached to the entry, then
/// handed to the handler unchanged. The response passes through untouched and
/// the append runs detached, so it may land after the response is sent.
pub async fn audit_action(
    State(state): State<AuditState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = req.into_parts();
    // Same answer the JSON extractor gives past its default limit.
    let bytes = axum::body::to_bytes(body, MAX_AUDITED_BODY)
        .await
        .map_err(|_| ApiError::PayloadTooLarge(BODY_TOO_LARGE))?;

    let actor = parts.extensions.get::<PrincipalContext>().map(PrincipalContext::user_id);
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|o| o.0.clone())
        .unwrap_or_else(|| parts.uri.clone());
    let metadata = request_metadata(&parts.method, &uri, &bytes);

    let req = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(req).await;

    if response.status().as_u16() < 400 {
        match actor {
            Some(actor) => {
                state.recorder.record_detached(actor, state.action, metadata);
            }
            None => tracing::warn!(action = %state.action, "audit wrapper reached without a principal"),
        }
    }

    Ok(response)
}

fn request_metadata(method: &Method, uri: &Uri, body: &[u8]) -> AuditMetadata {
    let query: serde_json::Map<String, Value> = Query::<BTreeMap<String, String>>::try_from_uri(uri)
        .map(|Query(q)| q)
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    let mut body = if body.is_empty() {
        Value::Object(serde_json::Map::new())
    } else {
        serde_json::from_slice(body).unwrap_or(Value::Null)
    };
    redact_passwords(&mut body);

    let mut meta = AuditMetadata::new();
    meta.insert("method".into(), Value::String(method.to_string()));
    meta.insert("path".into(), Value::String(uri.path().to_string()));
    meta.insert("query".into(), Value::Object(query));
    meta.insert("body".into(), body);
    meta
}

fn redact_passwords(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if key == "password" {
                    *v = Value::String(REDACTED.to_string());
                } else {
                    redact_passwords(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_passwords),
        _ => {}
    }
}
