//! Registration, login, logout and the current-user endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::json;

use quillgate_audit::AuditAction;
use quillgate_auth::{hash_password, registration_role, user::REQUIRED_FIELDS_MESSAGE, verify_password, NewUser};
use quillgate_core::{StoreError, UserId};

use crate::app::dto::{json_body, metadata, present, LoginRequest, RegisterRequest};
use crate::app::errors::ApiError;
use crate::app::routes::Gates;
use crate::app::{AppServices, Sessions};
use crate::context::PrincipalContext;

pub const EMAIL_TAKEN: &str = "User with this email already exists.";
pub const LOGIN_FIELDS_REQUIRED: &str = "Email and password are required.";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";

pub fn router(gates: &Gates) -> Router {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(gates.authenticated(protected))
}

/// POST /auth/register
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(sessions): Extension<Arc<Sessions>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let (Some(email), Some(password), Some(name)) =
        (present(req.email), present(req.password), present(req.name))
    else {
        return Err(ApiError::bad_request(REQUIRED_FIELDS_MESSAGE));
    };
    let role = registration_role(req.role.as_deref())?;

    if services.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::bad_request(EMAIL_TAKEN));
    }

    let hash = hash_password(&password).map_err(ApiError::internal)?;
    let user = NewUser::new(&email, &name, role, hash)?.into_user(UserId::new(), Utc::now());

    match services.users.insert(user.clone()).await {
        Ok(()) => {}
        // Lost a race with a concurrent registration.
        Err(StoreError::Conflict(_)) => return Err(ApiError::bad_request(EMAIL_TAKEN)),
        Err(e) => return Err(e.into()),
    }
    tracing::info!(user_id = %user.id, "user registered");

    services
        .recorder
        .record(
            user.id,
            AuditAction::UserCreated,
            metadata(json!({ "email": user.email, "role": user.role })),
        )
        .await;

    let cookie = sessions.start(user.id)?;
    Ok((
        StatusCode::CREATED,
        cookie,
        Json(json!({ "message": "User created successfully", "user": user })),
    ))
}

/// POST /auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(sessions): Extension<Arc<Sessions>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let (Some(email), Some(password)) = (present(req.email), present(req.password)) else {
        return Err(ApiError::bad_request(LOGIN_FIELDS_REQUIRED));
    };

    let user = services
        .users
        .find_by_email(&email)
        .await?
        .ok_or(ApiError::Unauthorized(INVALID_CREDENTIALS))?;

    if !verify_password(&password, &user.password_hash).map_err(ApiError::internal)? {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
    }

    services
        .recorder
        .record(user.id, AuditAction::UserLogin, metadata(json!({ "email": user.email })))
        .await;

    let cookie = sessions.start(user.id)?;
    Ok((
        cookie,
        Json(json!({ "message": "Login successful", "user": user })),
    ))
}

/// POST /auth/logout
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(sessions): Extension<Arc<Sessions>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> impl IntoResponse {
    services
        .recorder
        .record(ctx.user_id(), AuditAction::UserLogout, metadata(json!({ "email": ctx.email() })))
        .await;

    (sessions.end(), Json(json!({ "message": "Logout successful" })))
}

/// GET /auth/me
pub async fn me(Extension(ctx): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(json!({ "user": ctx.principal() }))
}
