//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store wiring (in-memory or Postgres)
//! - `session.rs`: credential cookie issuing
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and extraction helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use quillgate_auth::{TokenCodec, TokenError};
use quillgate_infra::AppConfig;

use crate::cookies::CookiePolicy;
use crate::middleware::AuthState;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;
pub mod session;

pub use services::{build_services, AppServices};
pub use session::Sessions;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
///
/// Fails only if the signing secret is unusable.
pub fn build_app(config: &AppConfig, services: Arc<AppServices>) -> Result<Router, TokenError> {
    let codec = Arc::new(TokenCodec::with_ttl(&config.jwt_secret, config.token_ttl)?);
    let sessions = Arc::new(Sessions::new(
        Arc::clone(&codec),
        CookiePolicy::new(config.environment.is_production(), config.token_ttl),
    ));

    let gates = routes::Gates {
        auth: AuthState {
            codec,
            resolver: services.resolver.clone(),
        },
        recorder: services.recorder.clone(),
    };

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router(&gates))
        .layer(Extension(services))
        .layer(Extension(sessions))
        .layer(ServiceBuilder::new()))
}
