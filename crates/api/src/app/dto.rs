//! Request DTOs and extraction helpers.
//!
//! Body fields are optional so that missing values produce the documented
//! validation messages instead of a generic rejection.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};
use serde::Deserialize;
use serde_json::Value;

use quillgate_audit::AuditMetadata;

use axum::http::StatusCode;

use crate::app::errors::{ApiError, BODY_TOO_LARGE};

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleChangeRequest {
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub action: Option<String>,
    pub actor_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub days: Option<u32>,
}

pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(BODY_TOO_LARGE)
        } else {
            ApiError::bad_request("Invalid JSON body.")
        }
    })
}

pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(q)| q)
        .map_err(|_| ApiError::bad_request("Invalid query parameters."))
}

/// `None` for absent or whitespace-only values.
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Turn a `json!` object literal into audit metadata.
pub fn metadata(value: Value) -> AuditMetadata {
    match value {
        Value::Object(map) => map,
        _ => AuditMetadata::new(),
    }
}
