use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use serde_json::json;

/// A single failed field check, reported back to the client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Unified application error type that maps to JSON HTTP responses.
///
/// Every error serializes as `{ "error": { "code": "...", "message": "..." } }`,
/// with an extra `fields` list for validation failures.
#[derive(Debug)]
pub enum AppError {
    /// 400 Bad Request
    BadRequest(String),
    /// 400 Bad Request with per-field details
    Validation(Vec<FieldError>),
    /// 401 Unauthorized (missing or invalid identity token)
    Unauthorized(String),
    /// 403 Forbidden (role does not grant access)
    Forbidden(String),
    /// 404 Not Found
    NotFound(String),
    /// 409 Conflict (duplicate slug/email, or row still referenced)
    Conflict(String),
    /// 502 Bad Gateway (identity provider, image host or mail relay failed)
    BadGateway(anyhow::Error),
    /// 500 Internal Server Error (wraps any error, logs details, returns generic message)
    Internal(anyhow::Error),
}

impl AppError {
    /// Map a database error, surfacing constraint violations as `409 Conflict`.
    ///
    /// `what` names the resource for the conflict message, e.g. `"Category"`.
    pub fn from_db(err: DbErr, what: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::Conflict(format!("{what} already exists."))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => Self::Conflict(format!(
                "{what} references a missing record or is still referenced."
            )),
            _ => Self::Internal(err.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            Self::Validation(fields) => {
                let message = fields
                    .iter()
                    .map(|f| f.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    message,
                    Some(fields),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "NOT_AUTHORIZED", msg, None),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, "ACCESS_DENIED", msg, None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg, None),
            Self::BadGateway(err) => {
                tracing::error!("Upstream service error: {err:#}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "An external service failed".to_string(),
                    None,
                )
            }
            Self::Internal(err) => {
                tracing::error!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = fields.map_or_else(
            || json!({ "error": { "code": code, "message": message } }),
            |fields| json!({ "error": { "code": code, "message": message, "fields": fields } }),
        );

        (status, Json(body)).into_response()
    }
}

/// Allow `?` to automatically convert any `anyhow::Error` into `AppError::Internal`.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
