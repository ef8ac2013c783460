use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use fca_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent `{ error, code }`
/// JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `fca_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A malformed request (unparseable JSON, broken multipart framing).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body exceeded the route's byte limit before it could
    /// be read.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Seconds a client should wait before retrying a `STORAGE_ERROR`.
const STORAGE_RETRY_AFTER_SECS: &str = "1";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from_static(STORAGE_RETRY_AFTER_SECS));
        }
        response
    }
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::MissingField { .. } => {
            (StatusCode::BAD_REQUEST, "MISSING_FIELD", err.to_string())
        }
        CoreError::InvalidValue { .. } => {
            (StatusCode::BAD_REQUEST, "INVALID_VALUE", err.to_string())
        }
        CoreError::InvalidDefectEntry { .. } => {
            (StatusCode::BAD_REQUEST, "INVALID_DEFECT_ENTRY", err.to_string())
        }
        CoreError::TooLarge { .. } => {
            (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", err.to_string())
        }
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::NotFoundByKey { entity, key } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} '{key}' not found"),
        ),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Upstream(msg) => {
            tracing::warn!(error = %msg, "Upstream service error");
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
        }
    }
}

fn storage_unavailable() -> (StatusCode, &'static str, String) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "STORAGE_ERROR",
        "Storage is temporarily unavailable, retry the request".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - Connection, pool, timeout, serialization and deadlock failures map to
///   503 `STORAGE_ERROR` (retryable).
/// - Unique, foreign-key and check constraint violations map to 409.
/// - `RowNotFound` maps to 404.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_) => {
            tracing::warn!(error = %err, "Storage unavailable");
            storage_unavailable()
        }
        sqlx::Error::Database(db_err) => {
            let code = db_err.code();
            let code = code.as_deref().unwrap_or("");
            let constraint = db_err.constraint().unwrap_or("unknown");
            match code {
                "23505" => (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                ),
                "23503" => (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Referenced row is missing or still referenced: {constraint}"),
                ),
                "23514" => (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Value violates check constraint: {constraint}"),
                ),
                "57014" | "40001" | "40P01" => {
                    tracing::warn!(error = %db_err, sqlstate = code, "Retryable database error");
                    storage_unavailable()
                }
                c if c.starts_with("08") => {
                    tracing::warn!(error = %db_err, sqlstate = c, "Database connection error");
                    storage_unavailable()
                }
                _ => {
                    tracing::error!(error = %db_err, sqlstate = code, "Database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            }
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
