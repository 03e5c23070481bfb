use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// ApiError
///
/// The application-wide error type. Every handler returns `Result<_, ApiError>` and the
/// variants map one-to-one onto the uniform endpoint contract:
/// 401 unauthenticated, 403 role/status disallowed, 400 missing/invalid fields,
/// 404 missing record, 409 conflicting state, 500 downstream failure.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Database operation failed. Wraps any sqlx::Error via `#[from]`.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The hosted auth provider (or another upstream HTTP service) failed.
    #[error("upstream service error: {0}")]
    Upstream(String),

    /// Missing or invalid session token.
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated, but the role/status allow-list refuses the caller.
    #[error("forbidden")]
    Forbidden,

    /// The requested record does not exist (or is not visible to the caller).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The record exists but is not in a state that permits the operation.
    #[error("{0}")]
    Conflict(String),

    /// Request body or parameters are invalid. The String names the offending field.
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    /// Converts the error into the wire shape `{success: false, error, details?}`.
    /// `details` is only populated on 500s, carrying the underlying failure text.
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            ApiError::Database(e) => {
                tracing::error!("database failure: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, Some(e.to_string()))
            }
            ApiError::Upstream(msg) => {
                tracing::error!("upstream failure: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, Some(msg.clone()))
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, None),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, None),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
        };

        let message = match &self {
            // Internal failures get a generic message; the specifics ride in `details`.
            ApiError::Database(_) | ApiError::Upstream(_) => "internal error".to_string(),
            other => other.to_string(),
        };

        let body = match details {
            Some(d) => json!({ "success": false, "error": message, "details": d }),
            None => json!({ "success": false, "error": message }),
        };

        (status, Json(body)).into_response()
    }
}
