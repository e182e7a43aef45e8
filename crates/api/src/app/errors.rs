use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use fintrack_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = match &err {
        DomainError::Validation(_) | DomainError::Conflict(_) | DomainError::Auth(_) => {
            StatusCode::BAD_REQUEST
        }
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Internal(detail) => {
            tracing::error!(error = %detail, "internal error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    json_error(status, err.public_message())
}

/// Undecodable JSON bodies are a plain validation failure, not axum's 415/422.
pub fn invalid_body(rejection: JsonRejection) -> axum::response::Response {
    tracing::debug!(reason = %rejection.body_text(), "rejected request body");
    json_error(StatusCode::BAD_REQUEST, "Invalid request body")
}

/// A path segment that cannot be decoded never names an existing user.
pub fn unknown_user_path(rejection: PathRejection) -> axum::response::Response {
    tracing::debug!(reason = %rejection.body_text(), "rejected path");
    json_error(StatusCode::NOT_FOUND, "User not found")
}

pub fn invalid_query(rejection: QueryRejection) -> axum::response::Response {
    tracing::debug!(reason = %rejection.body_text(), "rejected query string");
    json_error(StatusCode::BAD_REQUEST, "Invalid request")
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}
