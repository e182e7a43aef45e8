use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use fintrack_ledger::CategoryCatalog;

use crate::app::{dto::HealthResponse, errors, services::AppServices};

/// Always 200; a failed store ping is reported in the body.
pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let body = match services.health().await {
        Ok(()) => HealthResponse::healthy(),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            HealthResponse::degraded(e)
        }
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub async fn categories() -> axum::response::Response {
    (StatusCode::OK, Json(CategoryCatalog::standard())).into_response()
}

pub async fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "Endpoint not found")
}
