use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match services.register(body).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(dto::MessageResponse {
                message: "Registration successful",
            }),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match services.login(body).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
