use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use fintrack_auth::User;

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new().route(
        "/:user_id",
        get(list_transactions)
            .post(create_transaction)
            .delete(delete_transaction),
    )
}

/// Every ledger route starts here: undecodable and unknown ids are both 404.
async fn resolve_owner(
    services: &AppServices,
    path: Result<Path<String>, PathRejection>,
) -> Result<User, axum::response::Response> {
    let Path(user_id) = path.map_err(errors::unknown_user_path)?;
    services
        .resolve_user(&user_id)
        .await
        .map_err(errors::domain_error_to_response)
}

pub async fn list_transactions(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let owner = match resolve_owner(&services, path).await {
        Ok(u) => u,
        Err(res) => return res,
    };

    match services.list_transactions(&owner).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<dto::CreateTransactionRequest>, JsonRejection>,
) -> axum::response::Response {
    // The owner is checked before anything in the body.
    let owner = match resolve_owner(&services, path).await {
        Ok(u) => u,
        Err(res) => return res,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match services.create_transaction(&owner, body).await {
        Ok(tx) => (StatusCode::CREATED, Json(tx)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<dto::DeleteTransactionQuery>, QueryRejection>,
) -> axum::response::Response {
    let owner = match resolve_owner(&services, path).await {
        Ok(u) => u,
        Err(res) => return res,
    };
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::invalid_query(rejection),
    };

    match services.delete_transaction(&owner, query.id.as_deref()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(dto::MessageResponse {
                message: "Transaction deleted successfully",
            }),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
