use axum::{Router, routing::get};

pub mod auth;
pub mod system;
pub mod transactions;

/// Router for every endpoint. There is no authentication layer; callers
/// address a ledger by user id.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/categories", get(system::categories))
        .merge(auth::router())
        .nest("/transactions", transactions::router())
}
