use serde::{Deserialize, Serialize};

pub use fintrack_auth::{LoginAttempt as LoginRequest, Registration as RegisterRequest};
pub use fintrack_ledger::TransactionDraft as CreateTransactionRequest;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct DeleteTransactionQuery {
    pub id: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "ok",
            message: "Backend is running",
            database: Some("connected"),
            error: None,
        }
    }

    pub fn degraded(error: impl ToString) -> Self {
        Self {
            status: "ok",
            message: "Backend running but database error",
            database: None,
            error: Some(error.to_string()),
        }
    }
}
