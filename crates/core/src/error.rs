//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant carries the client-facing message. `Internal` messages are
/// for logs only; the HTTP layer replaces them with a generic text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed, missing or out-of-range input.
    #[error("{0}")]
    Validation(String),

    /// A uniqueness rule was violated (e.g. duplicate email).
    #[error("{0}")]
    Conflict(String),

    /// Bad credentials. Deliberately carries no hint about which part failed.
    #[error("{0}")]
    Auth(String),

    /// A user or transaction does not exist (or is not visible to the caller).
    #[error("{0}")]
    NotFound(String),

    /// Unexpected backing-store failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The message that is safe to show a client.
    pub fn public_message(&self) -> &str {
        match self {
            Self::Validation(m) | Self::Conflict(m) | Self::Auth(m) | Self::NotFound(m) => m,
            Self::Internal(_) => "Internal server error",
        }
    }
}
