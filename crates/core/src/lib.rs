//! `fintrack-core`: shared domain building blocks.
//!
//! Pure code only (no IO, no storage, no HTTP): identifiers, the error
//! taxonomy and the request validation rules shared by every entrypoint.

pub mod error;
pub mod id;
pub mod validate;

pub use error::{DomainError, DomainResult};
pub use id::{TransactionId, UserId};
pub use validate::FieldValue;
