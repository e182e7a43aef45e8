//! Storage abstractions for accounts and ledgers.
//!
//! The API layer only ever sees these traits; backends are injected at
//! startup. Both backends implement both traits on one type so that
//! deleting a user can cascade to that user's transactions.

use fintrack_auth::User;
use fintrack_core::{DomainError, TransactionId, UserId};
use fintrack_ledger::Transaction;

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Account storage.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new user. Fails with [`StoreError::Duplicate`] when the
    /// (normalized) email is already taken.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    /// Lookup by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Remove a user and every transaction they own. Returns whether a user
    /// was removed.
    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError>;

    /// Cheap liveness check of the backing store.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Per-user transaction storage.
#[async_trait::async_trait]
pub trait TransactionLedger: Send + Sync {
    /// All transactions of a user, most recent first (see
    /// [`fintrack_ledger::sort_ledger`]).
    async fn list(&self, user_id: UserId) -> Result<Vec<Transaction>, StoreError>;

    /// Fails with [`StoreError::UnknownOwner`] if the owner does not exist.
    async fn append(&self, transaction: &Transaction) -> Result<(), StoreError>;

    /// Remove one transaction owned by `user_id`. Returns whether a row was
    /// removed; a transaction owned by someone else is never touched.
    async fn remove(&self, user_id: UserId, id: TransactionId) -> Result<bool, StoreError>;
}

/// Storage error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    Duplicate(String),
    #[error("owning user does not exist")]
    UnknownOwner,
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("storage error: {0}")]
    Backend(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => DomainError::conflict("Email already registered"),
            StoreError::UnknownOwner => DomainError::not_found("User not found"),
            StoreError::Corrupt(msg) | StoreError::Backend(msg) => {
                tracing::error!(error = %msg, "storage failure");
                DomainError::internal(msg)
            }
        }
    }
}
