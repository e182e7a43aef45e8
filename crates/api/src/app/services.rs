//! Application services: the operations behind each route, wired to
//! injected storage and a password hasher.

use std::sync::Arc;

use fintrack_auth::{
    Argon2Hasher, CredentialHasher, INVALID_CREDENTIALS, LoginAttempt, PublicUser, Registration,
    User,
};
use fintrack_core::{DomainError, DomainResult, TransactionId, UserId};
use fintrack_infra::{
    AppConfig, CredentialStore, InMemoryStore, SqliteStore, StorageBackend, StoreError,
    TransactionLedger,
    seed::{self, SeedOutcome},
};
use fintrack_ledger::{CategoryPolicy, Transaction, TransactionDraft};

const USER_NOT_FOUND: &str = "User not found";
const TRANSACTION_NOT_FOUND: &str = "Transaction not found";

pub struct AppServices {
    users: Arc<dyn CredentialStore>,
    ledger: Arc<dyn TransactionLedger>,
    hasher: Arc<dyn CredentialHasher>,
    category_policy: CategoryPolicy,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        ledger: Arc<dyn TransactionLedger>,
        hasher: Arc<dyn CredentialHasher>,
        category_policy: CategoryPolicy,
    ) -> Self {
        Self {
            users,
            ledger,
            hasher,
            category_policy,
        }
    }

    /// Wire the storage backend selected by `config`.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        Self::from_config_with_hasher(config, Arc::new(Argon2Hasher::default())).await
    }

    pub async fn from_config_with_hasher(
        config: &AppConfig,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Result<Self, StoreError> {
        match config.storage {
            StorageBackend::Sqlite => {
                let store = Arc::new(SqliteStore::connect(&config.database_url).await?);
                tracing::info!(url = %config.database_url, "using sqlite storage");
                Ok(Self::new(store.clone(), store, hasher, config.category_policy))
            }
            StorageBackend::Memory => {
                tracing::warn!("using in-memory storage; data is lost on restart");
                let store = InMemoryStore::arc();
                Ok(Self::new(store.clone(), store, hasher, config.category_policy))
            }
        }
    }

    /// Volatile wiring for dev/test.
    pub fn in_memory(hasher: Arc<dyn CredentialHasher>, category_policy: CategoryPolicy) -> Self {
        let store = InMemoryStore::arc();
        Self::new(store.clone(), store, hasher, category_policy)
    }

    pub async fn seed_demo(&self) -> DomainResult<SeedOutcome> {
        seed::seed_demo(self.users.as_ref(), self.ledger.as_ref(), self.hasher.as_ref()).await
    }

    pub async fn health(&self) -> Result<(), StoreError> {
        self.users.ping().await
    }

    // -------------------------
    // Accounts
    // -------------------------

    pub async fn register(&self, input: Registration) -> DomainResult<PublicUser> {
        let input = input.validate_shape()?;
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(DomainError::conflict("Email already registered"));
        }
        input.check_passwords()?;

        let hasher = self.hasher.clone();
        let user = tokio::task::spawn_blocking(move || User::register(&input, hasher.as_ref()))
            .await
            .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))??;

        // A concurrent registration may have won; the store reports it as Duplicate.
        self.users.insert_user(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user.public_view())
    }

    pub async fn login(&self, attempt: LoginAttempt) -> DomainResult<PublicUser> {
        let (email, password) = attempt.validate()?;
        let found = self.users.find_by_email(&email).await?;

        let hasher = self.hasher.clone();
        let verified = tokio::task::spawn_blocking(move || match found {
            Some(user) if user.verify_password(&password, hasher.as_ref()) => Some(user),
            Some(_) => None,
            None => {
                hasher.verify_absent(&password);
                None
            }
        })
        .await
        .map_err(|e| DomainError::internal(format!("verification task failed: {e}")))?;

        match verified {
            Some(user) => {
                tracing::info!(user_id = %user.id, "login succeeded");
                Ok(user.public_view())
            }
            None => {
                tracing::info!("login rejected");
                Err(DomainError::auth(INVALID_CREDENTIALS))
            }
        }
    }

    // -------------------------
    // Ledger
    // -------------------------

    /// Resolve the owner named in a path segment. Unparseable ids are
    /// reported exactly like unknown ones.
    pub async fn resolve_user(&self, raw_id: &str) -> DomainResult<User> {
        let Ok(id) = raw_id.parse::<UserId>() else {
            return Err(DomainError::not_found(USER_NOT_FOUND));
        };
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))
    }

    pub async fn list_transactions(&self, owner: &User) -> DomainResult<Vec<Transaction>> {
        Ok(self.ledger.list(owner.id).await?)
    }

    pub async fn create_transaction(
        &self,
        owner: &User,
        draft: TransactionDraft,
    ) -> DomainResult<Transaction> {
        let transaction = draft.validate(self.category_policy)?.record(owner.id);
        self.ledger.append(&transaction).await.map_err(|e| match e {
            StoreError::UnknownOwner => DomainError::not_found(USER_NOT_FOUND),
            other => other.into(),
        })?;
        tracing::info!(
            user_id = %owner.id,
            transaction_id = %transaction.id,
            kind = %transaction.kind,
            "transaction created"
        );
        Ok(transaction)
    }

    pub async fn delete_transaction(&self, owner: &User, raw_id: Option<&str>) -> DomainResult<()> {
        let raw_id = raw_id.map(str::trim).unwrap_or_default();
        if raw_id.is_empty() {
            return Err(DomainError::validation("Transaction ID is required"));
        }
        let Ok(id) = raw_id.parse::<TransactionId>() else {
            return Err(DomainError::not_found(TRANSACTION_NOT_FOUND));
        };
        if !self.ledger.remove(owner.id, id).await? {
            return Err(DomainError::not_found(TRANSACTION_NOT_FOUND));
        }
        tracing::info!(user_id = %owner.id, transaction_id = %id, "transaction deleted");
        Ok(())
    }
}
