//! Volatile account and ledger store backed by a single lock.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use fintrack_auth::User;
use fintrack_core::{TransactionId, UserId};
use fintrack_ledger::{Transaction, sort_ledger};

use super::{CredentialStore, StoreError, TransactionLedger};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    by_email: HashMap<String, UserId>,
    ledgers: HashMap<UserId, Vec<Transaction>>,
}

/// In-memory account and ledger store.
///
/// Intended for tests/dev. A single lock guards users and ledgers together,
/// so check-then-insert on email and owner checks on append are atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.by_email.contains_key(&user.email) {
            return Err(StoreError::Duplicate(user.email.clone()));
        }
        if state.users.contains_key(&user.id) {
            return Err(StoreError::Duplicate(user.id.to_string()));
        }
        state.by_email.insert(user.email.clone(), user.id);
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.read()?;
        Ok(state
            .by_email
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let Some(user) = state.users.remove(&id) else {
            return Ok(false);
        };
        state.by_email.remove(&user.email);
        state.ledgers.remove(&id);
        Ok(true)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }
}

#[async_trait::async_trait]
impl TransactionLedger for InMemoryStore {
    async fn list(&self, user_id: UserId) -> Result<Vec<Transaction>, StoreError> {
        let mut out = self
            .read()?
            .ledgers
            .get(&user_id)
            .cloned()
            .unwrap_or_default();
        sort_ledger(&mut out);
        Ok(out)
    }

    async fn append(&self, transaction: &Transaction) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.users.contains_key(&transaction.user_id) {
            return Err(StoreError::UnknownOwner);
        }
        let ledger = state.ledgers.entry(transaction.user_id).or_default();
        if ledger.iter().any(|t| t.id == transaction.id) {
            return Err(StoreError::Duplicate(transaction.id.to_string()));
        }
        ledger.push(transaction.clone());
        Ok(())
    }

    async fn remove(&self, user_id: UserId, id: TransactionId) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let Some(ledger) = state.ledgers.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = ledger.len();
        ledger.retain(|t| t.id != id);
        Ok(ledger.len() != before)
    }
}
