//! SQLite-backed account and ledger store.
//!
//! ## Schema
//!
//! - `users(id, name, email UNIQUE, password_hash, created_at)`
//! - `transactions(id, user_id -> users.id ON DELETE CASCADE, description,
//!   amount, type, category, date, timestamp)`
//!
//! Ids are UUID text, amounts are decimal text (no float drift), dates are
//! `YYYY-MM-DD` and timestamps RFC 3339 with microseconds, so the text
//! ordering of `date` and `timestamp` matches their chronological order.
//!
//! ## Error Mapping
//!
//! | SQLx error | StoreError |
//! |------------|------------|
//! | unique violation | `Duplicate` |
//! | foreign key violation | `UnknownOwner` |
//! | undecodable row | `Corrupt` |
//! | anything else | `Backend` |

use core::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::instrument;
use uuid::Uuid;

use fintrack_auth::{PasswordDigest, User};
use fintrack_core::{TransactionId, UserId};
use fintrack_ledger::{Transaction, TransactionKind};

use super::{CredentialStore, StoreError, TransactionLedger};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            TEXT PRIMARY KEY,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        id          TEXT PRIMARY KEY,
        user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        description TEXT NOT NULL,
        amount      TEXT NOT NULL,
        type        TEXT NOT NULL CHECK (type IN ('income', 'expense')),
        category    TEXT NOT NULL,
        date        TEXT NOT NULL,
        timestamp   TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_transactions_user_date
        ON transactions (user_id, date)
    "#,
];

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and apply the schema.
    /// In-memory URLs get the single-connection pool of [`Self::in_memory`].
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        if url.contains(":memory:") || url.contains("mode=memory") {
            return Self::in_memory().await;
        }
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Backend(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// A private in-memory database. A single pinned connection keeps it
    /// alive for the lifetime of the pool.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CredentialStore for SqliteStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password_hash.as_str())
        .bind(format_timestamp(&user.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_email", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE id = ?1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_id", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;

        sqlx::query("DELETE FROM transactions WHERE user_id = ?1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;
        let removed = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?
            .rows_affected();

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TransactionLedger for SqliteStore {
    async fn list(&self, user_id: UserId) -> Result<Vec<Transaction>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, description, amount, type, category, date, timestamp
            FROM transactions
            WHERE user_id = ?1
            ORDER BY date DESC, timestamp DESC, id DESC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(transaction_from_row).collect()
    }

    #[instrument(skip(self, transaction), fields(user_id = %transaction.user_id, transaction_id = %transaction.id), err)]
    async fn append(&self, transaction: &Transaction) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO transactions
                (id, user_id, description, amount, type, category, date, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(transaction.id.to_string())
        .bind(transaction.user_id.to_string())
        .bind(&transaction.description)
        .bind(transaction.amount.to_string())
        .bind(transaction.kind.as_str())
        .bind(&transaction.category)
        .bind(transaction.date.format("%Y-%m-%d").to_string())
        .bind(format_timestamp(&transaction.timestamp))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("append", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id, transaction_id = %id), err)]
    async fn remove(&self, user_id: UserId, id: TransactionId) -> Result<bool, StoreError> {
        let removed = sqlx::query("DELETE FROM transactions WHERE id = ?1 AND user_id = ?2")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove", e))?
            .rows_affected();
        Ok(removed > 0)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn corrupt(column: &str, err: impl core::fmt::Display) -> StoreError {
    StoreError::Corrupt(format!("column '{column}': {err}"))
}

fn text(row: &SqliteRow, column: &str) -> Result<String, StoreError> {
    row.try_get::<String, _>(column).map_err(|e| corrupt(column, e))
}

fn uuid_column(row: &SqliteRow, column: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(&text(row, column)?).map_err(|e| corrupt(column, e))
}

fn timestamp_column(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(&text(row, column)?)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| corrupt(column, e))
}

fn user_from_row(row: &SqliteRow) -> Result<User, StoreError> {
    Ok(User {
        id: UserId::from_uuid(uuid_column(row, "id")?),
        name: text(row, "name")?,
        email: text(row, "email")?,
        password_hash: PasswordDigest::from_phc(text(row, "password_hash")?),
        created_at: timestamp_column(row, "created_at")?,
    })
}

fn transaction_from_row(row: &SqliteRow) -> Result<Transaction, StoreError> {
    let amount = Decimal::from_str(&text(row, "amount")?).map_err(|e| corrupt("amount", e))?;
    let kind = text(row, "type")?
        .parse::<TransactionKind>()
        .map_err(|e| corrupt("type", e))?;
    let date = NaiveDate::parse_from_str(&text(row, "date")?, "%Y-%m-%d")
        .map_err(|e| corrupt("date", e))?;

    Ok(Transaction {
        id: TransactionId::from_uuid(uuid_column(row, "id")?),
        user_id: UserId::from_uuid(uuid_column(row, "user_id")?),
        description: text(row, "description")?,
        amount,
        kind,
        category: text(row, "category")?,
        date,
        timestamp: timestamp_column(row, "timestamp")?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            if db_err.is_unique_violation() {
                StoreError::Duplicate(msg)
            } else if db_err.is_foreign_key_violation() {
                StoreError::UnknownOwner
            } else {
                StoreError::Backend(msg)
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::ColumnDecode { index, source } => {
            StoreError::Corrupt(format!("column {index} in {operation}: {source}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{sample_transaction, sample_user};

    async fn store() -> SqliteStore {
        SqliteStore::in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn users_round_trip() {
        let store = store().await;
        let user = sample_user("a@b.com");
        store.insert_user(&user).await.unwrap();

        assert_eq!(store.find_by_email("a@b.com").await.unwrap(), Some(user.clone()));
        assert_eq!(store.find_by_id(user.id).await.unwrap(), Some(user));
        assert!(store.find_by_email("nobody@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_maps_to_duplicate() {
        let store = store().await;
        store.insert_user(&sample_user("a@b.com")).await.unwrap();
        let err = store.insert_user(&sample_user("a@b.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn append_without_owner_maps_to_unknown_owner() {
        let store = store().await;
        let err = store
            .append(&sample_transaction(UserId::new(), "2025-09-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownOwner), "got {err:?}");
    }

    #[tokio::test]
    async fn transactions_round_trip_in_ledger_order() {
        let store = store().await;
        let user = sample_user("a@b.com");
        store.insert_user(&user).await.unwrap();

        let aug = sample_transaction(user.id, "2025-08-30");
        let sep_first = sample_transaction(user.id, "2025-09-02");
        let mut sep_second = sample_transaction(user.id, "2025-09-02");
        sep_second.timestamp = sep_first.timestamp + chrono::Duration::milliseconds(3);
        for tx in [&aug, &sep_first, &sep_second] {
            store.append(tx).await.unwrap();
        }

        let listed = store.list(user.id).await.unwrap();
        assert_eq!(listed, vec![sep_second, sep_first, aug]);
        assert_eq!(listed[0].amount, Decimal::new(2550, 2));
    }

    #[tokio::test]
    async fn remove_is_scoped_to_owner() {
        let store = store().await;
        let alice = sample_user("alice@b.com");
        let bob = sample_user("bob@b.com");
        store.insert_user(&alice).await.unwrap();
        store.insert_user(&bob).await.unwrap();
        let tx = sample_transaction(alice.id, "2025-09-01");
        store.append(&tx).await.unwrap();

        assert!(!store.remove(bob.id, tx.id).await.unwrap());
        assert!(store.remove(alice.id, tx.id).await.unwrap());
        assert!(!store.remove(alice.id, tx.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_a_user_cascades() {
        let store = store().await;
        let user = sample_user("a@b.com");
        store.insert_user(&user).await.unwrap();
        store.append(&sample_transaction(user.id, "2025-09-01")).await.unwrap();

        assert!(store.delete_user(user.id).await.unwrap());
        assert!(store.list(user.id).await.unwrap().is_empty());
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
        assert!(!store.delete_user(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn schema_cascade_holds_without_explicit_delete() {
        let store = store().await;
        let user = sample_user("a@b.com");
        store.insert_user(&user).await.unwrap();
        store.append(&sample_transaction(user.id, "2025-09-01")).await.unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(user.id.to_string())
            .execute(&store.pool)
            .await
            .unwrap();
        assert!(store.list(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_amount_is_reported() {
        let store = store().await;
        let user = sample_user("a@b.com");
        store.insert_user(&user).await.unwrap();
        let tx = sample_transaction(user.id, "2025-09-01");
        store.append(&tx).await.unwrap();

        sqlx::query("UPDATE transactions SET amount = 'lots' WHERE id = ?1")
            .bind(tx.id.to_string())
            .execute(&store.pool)
            .await
            .unwrap();
        assert!(matches!(
            store.list(user.id).await,
            Err(StoreError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn ping_succeeds() {
        store().await.ping().await.unwrap();
    }
}
