//! Demo account seeding.
//!
//! Creates a demo user with a small ledger so a fresh install has something
//! to show. Runs through the same validation as the HTTP surface.

use fintrack_auth::{CredentialHasher, Registration, User};
use fintrack_core::validate::FieldValue;
use fintrack_core::DomainResult;
use fintrack_ledger::{CategoryPolicy, TransactionDraft};

use crate::store::{CredentialStore, StoreError, TransactionLedger};

pub const DEMO_EMAIL: &str = "demo@financetracker.com";
pub const DEMO_PASSWORD: &str = "demo123";
pub const DEMO_NAME: &str = "Demo User";

/// description, amount, type, category, date
const DEMO_TRANSACTIONS: [(&str, i64, &str, &str, &str); 8] = [
    ("Monthly Salary", 5000, "income", "Salary", "2025-09-01"),
    ("Grocery Shopping", 150, "expense", "Food", "2025-09-02"),
    ("Gas Bill", 80, "expense", "Utilities", "2025-09-01"),
    ("Coffee Shop", 25, "expense", "Food", "2025-09-02"),
    ("Freelance Project", 800, "income", "Freelance", "2025-08-30"),
    ("Restaurant Dinner", 85, "expense", "Food", "2025-08-29"),
    ("Uber Ride", 20, "expense", "Transportation", "2025-08-28"),
    ("Netflix Subscription", 15, "expense", "Entertainment", "2025-08-25"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created { transactions: usize },
    AlreadyPresent,
}

/// Create the demo account unless it already exists.
pub async fn seed_demo(
    users: &dyn CredentialStore,
    ledger: &dyn TransactionLedger,
    hasher: &dyn CredentialHasher,
) -> DomainResult<SeedOutcome> {
    if users.find_by_email(DEMO_EMAIL).await?.is_some() {
        tracing::debug!(email = DEMO_EMAIL, "demo account already present");
        return Ok(SeedOutcome::AlreadyPresent);
    }

    let registration = Registration {
        name: Some(DEMO_NAME.to_string()),
        email: Some(DEMO_EMAIL.to_string()),
        password: Some(DEMO_PASSWORD.to_string()),
        confirm_password: Some(DEMO_PASSWORD.to_string()),
    }
    .validate_shape()?;
    registration.check_passwords()?;
    let user = User::register(&registration, hasher)?;

    match users.insert_user(&user).await {
        Ok(()) => {}
        // Another process seeded first.
        Err(StoreError::Duplicate(_)) => return Ok(SeedOutcome::AlreadyPresent),
        Err(e) => return Err(e.into()),
    }

    if let Err(e) = append_demo_ledger(ledger, &user).await {
        // Never leave a demo account with a partial ledger behind.
        if let Err(cleanup) = users.delete_user(user.id).await {
            tracing::error!(user_id = %user.id, error = %cleanup, "failed to roll back demo account");
        }
        return Err(e);
    }

    tracing::info!(user_id = %user.id, transactions = DEMO_TRANSACTIONS.len(), "seeded demo account");
    Ok(SeedOutcome::Created {
        transactions: DEMO_TRANSACTIONS.len(),
    })
}

async fn append_demo_ledger(ledger: &dyn TransactionLedger, user: &User) -> DomainResult<()> {
    for (description, amount, kind, category, date) in DEMO_TRANSACTIONS {
        let transaction = TransactionDraft {
            description: Some(description.to_string()),
            amount: Some(FieldValue::from(amount)),
            kind: Some(kind.to_string()),
            category: Some(category.to_string()),
            date: Some(date.to_string()),
        }
        .validate(CategoryPolicy::Enforced)?
        .record(user.id);
        ledger.append(&transaction).await?;
    }
    Ok(())
}
