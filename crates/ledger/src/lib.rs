//! Personal ledger: income/expense transactions and their categories.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod category;
pub mod transaction;

pub use category::{CategoryCatalog, CategoryPolicy, EXPENSE_CATEGORIES, INCOME_CATEGORIES};
pub use transaction::{
    NewTransaction, Transaction, TransactionDraft, TransactionKind, sort_ledger,
};
