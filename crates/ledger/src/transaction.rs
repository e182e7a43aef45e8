//! Income/expense transactions: input validation, recording and ledger order.

use core::str::FromStr;

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fintrack_core::validate::{self, FieldValue};
use fintrack_core::{DomainError, DomainResult, TransactionId, UserId};

use crate::category::{CategoryCatalog, CategoryPolicy};

/// Direction of money flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = DomainError;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(DomainError::validation("Type must be 'income' or 'expense'")),
        }
    }
}

/// A recorded income or expense.
///
/// # Invariants
/// - `amount > 0`
/// - owned by exactly one user; never shared
/// - immutable once recorded (only deletion is supported)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

/// Transaction fields as submitted, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionDraft {
    pub description: Option<String>,
    pub amount: Option<FieldValue>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
}

/// A validated transaction not yet assigned an id or owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: String,
    pub date: NaiveDate,
}

impl TransactionDraft {
    /// Checks run in a fixed order: presence, type, amount, date, category.
    pub fn validate(self, policy: CategoryPolicy) -> DomainResult<NewTransaction> {
        validate::require_all(&[
            &self.description,
            &self.amount,
            &self.kind,
            &self.category,
            &self.date,
        ])?;

        let (Some(description), Some(amount), Some(kind), Some(category), Some(date)) =
            (self.description, self.amount, self.kind, self.category, self.date)
        else {
            return Err(DomainError::validation(validate::ALL_FIELDS_REQUIRED));
        };

        let kind: TransactionKind = kind.parse()?;
        let amount = validate::parse_amount(&amount)?;
        let date = validate::parse_iso_date(&date)?;
        let category = category.trim().to_string();

        if policy == CategoryPolicy::Enforced && !CategoryCatalog::contains(kind, &category) {
            return Err(DomainError::validation(format!(
                "Invalid category for type '{kind}'"
            )));
        }

        Ok(NewTransaction {
            description: description.trim().to_string(),
            amount,
            kind,
            category,
            date,
        })
    }
}

impl NewTransaction {
    /// Assign an id and a creation timestamp (microsecond precision).
    pub fn record(self, user_id: UserId) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            user_id,
            description: self.description,
            amount: self.amount,
            kind: self.kind,
            category: self.category,
            date: self.date,
            timestamp: Utc::now().trunc_subsecs(6),
        }
    }
}

/// Most recent first: `date` desc, then `timestamp` desc, then `id` desc.
pub fn sort_ledger(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.timestamp.cmp(&a.timestamp))
            .then_with(|| b.id.cmp(&a.id))
    });
}
