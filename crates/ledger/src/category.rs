//! Fixed category reference lists.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::transaction::TransactionKind;

pub const INCOME_CATEGORIES: [&str; 5] = ["Salary", "Freelance", "Investment", "Gift", "Other Income"];

pub const EXPENSE_CATEGORIES: [&str; 8] = [
    "Food",
    "Transportation",
    "Utilities",
    "Entertainment",
    "Healthcare",
    "Shopping",
    "Rent",
    "Other",
];

/// Categories offered to clients, grouped by transaction kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCatalog {
    pub income: Vec<&'static str>,
    pub expense: Vec<&'static str>,
}

impl CategoryCatalog {
    pub fn standard() -> Self {
        Self {
            income: INCOME_CATEGORIES.to_vec(),
            expense: EXPENSE_CATEGORIES.to_vec(),
        }
    }

    pub fn for_kind(kind: TransactionKind) -> &'static [&'static str] {
        match kind {
            TransactionKind::Income => &INCOME_CATEGORIES,
            TransactionKind::Expense => &EXPENSE_CATEGORIES,
        }
    }

    pub fn contains(kind: TransactionKind, category: &str) -> bool {
        Self::for_kind(kind).contains(&category)
    }
}

/// Whether transaction creation rejects categories outside the reference lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryPolicy {
    /// Any non-empty category is accepted; the lists are display hints.
    #[default]
    Advisory,
    /// The category must belong to the list for the transaction's kind.
    Enforced,
}

impl FromStr for CategoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(Self::Advisory),
            "enforced" => Ok(Self::Enforced),
            other => Err(format!("unknown category policy '{other}' (expected advisory|enforced)")),
        }
    }
}
