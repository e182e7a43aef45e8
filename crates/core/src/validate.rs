//! Request validation rules.
//!
//! Stateless checks applied before any mutation. Nothing here touches
//! storage; callers decide the order in which rules are applied.

use core::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{DomainError, DomainResult};

pub const ALL_FIELDS_REQUIRED: &str = "All fields are required";
pub const INVALID_AMOUNT: &str = "Invalid amount";
pub const AMOUNT_NOT_POSITIVE: &str = "Amount must be positive";
pub const INVALID_DATE: &str = "Invalid date format. Use YYYY-MM-DD";

/// A loosely typed scalar as clients send it: `25`, `25.5` or `"25.50"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(serde_json::Number),
    Text(String),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// Truthiness of a submitted field.
///
/// Missing values, blank strings and numeric zero all count as absent.
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for str {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl Presence for String {
    fn is_present(&self) -> bool {
        self.as_str().is_present()
    }
}

impl Presence for FieldValue {
    fn is_present(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_present(),
            FieldValue::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        }
    }
}

impl<T: Presence> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.as_ref().is_some_and(Presence::is_present)
    }
}

/// Fails with [`ALL_FIELDS_REQUIRED`] unless every field is present.
pub fn require_all(fields: &[&dyn Presence]) -> DomainResult<()> {
    if fields.iter().all(|f| f.is_present()) {
        Ok(())
    } else {
        Err(DomainError::validation(ALL_FIELDS_REQUIRED))
    }
}

/// Trimmed, lowercased form used as the uniqueness key for accounts.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Coarse shape check: an `@` and a `.` somewhere.
pub fn looks_like_email(email: &str) -> bool {
    !email.is_empty() && email.contains('@') && email.contains('.')
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_iso_date(s: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| DomainError::validation(INVALID_DATE))
}

/// Parse a strictly positive monetary amount.
pub fn parse_amount(value: &FieldValue) -> DomainResult<Decimal> {
    let raw = match value {
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Text(s) => s.trim().to_string(),
    };

    let amount = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| DomainError::validation(INVALID_AMOUNT))?;

    if amount <= Decimal::ZERO {
        return Err(DomainError::validation(AMOUNT_NOT_POSITIVE));
    }
    Ok(amount.normalize())
}
