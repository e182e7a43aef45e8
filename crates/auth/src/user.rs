//! User accounts: registration and login input rules.
//!
//! Storage-dependent checks (email uniqueness, user lookup) live with the
//! stores; everything here is pure.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use fintrack_core::validate::{self, Presence};
use fintrack_core::{DomainError, DomainResult, UserId};

use crate::password::{CredentialHasher, PasswordDigest};

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const MIN_PASSWORD_CHARS: usize = 6;

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A registered account.
///
/// # Invariants
/// - `email` is normalized (trimmed, lowercased) and unique across users.
/// - `password_hash` is a one-way digest, never the plaintext.
/// - Nothing is mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: PasswordDigest,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a new account from validated input, hashing the password.
    pub fn register(input: &ValidRegistration, hasher: &dyn CredentialHasher) -> DomainResult<Self> {
        let password_hash = hasher
            .hash(&input.password)
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(Self {
            id: UserId::new(),
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash,
            created_at: Utc::now().trunc_subsecs(6),
        })
    }

    pub fn verify_password(&self, password: &str, hasher: &dyn CredentialHasher) -> bool {
        hasher.verify(password, &self.password_hash)
    }

    pub fn public_view(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// The subset of a [`User`] that is safe to hand to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

/// Raw registration input as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Registration input that passed the shape checks.
#[derive(Clone)]
pub struct ValidRegistration {
    pub name: String,
    /// Normalized.
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl core::fmt::Debug for ValidRegistration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValidRegistration")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Registration {
    /// Required fields and email shape. Uniqueness is checked next, by the
    /// store, before [`ValidRegistration::check_passwords`].
    pub fn validate_shape(self) -> DomainResult<ValidRegistration> {
        validate::require_all(&[&self.name, &self.email])?;

        // Passwords are taken verbatim: whitespace is a legal password.
        let (Some(name), Some(email), Some(password), Some(confirm_password)) =
            (self.name, self.email, self.password, self.confirm_password)
        else {
            return Err(DomainError::validation(validate::ALL_FIELDS_REQUIRED));
        };
        if password.is_empty() || confirm_password.is_empty() {
            return Err(DomainError::validation(validate::ALL_FIELDS_REQUIRED));
        }

        let email = validate::normalize_email(&email);
        if !validate::looks_like_email(&email) {
            return Err(DomainError::validation("Valid email is required"));
        }

        Ok(ValidRegistration {
            name: name.trim().to_string(),
            email,
            password,
            confirm_password,
        })
    }
}

impl ValidRegistration {
    pub fn check_passwords(&self) -> DomainResult<()> {
        if self.password != self.confirm_password {
            return Err(DomainError::validation("Passwords do not match"));
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(DomainError::validation(
                "Password must be at least 6 characters long",
            ));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Login
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginAttempt {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginAttempt {
    /// Returns the normalized email and the raw password.
    pub fn validate(self) -> DomainResult<(String, String)> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if email.is_present() && !password.is_empty() => {
                Ok((validate::normalize_email(&email), password))
            }
            _ => Err(DomainError::validation("Email and password are required")),
        }
    }
}
