//! Password hashing.
//!
//! Raw passwords only ever pass through [`CredentialHasher`]; what gets
//! stored is a salted PHC string (`$argon2id$v=19$...`).

use std::sync::OnceLock;

use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

/// A stored password hash in PHC string format.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a PHC string loaded from storage.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum HashError {
    #[error("invalid hashing parameters: {0}")]
    Params(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// One-way password hashing with a verification counterpart.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<PasswordDigest, HashError>;

    /// Constant outcome for malformed digests: they never verify.
    fn verify(&self, password: &str, digest: &PasswordDigest) -> bool;

    /// Spend roughly the cost of a `verify` without a real digest.
    ///
    /// Called on login for unknown emails so both failure paths take about
    /// the same time.
    fn verify_absent(&self, password: &str) {
        let _ = password;
    }
}

/// Argon2id hasher.
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
    decoy: OnceLock<Option<PasswordDigest>>,
}

impl Argon2Hasher {
    /// Memory cost in KiB, iteration count, lanes.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, HashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| HashError::Params(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy: OnceLock::new(),
        })
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
            decoy: OnceLock::new(),
        }
    }
}

impl core::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Argon2Hasher").finish_non_exhaustive()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<PasswordDigest, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| HashError::Hash(e.to_string()))?;
        Ok(PasswordDigest(phc.to_string()))
    }

    fn verify(&self, password: &str, digest: &PasswordDigest) -> bool {
        let Ok(parsed) = PasswordHash::new(digest.as_str()) else {
            tracing::warn!("stored password digest is not a valid PHC string");
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    fn verify_absent(&self, password: &str) {
        let decoy = self
            .decoy
            .get_or_init(|| self.hash("fintrack-decoy-password").ok());
        if let Some(decoy) = decoy {
            let _ = self.verify(password, decoy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Hasher {
        Argon2Hasher::new(1024, 1, 1).unwrap()
    }

    #[test]
    fn hash_never_equals_plaintext() {
        let digest = cheap().hash("demo123").unwrap();
        assert_ne!(digest.as_str(), "demo123");
        assert!(digest.as_str().starts_with("$argon2id$"));
    }

    #[test]
    fn verify_accepts_only_the_right_password() {
        let hasher = cheap();
        let digest = hasher.hash("correct horse").unwrap();
        assert!(hasher.verify("correct horse", &digest));
        assert!(!hasher.verify("correct h0rse", &digest));
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = cheap();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_digest_never_verifies() {
        let hasher = cheap();
        assert!(!hasher.verify("demo123", &PasswordDigest::from_phc("demo123")));
    }

    #[test]
    fn digest_debug_is_redacted() {
        let digest = cheap().hash("secret").unwrap();
        assert_eq!(format!("{digest:?}"), "PasswordDigest(<redacted>)");
    }

    #[test]
    fn bad_params_are_reported() {
        assert!(matches!(Argon2Hasher::new(0, 0, 0), Err(HashError::Params(_))));
    }
}
