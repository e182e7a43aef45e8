//! `fintrack-auth`: account identity and credential handling.
//!
//! This crate is decoupled from HTTP and storage: it knows how to validate
//! registration/login input and how to hash and verify passwords.

pub mod password;
pub mod user;

pub use password::{Argon2Hasher, CredentialHasher, HashError, PasswordDigest};
pub use user::{LoginAttempt, PublicUser, Registration, User, ValidRegistration, INVALID_CREDENTIALS};
