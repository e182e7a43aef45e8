//! Infrastructure layer: storage backends, demo seeding, configuration.

pub mod config;
pub mod seed;
pub mod store;

pub use config::{AppConfig, ConfigError, StorageBackend};
pub use store::{CredentialStore, InMemoryStore, SqliteStore, StoreError, TransactionLedger};
