//! Process configuration, read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;

use fintrack_ledger::CategoryPolicy;
use fintrack_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://finance_tracker.db";

/// Which storage backend serves accounts and ledgers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Sqlite,
    /// Volatile; lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{other}' (expected sqlite|memory)")),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageBackend,
    pub database_url: String,
    pub seed_demo: bool,
    pub category_policy: CategoryPolicy,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset and blank values fall back
    /// to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("FINTRACK_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("FINTRACK_BIND_ADDR", e))?;

        let storage = match get("FINTRACK_STORAGE") {
            Some(v) => v.parse().map_err(|e| ConfigError::invalid("FINTRACK_STORAGE", e))?,
            None => StorageBackend::default(),
        };

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let seed_demo = match get("FINTRACK_SEED_DEMO") {
            Some(v) => parse_bool(&v).ok_or_else(|| {
                ConfigError::invalid("FINTRACK_SEED_DEMO", format!("'{v}' is not a boolean"))
            })?,
            None => true,
        };

        let category_policy = match get("FINTRACK_CATEGORY_POLICY") {
            Some(v) => v
                .parse()
                .map_err(|e| ConfigError::invalid("FINTRACK_CATEGORY_POLICY", e))?,
            None => CategoryPolicy::default(),
        };

        let log_format = match get("FINTRACK_LOG_FORMAT") {
            Some(v) => v
                .parse()
                .map_err(|e| ConfigError::invalid("FINTRACK_LOG_FORMAT", e))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            storage,
            database_url,
            seed_demo,
            category_policy,
            log_format,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            storage: StorageBackend::default(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            seed_demo: true,
            category_policy: CategoryPolicy::default(),
            log_format: LogFormat::default(),
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
