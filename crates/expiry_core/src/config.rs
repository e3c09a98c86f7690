//! Runtime configuration resolved from the process environment.
//!
//! # Responsibility
//! - Resolve database path and logging settings for shells (FFI, CLI).
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Resolution never fails; invalid values are caught later by the
//!   component that consumes them (`init_logging`, `open_db`).

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "EXPIRY_TRACKER_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "EXPIRY_TRACKER_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "EXPIRY_TRACKER_LOG_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "expiry_tracker.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging stays disabled when unset.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Resolves configuration from `std::env`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}
