//! Key/value preference storage.
//!
//! # Responsibility
//! - Persist small user preferences (currently the list sort order).
//!
//! # Invariants
//! - One value per key; writes replace the previous value.

use crate::repo::food_item_repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};

/// Preference key holding the last chosen sort order index.
pub const SORT_ORDER_PREFERENCE_KEY: &str = "sort_order";

pub trait PreferenceRepository {
    fn get_preference(&self, key: &str) -> RepoResult<Option<String>>;
    fn set_preference(&self, key: &str, value: &str) -> RepoResult<()>;
}

/// SQLite-backed preference repository.
pub struct SqlitePreferenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePreferenceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PreferenceRepository for SqlitePreferenceRepository<'_> {
    fn get_preference(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_preference(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        )?;
        Ok(())
    }
}

impl<P: PreferenceRepository + ?Sized> PreferenceRepository for &P {
    fn get_preference(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get_preference(key)
    }

    fn set_preference(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).set_preference(key, value)
    }
}

impl<P: PreferenceRepository + ?Sized> PreferenceRepository for std::sync::Arc<P> {
    fn get_preference(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get_preference(key)
    }

    fn set_preference(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).set_preference(key, value)
    }
}
