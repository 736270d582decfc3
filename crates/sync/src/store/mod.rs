// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! On-device persistent record store.
//!
//! [`KeyValueStore`] is the raw contract: string values under string keys,
//! each operation atomic per key. [`LocalData`] layers typed, validating
//! accessors for audits, the user profile, settings and the auth token on top.

mod local;
mod memory;
mod sqlite;

pub use local::{keys, LocalData};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Error type for local persistence.
///
/// Any of these means device storage is unavailable or refused the write.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store cannot be used (closed, poisoned, quota exceeded).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record failed validation on its way into the store.
    #[error("invalid record: {0}")]
    Invalid(#[from] qa_core::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value storage for JSON-serialized records.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write `value` under `key`, replacing what was there.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Remove every key.
    fn clear(&self) -> StoreResult<()>;
}


#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod sqlite_tests;
