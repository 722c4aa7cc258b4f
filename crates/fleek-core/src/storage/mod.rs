//! Key-value persistence.
//!
//! All state lives under three keys of a [`KvStore`], each holding a JSON
//! array of camelCase records with RFC 3339 timestamps.

mod catalog;
mod config;
pub mod database;
mod memory;
pub mod persistence;

pub use catalog::TimerCatalog;
pub use config::Config;
pub use database::Database;
pub use memory::MemoryStore;
pub use persistence::{ActiveTimerStore, SerializedActiveTimer};

use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StorageError};

/// Store keys.
pub mod keys {
    /// Saved timer definitions.
    pub const TIMERS: &str = "fleek_timers";
    /// Completed sessions.
    pub const SESSIONS: &str = "fleek_completed_sessions";
    /// Snapshot of the active timers.
    pub const ACTIVE_TIMERS: &str = "fleek_active_timers";
}

/// Generic get/set/remove over whole serialized values.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Store handle shared by the catalog, recorder and snapshot adapter.
pub type SharedStore = Arc<dyn KvStore>;

/// Read a JSON array stored under `key`. A missing key is an empty list.
///
/// # Errors
/// Returns [`StorageError::Corrupted`] if the stored value does not decode.
pub fn read_list<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Vec<T>, StorageError> {
    match store.get(key)? {
        Some(json) => serde_json::from_str(&json).map_err(|source| StorageError::Corrupted {
            key: key.to_string(),
            source,
        }),
        None => Ok(Vec::new()),
    }
}

/// Replace the JSON array stored under `key`.
///
/// # Errors
/// Returns an error if encoding fails or the store rejects the write.
pub fn write_list<T: Serialize>(
    store: &dyn KvStore,
    key: &str,
    items: &[T],
) -> Result<(), StorageError> {
    let json = serde_json::to_string(items).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}

/// Returns `~/.config/fleek[-dev]/` based on FLEEK_ENV.
///
/// Set FLEEK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FLEEK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("fleek-dev")
    } else {
        base_dir.join("fleek")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
