//! Core error types for fleek-core.
//!
//! Lifecycle operations never fail for ordinary state mismatches (unknown
//! ids, pausing a paused timer, ...). Errors only surface from the storage
//! boundary, from configuration files, and from timer form validation.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for fleek-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A completed session could not be written. The timer stays active.
    #[error("Session for timer '{timer_id}' was not saved: {source}")]
    SessionNotSaved {
        timer_id: String,
        #[source]
        source: StorageError,
    },

    /// A timer definition could not be written to the catalog.
    #[error("Timer '{timer_id}' was not saved: {source}")]
    TimerNotSaved {
        timer_id: String,
        #[source]
        source: StorageError,
    },

    /// The active-timer snapshot could not be written.
    #[error("Active timers were not saved: {source}")]
    SnapshotNotSaved {
        #[source]
        source: StorageError,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a [`KvStore`](crate::storage::KvStore) implementation or
/// while encoding/decoding the values it holds.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// The value stored under `key` could not be decoded
    #[error("Stored value for '{key}' is corrupted: {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage under `key`
    #[error("Failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The store cannot be used (poisoned lock, quota exceeded, ...)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors for timer input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// A field exceeds its maximum length
    #[error("{field} must be less than {max} characters (got {len})")]
    TooLong {
        field: &'static str,
        max: usize,
        len: usize,
    },

    /// Several fields failed at once
    #[error("{}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

impl ValidationError {
    /// Flatten into the list of individual field failures.
    pub fn fields(&self) -> Vec<&ValidationError> {
        match self {
            ValidationError::Invalid(errors) => errors.iter().collect(),
            other => vec![other],
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked
                    || inner.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_joins_field_messages() {
        let err = ValidationError::Invalid(vec![
            ValidationError::MissingField { field: "project" },
            ValidationError::MissingField { field: "task" },
        ]);
        assert_eq!(err.to_string(), "project is required; task is required");
        assert_eq!(err.fields().len(), 2);
    }

    #[test]
    fn session_not_saved_keeps_source() {
        let err = CoreError::SessionNotSaved {
            timer_id: "t1".into(),
            source: StorageError::Unavailable("quota exceeded".into()),
        };
        assert!(err.to_string().contains("t1"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
