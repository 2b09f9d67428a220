//! Core error types for steptimer-core.
//!
//! Validation errors are user-facing and abort the operation before any
//! state is touched. Storage errors are mostly absorbed by the persistence
//! layer (logged, then degraded to defaults) and only surface from the
//! low-level [`Database`](crate::storage::Database) API.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for steptimer-core.
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

    /// Playback state errors
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
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

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable at {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
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

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors, surfaced to the user as blocking notices.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("step name must not be empty")]
    EmptyStepName,

    #[error("step duration must be at least 1 second (got '{0}')")]
    InvalidDuration(String),

    #[error("step duration must be at most {max} seconds (got '{got}')")]
    DurationTooLong { got: String, max: u64 },

    #[error("preset name must not be empty")]
    EmptyPresetName,

    #[error("no steps: add a step or load a preset first")]
    NoSteps,

    #[error("no step at position {position} (have {len})")]
    NoSuchStep { position: usize, len: usize },

    #[error("no preset named or identified by '{0}'")]
    NoSuchPreset(String),
}

/// Playback engine misuse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The run sequence cannot change while a step is active.
    #[error("cannot rebuild the run while step {index} is active; reset first")]
    RunActive { index: usize },

    #[error("start index {index} out of range for a run of {len} steps")]
    OutOfRange { index: usize, len: usize },

    #[error("the run has no steps")]
    EmptyRun,
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
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
