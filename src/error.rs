//! Error types for tally
//!
//! All modules use `TallyResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tally operations
pub type TallyResult<T> = Result<T, TallyError>;

/// All errors that can occur in tally
#[derive(Error, Debug)]
pub enum TallyError {
    // Storage errors
    #[error("store unavailable: {context} ({path})")]
    StorageUnavailable {
        context: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed store file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // Input errors
    #[error("invalid input: {reason}")]
    Validation { reason: String },

    // Lookup errors
    #[error("todo not found: {0}")]
    TodoNotFound(String),

    #[error("chat not found: {0}")]
    ChatNotFound(u64),

    // Configuration errors
    #[error("invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TallyError {
    /// Create a storage error with context
    pub fn storage(
        context: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::StorageUnavailable {
            context: context.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a validation error with a user-facing reason
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// True for errors caused by user input rather than the storage medium.
    ///
    /// Callers surface these as messages instead of failures.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
