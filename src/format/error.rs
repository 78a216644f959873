//! Error types for mask file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing mask files.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// No mask file exists yet for this image
    #[error("No mask file at {path:?}")]
    Missing {
        /// Where the file was expected
        path: PathBuf,
    },

    /// The file exists but does not follow the mask file schema
    #[error("Malformed mask file: {reason}")]
    Malformed {
        /// Description of the violation
        reason: String,
    },

    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PersistenceError {
    /// Create a malformed file error with a reason.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Whether this only means "nothing saved yet".
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}
