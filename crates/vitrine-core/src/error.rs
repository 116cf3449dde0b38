//! Error types for the Vitrine catalog.
//!
//! Structural document errors abort the current operation before any write,
//! leaving the last-known-good showcase untouched. Extraction problems are
//! never represented here; they degrade to derived defaults at the call site.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for catalog operations.
#[derive(Debug, Error)]
pub enum VitrineError {
    // Document errors
    #[error("Document parse failed: {message}")]
    Parse { message: String },

    #[error("Document region not found: {region}")]
    MissingRegion { region: String },

    // Catalog state errors
    #[error("Position {position} out of range 1..={len}")]
    InvalidPosition { position: usize, len: usize },

    #[error("Category already exists: {key}")]
    DuplicateCategory { key: String },

    #[error("Category not found: {key}")]
    CategoryNotFound { key: String },

    #[error("Record not found: {identifier}")]
    RecordNotFound { identifier: String },

    #[error("Report artifact not found: {identifier}")]
    ArtifactNotFound { identifier: String },

    // Backup/recovery errors
    #[error("Invalid backup: {message}")]
    InvalidBackup { message: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, VitrineError>;

impl From<std::io::Error> for VitrineError {
    fn from(err: std::io::Error) -> Self {
        VitrineError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for VitrineError {
    fn from(err: serde_json::Error) -> Self {
        VitrineError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl VitrineError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        VitrineError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// True when the operation was rejected without touching any state.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            VitrineError::InvalidPosition { .. }
                | VitrineError::DuplicateCategory { .. }
                | VitrineError::CategoryNotFound { .. }
                | VitrineError::RecordNotFound { .. }
                | VitrineError::InvalidBackup { .. }
        )
    }
}
