//! Error types for archive decoding and run bookkeeping.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading inputs, configuration or manifests.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip container could not be read.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input path does not exist.
    #[error("input not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The archive or directory holds no file entries.
    #[error("no entries in {}", .0.display())]
    EmptyArchive(PathBuf),
}

/// Convenience alias for results with [`IngestError`].
pub type Result<T> = std::result::Result<T, IngestError>;
