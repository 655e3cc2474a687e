//! Error types for batch extraction.
//!
//! Only batch-level invariant violations are errors. Per-line anomalies
//! (absent markers, unparsable numbers) are recorded as
//! [`Gap`](crate::report::Gap)s in the extraction report instead.

use thiserror::Error;

use report_extract_core::ValidationError;

/// Fatal extraction failures; the batch produces no records.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The batch has no entries the selected dialect can read.
    #[error("no report entries to extract")]
    NoEntries,

    /// Serial numbers and summary blocks were extracted in different numbers.
    #[error("serial numbers do not match the data: {serials} serial numbers, {summaries} summaries")]
    CountMismatch { serials: usize, summaries: usize },

    /// A task name repeated within one log under the reject policy.
    #[error("duplicate task section: {0}")]
    DuplicateSection(String),

    /// Serial number uniqueness or presence failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Convenience alias for results with [`ExtractError`].
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors raised while rendering extracted records.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
