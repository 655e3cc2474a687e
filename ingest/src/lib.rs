//! Input and bookkeeping around the report extraction engine.
//!
//! - [`read_entries`] decodes a zip, tar, gzip archive, a directory or a
//!   single report file into ordered [`ReportEntry`] values.
//! - [`ExtractConfig`] is the YAML run configuration.
//! - [`RunManifest`] is the JSON record of one run.
//!
//! [`ReportEntry`]: report_extract_core::ReportEntry

pub mod archive;
pub mod config;
pub mod error;
pub mod manifest;

pub use archive::{ArchiveKind, read_entries};
pub use config::{ExtractConfig, OutputConfig};
pub use error::{IngestError, Result};
pub use manifest::{EntryDigest, RunManifest};
