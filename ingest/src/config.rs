//! YAML configuration for extraction runs.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! extraction:
//!   header_policy: union
//!   duplicate_sections: merge
//!   burn_in_limits:
//!     - key: Seq1-Ton Read
//!       lower: 0.0
//!       upper: 3000.0
//!   poe_limits: []
//! output:
//!   directory: extracted
//!   csv_delimiter: ";"
//!   csv_skip_rows: 3
//!   format: json
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use report_extract_core::ExtractOptions;
use report_extract_engine::output::{CsvLayout, OutputFormat};

use crate::error::Result;

/// Where and how exports are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving exports, reports and the manifest.
    pub directory: String,
    pub csv_delimiter: char,
    /// Blank rows written above the burn-in CSV header.
    pub csv_skip_rows: usize,
    /// Export format; unset means CSV for burn-in and JSON for PoE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let layout = CsvLayout::default();
        Self {
            directory: "extracted".to_string(),
            csv_delimiter: char::from(layout.delimiter),
            csv_skip_rows: layout.skip_rows,
            format: None,
        }
    }
}

impl OutputConfig {
    /// CSV layout for the export writers. Non-ASCII delimiters fall back to
    /// `;`.
    pub fn csv_layout(&self) -> CsvLayout {
        let delimiter = u8::try_from(self.csv_delimiter)
            .ok()
            .filter(u8::is_ascii)
            .unwrap_or(b';');
        CsvLayout {
            delimiter,
            skip_rows: self.csv_skip_rows,
        }
    }
}

/// Top-level run configuration.
///
/// Missing sections take their defaults, so an empty file is valid.
///
/// # Examples
///
/// ```
/// use report_extract_ingest::ExtractConfig;
///
/// let config: ExtractConfig = serde_yaml::from_str("output:\n  csv_delimiter: ','\n").unwrap();
/// assert_eq!(config.version, "1.0");
/// assert_eq!(config.output.directory, "extracted");
/// assert_eq!(config.output.csv_layout().delimiter, b',');
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub version: String,
    pub extraction: ExtractOptions,
    pub output: OutputConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            extraction: ExtractOptions::default(),
            output: OutputConfig::default(),
        }
    }
}

impl ExtractConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::IngestError::Io) if the file cannot be read, or
    /// [`Yaml`](crate::IngestError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves configuration to a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::IngestError::Io) if the file cannot be written,
    /// or [`Yaml`](crate::IngestError::Yaml) if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
