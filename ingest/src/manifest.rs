//! Run manifest written next to the exports.
//!
//! The manifest records what went into a run (input checksum, per-entry
//! digests and line counts) and what came out (record count, output files).
//! It carries the only timestamp of a run, so the exports themselves stay
//! byte-identical across re-runs of the same input.
//!
//! # Examples
//!
//! ```no_run
//! use report_extract_core::{Dialect, ReportEntry};
//! use report_extract_ingest::RunManifest;
//!
//! let entries = vec![ReportEntry::from_text("unit.log", "SN1#: PSE-1\n")];
//! let mut manifest = RunManifest::new(Dialect::Poe, "batch.zip");
//! manifest.input_sha256 = Some(RunManifest::calculate_checksum("batch.zip").unwrap());
//! manifest.record_entries(&entries);
//! manifest.records = 1;
//! manifest.outputs.push("batch.json".into());
//! manifest.save("extracted/manifest.json").unwrap();
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use report_extract_core::{Dialect, RECORD_CONTRACT_VERSION, ReportEntry};

use crate::error::Result;

/// Digest of one decoded input entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDigest {
    pub name: String,
    /// SHA-256 hex digest of the decoded lines joined with `\n`.
    pub sha256: String,
    pub lines: usize,
}

impl EntryDigest {
    pub fn of(entry: &ReportEntry) -> Self {
        let mut hasher = Sha256::new();
        for (index, line) in entry.lines.iter().enumerate() {
            if index > 0 {
                hasher.update(b"\n");
            }
            hasher.update(line.as_bytes());
        }
        Self {
            name: entry.name.clone(),
            sha256: format!("{:x}", hasher.finalize()),
            lines: entry.lines.len(),
        }
    }
}

/// Bookkeeping for one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Version of the tool that produced the run.
    pub tool_version: String,
    /// Exported record contract (see [`RECORD_CONTRACT_VERSION`]).
    pub record_contract: String,
    pub dialect: Dialect,
    /// Input path as given on the command line.
    pub input: String,
    /// SHA-256 of the input file; `None` for directory inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_sha256: Option<String>,
    pub entries: Vec<EntryDigest>,
    /// Units (burn-in) or records (PoE) produced.
    pub records: usize,
    /// Output file names relative to the output directory.
    pub outputs: Vec<String>,
    /// ISO-8601 timestamp of the run.
    pub generated_at: String,
}

impl RunManifest {
    pub fn new(dialect: Dialect, input: impl Into<String>) -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            record_contract: RECORD_CONTRACT_VERSION.to_string(),
            dialect,
            input: input.into(),
            input_sha256: None,
            entries: Vec::new(),
            records: 0,
            outputs: Vec::new(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Replaces the entry digests with those of `entries`, in order.
    pub fn record_entries(&mut self, entries: &[ReportEntry]) {
        self.entries = entries.iter().map(EntryDigest::of).collect();
    }

    /// Loads a manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::IngestError::Io) if the file cannot be read, or
    /// [`Json`](crate::IngestError::Json) if the content is not manifest JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let manifest = serde_json::from_reader(reader)?;
        Ok(manifest)
    }

    /// Saves the manifest as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Computes the SHA-256 hex digest of a file.
    pub fn calculate_checksum(path: impl AsRef<Path>) -> Result<String> {
        let bytes = std::fs::read(path)?;
        let hash = Sha256::digest(&bytes);
        Ok(format!("{:x}", hash))
    }
}
