//! Structured extraction reporting.
//!
//! Non-fatal anomalies never abort a batch. They are collected here so the
//! caller can see which markers were absent and which values were skipped.

use serde::{Deserialize, Serialize};

use report_extract_core::{Dialect, LimitViolation};

/// A data gap left by a non-fatal anomaly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Gap {
    /// An expected marker line was not found; the block yielded nothing.
    MarkerAbsent {
        entry: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        section: Option<String>,
        marker: String,
    },
    /// A value failed numeric parsing where a limit rule expected a number.
    ParseMiss {
        entry: String,
        key: String,
        value: String,
    },
}

/// Per-batch extraction report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub dialect: Dialect,
    pub entries_seen: usize,
    pub entries_skipped: Vec<String>,
    pub records: usize,
    pub gaps: Vec<Gap>,
    pub warnings: Vec<String>,
    pub limit_violations: Vec<LimitViolation>,
}

impl ExtractionReport {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            entries_seen: 0,
            entries_skipped: Vec::new(),
            records: 0,
            gaps: Vec::new(),
            warnings: Vec::new(),
            limit_violations: Vec::new(),
        }
    }

    pub fn marker_absent(&mut self, entry: &str, section: Option<&str>, marker: &str) {
        self.gaps.push(Gap::MarkerAbsent {
            entry: entry.to_string(),
            section: section.map(str::to_string),
            marker: marker.to_string(),
        });
    }

    pub fn parse_miss(&mut self, entry: &str, key: &str, value: &str) {
        self.gaps.push(Gap::ParseMiss {
            entry: entry.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// Folds a per-entry report into this batch report.
    pub fn absorb(&mut self, other: ExtractionReport) {
        self.gaps.extend(other.gaps);
        self.warnings.extend(other.warnings);
        self.limit_violations.extend(other.limit_violations);
        self.entries_skipped.extend(other.entries_skipped);
    }

    pub fn gap_count(&self) -> usize {
        self.gaps.len()
    }
}
