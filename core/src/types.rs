//! Record type definitions for extracted test reports.
//!
//! This module defines the data model shared by the extraction engine, the
//! ingest layer and the exporters. The types are designed for serialization
//! with [`serde`]; the PoE record shapes keep the camel-cased field names that
//! downstream chart tooling already consumes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::limits::LimitTable;
use crate::merge::HeaderPolicy;

/// Version of the exported record contract (semver).
pub const RECORD_CONTRACT_VERSION: &str = "1.0.0";

/// Insertion-ordered field map (`field key -> raw value`).
pub type FieldMap = IndexMap<String, String>;

/// Report dialect handled by the engine.
///
/// Dialect selection is a caller decision; the engine never sniffs content.
///
/// # Examples
///
/// ```
/// use report_extract_core::Dialect;
///
/// assert_eq!(Dialect::BurnIn.label(), "burn-in");
/// assert_eq!(Dialect::Poe.to_string(), "poe");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Power-supply burn-in (ADAC) reports, many units per text file.
    BurnIn,
    /// Power-over-Ethernet network test logs, one unit per `.log` file.
    Poe,
}

impl Dialect {
    pub fn label(self) -> &'static str {
        match self {
            Self::BurnIn => "burn-in",
            Self::Poe => "poe",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One archive entry decoded to text lines.
///
/// # Examples
///
/// ```
/// use report_extract_core::ReportEntry;
///
/// let entry = ReportEntry::from_text("unit_01.log", "\u{feff}first\r\nsecond\nthird");
/// assert_eq!(entry.lines, vec!["first", "second", "third"]);
/// assert!(entry.has_extension("LOG"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Entry path inside the archive (or file name for loose files).
    pub name: String,
    /// Newline-normalized lines, without terminators.
    pub lines: Vec<String>,
}

impl ReportEntry {
    pub fn new(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    /// Splits `text` on `\r\n` or `\n` and drops a leading byte-order mark.
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        Self::new(name, lines)
    }

    /// Case-insensitive extension check on the entry name.
    pub fn has_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.');
        self.name
            .rsplit_once('.')
            .is_some_and(|(_, found)| found.eq_ignore_ascii_case(ext))
    }

    /// File name without directories and without the last extension.
    pub fn file_stem(&self) -> &str {
        let base = self
            .name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.name.as_str());
        base.rsplit_once('.').map_or(base, |(stem, _)| stem)
    }
}

/// Visualization a numeric PoE field feeds.
///
/// Serialized with the labels the legacy dashboards expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ChartCategory {
    #[serde(rename = "TxPacketsVSRxPackets")]
    TxPacketsVsRxPackets,
    #[serde(rename = "FrameSizeDis")]
    FrameSizeDistribution,
    LatencyPerTest,
    ErrorCounts,
    TxLineRateVsTestName,
    #[default]
    None,
}

impl ChartCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::TxPacketsVsRxPackets => "TxPacketsVSRxPackets",
            Self::FrameSizeDistribution => "FrameSizeDis",
            Self::LatencyPerTest => "LatencyPerTest",
            Self::ErrorCounts => "ErrorCounts",
            Self::TxLineRateVsTestName => "TxLineRateVsTestName",
            Self::None => "None",
        }
    }
}

/// One extracted PoE field with its derived annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskField {
    pub name: String,
    pub value: String,
    /// Whether `value` parses as a decimal (see [`is_decimal`]).
    pub is_numeric: bool,
    pub chart_category: ChartCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_limit: Option<f64>,
    /// Present only when a limit rule exists for this field and the value is numeric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_passed: Option<bool>,
}

/// One task section of a PoE log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoeTask {
    pub name: String,
    /// Result column of the task table, empty when the table lacks this task.
    pub status: String,
    pub fields: Vec<TaskField>,
}

/// Exported record for one PoE log file (one unit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoeRecord {
    pub serial_number: String,
    /// Archive entry the record was extracted from.
    pub source: String,
    pub has_passed: bool,
    pub summary: FieldMap,
    pub units: Vec<PoeTask>,
}

/// Verdict of one `SEQ.<n>:` marker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase: u8,
    pub passed: bool,
}

/// One burn-in unit after its record was closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnInUnit {
    pub serial_number: String,
    /// Report-local date (`YYYY_MM_DD` column), not parsed.
    pub timestamp: String,
    pub passed: bool,
    /// `false` when the unit ended without an end-of-record rule line.
    pub complete: bool,
    pub general_info: FieldMap,
    pub fields: FieldMap,
    pub phase_results: Vec<PhaseResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub limit_violations: Vec<crate::validate::LimitViolation>,
}

impl BurnInUnit {
    pub fn status_label(&self) -> &'static str {
        if self.passed { "PASS" } else { "FAIL" }
    }
}

/// One aligned row of the burn-in export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnInRow {
    pub serial_number: String,
    pub status: String,
    pub timestamp: String,
    /// Values aligned to [`BurnInTable::header`], blank where the unit lacks a key.
    pub values: Vec<String>,
}

/// Header row plus aligned unit rows for the delimiter-separated export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BurnInTable {
    pub header: Vec<String>,
    pub rows: Vec<BurnInRow>,
}

/// What the section splitter does when a task name repeats within one log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateSectionPolicy {
    /// Append the repeated section's lines to the first occurrence.
    #[default]
    Merge,
    /// Abort the batch with a duplicate-section error.
    Reject,
}

/// Tunables handed to the extraction engine.
///
/// # Examples
///
/// ```
/// use report_extract_core::{ExtractOptions, HeaderPolicy};
///
/// let options = ExtractOptions::default();
/// assert_eq!(options.header_policy, HeaderPolicy::Union);
/// assert!(options.burn_in_limits.get("Seq1-Ton Read").is_some());
/// assert!(options.poe_limits.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractOptions {
    #[serde(default)]
    pub header_policy: HeaderPolicy,
    #[serde(default)]
    pub duplicate_sections: DuplicateSectionPolicy,
    #[serde(default = "LimitTable::burn_in_defaults")]
    pub burn_in_limits: LimitTable,
    #[serde(default)]
    pub poe_limits: LimitTable,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            header_policy: HeaderPolicy::default(),
            duplicate_sections: DuplicateSectionPolicy::default(),
            burn_in_limits: LimitTable::burn_in_defaults(),
            poe_limits: LimitTable::default(),
        }
    }
}

/// Returns `true` when `text` (trimmed) is a plain decimal number.
///
/// Accepts an optional sign, digits and an optional fractional part. Exponents,
/// `inf`, `NaN` and thousands separators are rejected.
///
/// # Examples
///
/// ```
/// use report_extract_core::is_decimal;
///
/// assert!(is_decimal("10"));
/// assert!(is_decimal(" -0.25 "));
/// assert!(is_decimal(".5"));
/// assert!(!is_decimal("12 sec"));
/// assert!(!is_decimal("NaN"));
/// assert!(!is_decimal(""));
/// ```
pub fn is_decimal(text: &str) -> bool {
    parse_decimal(text).is_some()
}

/// Parses `text` with the same rules as [`is_decimal`].
pub fn parse_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix(['+', '-'])
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return None;
    }
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };
    let int_ok = int_part.chars().all(|ch| ch.is_ascii_digit());
    let frac_ok = frac_part.is_none_or(|frac| frac.chars().all(|ch| ch.is_ascii_digit()));
    let has_digit = !int_part.is_empty() || frac_part.is_some_and(|frac| !frac.is_empty());
    if !(int_ok && frac_ok && has_digit) {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
