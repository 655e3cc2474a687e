//! Core record types and shared primitives for test-report extraction.
//!
//! This crate defines the data model the extraction engine produces and the
//! exporters consume:
//!
//! - [`ReportEntry`]: one decoded archive entry (name + lines).
//! - [`BurnInUnit`] / [`BurnInTable`]: burn-in units and the aligned table
//!   used for the delimiter-separated export.
//! - [`PoeRecord`] / [`PoeTask`] / [`TaskField`]: PoE records, one per log
//!   file.
//! - [`ChartCategory`]: chart hint attached to numeric PoE fields.
//!
//! Limits ([`LimitTable`], [`LimitRule`]) hold the numeric acceptance bands
//! used to adjust verdicts; [`validate_fields`] reports out-of-band values.
//! Header reconciliation ([`build_header`], [`align_values`]) keeps burn-in
//! columns aligned under a [`HeaderPolicy`].
//!
//! # Example
//!
//! ```
//! use report_extract_core::*;
//!
//! let entry = ReportEntry::from_text("batch.txt", "SEQ.1: Turn On  PASS\r\nTon Read = 1500");
//! assert_eq!(entry.lines.len(), 2);
//!
//! let options = ExtractOptions::default();
//! assert_eq!(
//!     options.burn_in_limits.check("Seq1-Ton Read", "1500"),
//!     LimitCheck::Within
//! );
//! ```

mod limits;
mod merge;
mod types;
mod validate;

pub use limits::{LimitCheck, LimitRule, LimitTable};
pub use merge::{HeaderPolicy, align_values, build_header, dropped_keys};
pub use types::*;
pub use validate::{
    LimitDirection, LimitViolation, ValidationError, check_field, validate_fields,
    validate_unique_serials,
};
