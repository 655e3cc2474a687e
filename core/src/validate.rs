//! Limit and batch validation.
//!
//! Checks extracted fields against a [`LimitTable`] and enforces the batch
//! invariant that serial numbers are unique.
//!
//! # Examples
//!
//! ```
//! use report_extract_core::*;
//!
//! let mut fields = FieldMap::new();
//! fields.insert("Seq1-Ton Read".into(), "3400".into());
//! fields.insert("Seq1-Vin".into(), "230".into());
//!
//! let violations = validate_fields("SN001", &fields, &LimitTable::burn_in_defaults());
//! assert_eq!(violations.len(), 1);
//! assert_eq!(violations[0].direction, LimitDirection::Above);
//! assert!((violations[0].deviation - 400.0).abs() < 1e-9);
//!
//! assert!(validate_unique_serials(["A", "B"]).is_ok());
//! assert!(validate_unique_serials(["A", "A"]).is_err());
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::limits::{LimitCheck, LimitTable};
use crate::types::{FieldMap, parse_decimal};

/// Batch-level validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A unit header carried an empty serial number.
    #[error("serial number cannot be empty")]
    EmptySerial,
    /// Two units in the same batch share a serial number.
    #[error("duplicate serial number in batch: {0}")]
    DuplicateSerial(String),
}

/// Side of the band a value fell out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitDirection {
    Below,
    Above,
}

/// One out-of-band measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitViolation {
    pub serial_number: String,
    pub key: String,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
    pub direction: LimitDirection,
    /// Distance from the violated bound (always positive).
    pub deviation: f64,
}

/// Checks one field and returns the violation, if any.
pub fn check_field(
    serial: &str,
    key: &str,
    raw: &str,
    limits: &LimitTable,
) -> Option<LimitViolation> {
    let rule = limits.get(key)?;
    let value = parse_decimal(raw)?;
    let (direction, deviation) = match rule.classify(value) {
        LimitCheck::Below => (LimitDirection::Below, rule.lower - value),
        LimitCheck::Above => (LimitDirection::Above, value - rule.upper),
        LimitCheck::Within | LimitCheck::NotApplicable => return None,
    };
    Some(LimitViolation {
        serial_number: serial.to_string(),
        key: key.to_string(),
        value,
        lower: rule.lower,
        upper: rule.upper,
        direction,
        deviation,
    })
}

/// Checks every field of one unit, in field order.
pub fn validate_fields(serial: &str, fields: &FieldMap, limits: &LimitTable) -> Vec<LimitViolation> {
    if limits.is_empty() {
        return Vec::new();
    }
    fields
        .iter()
        .filter_map(|(key, raw)| check_field(serial, key, raw, limits))
        .collect()
}

/// Fails on the first empty or repeated serial number.
pub fn validate_unique_serials<'a, I>(serials: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for serial in serials {
        if serial.trim().is_empty() {
            return Err(ValidationError::EmptySerial);
        }
        if !seen.insert(serial) {
            return Err(ValidationError::DuplicateSerial(serial.to_string()));
        }
    }
    Ok(())
}
