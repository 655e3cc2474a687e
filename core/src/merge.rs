//! Header reconciliation for the burn-in table export.
//!
//! Burn-in units do not always report the same field set. [`build_header`]
//! decides the export column order under a [`HeaderPolicy`] and
//! [`align_values`] lines one unit's values up with that header so columns
//! never shift.
//!
//! # Example
//!
//! ```
//! use report_extract_core::{FieldMap, HeaderPolicy, align_values, build_header};
//!
//! let mut first = FieldMap::new();
//! first.insert("Seq1-Vin".into(), "230".into());
//! let mut second = FieldMap::new();
//! second.insert("Seq1-Vin".into(), "115".into());
//! second.insert("Seq1-Freq".into(), "60".into());
//!
//! let header = build_header([&first, &second], HeaderPolicy::Union);
//! assert_eq!(header, vec!["Seq1-Vin", "Seq1-Freq"]);
//! assert_eq!(align_values(&first, &header), vec!["230", ""]);
//! ```

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::types::FieldMap;

/// Column-order policy for the burn-in export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeaderPolicy {
    /// Keys observed in the first unit define the columns; later units'
    /// extra keys are dropped and missing keys are left blank.
    FirstUnit,
    /// Union of all units' keys in first-seen order; gaps are left blank.
    #[default]
    Union,
}

/// Builds the ordered column list for `units` under `policy`.
pub fn build_header<'a, I>(units: I, policy: HeaderPolicy) -> Vec<String>
where
    I: IntoIterator<Item = &'a FieldMap>,
{
    let mut seen: IndexSet<&'a str> = IndexSet::new();
    for fields in units {
        seen.extend(fields.keys().map(String::as_str));
        if policy == HeaderPolicy::FirstUnit {
            break;
        }
    }
    seen.into_iter().map(str::to_string).collect()
}

/// Returns `fields` values in `header` order, blank where a key is missing.
pub fn align_values(fields: &FieldMap, header: &[String]) -> Vec<String> {
    header
        .iter()
        .map(|key| fields.get(key).cloned().unwrap_or_default())
        .collect()
}

/// Keys present in `fields` that `header` does not carry.
pub fn dropped_keys<'a>(fields: &'a FieldMap, header: &[String]) -> Vec<&'a str> {
    fields
        .keys()
        .filter(|key| !header.iter().any(|h| h == *key))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_first_unit_policy_drops_later_keys() {
        let a = fields(&[("k1", "1"), ("k2", "2")]);
        let b = fields(&[("k2", "20"), ("k3", "30")]);
        let header = build_header([&a, &b], HeaderPolicy::FirstUnit);
        assert_eq!(header, vec!["k1", "k2"]);
        assert_eq!(align_values(&b, &header), vec!["", "20"]);
        assert_eq!(dropped_keys(&b, &header), vec!["k3"]);
    }

    #[test]
    fn test_union_policy_keeps_first_seen_order() {
        let a = fields(&[("k2", "2"), ("k1", "1")]);
        let b = fields(&[("k3", "3"), ("k1", "10")]);
        let header = build_header([&a, &b], HeaderPolicy::Union);
        assert_eq!(header, vec!["k2", "k1", "k3"]);
        assert_eq!(align_values(&b, &header), vec!["", "10", "3"]);
        assert!(dropped_keys(&b, &header).is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_header() {
        let header = build_header(std::iter::empty::<&FieldMap>(), HeaderPolicy::Union);
        assert!(header.is_empty());
    }
}
