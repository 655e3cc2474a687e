//! Static numeric acceptance bands keyed by field key.
//!
//! A [`LimitTable`] is built once per dialect (from the built-in defaults or
//! the YAML configuration) and passed by reference into the extractors. Most
//! fields have no rule; for those the report's own PASS/FAIL markers decide.
//!
//! # Examples
//!
//! ```
//! use report_extract_core::{LimitCheck, LimitTable};
//!
//! let limits = LimitTable::burn_in_defaults();
//! assert_eq!(limits.check("Seq1-Ton Read", "1500"), LimitCheck::Within);
//! assert_eq!(limits.check("Seq1-Ton Read", "3500"), LimitCheck::Above);
//! assert_eq!(limits.check("Seq1-Ton Read", "n/a"), LimitCheck::NotApplicable);
//! assert_eq!(limits.check("Seq1-Vin Port", "1"), LimitCheck::NotApplicable);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::parse_decimal;

/// Inclusive `[lower, upper]` band for one field key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitRule {
    pub key: String,
    pub lower: f64,
    pub upper: f64,
}

impl LimitRule {
    pub fn new(key: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            key: key.into(),
            lower,
            upper,
        }
    }

    pub fn classify(&self, value: f64) -> LimitCheck {
        if value < self.lower {
            LimitCheck::Below
        } else if value > self.upper {
            LimitCheck::Above
        } else {
            LimitCheck::Within
        }
    }
}

/// Outcome of checking one raw value against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitCheck {
    /// No rule for the key, or the value is not a decimal.
    NotApplicable,
    Within,
    Below,
    Above,
}

impl LimitCheck {
    pub fn is_violation(self) -> bool {
        matches!(self, Self::Below | Self::Above)
    }
}

/// Ordered collection of [`LimitRule`]s.
///
/// Serializes as a plain list of rules so configuration files stay readable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LimitTable {
    rules: IndexMap<String, LimitRule>,
}

impl LimitTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in burn-in limits for the turn-on time and ripple readings.
    pub fn burn_in_defaults() -> Self {
        [
            LimitRule::new("Seq1-Ton Read", 1000.0, 3000.0),
            LimitRule::new("Seq2-Vpp-1 RD", 0.01, 0.1),
            LimitRule::new("Seq2-Vpp-2 RD", 0.005, 0.07),
            LimitRule::new("Seq2-Vpp-3 RD", 0.005, 0.07),
        ]
        .into_iter()
        .collect()
    }

    /// Inserts `rule`, replacing any rule with the same key.
    pub fn insert(&mut self, rule: LimitRule) {
        self.rules.insert(rule.key.clone(), rule);
    }

    pub fn get(&self, key: &str) -> Option<&LimitRule> {
        self.rules.get(key)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &LimitRule> {
        self.rules.values()
    }

    /// Checks `raw` against the rule for `key`. Never fails: a missing rule or
    /// a non-decimal value yields [`LimitCheck::NotApplicable`].
    pub fn check(&self, key: &str, raw: &str) -> LimitCheck {
        let Some(rule) = self.rules.get(key) else {
            return LimitCheck::NotApplicable;
        };
        match parse_decimal(raw) {
            Some(value) => rule.classify(value),
            None => LimitCheck::NotApplicable,
        }
    }
}

impl FromIterator<LimitRule> for LimitTable {
    fn from_iter<I: IntoIterator<Item = LimitRule>>(iter: I) -> Self {
        let mut table = Self::new();
        for rule in iter {
            table.insert(rule);
        }
        table
    }
}

impl Serialize for LimitTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rules.values())
    }
}

impl<'de> Deserialize<'de> for LimitTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rules = Vec::<LimitRule>::deserialize(deserializer)?;
        Ok(rules.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        let limits = LimitTable::burn_in_defaults();
        assert_eq!(limits.check("Seq1-Ton Read", "1000"), LimitCheck::Within);
        assert_eq!(limits.check("Seq1-Ton Read", "3000"), LimitCheck::Within);
        assert_eq!(limits.check("Seq1-Ton Read", "999.9"), LimitCheck::Below);
        assert_eq!(limits.check("Seq2-Vpp-1 RD", "0.1"), LimitCheck::Within);
        assert_eq!(limits.check("Seq2-Vpp-2 RD", "0.08"), LimitCheck::Above);
    }

    #[test]
    fn test_parse_miss_is_not_applicable() {
        let limits = LimitTable::burn_in_defaults();
        assert_eq!(limits.check("Seq2-Vpp-3 RD", "---"), LimitCheck::NotApplicable);
        assert!(!LimitCheck::NotApplicable.is_violation());
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut limits = LimitTable::burn_in_defaults();
        let before = limits.len();
        limits.insert(LimitRule::new("Seq1-Ton Read", 0.0, 10.0));
        assert_eq!(limits.len(), before);
        assert_eq!(limits.check("Seq1-Ton Read", "1500"), LimitCheck::Above);
    }

    #[test]
    fn test_serializes_as_rule_list() {
        let limits: LimitTable = [LimitRule::new("Latency CT(us)_1(0,4,1)", 0.0, 5.0)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&limits).unwrap();
        assert_eq!(
            json,
            r#"[{"key":"Latency CT(us)_1(0,4,1)","lower":0.0,"upper":5.0}]"#
        );
        let back: LimitTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, limits);
    }
}
