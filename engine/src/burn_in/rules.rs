//! Label/value table rules for the burn-in sequence phases.
//!
//! The whole rule table is a single static value; the scanner receives it by
//! reference and never matches labels inline.

use regex::Regex;
use std::sync::LazyLock;

use crate::cursor::LineCursor;
use crate::text::{contains_label, split_columns, split_words_joined};

use super::phase::RuleGroup;

static ROW_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.$").expect("valid row label regex"));

/// Width of the dash run that closes a unit record in the last phase.
pub const RECORD_RULE_WIDTH: usize = 71;

/// How a table header line is cut into column keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySplit {
    /// Runs of two or more spaces.
    Columns,
    /// Single spaces, re-gluing the listed word pairs.
    Words(&'static [(&'static str, &'static str)]),
}

/// A two-line (or three-line) label/value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRule {
    /// Any of these labels on the header line triggers the rule.
    pub labels: &'static [&'static str],
    /// Distance from the header line to the value row.
    pub value_offset: usize,
    /// `false` drops the first header column (the row-label column).
    pub keep_first_key: bool,
    pub key_split: KeySplit,
    /// Rename every key containing `TRIGG` to `TRIGG<column>` so repeated
    /// trigger columns stay distinct.
    pub number_triggers: bool,
}

/// Pairs produced by one table match, plus the lines it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMatch {
    pub pairs: Vec<(String, String)>,
    pub consumed: usize,
}

impl TableRule {
    const fn columns(labels: &'static [&'static str], value_offset: usize, keep_first_key: bool) -> Self {
        Self {
            labels,
            value_offset,
            keep_first_key,
            key_split: KeySplit::Columns,
            number_triggers: false,
        }
    }

    const fn triggers(labels: &'static [&'static str]) -> Self {
        Self {
            labels,
            value_offset: 2,
            keep_first_key: false,
            key_split: KeySplit::Columns,
            number_triggers: true,
        }
    }

    pub fn matches_header(&self, line: &str) -> bool {
        self.labels.iter().any(|label| contains_label(line, label))
    }

    /// Applies the rule at the cursor position.
    ///
    /// Returns `None` when the header does not match or the value row is
    /// missing or lacks its `<n>.` row label. Keys and values pair up to the
    /// shorter of the two lists.
    pub fn apply(&self, cursor: &LineCursor<'_>) -> Option<TableMatch> {
        let header = cursor.peek(0)?;
        if !self.matches_header(header) {
            return None;
        }
        let mut values = split_columns(cursor.peek(self.value_offset)?);
        if !values.first().is_some_and(|first| ROW_LABEL.is_match(first)) {
            return None;
        }
        values.remove(0);

        let mut keys = match self.key_split {
            KeySplit::Columns => split_columns(header),
            KeySplit::Words(joins) => split_words_joined(header, joins),
        };
        if self.number_triggers {
            for (index, key) in keys.iter_mut().enumerate() {
                if key.contains("TRIGG") {
                    *key = format!("TRIGG{}", index + 1);
                }
            }
        }
        if !self.keep_first_key && !keys.is_empty() {
            keys.remove(0);
        }

        Some(TableMatch {
            pairs: keys.into_iter().zip(values).collect(),
            consumed: self.value_offset + 1,
        })
    }
}

/// Rules for one [`RuleGroup`].
#[derive(Debug, Clone, Copy)]
pub struct PhaseRules {
    pub group: RuleGroup,
    pub tables: &'static [TableRule],
    /// A dash run of [`RECORD_RULE_WIDTH`] closes the unit record.
    pub closes_record: bool,
}

/// The burn-in rule table, keyed by rule group.
#[derive(Debug)]
pub struct BurnInRules {
    groups: &'static [PhaseRules],
}

impl BurnInRules {
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    pub fn for_group(&self, group: RuleGroup) -> Option<&PhaseRules> {
        self.groups.iter().find(|rules| rules.group == group)
    }
}

const LOAD_NAME: TableRule = TableRule::columns(&["Load Name"], 1, true);

const SLEW_RATE: &[(&str, &str)] = &[("SLEW", "Rate")];

static STANDARD: BurnInRules = BurnInRules {
    groups: &[
        PhaseRules {
            group: RuleGroup::TurnOn,
            tables: &[
                LOAD_NAME,
                TableRule::columns(&["Ld TRIG"], 2, false),
                TableRule::columns(&["Ld Ton"], 1, false),
            ],
            closes_record: false,
        },
        PhaseRules {
            group: RuleGroup::Ripple,
            tables: &[
                LOAD_NAME,
                TableRule {
                    labels: &["BITS-1"],
                    value_offset: 1,
                    keep_first_key: false,
                    key_split: KeySplit::Words(SLEW_RATE),
                    number_triggers: false,
                },
                TableRule::columns(&["Vpp Max", "Vdc Max"], 1, false),
                TableRule::columns(&["dV(+) Max"], 1, false),
                TableRule::columns(&["Vn Max"], 1, false),
            ],
            closes_record: false,
        },
        PhaseRules {
            group: RuleGroup::Period,
            tables: &[
                LOAD_NAME,
                TableRule::columns(&["Period-1"], 1, false),
                TableRule::columns(&["I/R-1"], 1, false),
                TableRule::columns(&["Vs Max"], 1, false),
            ],
            closes_record: false,
        },
        PhaseRules {
            group: RuleGroup::LoadOnly,
            tables: &[LOAD_NAME],
            closes_record: false,
        },
        PhaseRules {
            group: RuleGroup::Disable,
            tables: &[LOAD_NAME, TableRule::columns(&["Vdisable Max"], 1, false)],
            closes_record: false,
        },
        PhaseRules {
            group: RuleGroup::Dynamic,
            tables: &[
                LOAD_NAME,
                TableRule::columns(&["RISE"], 1, false),
                TableRule::columns(&["Vdc Max"], 1, false),
            ],
            closes_record: false,
        },
        PhaseRules {
            group: RuleGroup::Timing,
            tables: &[
                LOAD_NAME,
                TableRule::triggers(&["TRIG"]),
                TableRule::columns(&["Ton Max"], 1, false),
                TableRule::columns(&["Tons Source"], 1, false),
            ],
            closes_record: false,
        },
        PhaseRules {
            group: RuleGroup::Final,
            tables: &[
                LOAD_NAME,
                TableRule::triggers(&["TRIG"]),
                TableRule::columns(&["Thd Max"], 1, false),
            ],
            closes_record: true,
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_every_group_has_rules() {
        let rules = BurnInRules::standard();
        for group in [
            RuleGroup::TurnOn,
            RuleGroup::Ripple,
            RuleGroup::Period,
            RuleGroup::LoadOnly,
            RuleGroup::Disable,
            RuleGroup::Dynamic,
            RuleGroup::Timing,
            RuleGroup::Final,
        ] {
            assert!(rules.for_group(group).is_some(), "{group:?}");
        }
        assert!(rules.for_group(RuleGroup::Final).unwrap().closes_record);
    }

    #[test]
    fn test_load_name_keeps_first_key() {
        let input = lines(&["Load Name    Von     Iload", "1.   LOAD1    12.0    2.5"]);
        let cursor = LineCursor::new(&input);
        let found = LOAD_NAME.apply(&cursor).unwrap();
        assert_eq!(found.consumed, 2);
        assert_eq!(
            found.pairs,
            vec![
                ("Load Name".to_string(), "LOAD1".to_string()),
                ("Von".to_string(), "12.0".to_string()),
                ("Iload".to_string(), "2.5".to_string()),
            ]
        );
    }

    #[test]
    fn test_value_row_two_lines_down_with_trigger_numbering() {
        let input = lines(&[
            "Ld    TRIG    TRIGG    TRIGG",
            "      (ms)    (ms)     (ms)",
            "1.    10      20       30",
        ]);
        let cursor = LineCursor::new(&input);
        let found = TableRule::triggers(&["TRIG"]).apply(&cursor).unwrap();
        assert_eq!(found.consumed, 3);
        let keys: Vec<&str> = found.pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["TRIG", "TRIGG3", "TRIGG4"]);
    }

    #[test]
    fn test_mismatched_lengths_truncate() {
        let rule = TableRule::columns(&["Ld Ton"], 1, false);
        let input = lines(&["Ld    Ton Max    Ton Read    Extra", "1.    3000"]);
        let found = rule.apply(&LineCursor::new(&input)).unwrap();
        assert_eq!(found.pairs, vec![("Ton Max".to_string(), "3000".to_string())]);
    }

    #[test]
    fn test_missing_row_label_rejects() {
        let rule = TableRule::columns(&["Vn Max"], 1, false);
        let input = lines(&["Ld   Vn Max", "     0.05"]);
        assert!(rule.apply(&LineCursor::new(&input)).is_none());
        let short = lines(&["Ld   Vn Max"]);
        assert!(rule.apply(&LineCursor::new(&short)).is_none());
    }

    #[test]
    fn test_slew_rate_words_glue() {
        let rules = BurnInRules::standard().for_group(RuleGroup::Ripple).unwrap();
        let bits = rules.tables.iter().find(|t| t.labels == ["BITS-1"]).unwrap();
        let input = lines(&["Ld BITS-1 SLEW Rate Vo", "1.  0.5  1.2  12"]);
        let found = bits.apply(&LineCursor::new(&input)).unwrap();
        let keys: Vec<&str> = found.pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["BITS-1", "SLEW Rate", "Vo"]);
    }
}
