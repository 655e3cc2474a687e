//! Shared line-splitting helpers for the report scanners.
//!
//! The report dialects mix fixed-width columns, `key = value` pairs and
//! label rows. Columns are separated by runs of two or more spaces, so a
//! single space is always part of a label (`Load Name`, `Vpp Max`).

use regex::Regex;
use std::sync::LazyLock;

static PATTERNS: LazyLock<TextPatterns> = LazyLock::new(TextPatterns::new);

struct TextPatterns {
    column_break: Regex,
    equals_break: Regex,
    whitespace_run: Regex,
}

impl TextPatterns {
    fn new() -> Self {
        Self {
            column_break: Regex::new(r"\s{2,}").expect("valid column regex"),
            equals_break: Regex::new(r"\s+=\s+|\s{2,}").expect("valid equals regex"),
            whitespace_run: Regex::new(r"\s+").expect("valid whitespace regex"),
        }
    }
}

/// Splits a trimmed line on runs of two or more whitespace characters.
pub fn split_columns(line: &str) -> Vec<String> {
    PATTERNS
        .column_break
        .split(line.trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits on single whitespace, then glues back word pairs that form one
/// column label (e.g. `SLEW Rate`).
pub fn split_words_joined(line: &str, joins: &[(&str, &str)]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for word in line.split_whitespace() {
        let glue = out.last().is_some_and(|prev| {
            joins
                .iter()
                .any(|(left, right)| prev.ends_with(left) && word == *right)
        });
        match out.last_mut() {
            Some(prev) if glue => {
                prev.push(' ');
                prev.push_str(word);
            }
            _ => out.push(word.to_string()),
        }
    }
    out
}

/// Splits a `Key = Value  Other Key = Other` line into key/value pairs.
///
/// Tokens alternate key, value, key, value. The `=` only separates when
/// whitespace surrounds it, so `a = b=c` yields `a` -> `b=c`. A trailing key
/// without a value is dropped, as are pairs with an empty key.
pub fn split_equals_pairs(line: &str) -> Vec<(String, String)> {
    let trimmed = line.trim();
    if !trimmed.contains('=') || is_rule_line(trimmed, '=', 3) {
        return Vec::new();
    }
    let tokens: Vec<&str> = PATTERNS.equals_break.split(trimmed).collect();
    tokens
        .chunks_exact(2)
        .filter(|pair| !pair[0].trim().is_empty())
        .map(|pair| (pair[0].trim().to_string(), pair[1].trim().to_string()))
        .collect()
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    PATTERNS
        .whitespace_run
        .replace_all(text.trim(), " ")
        .into_owned()
}

/// Whitespace-insensitive substring test (`Ld    TRIG` matches `Ld TRIG`).
pub fn contains_label(line: &str, label: &str) -> bool {
    collapse_whitespace(line).contains(&collapse_whitespace(label))
}

/// Whitespace-insensitive, case-insensitive prefix test on the trimmed line.
pub fn starts_with_label(line: &str, label: &str) -> bool {
    let line = collapse_whitespace(line).to_ascii_lowercase();
    line.starts_with(&collapse_whitespace(label).to_ascii_lowercase())
}

/// Returns the value following `key` on `line`.
///
/// The value runs up to the next column break (two or more spaces) or the
/// end of the line, so `Model Name: PSU-65W      Customer: ACME` yields
/// `PSU-65W` for `Model Name:`.
pub fn value_after(line: &str, key: &str) -> Option<String> {
    let start = line.find(key)? + key.len();
    let rest = line[start..].trim_start();
    let value = match PATTERNS.column_break.find(rest) {
        Some(found) => &rest[..found.start()],
        None => rest,
    };
    Some(value.trim().to_string())
}

/// `true` when the trimmed line is at least `min` repetitions of `ch` and
/// nothing else (`------`, `======`).
pub fn is_rule_line(line: &str, ch: char, min: usize) -> bool {
    let trimmed = line.trim();
    trimmed.chars().count() >= min && trimmed.chars().all(|c| c == ch)
}

/// `true` when `line` contains an unbroken run of at least `min` `ch` characters.
pub fn has_rule_run(line: &str, ch: char, min: usize) -> bool {
    let mut run = 0usize;
    for c in line.chars() {
        if c == ch {
            run += 1;
            if run >= min {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// `true` when the first non-blank character is an ASCII digit.
pub fn starts_with_digit(line: &str) -> bool {
    line.trim_start()
        .chars()
        .next()
        .is_some_and(|ch| ch.is_ascii_digit())
}

/// Character-based slice that tolerates short lines (fixed-width tables).
pub fn fixed_column(line: &str, start: usize, end: Option<usize>) -> String {
    let chars = line.chars().skip(start);
    let column: String = match end {
        Some(end) => chars.take(end.saturating_sub(start)).collect(),
        None => chars.collect(),
    };
    column.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_columns_keeps_single_space_labels() {
        assert_eq!(
            split_columns("  Load Name    Von      Iload  "),
            vec!["Load Name", "Von", "Iload"]
        );
        assert!(split_columns("   ").is_empty());
    }

    #[test]
    fn test_split_words_joined_glues_slew_rate() {
        assert_eq!(
            split_words_joined("Ld BITS-1 SLEW Rate BITS-2", &[("SLEW", "Rate")]),
            vec!["Ld", "BITS-1", "SLEW Rate", "BITS-2"]
        );
    }

    #[test]
    fn test_split_equals_pairs_alternates() {
        let pairs = split_equals_pairs("Vin Port       =        1      Vin Type        =       AC");
        assert_eq!(
            pairs,
            vec![
                ("Vin Port".to_string(), "1".to_string()),
                ("Vin Type".to_string(), "AC".to_string())
            ]
        );
    }

    #[test]
    fn test_split_equals_pairs_ignores_rule_lines_and_dangling_keys() {
        assert!(split_equals_pairs("==========").is_empty());
        assert_eq!(
            split_equals_pairs("Freq = 50   Dangling"),
            vec![("Freq".to_string(), "50".to_string())]
        );
        assert!(split_equals_pairs("Key=Value").is_empty());
        assert_eq!(
            split_equals_pairs("Mode = a=b=c   Freq = 50"),
            vec![
                ("Mode".to_string(), "a=b=c".to_string()),
                ("Freq".to_string(), "50".to_string())
            ]
        );
    }

    #[test]
    fn test_contains_label_is_whitespace_insensitive() {
        assert!(contains_label("Ld    TRIG    TRIGG", "Ld TRIG"));
        assert!(!contains_label("Ld Ton", "Ld TRIG"));
        assert!(starts_with_label("  VLAN       IP Checksum Error  Latency", "VLAN IP Checksum Error"));
    }

    #[test]
    fn test_value_after_stops_at_column_break() {
        let line = "Model Name: PSU-65W      Customer: ACME Corp     Serial No: SN0001";
        assert_eq!(value_after(line, "Model Name:").as_deref(), Some("PSU-65W"));
        assert_eq!(value_after(line, "Customer:").as_deref(), Some("ACME Corp"));
        assert_eq!(value_after(line, "Serial No:").as_deref(), Some("SN0001"));
        assert_eq!(value_after(line, "Lot No.:"), None);
    }

    #[test]
    fn test_rule_lines() {
        assert!(is_rule_line("  ------  ", '-', 5));
        assert!(!is_rule_line("---+---", '-', 5));
        assert!(has_rule_run("x ----- y", '-', 5));
        assert!(!has_rule_run("-- -- --", '-', 3));
    }

    #[test]
    fn test_fixed_column_tolerates_short_lines() {
        assert_eq!(fixed_column("1       Power Up", 0, Some(8)), "1");
        assert_eq!(fixed_column("1       Power Up", 8, Some(44)), "Power Up");
        assert_eq!(fixed_column("short", 95, None), "");
    }
}
