//! Stream counter table (`SPort  DPort  TxPackets ...`).

use regex::Regex;
use std::sync::LazyLock;

use report_extract_core::FieldMap;

use crate::text::is_rule_line;

static STREAM_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*\d+\s*,\s*\d+\s*,\s*\d+\s*\)|\S+").expect("valid stream token regex")
});

/// Extracts `<column>(<sPort>)(<dPort>)` fields from the first stream
/// counter table.
///
/// Rows start after the header (and an optional separator line directly
/// under it) and stop at a blank line or a `-----` line. Rows with fewer
/// tokens than the two port ids plus every column are skipped.
pub fn extract_stream_counters(lines: &[String], header: &str, columns: &[&str]) -> FieldMap {
    let mut out = FieldMap::new();
    let Some(start) = lines.iter().position(|line| line.trim().starts_with(header)) else {
        return out;
    };

    let mut rows = lines[start + 1..].iter().map(|line| line.trim()).peekable();
    if rows
        .peek()
        .is_some_and(|line| is_rule_line(line, '-', 3) || is_rule_line(line, '=', 3))
    {
        rows.next();
    }

    for line in rows {
        if line.is_empty() || line.starts_with("-----") {
            break;
        }
        let tokens: Vec<&str> = STREAM_TOKEN.find_iter(line).map(|m| m.as_str()).collect();
        if tokens.len() < 2 + columns.len() {
            continue;
        }
        let (source, dest) = (tokens[0], tokens[1]);
        for (column, value) in columns.iter().zip(&tokens[2..]) {
            out.insert(format!("{column}({source})({dest})"), (*value).to_string());
        }
    }
    out
}
