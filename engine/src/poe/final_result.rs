//! Final result tables: per-port counters, frame-size histogram and the
//! VLAN/latency table.
//!
//! Port rows carry the port identifier (`1(0,4,1)`). Histogram and VLAN
//! rows do not; they are matched to ports by row order.

use regex::Regex;
use std::sync::LazyLock;

use report_extract_core::FieldMap;

use super::PoeLayout;
use crate::text::starts_with_label;

static PORT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\(\d+,\d+,\d+\)$").expect("valid port id regex"));

fn is_block_end(line: &str) -> bool {
    line.trim_start().starts_with("====")
}

/// Separator rows inside a block (`-----------+-----`, `=======`).
fn is_separator_row(tokens: &[&str]) -> bool {
    tokens
        .iter()
        .any(|token| token.starts_with("-----------+") || token.starts_with("============="))
}

/// Rows of the first block opened by a line matching `opens`, up to the
/// next `====` line.
fn block_rows<'a>(lines: &'a [String], opens: impl Fn(&str) -> bool) -> Vec<Vec<&'a str>> {
    let mut rows = Vec::new();
    let Some(start) = lines.iter().position(|line| opens(line.as_str())) else {
        return rows;
    };
    for line in &lines[start + 1..] {
        if is_block_end(line) {
            break;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() || is_separator_row(&tokens) {
            continue;
        }
        rows.push(tokens);
    }
    rows
}

/// Port identifiers and their counter values, in table order.
fn port_rows<'a>(lines: &'a [String], layout: &PoeLayout) -> Vec<(&'a str, Vec<&'a str>)> {
    let opens = |line: &str| starts_with_label(line, layout.port_header) && !line.contains(':');
    block_rows(lines, opens)
        .into_iter()
        .filter(|tokens| PORT_ID.is_match(tokens[0]))
        .map(|tokens| (tokens[0], tokens[1..].to_vec()))
        .collect()
}

fn zip_into(out: &mut FieldMap, columns: &[&str], port: &str, values: &[&str]) {
    for (column, value) in columns.iter().zip(values) {
        out.insert(format!("{column}_{port}"), (*value).to_string());
    }
}

/// Extracts `<column>_<port>` fields from the three result tables.
///
/// Without a port table nothing can be keyed, so the result is empty.
pub fn extract_final_result(lines: &[String], layout: &PoeLayout) -> FieldMap {
    let mut out = FieldMap::new();
    let ports = port_rows(lines, layout);
    if ports.is_empty() {
        return out;
    }

    for (port, values) in &ports {
        zip_into(&mut out, layout.port_columns, port, values);
    }

    let bytes = block_rows(lines, |line| starts_with_label(line, layout.byte_header));
    for ((port, _), row) in ports.iter().zip(&bytes) {
        let values = match row.first() {
            Some(first) if PORT_ID.is_match(first) => &row[1..],
            _ => &row[..],
        };
        zip_into(&mut out, layout.byte_columns, port, values);
    }

    let vlans = block_rows(lines, |line| starts_with_label(line, layout.vlan_header));
    for ((port, _), row) in ports.iter().zip(&vlans) {
        zip_into(&mut out, layout.vlan_columns, port, row);
    }

    out
}
