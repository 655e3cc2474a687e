//! `Process Detail:` and `Process Time Summary:` blocks.

use regex::Regex;
use std::sync::LazyLock;

use report_extract_core::FieldMap;

use crate::text::starts_with_digit;

static PROCESS_TIME_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s+(.+?)\s+\d{2}:\d{2}:\d{2}\s+\d{2}:\d{2}:\d{2}\s+(\d+)\s*sec")
        .expect("valid process time regex")
});

/// Lines after the first line whose trimmed text equals `marker`, skipping
/// blanks and `---` separators.
fn block_after<'a>(lines: &'a [String], marker: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    lines
        .iter()
        .skip_while(move |line| line.trim() != marker)
        .skip(1)
        .map(String::as_str)
        .filter(|line| !line.trim().is_empty() && !line.contains("---"))
}

/// Pairs each numbered process item with the `Test Time = <value>` line
/// that follows it. An item without a test time is dropped.
pub fn extract_process_details(lines: &[String], marker: &str, test_time_label: &str) -> FieldMap {
    let mut out = FieldMap::new();
    let mut pending: Option<String> = None;
    for line in block_after(lines, marker) {
        let trimmed = line.trim();
        if starts_with_digit(trimmed) {
            let name = trimmed
                .split_once(char::is_whitespace)
                .map_or("", |(_, rest)| rest)
                .trim();
            pending = Some(name.to_string());
        } else if trimmed.starts_with(test_time_label) {
            let value = trimmed.rsplit('=').next().unwrap_or_default().trim();
            if let Some(item) = pending.take() {
                out.insert(item, value.to_string());
            }
        }
    }
    out
}

/// Reads `<index> <name> <start> <end> <n> sec` rows into
/// `<index>-<name>` → `<n> sec`.
pub fn extract_process_time_summary(lines: &[String], marker: &str) -> FieldMap {
    let mut out = FieldMap::new();
    for line in block_after(lines, marker).filter(|line| starts_with_digit(line)) {
        if let Some(caps) = PROCESS_TIME_ROW.captures(line) {
            out.insert(
                format!("{}-{}", &caps[1], caps[2].trim()),
                format!("{} sec", &caps[3]),
            );
        }
    }
    out
}
