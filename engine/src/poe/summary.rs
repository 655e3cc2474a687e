//! File-level PoE blocks: the `SN1#:` serial line, the `SUMMARY` block and
//! the task-status table.

use serde::{Deserialize, Serialize};

use report_extract_core::FieldMap;

use super::PoeLayout;
use crate::text::{contains_label, fixed_column, has_rule_run};

/// Summary entry used for the verdict when no key mentions `result`.
const VERDICT_FALLBACK_INDEX: usize = 5;

/// One row of the task-status table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub index: String,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub elapsed: String,
    pub result: String,
}

/// Serial number from the last `SN1#:` line.
pub fn extract_serial(lines: &[String], marker: &str) -> Option<String> {
    lines
        .iter()
        .rev()
        .find_map(|line| line.find(marker).map(|at| line[at + marker.len()..].trim().to_string()))
        .filter(|serial| !serial.is_empty())
}

/// `key: value` rows between the summary marker and the closing dash rule.
/// Repeated keys keep their first position and the last value.
pub fn extract_summary(lines: &[String], layout: &PoeLayout) -> FieldMap {
    let mut out = FieldMap::new();
    let mut inside = false;
    for line in lines {
        if line.contains(layout.summary_marker) {
            inside = true;
            continue;
        }
        if !inside {
            continue;
        }
        if has_rule_run(line.trim_start(), '-', layout.summary_rule_width) {
            inside = false;
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            if !key.trim().is_empty() {
                out.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }
    out
}

/// Record verdict from the summary block.
///
/// The first key containing `result` (any case) decides; without one, the
/// sixth entry does. Either must read `Pass`.
pub fn summary_verdict(summary: &FieldMap) -> bool {
    let value = summary
        .iter()
        .find(|(key, _)| key.to_ascii_lowercase().contains("result"))
        .map(|(_, value)| value)
        .or_else(|| summary.get_index(VERDICT_FALLBACK_INDEX).map(|(_, value)| value));
    value.is_some_and(|value| value.trim().eq_ignore_ascii_case("pass"))
}

/// Rows of the task-status table, cut by fixed character columns.
///
/// The row after the header is a separator; rows end at a blank line or a
/// line starting with `=`.
pub fn extract_task_statuses(lines: &[String], layout: &PoeLayout) -> Vec<TaskStatus> {
    let Some(header) = lines
        .iter()
        .position(|line| contains_label(line, layout.task_table_header))
    else {
        return Vec::new();
    };

    let [index, name, start, end, elapsed, result] = layout.task_columns;
    let column = |line: &str, (from, to): (usize, Option<usize>)| fixed_column(line, from, to);

    lines
        .iter()
        .skip(header + 2)
        .take_while(|line| !line.trim().is_empty() && !line.starts_with('='))
        .map(String::as_str)
        .map(|line| TaskStatus {
            index: column(line, index),
            name: column(line, name),
            start_time: column(line, start),
            end_time: column(line, end),
            elapsed: column(line, elapsed),
            result: column(line, result),
        })
        .collect()
}
