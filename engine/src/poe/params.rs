//! Packet and learning parameter lines (`Frame Count : 1000`).

use report_extract_core::FieldMap;

use crate::text::starts_with_label;

/// Scans for lines starting with one of `labels` (case-insensitive) and
/// stores the text after the first `:`. A later line overrides an earlier one.
pub fn extract_params(lines: &[String], labels: &[&str]) -> FieldMap {
    let mut out = FieldMap::new();
    for line in lines {
        let Some((_, value)) = line.split_once(':') else { continue };
        for label in labels {
            if starts_with_label(line, label) {
                out.insert((*label).to_string(), value.trim().to_string());
            }
        }
    }
    out
}
