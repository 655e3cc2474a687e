//! Burn-in (dialect A) sequence-state extractor.
//!
//! A report holds one or more units. Each unit opens with a four-line
//! header block and walks through the `SEQ.1:` .. `SEQ.11:` phases. Inside a
//! phase, lines are matched against the phase's table rules first and the
//! `key = value` rule second. A long dash run in the last phase closes the
//! unit record.

mod phase;
mod rules;

pub use phase::{Phase, RuleGroup, ScanState, SequenceMarker, parse_marker};
pub use rules::{BurnInRules, KeySplit, PhaseRules, RECORD_RULE_WIDTH, TableMatch, TableRule};

use tracing::{debug, warn};

use report_extract_core::{
    BurnInUnit, Dialect, FieldMap, LimitTable, PhaseResult, ReportEntry, is_decimal, validate_fields,
};

use crate::cursor::LineCursor;
use crate::report::ExtractionReport;
use crate::text::{has_rule_run, split_equals_pairs, value_after};

/// Lines taken by the unit header block.
pub const UNIT_HEADER_LINES: usize = 4;

/// `(line offset, label, general_info key)` for the unit header block.
const HEADER_FIELDS: &[(usize, &str, &str)] = &[
    (0, "Model Name:", "Model Name"),
    (0, "Customer:", "Customer"),
    (0, "Serial No:", "Serial No"),
    (1, "Order No.:", "Order No"),
    (1, "Lot No.:", "Lot No"),
    (1, "Total Load No.:", "Total Load No"),
    (2, "Environment:", "Environment"),
    (2, "Inspector:", "Inspector"),
    (3, "YYYY_MM_DD:", "YYYY_MM_DD"),
    (3, "Begin Time:", "Begin Time"),
    (3, "End Time:", "End Time"),
];

/// Parsed unit header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitHeader {
    pub serial_number: String,
    pub timestamp: String,
    pub general_info: FieldMap,
}

/// Recognizes a unit header at the cursor: the current line mentions
/// `Model` and the line three below carries the `YYYY_MM_DD` column.
pub fn parse_unit_header(cursor: &LineCursor<'_>) -> Option<UnitHeader> {
    let first = cursor.peek(0)?;
    let date_line = cursor.peek(UNIT_HEADER_LINES - 1)?;
    if !first.contains("Model") || !date_line.contains("YYYY_MM_DD") {
        return None;
    }

    let mut general_info = FieldMap::new();
    for (offset, label, key) in HEADER_FIELDS {
        let Some(line) = cursor.peek(*offset) else { continue };
        let Some(value) = value_after(line, label) else { continue };
        let siblings = HEADER_FIELDS
            .iter()
            .filter(|(other, other_label, _)| other == offset && other_label != label)
            .map(|(_, other_label, _)| *other_label);
        general_info.insert((*key).to_string(), cut_at_sibling(value, siblings));
    }

    Some(UnitHeader {
        serial_number: general_info.get("Serial No").cloned().unwrap_or_default(),
        timestamp: general_info.get("YYYY_MM_DD").cloned().unwrap_or_default(),
        general_info,
    })
}

/// Trims a header value at the next label when columns are separated by a
/// single space only.
fn cut_at_sibling<'a>(value: String, siblings: impl Iterator<Item = &'a str>) -> String {
    let end = siblings
        .filter_map(|label| value.find(label))
        .min()
        .unwrap_or(value.len());
    value[..end].trim().to_string()
}

/// Accumulating state for the unit under the scanner.
#[derive(Debug)]
struct OpenUnit {
    header: UnitHeader,
    state: ScanState,
    fields: FieldMap,
    phase_results: Vec<PhaseResult>,
    closed: bool,
}

impl OpenUnit {
    fn new(header: UnitHeader) -> Self {
        Self {
            header,
            state: ScanState::default(),
            fields: FieldMap::new(),
            phase_results: Vec::new(),
            closed: false,
        }
    }

    /// Handles the line under the cursor and returns how many lines it used.
    fn scan(&mut self, cursor: &LineCursor<'_>, rules: &BurnInRules) -> usize {
        let Some(line) = cursor.peek(0) else { return 1 };
        if self.closed {
            return 1;
        }
        if let Some(marker) = parse_marker(line) {
            self.state = self.state.transition(marker);
            self.phase_results.push(PhaseResult {
                phase: marker.phase.number(),
                passed: marker.passed,
            });
            return 1;
        }
        let Some(phase) = self.state.phase() else { return 1 };
        let Some(phase_rules) = rules.for_group(phase.rule_group()) else { return 1 };

        if phase_rules.closes_record && has_rule_run(line, '-', RECORD_RULE_WIDTH) {
            debug!(serial = %self.header.serial_number, "End of record");
            self.closed = true;
            return 1;
        }

        let prefix = phase.key_prefix();
        for table in phase_rules.tables {
            if let Some(found) = table.apply(cursor) {
                for (key, value) in found.pairs {
                    self.fields.insert(format!("{prefix}{key}"), value);
                }
                return found.consumed;
            }
        }
        for (key, value) in split_equals_pairs(line) {
            self.fields.insert(format!("{prefix}{key}"), value);
        }
        1
    }

    fn finish(self, entry: &str, limits: &LimitTable, report: &mut ExtractionReport) -> BurnInUnit {
        let serial = self.header.serial_number;
        if !self.closed {
            warn!(entry, serial = %serial, "Unit ended without an end-of-record rule");
            report
                .warnings
                .push(format!("{entry}: unit {serial} has no end-of-record marker"));
        }

        for (key, value) in &self.fields {
            if limits.get(key).is_some() && !is_decimal(value) {
                report.parse_miss(entry, key, value);
            }
        }
        let violations = validate_fields(&serial, &self.fields, limits);
        let marker_passed = self.phase_results.last().is_some_and(|result| result.passed);

        BurnInUnit {
            passed: self.closed && marker_passed && violations.is_empty(),
            complete: self.closed,
            timestamp: self.header.timestamp,
            general_info: self.header.general_info,
            fields: self.fields,
            phase_results: self.phase_results,
            limit_violations: violations,
            serial_number: serial,
        }
    }
}

/// Scans one burn-in report entry into its units.
///
/// Returns the units in report order plus the per-entry report. Lines before
/// the first unit header are ignored. Units whose header has no serial number
/// are dropped and recorded as a gap.
pub fn scan_entry(
    entry: &ReportEntry,
    rules: &BurnInRules,
    limits: &LimitTable,
) -> (Vec<BurnInUnit>, ExtractionReport) {
    let mut report = ExtractionReport::new(Dialect::BurnIn);
    let mut units = Vec::new();
    let mut current: Option<OpenUnit> = None;
    let mut cursor = LineCursor::new(&entry.lines);

    while !cursor.is_done() {
        if let Some(header) = parse_unit_header(&cursor) {
            if let Some(open) = current.take() {
                units.push(open.finish(&entry.name, limits, &mut report));
            }
            debug!(entry = %entry.name, serial = %header.serial_number, "Unit start");
            current = Some(OpenUnit::new(header));
            cursor.advance(UNIT_HEADER_LINES);
            continue;
        }
        let consumed = match current.as_mut() {
            Some(open) => open.scan(&cursor, rules),
            None => 1,
        };
        cursor.advance(consumed.max(1));
    }
    if let Some(open) = current.take() {
        units.push(open.finish(&entry.name, limits, &mut report));
    }

    if units.is_empty() {
        report.marker_absent(&entry.name, None, "Model Name");
    }
    units.retain(|unit| {
        if !unit.serial_number.trim().is_empty() {
            return true;
        }
        warn!(entry = %entry.name, timestamp = %unit.timestamp, "Unit header without serial number, unit skipped");
        report.marker_absent(&entry.name, None, "Serial No:");
        report
            .warnings
            .push(format!("{}: unit without serial number skipped", entry.name));
        false
    });
    for violation in units.iter().flat_map(|unit| unit.limit_violations.iter()) {
        report.limit_violations.push(violation.clone());
    }
    report.records = units.len();
    (units, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_extract_core::LimitRule;

    const HEADER: &str = "Model Name: PSU-65W      Customer: ACME      Serial No: SN001\n\
Order No.: ORD-9      Lot No.: L7      Total Load No.: 2\n\
Environment: 25C      Inspector: QA1\n\
YYYY_MM_DD: 2024_01_15      Begin Time: 10:00:00      End Time: 11:00:00\n";

    fn entry(text: &str) -> ReportEntry {
        ReportEntry::from_text("report.txt", text)
    }

    fn scan(text: &str) -> (Vec<BurnInUnit>, ExtractionReport) {
        scan_entry(&entry(text), BurnInRules::standard(), &LimitTable::burn_in_defaults())
    }

    fn dashes() -> String {
        "-".repeat(RECORD_RULE_WIDTH)
    }

    #[test]
    fn test_header_block() {
        let input = entry(HEADER);
        let header = parse_unit_header(&LineCursor::new(&input.lines)).unwrap();
        assert_eq!(header.serial_number, "SN001");
        assert_eq!(header.timestamp, "2024_01_15");
        assert_eq!(header.general_info["Model Name"], "PSU-65W");
        assert_eq!(header.general_info["Total Load No"], "2");
        assert_eq!(header.general_info["Inspector"], "QA1");
        assert_eq!(header.general_info["End Time"], "11:00:00");
    }

    #[test]
    fn test_header_single_space_columns() {
        let input = entry(
            "Model Name: X Customer: Y Serial No: Z\nOrder No.: 1\nEnvironment: E\nYYYY_MM_DD: D Begin Time: B\n",
        );
        let header = parse_unit_header(&LineCursor::new(&input.lines)).unwrap();
        assert_eq!(header.general_info["Model Name"], "X");
        assert_eq!(header.serial_number, "Z");
        assert_eq!(header.timestamp, "D");
    }

    #[test]
    fn test_equals_pairs_take_phase_prefix() {
        let text = format!("{HEADER}SEQ.3: Ripple   PASS\n  Vin Port = 230   Freq = 50\nSEQ.11: THD   PASS\n{}\n", dashes());
        let (units, report) = scan(&text);
        assert_eq!(units.len(), 1);
        let unit = &units[0];
        assert_eq!(unit.fields["Seq3-Vin Port"], "230");
        assert_eq!(unit.fields["Seq3-Freq"], "50");
        assert!(unit.complete);
        assert!(unit.passed);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_seq_eleven_never_lands_in_phase_one() {
        let text = format!("{HEADER}SEQ.11: THD   PASS\n  A = 1\n{}\n", dashes());
        let (units, _) = scan(&text);
        assert_eq!(units[0].fields["Seq11-A"], "1");
        assert!(!units[0].fields.contains_key("Seq1-A"));
        assert_eq!(units[0].phase_results, vec![PhaseResult { phase: 11, passed: true }]);
    }

    #[test]
    fn test_table_consumes_value_row() {
        let text = format!(
            "{HEADER}SEQ.1: Turn On   PASS\nLd    Ton Max    Ton Read\n1.    3000       1500\nSEQ.11: THD   PASS\n{}\n",
            dashes()
        );
        let (units, report) = scan(&text);
        let unit = &units[0];
        assert_eq!(unit.fields["Seq1-Ton Max"], "3000");
        assert_eq!(unit.fields["Seq1-Ton Read"], "1500");
        assert_eq!(unit.fields.len(), 2);
        assert!(unit.passed);
        assert!(report.limit_violations.is_empty());
    }

    #[test]
    fn test_limit_violation_forces_fail() {
        let text = format!(
            "{HEADER}SEQ.1: Turn On   PASS\nLd    Ton Read\n1.    4500\nSEQ.11: THD   PASS\n{}\n",
            dashes()
        );
        let (units, report) = scan(&text);
        assert!(!units[0].passed);
        assert_eq!(units[0].limit_violations.len(), 1);
        assert_eq!(report.limit_violations[0].key, "Seq1-Ton Read");
    }

    #[test]
    fn test_unparsable_limit_value_is_a_gap() {
        let text = format!(
            "{HEADER}SEQ.1: Turn On   PASS\nLd    Ton Read\n1.    n/a\nSEQ.11: THD   PASS\n{}\n",
            dashes()
        );
        let (units, report) = scan(&text);
        assert!(units[0].passed);
        assert_eq!(report.gap_count(), 1);
    }

    #[test]
    fn test_last_marker_decides_verdict() {
        let text = format!("{HEADER}SEQ.2: Ripple   FAIL\nSEQ.11: THD   PASS\n{}\n", dashes());
        let (units, _) = scan(&text);
        assert!(units[0].passed);
        assert_eq!(units[0].phase_results.len(), 2);

        let text = format!("{HEADER}SEQ.2: Ripple   PASS\nSEQ.11: THD   FAIL\n{}\n", dashes());
        let (units, _) = scan(&text);
        assert!(!units[0].passed);
    }

    #[test]
    fn test_lines_after_end_of_record_are_ignored() {
        let text = format!("{HEADER}SEQ.11: THD   PASS\n{}\n  Late = 1\n", dashes());
        let (units, _) = scan(&text);
        assert!(units[0].fields.is_empty());
    }

    #[test]
    fn test_incomplete_unit_is_kept_as_failed() {
        let second = HEADER.replace("SN001", "SN002");
        let text = format!("{HEADER}SEQ.1: Turn On   PASS\n  A = 1\n{second}SEQ.11: THD   PASS\n{}\n", dashes());
        let (units, report) = scan(&text);
        assert_eq!(units.len(), 2);
        assert!(!units[0].complete);
        assert!(!units[0].passed);
        assert_eq!(units[0].fields["Seq1-A"], "1");
        assert!(units[1].complete);
        assert!(units[1].fields.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_no_units_records_marker_gap() {
        let (units, report) = scan("random text\nwithout units\n");
        assert!(units.is_empty());
        assert_eq!(report.gap_count(), 1);
    }

    #[test]
    fn test_custom_limits_are_injected() {
        let limits: LimitTable = [LimitRule::new("Seq3-Vin Port", 100.0, 200.0)].into_iter().collect();
        let text = format!("{HEADER}SEQ.3: Ripple   PASS\n  Vin Port = 230\nSEQ.11: THD   PASS\n{}\n", dashes());
        let (units, _) = scan_entry(&entry(&text), BurnInRules::standard(), &limits);
        assert!(!units[0].passed);
    }

    #[test]
    fn test_unit_without_serial_is_dropped_as_gap() {
        let blank = HEADER.replace("Serial No: SN001", "Serial No:");
        let text = format!("{blank}SEQ.11: THD   PASS\n{}\n{HEADER}SEQ.11: THD   PASS\n{}\n", dashes(), dashes());
        let (units, report) = scan(&text);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].serial_number, "SN001");
        assert_eq!(report.records, 1);
        assert_eq!(report.gap_count(), 1);
        assert_eq!(report.warnings, vec!["report.txt: unit without serial number skipped"]);
    }
}
