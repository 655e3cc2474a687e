//! PoE (dialect B) table block extractors.
//!
//! Each log file is one unit. The file is cut into task sections and every
//! section runs through the same independent sub-extractors. File-level
//! blocks (serial, summary, task table) are read from the whole log.

mod final_result;
mod layout;
mod params;
mod process;
mod stream;
mod summary;

pub use final_result::extract_final_result;
pub use layout::PoeLayout;
pub use params::extract_params;
pub use process::{extract_process_details, extract_process_time_summary};
pub use stream::extract_stream_counters;
pub use summary::{TaskStatus, extract_serial, extract_summary, extract_task_statuses, summary_verdict};

use tracing::{debug, warn};

use report_extract_core::{Dialect, DuplicateSectionPolicy, FieldMap, ReportEntry};

use crate::error::Result;
use crate::report::ExtractionReport;
use crate::sections::{Section, split_sections};

/// Fields of one task section, sub-extractor order preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFields {
    pub name: String,
    pub fields: FieldMap,
}

/// Everything read from one PoE log, before record assembly.
#[derive(Debug, Clone)]
pub struct LogExtraction {
    pub source: String,
    pub serial: String,
    pub summary: FieldMap,
    pub statuses: Vec<TaskStatus>,
    pub sections: Vec<SectionFields>,
    pub report: ExtractionReport,
}

/// `.log` entries with more than one line.
pub fn is_poe_log(entry: &ReportEntry) -> bool {
    entry.has_extension("log") && entry.lines.len() > 1
}

/// Runs every sub-extractor over one section.
pub fn extract_section(section: &Section, layout: &PoeLayout) -> FieldMap {
    let lines = &section.lines;
    let blocks = [
        extract_params(lines, layout.packet_params),
        extract_params(lines, layout.learning_params),
        extract_process_details(lines, layout.process_detail_marker, layout.test_time_label),
        extract_process_time_summary(lines, layout.process_time_marker),
        extract_final_result(lines, layout),
        extract_stream_counters(lines, layout.stream_header, layout.stream_columns),
    ];

    let mut fields = FieldMap::new();
    for block in blocks {
        fields.extend(block);
    }
    fields
}

/// Extracts one PoE log. Only a duplicate section under the reject policy
/// fails; every other anomaly is recorded in the returned report.
pub fn extract_log(
    entry: &ReportEntry,
    layout: &PoeLayout,
    policy: DuplicateSectionPolicy,
) -> Result<LogExtraction> {
    let mut report = ExtractionReport::new(Dialect::Poe);
    let name = entry.name.as_str();

    let serial = match extract_serial(&entry.lines, layout.serial_marker) {
        Some(serial) => serial,
        None => {
            let fallback = entry.file_stem().to_string();
            warn!(entry = name, fallback = %fallback, "No serial line, using file name");
            report.marker_absent(name, None, layout.serial_marker);
            report
                .warnings
                .push(format!("{name}: no {} line, serial taken from file name", layout.serial_marker));
            fallback
        }
    };

    let summary = extract_summary(&entry.lines, layout);
    if summary.is_empty() {
        report.marker_absent(name, None, layout.summary_marker);
    }
    let statuses = extract_task_statuses(&entry.lines, layout);
    if statuses.is_empty() {
        report.marker_absent(name, None, layout.task_table_header);
    }

    let section_map = split_sections(&entry.lines, policy)?;
    let mut sections = Vec::new();
    for section in section_map.tasks() {
        let fields = extract_section(section, layout);
        if fields.is_empty() {
            report.marker_absent(name, Some(&section.name), "result block");
        }
        debug!(entry = name, section = %section.name, fields = fields.len(), "Section extracted");
        sections.push(SectionFields {
            name: section.name.clone(),
            fields,
        });
    }

    Ok(LogExtraction {
        source: entry.name.clone(),
        serial,
        summary,
        statuses,
        sections,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, text: &str) -> ReportEntry {
        ReportEntry::from_text(name, text)
    }

    #[test]
    fn test_is_poe_log() {
        assert!(is_poe_log(&entry("a/B.LOG", "x\ny")));
        assert!(!is_poe_log(&entry("a.log", "single")));
        assert!(!is_poe_log(&entry("a.txt", "x\ny")));
    }

    #[test]
    fn test_port_block_end_to_end() {
        let log = "SN1#: PSE-7\n\
Task Name : Throughput\n\
Frame Count : 1000\n\
Port       TxPacket  RxPacket\n\
1(0,4,1) 10 20 30 40 0 0 0 0 0 0 0 0\n\
=====\n";
        let extraction = extract_log(&entry("unit.log", log), PoeLayout::standard(), DuplicateSectionPolicy::Merge).unwrap();
        assert_eq!(extraction.serial, "PSE-7");
        assert_eq!(extraction.sections.len(), 1);
        let section = &extraction.sections[0];
        assert_eq!(section.name, "Throughput");
        assert_eq!(section.fields["TxPacket_1(0,4,1)"], "10");
        assert_eq!(section.fields.get_index(0).map(|(k, _)| k.as_str()), Some("Frame Count"));
    }

    #[test]
    fn test_missing_serial_falls_back_to_stem() {
        let extraction = extract_log(
            &entry("batch/unit_03.log", "Task Name : A\nnothing"),
            PoeLayout::standard(),
            DuplicateSectionPolicy::Merge,
        )
        .unwrap();
        assert_eq!(extraction.serial, "unit_03");
        assert_eq!(extraction.report.warnings.len(), 1);
        // serial, summary, task table, empty section
        assert_eq!(extraction.report.gap_count(), 4);
    }
}
