//! Record assembly for both dialects.

use tracing::{debug, warn};

use report_extract_core::{
    BurnInRow, BurnInTable, BurnInUnit, FieldMap, HeaderPolicy, LimitTable, PoeRecord, PoeTask,
    TaskField, align_values, build_header, check_field, dropped_keys, is_decimal, parse_decimal,
    validate_unique_serials,
};

use crate::classify::classify_field;
use crate::error::{ExtractError, Result};
use crate::poe::{LogExtraction, SectionFields, TaskStatus, summary_verdict};
use crate::report::ExtractionReport;

/// Per-log parts collected in entry order.
///
/// `summaries` only holds the logs that had a SUMMARY block, so its length
/// can fall short of `serials`; every other list has one slot per log.
#[derive(Debug, Clone, Default)]
pub struct PoeParts {
    pub sources: Vec<String>,
    pub serials: Vec<String>,
    pub summaries: Vec<FieldMap>,
    pub statuses: Vec<Vec<TaskStatus>>,
    pub sections: Vec<Vec<SectionFields>>,
}

impl PoeParts {
    /// Appends one log's parts and hands back its diagnostics.
    pub fn push(&mut self, extraction: LogExtraction) -> ExtractionReport {
        self.sources.push(extraction.source);
        self.serials.push(extraction.serial);
        if !extraction.summary.is_empty() {
            self.summaries.push(extraction.summary);
        }
        self.statuses.push(extraction.statuses);
        self.sections.push(extraction.sections);
        extraction.report
    }
}

/// Builds one annotated field. A limit rule adds its band and, for numeric
/// values, the in-band verdict.
pub fn annotate_field(name: &str, value: &str, limits: &LimitTable) -> TaskField {
    let is_numeric = is_decimal(value);
    let rule = limits.get(name);
    let has_passed = rule
        .zip(parse_decimal(value))
        .map(|(rule, parsed)| !rule.classify(parsed).is_violation());
    TaskField {
        name: name.to_string(),
        value: value.to_string(),
        is_numeric,
        chart_category: classify_field(name, is_numeric),
        lower_limit: rule.map(|rule| rule.lower),
        upper_limit: rule.map(|rule| rule.upper),
        has_passed,
    }
}

/// Status for each section: the task-table row with the same name, else the
/// row at the same position, else empty.
fn section_status(position: usize, name: &str, statuses: &[TaskStatus]) -> String {
    statuses
        .iter()
        .find(|status| status.name == name)
        .or_else(|| statuses.get(position))
        .map(|status| status.result.clone())
        .unwrap_or_default()
}

/// Combines per-log parts into records.
///
/// Fails without producing any record when the serial and summary counts
/// differ or when a serial repeats.
pub fn assemble_poe(
    parts: PoeParts,
    limits: &LimitTable,
    report: &mut ExtractionReport,
) -> Result<Vec<PoeRecord>> {
    if parts.serials.len() != parts.summaries.len() {
        return Err(ExtractError::CountMismatch {
            serials: parts.serials.len(),
            summaries: parts.summaries.len(),
        });
    }
    validate_unique_serials(parts.serials.iter().map(String::as_str))?;

    let PoeParts {
        sources,
        serials,
        summaries,
        statuses,
        sections,
    } = parts;

    let mut records = Vec::with_capacity(serials.len());
    for ((((source, serial), summary), statuses), sections) in sources
        .into_iter()
        .zip(serials)
        .zip(summaries)
        .zip(statuses)
        .zip(sections)
    {
        let mut units = Vec::with_capacity(sections.len());
        for (position, section) in sections.into_iter().enumerate() {
            let mut fields = Vec::with_capacity(section.fields.len());
            for (name, value) in &section.fields {
                if limits.get(name).is_some() && !is_decimal(value) {
                    report.parse_miss(&source, name, value);
                }
                if let Some(violation) = check_field(&serial, name, value, limits) {
                    report.limit_violations.push(violation);
                }
                fields.push(annotate_field(name, value, limits));
            }
            units.push(PoeTask {
                status: section_status(position, &section.name, &statuses),
                name: section.name,
                fields,
            });
        }
        debug!(serial = %serial, tasks = units.len(), "Assembled PoE record");
        records.push(PoeRecord {
            has_passed: summary_verdict(&summary),
            serial_number: serial,
            source,
            summary,
            units,
        });
    }
    report.records = records.len();
    Ok(records)
}

/// Lines burn-in units up under one header row chosen by `policy`.
pub fn assemble_burn_in_table(units: &[BurnInUnit], policy: HeaderPolicy) -> BurnInTable {
    let header = build_header(units.iter().map(|unit| &unit.fields), policy);
    let rows = units
        .iter()
        .map(|unit| {
            let dropped = dropped_keys(&unit.fields, &header);
            if !dropped.is_empty() {
                warn!(serial = %unit.serial_number, dropped = ?dropped, "Fields outside the export header");
            }
            BurnInRow {
                serial_number: unit.serial_number.clone(),
                status: unit.status_label().to_string(),
                timestamp: unit.timestamp.clone(),
                values: align_values(&unit.fields, &header),
            }
        })
        .collect();
    BurnInTable { header, rows }
}
