//! Output formatting for extracted records and reports.

use std::io::Write;

use serde::{Deserialize, Serialize};

use report_extract_core::{BurnInTable, BurnInUnit, PoeRecord};

use crate::error::OutputError;
use crate::report::{ExtractionReport, Gap};

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Yaml,
    Table,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Table => "txt",
        }
    }
}

/// Delimiter and blank-row offset of the burn-in spreadsheet export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvLayout {
    pub delimiter: u8,
    /// Empty rows written before the header row.
    pub skip_rows: usize,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self {
            delimiter: b';',
            skip_rows: 3,
        }
    }
}

const BURN_IN_LEAD_COLUMNS: [&str; 3] = ["SerialNumber", "IsPass", "StartDate"];

/// Writes the burn-in table: blank rows, the header row, one row per unit.
pub fn write_burn_in_csv<W: Write>(
    table: &BurnInTable,
    layout: &CsvLayout,
    mut writer: W,
) -> Result<(), OutputError> {
    for _ in 0..layout.skip_rows {
        writer.write_all(b"\n")?;
    }
    let mut csv = csv::WriterBuilder::new()
        .delimiter(layout.delimiter)
        .flexible(true)
        .from_writer(writer);

    let header = BURN_IN_LEAD_COLUMNS
        .iter()
        .copied()
        .chain(table.header.iter().map(String::as_str));
    csv.write_record(header)?;

    for row in &table.rows {
        let record = [
            row.serial_number.as_str(),
            row.status.as_str(),
            row.timestamp.as_str(),
        ]
        .into_iter()
        .chain(row.values.iter().map(String::as_str));
        csv.write_record(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Long-form PoE export: one row per field.
pub fn write_poe_csv<W: Write>(
    records: &[PoeRecord],
    layout: &CsvLayout,
    writer: W,
) -> Result<(), OutputError> {
    let mut csv = csv::WriterBuilder::new()
        .delimiter(layout.delimiter)
        .from_writer(writer);
    csv.write_record([
        "SerialNumber",
        "Task",
        "Status",
        "Field",
        "Value",
        "IsNumeric",
        "ChartCategory",
    ])?;
    for record in records {
        for task in &record.units {
            for field in &task.fields {
                csv.write_record([
                    record.serial_number.as_str(),
                    task.name.as_str(),
                    task.status.as_str(),
                    field.name.as_str(),
                    field.value.as_str(),
                    if field.is_numeric { "true" } else { "false" },
                    field.chart_category.label(),
                ])?;
            }
        }
    }
    csv.flush()?;
    Ok(())
}

fn csv_string(write: impl FnOnce(&mut Vec<u8>) -> Result<(), OutputError>) -> Result<String, OutputError> {
    let mut buf = Vec::new();
    write(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Formats burn-in results. CSV renders the aligned table; JSON and YAML
/// render the full units.
pub fn format_burn_in(
    units: &[BurnInUnit],
    table: &BurnInTable,
    format: OutputFormat,
    layout: &CsvLayout,
) -> Result<String, OutputError> {
    match format {
        OutputFormat::Csv => csv_string(|buf| write_burn_in_csv(table, layout, buf)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(units)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(units)?),
        OutputFormat::Table => Ok(burn_in_to_table(units)),
    }
}

/// Formats PoE records.
pub fn format_poe(records: &[PoeRecord], format: OutputFormat, layout: &CsvLayout) -> Result<String, OutputError> {
    match format {
        OutputFormat::Csv => csv_string(|buf| write_poe_csv(records, layout, buf)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(records)?),
        OutputFormat::Table => Ok(poe_to_table(records)),
    }
}

/// Formats an extraction report. CSV falls back to the table form.
pub fn format_report(report: &ExtractionReport, format: OutputFormat) -> Result<String, OutputError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
        OutputFormat::Csv | OutputFormat::Table => Ok(report_to_table(report)),
    }
}

fn burn_in_to_table(units: &[BurnInUnit]) -> String {
    let mut out = String::new();
    let width = units
        .iter()
        .map(|unit| unit.serial_number.len())
        .max()
        .unwrap_or(6)
        .max(6);
    out.push_str(&format!(
        "{:<width$}  {:<6}  {:<12}  {:>6}  {}\n",
        "Serial", "Status", "Date", "Fields", "Notes"
    ));
    for unit in units {
        let mut notes = Vec::new();
        if !unit.complete {
            notes.push("incomplete".to_string());
        }
        if !unit.limit_violations.is_empty() {
            notes.push(format!("{} limit violation(s)", unit.limit_violations.len()));
        }
        out.push_str(&format!(
            "{:<width$}  {:<6}  {:<12}  {:>6}  {}\n",
            unit.serial_number,
            unit.status_label(),
            unit.timestamp,
            unit.fields.len(),
            notes.join(", ")
        ));
    }
    out
}

fn poe_to_table(records: &[PoeRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let verdict = if record.has_passed { "PASS" } else { "FAIL" };
        out.push_str(&format!(
            "{}  {verdict}  ({})\n",
            record.serial_number, record.source
        ));
        let width = record
            .units
            .iter()
            .map(|task| task.name.len())
            .max()
            .unwrap_or(4);
        for task in &record.units {
            out.push_str(&format!(
                "  {:<width$}  {:<6}  {} fields\n",
                task.name,
                task.status,
                task.fields.len()
            ));
        }
    }
    out
}

fn report_to_table(report: &ExtractionReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Dialect: {}  Entries: {}  Records: {}\n",
        report.dialect,
        report.entries_seen,
        report.records
    ));
    if !report.entries_skipped.is_empty() {
        out.push_str(&format!("Skipped: {}\n", report.entries_skipped.join(", ")));
    }

    if !report.gaps.is_empty() {
        out.push_str("\nGaps:\n");
        for gap in &report.gaps {
            match gap {
                Gap::MarkerAbsent {
                    entry,
                    section,
                    marker,
                } => {
                    let at = section
                        .as_deref()
                        .map(|name| format!(" [{name}]"))
                        .unwrap_or_default();
                    out.push_str(&format!("  {entry}{at}: marker absent: {marker}\n"));
                }
                Gap::ParseMiss { entry, key, value } => {
                    out.push_str(&format!("  {entry}: not numeric: {key} = {value}\n"));
                }
            }
        }
    }

    if !report.limit_violations.is_empty() {
        out.push_str("\nLimit violations:\n");
        for violation in &report.limit_violations {
            out.push_str(&format!(
                "  {}  {} = {} outside [{}, {}]\n",
                violation.serial_number,
                violation.key,
                violation.value,
                violation.lower,
                violation.upper
            ));
        }
    }

    if !report.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for warning in &report.warnings {
            out.push_str(&format!("  {warning}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_extract_core::{BurnInRow, ChartCategory, Dialect, FieldMap, PoeTask, TaskField};

    fn table() -> BurnInTable {
        BurnInTable {
            header: vec!["Seq1-A".into(), "Seq1-B".into()],
            rows: vec![BurnInRow {
                serial_number: "SN1".into(),
                status: "PASS".into(),
                timestamp: "2024_01_15".into(),
                values: vec!["1".into(), String::new()],
            }],
        }
    }

    #[test]
    fn test_burn_in_csv_layout() {
        let mut buf = Vec::new();
        write_burn_in_csv(&table(), &CsvLayout::default(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[..3], ["", "", ""]);
        assert_eq!(lines[3], "SerialNumber;IsPass;StartDate;Seq1-A;Seq1-B");
        assert_eq!(lines[4], "SN1;PASS;2024_01_15;1;");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_custom_delimiter() {
        let layout = CsvLayout {
            delimiter: b',',
            skip_rows: 0,
        };
        let mut buf = Vec::new();
        write_burn_in_csv(&table(), &layout, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("SerialNumber,IsPass,StartDate"));
    }

    #[test]
    fn test_poe_json_uses_record_shape() {
        let record = PoeRecord {
            serial_number: "PSE-1".into(),
            source: "a.log".into(),
            has_passed: true,
            summary: FieldMap::new(),
            units: vec![PoeTask {
                name: "Throughput".into(),
                status: "Pass".into(),
                fields: vec![TaskField {
                    name: "TxPacket_1(0,4,1)".into(),
                    value: "10".into(),
                    is_numeric: true,
                    chart_category: ChartCategory::TxPacketsVsRxPackets,
                    lower_limit: None,
                    upper_limit: None,
                    has_passed: None,
                }],
            }],
        };
        let json = format_poe(&[record.clone()], OutputFormat::Json, &CsvLayout::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["serialNumber"], "PSE-1");
        assert_eq!(value[0]["units"][0]["fields"][0]["chartCategory"], "TxPacketsVSRxPackets");
        assert_eq!(value[0]["units"][0]["fields"][0]["isNumeric"], true);

        let csv = format_poe(&[record], OutputFormat::Csv, &CsvLayout::default()).unwrap();
        assert!(csv.contains("PSE-1;Throughput;Pass;TxPacket_1(0,4,1);10;true;TxPacketsVSRxPackets"));
    }

    #[test]
    fn test_report_table_lists_gaps() {
        let mut report = ExtractionReport::new(Dialect::Poe);
        report.marker_absent("a.log", Some("Latency"), "result block");
        report.parse_miss("a.log", "Frame Gap", "12 byte");
        let text = format_report(&report, OutputFormat::Table).unwrap();
        assert!(text.contains("a.log [Latency]: marker absent: result block"));
        assert!(text.contains("not numeric: Frame Gap = 12 byte"));
    }
}
