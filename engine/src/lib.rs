//! Extraction engine for burn-in and PoE test reports.
//!
//! The engine turns decoded report entries into records:
//!
//! - [`extract_burn_in`] runs the sequence-state scanner over burn-in
//!   reports and lines the units up in one [`BurnInTable`].
//! - [`extract_poe`] splits every PoE log into task sections, runs the table
//!   block extractors over each section and assembles one [`PoeRecord`] per
//!   log.
//!
//! Entries are scanned in parallel; results keep entry order. Non-fatal
//! anomalies land in the [`ExtractionReport`]; only batch-level invariant
//! violations return an [`ExtractError`].
//!
//! # Example
//!
//! ```
//! use report_extract_core::{ExtractOptions, ReportEntry};
//! use report_extract_engine::extract_poe;
//!
//! let log = "\
//! SN1#: PSE-0001
//! ===<< SUMMARY >>===
//! Test Result  : Pass
//! ----------------------------------------------------------------
//! Task Name : Throughput
//! Port       TxPacket  RxPacket
//! 1(0,4,1) 10 20 30 40 0 0 0 0 0 0 0 0
//! =====
//! ";
//! let entries = vec![ReportEntry::from_text("unit.log", log)];
//! let batch = extract_poe(&entries, &ExtractOptions::default()).unwrap();
//!
//! let record = &batch.records[0];
//! assert_eq!(record.serial_number, "PSE-0001");
//! assert!(record.has_passed);
//! let tx = &record.units[0].fields[0];
//! assert_eq!((tx.name.as_str(), tx.value.as_str()), ("TxPacket_1(0,4,1)", "10"));
//! ```
//!
//! [`BurnInTable`]: report_extract_core::BurnInTable
//! [`PoeRecord`]: report_extract_core::PoeRecord

pub mod assemble;
pub mod burn_in;
pub mod classify;
pub mod cursor;
pub mod error;
pub mod output;
pub mod poe;
pub mod report;
pub mod sections;
pub mod text;

pub use error::{ExtractError, OutputError, Result};
pub use report::{ExtractionReport, Gap};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use report_extract_core::{
    BurnInTable, BurnInUnit, Dialect, ExtractOptions, PoeRecord, ReportEntry,
    validate_unique_serials,
};

use crate::assemble::{PoeParts, assemble_burn_in_table, assemble_poe};
use crate::burn_in::BurnInRules;
use crate::poe::PoeLayout;

/// Burn-in units, their aligned export table and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct BurnInBatch {
    pub units: Vec<BurnInUnit>,
    pub table: BurnInTable,
    pub report: ExtractionReport,
}

/// PoE records and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct PoeBatch {
    pub records: Vec<PoeRecord>,
    pub report: ExtractionReport,
}

fn has_text(entry: &ReportEntry) -> bool {
    entry.lines.iter().any(|line| !line.trim().is_empty())
}

/// Extracts every burn-in unit from `entries`.
///
/// Entries without any text are skipped, as are units without a serial
/// number. Fails when there are no entries or when a unit serial repeats.
pub fn extract_burn_in(entries: &[ReportEntry], options: &ExtractOptions) -> Result<BurnInBatch> {
    if entries.is_empty() {
        return Err(ExtractError::NoEntries);
    }
    let rules = BurnInRules::standard();
    let mut report = ExtractionReport::new(Dialect::BurnIn);
    report.entries_seen = entries.len();

    let scanned: Vec<_> = entries
        .par_iter()
        .map(|entry| {
            if has_text(entry) {
                Some(burn_in::scan_entry(entry, rules, &options.burn_in_limits))
            } else {
                None
            }
        })
        .collect();

    let mut units = Vec::new();
    for (entry, result) in entries.iter().zip(scanned) {
        match result {
            Some((entry_units, entry_report)) => {
                debug!(entry = %entry.name, units = entry_units.len(), "Burn-in entry scanned");
                units.extend(entry_units);
                report.absorb(entry_report);
            }
            None => report.entries_skipped.push(entry.name.clone()),
        }
    }

    validate_unique_serials(units.iter().map(|unit| unit.serial_number.as_str()))?;
    let table = assemble_burn_in_table(&units, options.header_policy);
    report.records = units.len();

    info!(
        entries = entries.len(),
        units = units.len(),
        columns = table.header.len(),
        gaps = report.gap_count(),
        "Burn-in extraction finished"
    );
    Ok(BurnInBatch {
        units,
        table,
        report,
    })
}

/// Extracts one record per PoE log in `entries`.
///
/// Only `.log` entries with more than one line are read; the rest are listed
/// as skipped. Fails when no log is left, when a task section repeats under
/// the reject policy, when some log has no SUMMARY block (the serial and
/// summary counts then differ), or when a serial repeats.
pub fn extract_poe(entries: &[ReportEntry], options: &ExtractOptions) -> Result<PoeBatch> {
    let layout = PoeLayout::standard();
    let mut report = ExtractionReport::new(Dialect::Poe);
    report.entries_seen = entries.len();

    let (logs, skipped): (Vec<&ReportEntry>, Vec<&ReportEntry>) =
        entries.iter().partition(|entry| poe::is_poe_log(entry));
    report
        .entries_skipped
        .extend(skipped.iter().map(|entry| entry.name.clone()));
    if logs.is_empty() {
        return Err(ExtractError::NoEntries);
    }

    let extracted: Vec<Result<poe::LogExtraction>> = logs
        .par_iter()
        .map(|entry| poe::extract_log(entry, layout, options.duplicate_sections))
        .collect();

    let mut parts = PoeParts::default();
    for extraction in extracted {
        let entry_report = parts.push(extraction?);
        report.absorb(entry_report);
    }

    let records = assemble_poe(parts, &options.poe_limits, &mut report)?;
    info!(
        logs = logs.len(),
        records = records.len(),
        gaps = report.gap_count(),
        "PoE extraction finished"
    );
    Ok(PoeBatch { records, report })
}
