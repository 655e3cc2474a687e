use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use report_extract_core::{Dialect, DuplicateSectionPolicy};
use report_extract_engine::output::{OutputFormat, format_burn_in, format_poe, format_report};
use report_extract_engine::poe::is_poe_log;
use report_extract_engine::sections::split_sections;
use report_extract_engine::{ExtractionReport, extract_burn_in, extract_poe};
use report_extract_ingest::{ExtractConfig, RunManifest, read_entries};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Csv,
    Json,
    Yaml,
    Table,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(fmt: CliOutputFormat) -> Self {
        match fmt {
            CliOutputFormat::Csv => Self::Csv,
            CliOutputFormat::Json => Self::Json,
            CliOutputFormat::Yaml => Self::Yaml,
            CliOutputFormat::Table => Self::Table,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "report-extract", version)]
#[command(about = "Extract burn-in and PoE test reports into flat records")]
struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract power-supply burn-in reports into one aligned table.
    BurnIn(ExtractArgs),
    /// Extract PoE network test logs into one record per log.
    Poe(ExtractArgs),
    /// List the task sections of every PoE log in the input.
    Sections(SectionsArgs),
    /// Write the default YAML configuration.
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Archive (.zip, .tar, .tar.gz, .gz), directory or single report file.
    input: String,
    /// Output directory (default: the configured directory, `extracted`).
    #[arg(long)]
    output: Option<PathBuf>,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Export format (default: csv for burn-in, json for PoE).
    #[arg(long)]
    format: Option<CliOutputFormat>,
    /// Also write the extraction report next to the export.
    #[arg(long)]
    report: bool,
    /// Do not write the run manifest.
    #[arg(long)]
    no_manifest: bool,
    /// Number of parallel extraction threads (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
}

#[derive(Debug, Args)]
struct SectionsArgs {
    /// Archive, directory or single log file.
    input: String,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Path of the configuration file to create.
    path: PathBuf,
    /// Overwrite an existing file.
    #[arg(long)]
    force: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::BurnIn(args) => run_extract(Dialect::BurnIn, args),
        Command::Poe(args) => run_extract(Dialect::Poe, args),
        Command::Sections(args) => run_sections(args),
        Command::InitConfig(args) => run_init_config(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Cleans a path pasted from a file manager or shell: drops a leading
/// `& ` call operator, any number of surrounding quote pairs, and collapses
/// `&&` to `&`.
fn clean_input_path(raw: &str) -> Option<String> {
    let mut input = raw.trim();
    if let Some(rest) = input.strip_prefix("& ") {
        input = rest.trim();
    }
    while input.len() > 1
        && ((input.starts_with('"') && input.ends_with('"'))
            || (input.starts_with('\'') && input.ends_with('\'')))
    {
        input = input[1..input.len() - 1].trim();
    }
    if input.is_empty() {
        return None;
    }
    Some(input.replace("&&", "&"))
}

/// Base name for the files written for `input`: the file name without its
/// container suffix.
fn output_stem(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "extracted".to_string());
    if input.is_dir() {
        return name;
    }
    let lower = name.to_ascii_lowercase();
    for suffix in [".tar.gz", ".tgz", ".zip", ".tar", ".gz"] {
        if lower.ends_with(suffix) {
            return strip_extension(&name[..name.len() - suffix.len()]);
        }
    }
    strip_extension(&name)
}

fn strip_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

fn run_extract(dialect: Dialect, args: ExtractArgs) -> Result<(), String> {
    let input = clean_input_path(&args.input).ok_or("no input path given")?;
    let input_path = PathBuf::from(&input);

    let config = match &args.config {
        Some(path) => ExtractConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => ExtractConfig::default(),
    };

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .map_err(|err| format!("Failed to create thread pool: {err}"))?;
    }

    let entries = read_entries(&input_path).map_err(|err| err.to_string())?;
    debug!(input = %input, entries = entries.len(), dialect = %dialect, "Input read");

    let format: OutputFormat = args
        .format
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or(match dialect {
            Dialect::BurnIn => OutputFormat::Csv,
            Dialect::Poe => OutputFormat::Json,
        });
    let layout = config.output.csv_layout();

    let (rendered, report, records) = match dialect {
        Dialect::BurnIn => {
            let batch = extract_burn_in(&entries, &config.extraction).map_err(|err| err.to_string())?;
            let rendered = format_burn_in(&batch.units, &batch.table, format, &layout)
                .map_err(|err| err.to_string())?;
            (rendered, batch.report, batch.units.len())
        }
        Dialect::Poe => {
            let batch = extract_poe(&entries, &config.extraction).map_err(|err| err.to_string())?;
            let rendered =
                format_poe(&batch.records, format, &layout).map_err(|err| err.to_string())?;
            (rendered, batch.report, batch.records.len())
        }
    };

    let output_dir = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));
    fs::create_dir_all(&output_dir).map_err(|err| {
        format!(
            "Failed to create output directory '{}': {err}",
            output_dir.display()
        )
    })?;

    let stem = output_stem(&input_path);
    let mut outputs = Vec::new();

    let export_name = format!("{stem}.{}", format.extension());
    write_output(&output_dir, &export_name, &rendered)?;
    outputs.push(export_name.clone());

    if args.report {
        let report_format = match format {
            OutputFormat::Csv => OutputFormat::Table,
            other => other,
        };
        let text = format_report(&report, report_format).map_err(|err| err.to_string())?;
        let report_name = format!("{stem}.report.{}", report_format.extension());
        write_output(&output_dir, &report_name, &text)?;
        outputs.push(report_name);
    }

    if !args.no_manifest {
        let mut manifest = RunManifest::new(dialect, input.clone());
        if input_path.is_file() {
            manifest.input_sha256 =
                Some(RunManifest::calculate_checksum(&input_path).map_err(|err| err.to_string())?);
        }
        manifest.record_entries(&entries);
        manifest.records = records;
        manifest.outputs = outputs;
        let manifest_path = output_dir.join(format!("{stem}.manifest.json"));
        manifest
            .save(&manifest_path)
            .map_err(|err| format!("Failed to write '{}': {err}", manifest_path.display()))?;
    }

    print_summary(dialect, records, &report, &output_dir.join(&export_name));
    Ok(())
}

fn write_output(dir: &Path, name: &str, content: &str) -> Result<(), String> {
    let path = dir.join(name);
    fs::write(&path, content).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}

fn print_summary(dialect: Dialect, records: usize, report: &ExtractionReport, export: &Path) {
    let noun = match dialect {
        Dialect::BurnIn => "unit(s)",
        Dialect::Poe => "record(s)",
    };
    println!(
        "Extracted {records} {noun} from {} entr(ies) -> {}",
        report.entries_seen,
        export.display()
    );
    if !report.entries_skipped.is_empty() {
        println!("Skipped: {}", report.entries_skipped.join(", "));
    }
    if report.gap_count() > 0 {
        warn!(gaps = report.gap_count(), "Markers absent or values not numeric");
        eprintln!("{} gap(s) recorded during extraction.", report.gap_count());
    }
    if !report.limit_violations.is_empty() {
        eprintln!("{} limit violation(s).", report.limit_violations.len());
    }
}

fn run_sections(args: SectionsArgs) -> Result<(), String> {
    let input = clean_input_path(&args.input).ok_or("no input path given")?;
    let entries = read_entries(&input).map_err(|err| err.to_string())?;

    let mut logs = 0usize;
    for entry in entries.iter().filter(|entry| is_poe_log(entry)) {
        logs += 1;
        let sections = split_sections(&entry.lines, DuplicateSectionPolicy::Merge)
            .map_err(|err| format!("{}: {err}", entry.name))?;
        println!("{}", entry.name);
        let width = sections
            .names()
            .map(str::len)
            .max()
            .unwrap_or(0)
            .max("(preamble)".len());
        for section in sections.iter() {
            let name = if section.name.is_empty() {
                "(preamble)"
            } else {
                section.name.as_str()
            };
            println!("  {name:<width$}  {:>6} lines", section.lines.len());
        }
    }

    if logs == 0 {
        return Err(format!("no PoE logs in '{input}'"));
    }
    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.path.exists() && !args.force {
        return Err(format!(
            "'{}' already exists (use --force to overwrite)",
            args.path.display()
        ));
    }
    ExtractConfig::default()
        .save(&args.path)
        .map_err(|err| format!("Failed to write '{}': {err}", args.path.display()))?;
    println!("Wrote default configuration to {}", args.path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_input_path() {
        assert_eq!(clean_input_path("  & 'C:\\logs\\batch.zip' ").as_deref(), Some("C:\\logs\\batch.zip"));
        assert_eq!(clean_input_path("\"'/tmp/a b.zip'\"").as_deref(), Some("/tmp/a b.zip"));
        assert_eq!(clean_input_path("/tmp/R&&D.zip").as_deref(), Some("/tmp/R&D.zip"));
        assert_eq!(clean_input_path("\"\""), None);
        assert_eq!(clean_input_path("   "), None);
    }

    #[test]
    fn test_output_stem() {
        assert_eq!(output_stem(Path::new("/data/batch.tar.gz")), "batch");
        assert_eq!(output_stem(Path::new("batch.ZIP")), "batch");
        assert_eq!(output_stem(Path::new("unit_01.log.gz")), "unit_01");
        assert_eq!(output_stem(Path::new("report.txt")), "report");
        assert_eq!(output_stem(Path::new("noext")), "noext");
    }
}
