use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("engine")
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_report-extract"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run report-extract")
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// Zips the two PoE fixture logs plus a non-log note.
fn write_poe_zip(dir: &Path) -> PathBuf {
    let path = dir.join("poe_batch.zip");
    let mut writer = zip::ZipWriter::new(fs::File::create(&path).unwrap());
    let options = zip::write::SimpleFileOptions::default();
    for name in ["poe_unit_01.log", "notes.txt", "poe_unit_02.log"] {
        writer.start_file(name, options).unwrap();
        writer.write_all(&fs::read(fixture(name)).unwrap()).unwrap();
    }
    writer.finish().unwrap();
    path
}

// ---------------------------------------------------------------------------
// burn-in
// ---------------------------------------------------------------------------

#[test]
fn burn_in_writes_csv_and_manifest() {
    let out = tempfile::tempdir().unwrap();
    let output = run(&[
        "burn-in",
        path_str(&fixture("burn_in_report.txt")),
        "--output",
        path_str(out.path()),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Extracted 2 unit(s)"), "stdout: {stdout}");

    let csv = fs::read_to_string(out.path().join("burn_in_report.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert!(lines[3].starts_with("SerialNumber;IsPass;StartDate;"));
    assert!(lines[4].starts_with("SN-A001;PASS;"));

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("burn_in_report.manifest.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["dialect"], "burn_in");
    assert_eq!(manifest["records"], 2);
    assert_eq!(manifest["outputs"][0], "burn_in_report.csv");
    assert_eq!(manifest["input_sha256"].as_str().map(str::len), Some(64));
}

#[test]
fn burn_in_export_is_byte_identical_across_runs() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    for dir in [&first, &second] {
        let output = run(&[
            "burn-in",
            path_str(&fixture("burn_in_report.txt")),
            "--output",
            path_str(dir.path()),
            "--no-manifest",
        ]);
        assert!(output.status.success());
    }
    let a = fs::read(first.path().join("burn_in_report.csv")).unwrap();
    let b = fs::read(second.path().join("burn_in_report.csv")).unwrap();
    assert_eq!(a, b);
    assert!(!second.path().join("burn_in_report.manifest.json").exists());
}

#[test]
fn burn_in_respects_config_delimiter() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yml");
    fs::write(&config, "output:\n  csv_delimiter: ','\n  csv_skip_rows: 0\n").unwrap();

    let output = run(&[
        "burn-in",
        path_str(&fixture("burn_in_report.txt")),
        "--config",
        path_str(&config),
        "--output",
        path_str(dir.path()),
        "--no-manifest",
    ]);
    assert!(output.status.success());
    let csv = fs::read_to_string(dir.path().join("burn_in_report.csv")).unwrap();
    assert!(csv.starts_with("SerialNumber,IsPass,StartDate,"));
}

// ---------------------------------------------------------------------------
// PoE
// ---------------------------------------------------------------------------

#[test]
fn poe_zip_writes_json_records_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_poe_zip(dir.path());
    let out = dir.path().join("out");

    let output = run(&[
        "poe",
        path_str(&archive),
        "--output",
        path_str(&out),
        "--report",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Skipped: notes.txt"), "stdout: {stdout}");

    let records: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("poe_batch.json")).unwrap()).unwrap();
    assert_eq!(records.as_array().map(Vec::len), Some(2));
    assert_eq!(records[0]["serialNumber"], "PSE-2024-0001");
    assert_eq!(records[1]["hasPassed"], false);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("poe_batch.report.json")).unwrap()).unwrap();
    assert_eq!(report["dialect"], "poe");
    assert_eq!(report["records"], 2);
}

#[test]
fn poe_cleans_pasted_input_path() {
    let dir = tempfile::tempdir().unwrap();
    let archive = write_poe_zip(dir.path());
    let pasted = format!("& '{}'", archive.display());

    let output = run(&[
        "poe",
        &pasted,
        "--output",
        path_str(dir.path()),
        "--format",
        "csv",
        "--no-manifest",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let csv = fs::read_to_string(dir.path().join("poe_batch.csv")).unwrap();
    assert!(csv.starts_with("SerialNumber;Task;Status;Field;Value;IsNumeric;ChartCategory"));
}

#[test]
fn poe_without_logs_fails_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&[
        "poe",
        path_str(&fixture("notes.txt")),
        "--output",
        path_str(dir.path()),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
}

#[test]
fn missing_input_fails_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.zip");
    let output = run(&["burn-in", path_str(&missing)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("input not found"));
}

// ---------------------------------------------------------------------------
// sections / init-config
// ---------------------------------------------------------------------------

#[test]
fn sections_lists_task_sections() {
    let output = run(&["sections", path_str(&fixture("poe_unit_01.log"))]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("poe_unit_01.log"));
    assert!(stdout.contains("Throughput"));
    assert!(stdout.contains("Stream Check"));
}

#[test]
fn init_config_writes_loadable_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report-extract.yml");

    let output = run(&["init-config", path_str(&path)]);
    assert!(output.status.success());
    let yaml = fs::read_to_string(&path).unwrap();
    assert!(yaml.contains("directory: extracted"));
    assert!(yaml.contains("Seq1-Ton Read"));

    let again = run(&["init-config", path_str(&path)]);
    assert_eq!(again.status.code(), Some(1));
    let forced = run(&["init-config", path_str(&path), "--force"]);
    assert!(forced.status.success());
}
