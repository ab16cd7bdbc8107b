//! CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary config
//! directory and working files.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

const EXPORT: &str = "\
# Core XYZ-1
# Data: d18O against calendar year
year (yr CE)\td18O (permil)
1940\t-3.6
1941\t-3.6
1942\t-3.8
1943\t-4.0
1944\t-4.0
1945\t-3.5
1946\t-3.0
1947\t-3.0
";

/// Run the CLI with `dir` as its config directory; returns (stdout, stderr, code).
fn run_cli(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_paleotag"))
        .env("PALEOTAG_CONFIG_DIR", dir.join("config"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn with<'a>(base: &[&'a str], extra: &[&'a str]) -> Vec<&'a str> {
    base.iter().chain(extra).copied().collect()
}

fn run_cli_success(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

/// Text export converted and imported into `xyz1.json`.
fn imported(dir: &TempDir) -> String {
    let txt = dir.path().join("xyz1.txt");
    fs::write(&txt, EXPORT).unwrap();
    let txt = txt.to_str().unwrap();

    let csv = run_cli_success(dir.path(), &["convert", txt]);
    let csv = csv.trim();
    assert!(csv.ends_with("xyz1.csv"));

    let record = run_cli_success(dir.path(), &["import", csv, "--name", "XYZ-1"]);
    record.trim().to_string()
}

#[test]
fn test_columns_lists_indices() {
    let dir = TempDir::new().unwrap();
    let record = imported(&dir);

    let out = run_cli_success(dir.path(), &["columns", &record]);
    assert!(out.contains("XYZ-1"));
    assert!(out.contains("0 : year [yr CE]"));
    assert!(out.contains("1 : d18O [permil]"));
}

#[test]
fn test_fit_save_and_rebuild() {
    let dir = TempDir::new().unwrap();
    let record = imported(&dir);
    let base: [&str; 13] = [
        "fit", &record, "--time-col", "0", "--value-col", "1", "--raw", "--start", "4",
        "--bp", "first=6", "--bp", "third=9",
    ];

    let json = run_cli_success(dir.path(), &with(&base, &["--json"]));
    let stats: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(stats["event_start"], 4.0);
    assert_eq!(stats["first_dur"], 2);
    assert_eq!(stats["second_dur"], 0);
    assert_eq!(stats["third_dur"], 3);
    assert_eq!(stats["event_end"], 9.0);
    let keys: Vec<_> = stats.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys.first().map(String::as_str), Some("event_start"));
    assert_eq!(keys.last().map(String::as_str), Some("event_end"));

    let (_, stderr, code) = run_cli(
        dir.path(),
        &with(&base, &["--save", &record, "--event", "0", "--event-type", "8.2ka"]),
    );
    assert_eq!(code, 0, "{stderr}");
    assert!(stderr.contains("Event_0"));

    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&record).unwrap()).unwrap();
    let event = &stored["columns"][2];
    assert_eq!(event["variable_name"], "Event_0");
    assert_eq!(event["values"], serde_json::json!([0, 1, 1, 1, 1, 1, 1, 0]));
    assert_eq!(event["event"]["event_type"], "8.2ka");

    let rebuilt = run_cli_success(
        dir.path(),
        &["rebuild", &record, "--event", "0", "--raw", "--json"],
    );
    let rebuilt: serde_json::Value = serde_json::from_str(&rebuilt).unwrap();
    assert_eq!(rebuilt["time"].as_array().unwrap().len(), 8);
    let last = rebuilt["value"][7].as_f64().unwrap();
    assert!((last + 3.6).abs() < 1e-9, "{last}");
}

#[test]
fn test_fit_without_start_fails() {
    let dir = TempDir::new().unwrap();
    let record = imported(&dir);

    let (_, stderr, code) = run_cli(
        dir.path(),
        &["fit", &record, "--time-col", "0", "--value-col", "1"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("--start"));
}

#[test]
fn test_misaligned_breakpoint_is_reported() {
    let dir = TempDir::new().unwrap();
    let record = imported(&dir);

    let (_, stderr, code) = run_cli(
        dir.path(),
        &[
            "fit", &record, "--time-col", "0", "--value-col", "1", "--start", "4", "--bp",
            "first=6.5",
        ],
    );
    assert_ne!(code, 0);
    assert!(stderr.starts_with("error:"));
    assert!(stderr.contains("6.5"));
}

#[test]
fn test_config_get_set() {
    let dir = TempDir::new().unwrap();

    assert_eq!(run_cli_success(dir.path(), &["config", "get", "fit.scheme"]).trim(), "spline");
    run_cli_success(dir.path(), &["config", "set", "fit.scheme", "staged"]);
    assert_eq!(run_cli_success(dir.path(), &["config", "get", "fit.scheme"]).trim(), "staged");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "resample.step", "0"]);
    assert_ne!(code, 0);
    let (_, _, code) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_ne!(code, 0);

    run_cli_success(dir.path(), &["config", "reset"]);
    assert_eq!(run_cli_success(dir.path(), &["config", "get", "fit.scheme"]).trim(), "spline");
}
