//! Every stdout line of `--json` mode must be one self-contained JSON object
//! with a known channel and a value of the right shape.

use std::collections::HashSet;
use std::time::Duration;

use assert_cmd::Command;

const CHANNELS: &[&str] = &[
    "set_temp",
    "current_temp",
    "humidity",
    "drying_time",
    "material",
    "cursor",
    "temp_units",
    "error_status",
    "dryer_status",
];

/// Config with a bus timeout loose enough that a descheduled replay thread on
/// a loaded test host cannot split frames.
fn tolerant_config(dir: &tempfile::TempDir) -> String {
    let path = dir.path().join("drywatch.toml");
    std::fs::write(&path, "[bus]\nbit_timeout_us = 50000\n").expect("write config");
    path.to_str().expect("utf-8 path").to_string()
}

#[test]
fn jsonl_lines_conform_to_schema() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = tolerant_config(&dir);
    let output = Command::cargo_bin("drywatch")
        .expect("binary built")
        .timeout(Duration::from_secs(30))
        .args(["--config", &config])
        .args(["--json", "simulate", "--frames", "12", "--interval-ms", "20"])
        .output()
        .expect("run drywatch");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    let mut seen = HashSet::new();
    let mut lines = 0;
    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        lines += 1;
        let value: serde_json::Value = serde_json::from_str(line).expect("valid JSON line");
        let obj = value.as_object().expect("object");
        let channel = obj["channel"].as_str().expect("channel string");
        assert!(CHANNELS.contains(&channel), "unknown channel {channel}");
        seen.insert(channel.to_string());
        match channel {
            "set_temp" | "current_temp" | "humidity" => {
                assert!(obj["value"].is_number() || obj["value"].is_null());
            }
            _ => assert!(obj["value"].is_string()),
        }
    }

    // Power-on defaults alone guarantee several channels.
    assert!(lines >= 4, "expected publications, got {lines} lines");
    for required in ["drying_time", "error_status", "dryer_status", "temp_units"] {
        assert!(seen.contains(required), "missing channel {required}");
    }
}

#[test]
fn error_replay_raises_and_reports_the_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = tolerant_config(&dir);
    let output = Command::cargo_bin("drywatch")
        .expect("binary built")
        .timeout(Duration::from_secs(30))
        .args(["--config", &config])
        .args([
            "--json",
            "simulate",
            "--frames",
            "30",
            "--interval-ms",
            "20",
            "--error",
            "2",
        ])
        .output()
        .expect("run drywatch");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    let error_values: Vec<String> = stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .filter(|v| v["channel"] == "error_status")
        .filter_map(|v| v["value"].as_str().map(String::from))
        .collect();

    // Power-on OK, then the confirmed code; ten normal frames follow the
    // error window, so the code also clears before the replay ends.
    assert!(error_values.contains(&"E2".to_string()), "{error_values:?}");
    assert_eq!(error_values.first().map(String::as_str), Some("OK"));
    assert_eq!(error_values.last().map(String::as_str), Some("OK"));
}
