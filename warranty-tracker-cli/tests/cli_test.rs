use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn warranty() -> Command {
    cargo_bin_cmd!("warranty")
}

#[test]
fn test_status_table() {
    warranty()
        .args(["status", "--inspection-date", "2024-01-01", "--now", "2024-01-20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Replacement warranty"))
        .stdout(predicate::str::contains("2024-01-15"))
        .stdout(predicate::str::contains("161 days left"))
        .stdout(predicate::str::contains("Next change: 2024-06-29"));
}

#[test]
fn test_status_json() {
    let output = warranty()
        .args(["status", "--inspection-date", "2024-01-01", "--now", "2024-07-15", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["maintenance1"]["state"], "expired");
    assert_eq!(report["maintenance2"]["state"], "active");
    assert_eq!(report["maintenance2"]["startDate"], report["maintenance1"]["endDate"]);
    assert_eq!(report["manufacturing"]["progressPercent"], 100.0);
}

#[test]
fn test_invalid_dates_fail() {
    warranty()
        .args(["status", "--inspection-date", "last week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --inspection-date"));

    warranty()
        .args(["status", "--inspection-date", "2024-01-01", "--now", "13/01/2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --now"));
}

#[test]
fn test_report_file() {
    let dir = tempdir().unwrap();
    let completed = dir.path().join("completed.json");
    fs::write(&completed, r#"{"inspectionDate": "2025-06-01", "status": "completed"}"#).unwrap();

    warranty()
        .args(["report", "--now", "2024-01-01", "--file"])
        .arg(&completed)
        .assert()
        .success()
        .stdout(predicate::str::contains("starts in 517 days"));

    let pending = dir.path().join("pending.json");
    fs::write(&pending, r#"{"inspectionDate": "2024-01-01", "status": "in progress"}"#).unwrap();

    warranty()
        .args(["report", "--file"])
        .arg(&pending)
        .assert()
        .success()
        .stdout(predicate::str::contains("No active warranty"));

    warranty()
        .args(["report", "--json", "--file"])
        .arg(&pending)
        .assert()
        .success()
        .stdout(predicate::str::diff("null\n"));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, r#"{"status": "completed"}"#).unwrap();

    warranty()
        .args(["report", "--file"])
        .arg(&broken)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing inspection date"));
}

#[test]
fn test_init_and_custom_schedule() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("warranty.toml");

    warranty()
        .args(["init", "--out"])
        .arg(&path)
        .assert()
        .success();
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("replacement = 14"));

    warranty()
        .args(["init", "--out"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    fs::write(&path, content.replace("replacement = 14", "replacement = 30")).unwrap();

    warranty()
        .arg("--schedule")
        .arg(&path)
        .arg("periods")
        .assert()
        .success()
        .stdout(predicate::str::contains("replacement"))
        .stdout(predicate::str::contains("30"))
        .stdout(predicate::str::contains("when maintenance1 ends"));

    fs::write(&path, "[durations]\nmanufacturing = 0\n").unwrap();

    warranty()
        .arg("--schedule")
        .arg(&path)
        .args(["status", "--inspection-date", "2024-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load schedule"));
}
