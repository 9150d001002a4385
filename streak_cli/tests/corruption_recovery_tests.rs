//! Corruption recovery tests for streakline.
//!
//! These tests verify the system can handle:
//! - Corrupted activity log lines
//! - Partial writes at the end of the log
//! - Malformed archive rows
//! - Missing files

use assert_cmd::Command;
use std::fs;
use std::io::Write as IoWrite;
use tempfile::TempDir;

const NOW: &str = "2024-03-14T20:00:00Z";

fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("streakline"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.path().join("config"));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn streak_json(temp_dir: &TempDir) -> serde_json::Value {
    let output = cli(temp_dir)
        .args(["streak", "--json", "--now", NOW])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to run CLI");
    assert!(output.status.success(), "CLI failed: {:?}", output);
    serde_json::from_slice(&output.stdout).expect("Output is not JSON")
}

#[test]
fn test_corrupted_log_lines_ignored_during_read() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("activity.jsonl");

    fs::write(&log_path, "{ invalid json }}}}\nnot even close\n\n").unwrap();

    cli(&temp_dir)
        .args(["log", "--routine", "Row", "--at", "2024-03-14T07:00:00Z", "--now", NOW])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    let streak = streak_json(&temp_dir);
    assert_eq!(streak["current"], 1);
    assert_eq!(streak["last_activity_date"], "2024-03-14");
}

#[test]
fn test_partial_write_at_end_of_log() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("activity.jsonl");

    cli(&temp_dir)
        .args(["log", "--routine", "Bike", "--at", "2024-03-13T07:00:00Z", "--now", NOW])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    // Simulate a crash mid-append
    let mut file = fs::OpenOptions::new().append(true).open(&log_path).unwrap();
    write!(file, "{{\"type\":\"workout\",\"id\":\"0b7c").unwrap();
    drop(file);

    let streak = streak_json(&temp_dir);
    assert_eq!(streak["current"], 1);
    assert_eq!(streak["last_activity_date"], "2024-03-13");
}

#[test]
fn test_unknown_entry_type_skipped() {
    let temp_dir = setup_test_dir();
    let log_path = temp_dir.path().join("activity.jsonl");

    fs::write(
        &log_path,
        "{\"type\":\"meditation\",\"id\":\"6f1c1d3e-8a43-4f0e-9d55-3c0b0a1e2f10\"}\n",
    )
    .unwrap();

    let streak = streak_json(&temp_dir);
    assert_eq!(streak["current"], 0);
    assert!(streak["last_activity_date"].is_null());
}

#[test]
fn test_archive_bad_rows_skipped() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("archive.csv");

    fs::write(
        &archive_path,
        "id,routine_name,performed_at,calories_burned,total_reps,duration_minutes,intensity\n\
         2d8f5c1a-0c5e-4b7e-a6f1-6c1f0d5a9e01,Run,2024-03-12T07:00:00Z,250,0,30,6\n\
         not-a-uuid,Run,2024-03-11T07:00:00Z,250,0,30,6\n\
         9a4e2b7c-3d1f-4c8a-b5e6-7f0a1b2c3d04,Run,someday,250,0,30,6\n\
         5c3b1a9d-7e2f-4d6a-8b0c-1e2f3a4b5c06,Swim,2024-03-13,180,0,40,\n",
    )
    .unwrap();

    let streak = streak_json(&temp_dir);
    assert_eq!(streak["current"], 2);
    assert_eq!(streak["longest"], 2);
    assert_eq!(streak["last_activity_date"], "2024-03-13");
}

#[test]
fn test_archive_and_log_combine() {
    let temp_dir = setup_test_dir();

    fs::write(
        temp_dir.path().join("archive.csv"),
        "id,routine_name,performed_at,calories_burned,total_reps,duration_minutes,intensity\n\
         2d8f5c1a-0c5e-4b7e-a6f1-6c1f0d5a9e01,Run,1710230400000,250,0,30,6\n",
    )
    .unwrap();

    cli(&temp_dir)
        .args(["log", "--routine", "Row", "--at", "2024-03-13T07:00:00Z", "--now", NOW])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    // 1710230400000 is 2024-03-12T08:00:00Z
    let streak = streak_json(&temp_dir);
    assert_eq!(streak["current"], 2);
}

#[test]
fn test_missing_data_dir_reports_empty() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["report", "--json", "--now", NOW])
        .arg("--data-dir")
        .arg(temp_dir.path().join("does/not/exist"))
        .assert()
        .success();
}
