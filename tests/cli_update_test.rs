//! Integration tests for `qm update` via the CLI.
//!
//! These tests verify the protect-user-edits policy end to end: pristine
//! files are refreshed, edited files are skipped (unless forced), dry-run
//! writes nothing, and a backup snapshot is taken before real writes.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_update_requires_init() {
    let env = TestEnv::new();

    env.qm()
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not initialized"));
}

#[test]
fn test_update_refreshes_pristine_files() {
    let env = TestEnv::init();

    env.qm()
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"updated\""));
}

#[test]
fn test_update_skips_edited_file_and_reports_reason() {
    let env = TestEnv::init();

    let claude_path = env.path().join("CLAUDE.md");
    let edited = format!(
        "{}\n- Always run the linter.",
        fs::read_to_string(&claude_path).unwrap()
    );
    fs::write(&claude_path, &edited).unwrap();

    env.qm()
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("user customizations detected"));

    // Byte-identical before and after
    assert_eq!(fs::read_to_string(&claude_path).unwrap(), edited);
}

#[test]
fn test_update_skips_legacy_file() {
    let env = TestEnv::init();

    fs::write(env.path().join("CLAUDE.md"), "hand-written, never signed").unwrap();

    env.qm()
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("legacy file, no signature"));
}

#[test]
fn test_update_force_overwrites_edits() {
    let env = TestEnv::init();

    let claude_path = env.path().join("CLAUDE.md");
    fs::write(&claude_path, "hand-written").unwrap();

    env.qm().args(["update", "--force"]).assert().success();

    let after = fs::read_to_string(&claude_path).unwrap();
    assert!(after.contains("<!-- qm-signature: "));
    assert!(!after.contains("hand-written"));
}

#[test]
fn test_update_dry_run_writes_nothing() {
    let env = TestEnv::init();

    let claude_path = env.path().join("CLAUDE.md");
    let before = fs::read_to_string(&claude_path).unwrap();
    let snapshots_before = env.snapshot_count();

    env.qm()
        .args(["update", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"dry_run\": true"));

    assert_eq!(fs::read_to_string(&claude_path).unwrap(), before);
    // No new snapshot beyond what init itself took
    assert_eq!(env.snapshot_count(), snapshots_before);
}

#[test]
fn test_update_dry_run_human_output_is_prefixed() {
    let env = TestEnv::init();

    env.qm()
        .args(["update", "--dry-run", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run] "));
}

#[test]
fn test_update_takes_backup_before_writing() {
    let env = TestEnv::init();
    let snapshots_before = env.snapshot_count();

    env.qm().arg("update").assert().success();

    assert_eq!(env.snapshot_count(), snapshots_before + 1);
}

#[test]
fn test_init_snapshots_before_creating_files() {
    let env = TestEnv::init();

    // init writes new files, so it takes a snapshot of its own
    assert_eq!(env.snapshot_count(), 1);
}

#[test]
fn test_update_with_missing_backlog_still_processes_other_files() {
    let env = TestEnv::init();
    fs::remove_dir_all(env.managed_path().join("backlog")).unwrap();

    env.qm()
        .arg("update")
        .assert()
        .failure()
        .stdout(predicate::str::contains("backlog directory missing"))
        .stdout(predicate::str::contains("\"updated\""));
}

#[test]
fn test_update_regenerates_index_with_tasks_intact() {
    let env = TestEnv::init();

    env.qm()
        .args(["task", "init", "feature", "Survives updates"])
        .assert()
        .success();
    env.qm().arg("update").assert().success();

    let index = fs::read_to_string(env.managed_path().join("backlog.md")).unwrap();
    assert!(index.contains("Survives updates"));
}
