//! Integration tests for `qm doctor` via the CLI.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_doctor_fails_without_init() {
    let env = TestEnv::new();

    env.qm()
        .arg("doctor")
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"fail\""))
        .stdout(predicate::str::contains("qm init"));
}

#[test]
fn test_doctor_passes_after_init() {
    let env = TestEnv::init();

    env.qm()
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ok\": true"));
}

#[test]
fn test_doctor_warns_on_missing_subdirectory() {
    let env = TestEnv::init();
    fs::remove_dir_all(env.managed_path().join("docs")).unwrap();

    env.qm()
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"warn\""))
        .stdout(predicate::str::contains("docs"));
}

#[test]
fn test_doctor_notes_user_customizations() {
    let env = TestEnv::init();

    let claude_path = env.path().join("CLAUDE.md");
    let edited = format!("{}\nextra", fs::read_to_string(&claude_path).unwrap());
    fs::write(&claude_path, edited).unwrap();

    env.qm()
        .args(["doctor", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user customizations"));
}

#[test]
fn test_doctor_warns_on_legacy_file() {
    let env = TestEnv::init();
    fs::write(env.path().join("CLAUDE.md"), "no signature here").unwrap();

    env.qm()
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("no signature"));
}

#[test]
#[cfg(unix)]
fn test_doctor_fails_on_non_executable_script() {
    use std::os::unix::fs::PermissionsExt;

    let env = TestEnv::init();
    let script = env.managed_path().join("scripts/backup.sh");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();

    env.qm()
        .arg("doctor")
        .assert()
        .failure()
        .stdout(predicate::str::contains("not executable"));
}
