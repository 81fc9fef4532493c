//! Health checks for a project's managed directory.
//!
//! `diagnose` runs three independent check groups in a fixed order:
//! structure (is the managed tree present and complete), permissions (are
//! the maintenance scripts executable), and integrity (do the managed files
//! match their signatures). It reports, it never repairs, and it never
//! fails as a whole: a missing managed root degrades the structure check
//! while the remaining checks still run.

use crate::models::{CheckResult, CheckStatus, FileStatus};
use crate::{MAINTENANCE_SCRIPTS, MANAGED_DIR, REQUIRED_SUBDIRS, scanner};
use std::path::Path;

/// Run all checks against `project_root` and collect their records.
pub fn diagnose(project_root: &Path) -> Vec<CheckResult> {
    let mut checks = Vec::new();
    checks.extend(check_structure(project_root));
    checks.extend(check_permissions(project_root));
    checks.push(check_integrity(project_root));
    checks
}

/// True when any check in the report failed.
pub fn has_failures(checks: &[CheckResult]) -> bool {
    checks.iter().any(|c| c.status == CheckStatus::Fail)
}

/// Managed root exists, and every required subdirectory is present.
fn check_structure(project_root: &Path) -> Vec<CheckResult> {
    let managed = project_root.join(MANAGED_DIR);
    if !managed.is_dir() {
        return vec![CheckResult::fail(
            "structure.root",
            "managed directory",
            format!("{MANAGED_DIR}/ not found; run `qm init` to create it"),
        )];
    }

    let missing: Vec<&str> = REQUIRED_SUBDIRS
        .iter()
        .copied()
        .filter(|sub| !managed.join(sub).is_dir())
        .collect();

    let record = if missing.is_empty() {
        CheckResult::pass(
            "structure.subdirs",
            "required subdirectories",
            "all required subdirectories present",
        )
    } else {
        // Missing subdirectories are recoverable (qm init restores them), so
        // this is a warning rather than a failure.
        CheckResult::warn(
            "structure.subdirs",
            "required subdirectories",
            format!("missing: {}", missing.join(", ")),
        )
    };

    vec![
        CheckResult::pass(
            "structure.root",
            "managed directory",
            format!("{MANAGED_DIR}/ present"),
        ),
        record,
    ]
}

/// Maintenance scripts that exist must carry the execute bit.
///
/// Scripts that do not exist produce no record; they are optional.
#[cfg(unix)]
fn check_permissions(project_root: &Path) -> Vec<CheckResult> {
    use std::os::unix::fs::PermissionsExt;

    let managed = project_root.join(MANAGED_DIR);
    let mut records = Vec::new();
    for script in MAINTENANCE_SCRIPTS {
        let path = managed.join(script);
        let Ok(meta) = std::fs::metadata(&path) else {
            continue;
        };
        let executable = meta.permissions().mode() & 0o111 != 0;
        let id = format!("permissions.{script}");
        if executable {
            records.push(CheckResult::pass(&id, script, "executable"));
        } else {
            records.push(CheckResult::fail(
                &id,
                script,
                format!("not executable; run `chmod +x {MANAGED_DIR}/{script}`"),
            ));
        }
    }
    records
}

/// No POSIX execute bit to check on this platform.
#[cfg(not(unix))]
fn check_permissions(_project_root: &Path) -> Vec<CheckResult> {
    vec![CheckResult::pass(
        "permissions",
        "script permissions",
        "skipped: not applicable on this platform",
    )]
}

/// Managed files match their embedded signatures.
fn check_integrity(project_root: &Path) -> CheckResult {
    let results = match scanner::scan_default(project_root) {
        Ok(results) => results,
        Err(e) => {
            return CheckResult::warn(
                "integrity.signatures",
                "file signatures",
                format!("scan incomplete: {e}"),
            );
        }
    };

    let legacy = results
        .iter()
        .filter(|r| r.status == FileStatus::Legacy)
        .count();
    let modified = results
        .iter()
        .filter(|r| r.status == FileStatus::Modified)
        .count();

    if legacy > 0 {
        CheckResult::warn(
            "integrity.signatures",
            "file signatures",
            format!("{legacy} file(s) have no signature; run `qm update` to adopt them"),
        )
    } else if modified > 0 {
        // User customizations are an expected, healthy state.
        CheckResult::pass(
            "integrity.signatures",
            "file signatures",
            format!("{modified} file(s) carry user customizations"),
        )
    } else {
        CheckResult::pass(
            "integrity.signatures",
            "file signatures",
            "all signatures match",
        )
    }
}
