//! The update engine: regenerate managed files without destroying edits.
//!
//! Each target is classified by the scanner and then driven through a small
//! state machine: `missing` files are created, `pristine` files are
//! overwritten with freshly signed content, and `modified` or `legacy` files
//! are skipped unless the caller forces the overwrite. Before the first
//! write of a run, the whole managed directory (plus any existing
//! instruction files among the targets) is snapshotted into a timestamped
//! backup directory. In dry-run mode nothing is written, not even the
//! backup, but every decision is still computed and reported.

use crate::models::{FileStatus, UpdateDecision, UpdateOutcome, UpdateSummary};
use crate::{BACKUP_DIR, MANAGED_DIR, Result, paths, scanner, signature};
use chrono::Utc;
use std::fs;
use std::path::Path;

/// One file the engine should bring up to date.
pub struct UpdateTarget {
    /// Project-relative path
    pub rel_path: String,
    /// Freshly generated, unsigned content
    pub content: String,
}

/// Policy knobs for an update run.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdatePolicy {
    /// Overwrite files classified modified or legacy.
    pub force: bool,
    /// Compute and report decisions without touching the filesystem.
    pub dry_run: bool,
}

/// Result of an update run.
#[derive(Debug, serde::Serialize)]
pub struct UpdateReport {
    pub dry_run: bool,
    /// Relative path of the backup snapshot, when one was taken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
    pub outcomes: Vec<UpdateOutcome>,
    pub summary: UpdateSummary,
}

/// Bring each target up to date under `project_root` according to `policy`.
///
/// A write failure on one target is reported in that target's outcome and
/// does not abort the rest of the run.
pub fn run(project_root: &Path, targets: &[UpdateTarget], policy: UpdatePolicy) -> Result<UpdateReport> {
    let rel_paths: Vec<String> = targets.iter().map(|t| t.rel_path.clone()).collect();
    let scans = scanner::scan(project_root, &rel_paths)?;

    // Decide everything up front; the decisions drive both the backup
    // (only needed if something will be written) and the writes.
    let decisions: Vec<UpdateDecision> = scans
        .iter()
        .map(|scan| decide(scan.status, policy.force))
        .collect();

    let will_write = decisions
        .iter()
        .any(|d| matches!(d, UpdateDecision::Created | UpdateDecision::Updated));

    // Without a managed root there is nothing to snapshot.
    let backup = if will_write && !policy.dry_run && project_root.join(MANAGED_DIR).is_dir() {
        Some(backup_managed_tree(project_root, &rel_paths)?)
    } else {
        None
    };

    let mut outcomes = Vec::with_capacity(targets.len());
    for (target, (scan, decision)) in targets.iter().zip(scans.iter().zip(decisions)) {
        let outcome = match decision {
            UpdateDecision::Skipped => UpdateOutcome {
                rel_path: target.rel_path.clone(),
                decision: UpdateDecision::Skipped,
                reason: Some(skip_reason(scan.status).to_string()),
            },
            decision if policy.dry_run => UpdateOutcome {
                rel_path: target.rel_path.clone(),
                decision,
                reason: None,
            },
            decision => match write_signed(project_root, target) {
                Ok(()) => UpdateOutcome {
                    rel_path: target.rel_path.clone(),
                    decision,
                    reason: None,
                },
                Err(e) => UpdateOutcome {
                    rel_path: target.rel_path.clone(),
                    decision: UpdateDecision::Error,
                    reason: Some(e.to_string()),
                },
            },
        };
        outcomes.push(outcome);
    }

    let summary = UpdateSummary::from_outcomes(&outcomes);
    Ok(UpdateReport {
        dry_run: policy.dry_run,
        backup,
        outcomes,
        summary,
    })
}

/// Map a classification to the action the policy allows.
fn decide(status: FileStatus, force: bool) -> UpdateDecision {
    match status {
        FileStatus::Missing => UpdateDecision::Created,
        FileStatus::Pristine => UpdateDecision::Updated,
        FileStatus::Modified | FileStatus::Legacy => {
            if force {
                UpdateDecision::Updated
            } else {
                UpdateDecision::Skipped
            }
        }
    }
}

fn skip_reason(status: FileStatus) -> &'static str {
    match status {
        FileStatus::Modified => "user customizations detected",
        FileStatus::Legacy => "legacy file, no signature",
        // Skips only arise from the two states above
        FileStatus::Pristine | FileStatus::Missing => "skipped",
    }
}

/// Sign the target content and write it, creating parent directories.
///
/// The write path goes through the link-following guard so a symlinked
/// target pointing outside the project is rejected rather than followed.
fn write_signed(project_root: &Path, target: &UpdateTarget) -> Result<()> {
    let path = paths::resolve_following_links(Path::new(&target.rel_path), project_root)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, signature::sign(&target.content))?;
    Ok(())
}

/// Snapshot the managed directory and any existing root-level targets into
/// `<root>/<BACKUP_DIR>/<timestamp>/`. Returns the snapshot path relative to
/// the project root.
fn backup_managed_tree(project_root: &Path, rel_paths: &[String]) -> Result<String> {
    let stamp = Utc::now().format("%Y%m%d-%H%M%S").to_string();
    let mut snapshot_rel = format!("{BACKUP_DIR}/{stamp}");
    let mut snapshot = paths::resolve(Path::new(&snapshot_rel), project_root)?;
    // Two runs within the same second must not merge their snapshots.
    let mut n = 1;
    while snapshot.exists() {
        n += 1;
        snapshot_rel = format!("{BACKUP_DIR}/{stamp}-{n}");
        snapshot = paths::resolve(Path::new(&snapshot_rel), project_root)?;
    }
    fs::create_dir_all(&snapshot)?;

    let managed = project_root.join(MANAGED_DIR);
    if managed.is_dir() {
        copy_dir_recursive(&managed, &snapshot.join(MANAGED_DIR))?;
    }

    // Targets outside the managed directory (instruction files at the root)
    // are snapshotted individually when they already exist.
    for rel in rel_paths {
        if rel.starts_with(MANAGED_DIR) {
            continue;
        }
        let src = paths::resolve(Path::new(rel), project_root)?;
        if src.is_file() {
            let dest = snapshot.join(rel);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&src, &dest)?;
        }
    }

    Ok(snapshot_rel)
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{sign, verify};
    use crate::test_utils::TestProject;

    fn target(rel: &str, content: &str) -> UpdateTarget {
        UpdateTarget {
            rel_path: rel.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_state_machine_per_classification() {
        let project = TestProject::installed();
        fs::write(project.path().join("CLAUDE.md"), sign("old")).unwrap();
        let modified_content = format!("{}\nmy edit", sign("old"));
        fs::write(project.path().join("AGENTS.md"), &modified_content).unwrap();
        // GEMINI.md missing

        let targets = vec![
            target("CLAUDE.md", "new"),
            target("AGENTS.md", "new"),
            target("GEMINI.md", "new"),
        ];
        let report = run(project.path(), &targets, UpdatePolicy::default()).unwrap();

        let decisions: Vec<UpdateDecision> =
            report.outcomes.iter().map(|o| o.decision).collect();
        assert_eq!(
            decisions,
            vec![
                UpdateDecision::Updated,
                UpdateDecision::Skipped,
                UpdateDecision::Created,
            ]
        );
        assert_eq!(report.summary.updated, 1);
        assert_eq!(report.summary.skipped, 1);
        assert_eq!(report.summary.created, 1);

        // The modified file is byte-identical before and after
        let after = fs::read_to_string(project.path().join("AGENTS.md")).unwrap();
        assert_eq!(after, modified_content);

        // The updated file carries the new content, signed
        let updated = fs::read_to_string(project.path().join("CLAUDE.md")).unwrap();
        assert!(updated.starts_with("new"));
        assert_eq!(verify(&updated), FileStatus::Pristine);
    }

    #[test]
    fn test_skip_reasons() {
        let project = TestProject::installed();
        fs::write(
            project.path().join("CLAUDE.md"),
            format!("{}\nedit", sign("old")),
        )
        .unwrap();
        fs::write(project.path().join("AGENTS.md"), "unsigned").unwrap();

        let targets = vec![target("CLAUDE.md", "new"), target("AGENTS.md", "new")];
        let report = run(project.path(), &targets, UpdatePolicy::default()).unwrap();

        assert_eq!(
            report.outcomes[0].reason.as_deref(),
            Some("user customizations detected")
        );
        assert_eq!(
            report.outcomes[1].reason.as_deref(),
            Some("legacy file, no signature")
        );
    }

    #[test]
    fn test_force_overwrites_modified_and_legacy() {
        let project = TestProject::installed();
        fs::write(
            project.path().join("CLAUDE.md"),
            format!("{}\nedit", sign("old")),
        )
        .unwrap();
        fs::write(project.path().join("AGENTS.md"), "unsigned").unwrap();

        let targets = vec![target("CLAUDE.md", "new"), target("AGENTS.md", "new")];
        let policy = UpdatePolicy {
            force: true,
            dry_run: false,
        };
        let report = run(project.path(), &targets, policy).unwrap();

        assert!(report
            .outcomes
            .iter()
            .all(|o| o.decision == UpdateDecision::Updated));
        let content = fs::read_to_string(project.path().join("AGENTS.md")).unwrap();
        assert_eq!(verify(&content), FileStatus::Pristine);
    }

    #[test]
    fn test_dry_run_mutates_nothing() {
        let project = TestProject::installed();
        fs::write(project.path().join("CLAUDE.md"), sign("old")).unwrap();

        let targets = vec![target("CLAUDE.md", "new"), target("GEMINI.md", "new")];
        let policy = UpdatePolicy {
            force: false,
            dry_run: true,
        };
        let report = run(project.path(), &targets, policy).unwrap();

        // Decisions match what a real run would produce
        assert_eq!(report.outcomes[0].decision, UpdateDecision::Updated);
        assert_eq!(report.outcomes[1].decision, UpdateDecision::Created);
        assert!(report.dry_run);
        assert!(report.backup.is_none());

        // Nothing on disk changed: no new file, no backup directory
        let old = fs::read_to_string(project.path().join("CLAUDE.md")).unwrap();
        assert_eq!(old, sign("old"));
        assert!(!project.path().join("GEMINI.md").exists());
        assert!(!project.path().join(BACKUP_DIR).exists());
    }

    #[test]
    fn test_backup_taken_before_writes() {
        let project = TestProject::installed();
        fs::write(project.path().join("CLAUDE.md"), sign("old")).unwrap();
        fs::write(
            project.managed_path().join("backlog/TASK-001-x.md"),
            "task",
        )
        .unwrap();

        let targets = vec![target("CLAUDE.md", "new")];
        let report = run(project.path(), &targets, UpdatePolicy::default()).unwrap();

        let backup_rel = report.backup.expect("backup should be taken");
        let backup = project.path().join(&backup_rel);
        // Snapshot holds both the managed tree and the old instruction file
        assert!(backup.join(MANAGED_DIR).join("backlog/TASK-001-x.md").exists());
        let snapshot_claude = fs::read_to_string(backup.join("CLAUDE.md")).unwrap();
        assert_eq!(snapshot_claude, sign("old"));
    }

    #[test]
    fn test_create_only_run_takes_backup() {
        let project = TestProject::installed();
        fs::write(
            project.managed_path().join("backlog/TASK-001-x.md"),
            "task",
        )
        .unwrap();

        // Nothing exists to overwrite, only a new file to create
        let targets = vec![target("GEMINI.md", "new")];
        let report = run(project.path(), &targets, UpdatePolicy::default()).unwrap();

        assert_eq!(report.summary.created, 1);
        let backup_rel = report.backup.expect("creation counts as a write");
        let backup = project.path().join(&backup_rel);
        assert!(backup.join(MANAGED_DIR).join("backlog/TASK-001-x.md").exists());
    }

    #[test]
    fn test_no_backup_when_all_skipped() {
        let project = TestProject::installed();
        fs::write(project.path().join("CLAUDE.md"), "legacy, unsigned").unwrap();

        let targets = vec![target("CLAUDE.md", "new")];
        let report = run(project.path(), &targets, UpdatePolicy::default()).unwrap();

        assert_eq!(report.summary.skipped, 1);
        assert!(report.backup.is_none());
        assert!(!project.path().join(BACKUP_DIR).exists());
    }

    #[test]
    fn test_write_failure_does_not_abort_batch() {
        let project = TestProject::installed();

        // A target whose parent is an existing file cannot be created
        fs::write(project.path().join("blocker"), "").unwrap();
        let targets = vec![
            target("blocker/impossible.md", "new"),
            target("CLAUDE.md", "new"),
        ];
        let report = run(project.path(), &targets, UpdatePolicy::default()).unwrap();

        assert_eq!(report.outcomes[0].decision, UpdateDecision::Error);
        assert!(report.outcomes[0].reason.is_some());
        assert_eq!(report.outcomes[1].decision, UpdateDecision::Created);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.created, 1);
    }
}
