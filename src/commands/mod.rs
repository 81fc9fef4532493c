//! Command implementations for the Quartermaster CLI.
//!
//! Each function here orchestrates one CLI operation and returns a
//! serializable report struct. The binary decides how to print it (JSON by
//! default, human-readable with `-H`) and what exit code to use.

use crate::models::{Assistant, CheckResult, TaskType, UpdateDecision, UpdateOutcome, UpdateSummary};
use crate::update::{UpdatePolicy, UpdateReport, UpdateTarget};
use crate::{
    Error, MAINTENANCE_SCRIPTS, MANAGED_DIR, REQUIRED_SUBDIRS, Result, doctor, tasks, templates,
    update,
};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Human-readable rendering for a command report.
pub trait Render {
    fn human(&self) -> String;
}

/// Print a report as JSON (default) or human text.
pub fn output<T: Serialize + Render>(report: &T, human: bool) {
    if human {
        println!("{}", report.human());
    } else {
        // Reports are plain data; serialization only fails on bugs.
        match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error: could not serialize report: {e}"),
        }
    }
}

/// Report of an `init` run.
#[derive(Debug, Serialize)]
pub struct InitReport {
    pub root: String,
    pub assistants: Vec<Assistant>,
    #[serde(flatten)]
    pub update: UpdateReport,
}

impl Render for InitReport {
    fn human(&self) -> String {
        format!(
            "Initialized {MANAGED_DIR}/ in {}\n{}",
            self.root,
            render_outcomes(&self.update)
        )
    }
}

/// Create the managed tree and generate the managed files.
///
/// Safe to re-run: directories are created if absent, and existing files go
/// through the same protect-user-edits policy as `update`.
pub fn init(project_root: &Path, assistants: &[Assistant], force: bool) -> Result<InitReport> {
    let assistants: Vec<Assistant> = if assistants.is_empty() {
        vec![Assistant::Claude, Assistant::Agents]
    } else {
        assistants.to_vec()
    };

    install_tree(project_root)?;

    let mut targets: Vec<UpdateTarget> = assistants
        .iter()
        .map(|assistant| UpdateTarget {
            rel_path: assistant.file_name().to_string(),
            content: templates::instruction_body(*assistant),
        })
        .collect();
    targets.push(backlog_index_target(project_root)?);

    let policy = UpdatePolicy {
        force,
        dry_run: false,
    };
    let report = update::run(project_root, &targets, policy)?;

    Ok(InitReport {
        root: project_root.display().to_string(),
        assistants,
        update: report,
    })
}

/// Create the managed directory skeleton and install maintenance scripts.
fn install_tree(project_root: &Path) -> Result<()> {
    let managed = project_root.join(MANAGED_DIR);
    for sub in REQUIRED_SUBDIRS {
        fs::create_dir_all(managed.join(sub))?;
    }

    let scripts = [
        (MAINTENANCE_SCRIPTS[0], templates::BACKUP_SCRIPT),
        (MAINTENANCE_SCRIPTS[1], templates::ARCHIVE_TASK_SCRIPT),
    ];
    for (rel, source) in scripts {
        let path = managed.join(rel);
        // Scripts are plain collaborators, not managed files; only write
        // them when absent so local tweaks survive.
        if !path.exists() {
            fs::write(&path, source)?;
            set_executable(&path)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

impl Render for UpdateReport {
    fn human(&self) -> String {
        render_outcomes(self)
    }
}

/// Regenerate the managed files that are present in the project.
///
/// Instruction files that were never installed are left alone; the backlog
/// index is always a target since it is rebuilt from the backlog directory.
pub fn update(project_root: &Path, force: bool, dry_run: bool) -> Result<UpdateReport> {
    if !project_root.join(MANAGED_DIR).is_dir() {
        return Err(Error::NotInitialized);
    }

    let mut targets = Vec::new();
    for assistant in Assistant::ALL {
        if project_root.join(assistant.file_name()).exists() {
            targets.push(UpdateTarget {
                rel_path: assistant.file_name().to_string(),
                content: templates::instruction_body(assistant),
            });
        }
    }
    // A deleted backlog directory must not take the instruction files down
    // with it; the index target degrades to a per-file error instead.
    let index_error = match backlog_index_target(project_root) {
        Ok(target) => {
            targets.push(target);
            None
        }
        Err(Error::NotInitialized) => Some(UpdateOutcome {
            rel_path: format!("{MANAGED_DIR}/backlog.md"),
            decision: UpdateDecision::Error,
            reason: Some(format!("backlog directory missing: {MANAGED_DIR}/backlog")),
        }),
        Err(e) => return Err(e),
    };

    let mut report = update::run(project_root, &targets, UpdatePolicy { force, dry_run })?;
    if let Some(outcome) = index_error {
        report.outcomes.push(outcome);
        report.summary = UpdateSummary::from_outcomes(&report.outcomes);
    }
    Ok(report)
}

fn backlog_index_target(project_root: &Path) -> Result<UpdateTarget> {
    let entries = tasks::list_backlog(project_root)?;
    Ok(UpdateTarget {
        rel_path: format!("{MANAGED_DIR}/backlog.md"),
        content: templates::backlog_index_body(&entries),
    })
}

fn render_outcomes(report: &UpdateReport) -> String {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let mut lines: Vec<String> = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.reason {
            Some(reason) => format!("{prefix}{}: {} ({reason})", outcome.decision, outcome.rel_path),
            None => format!("{prefix}{}: {}", outcome.decision, outcome.rel_path),
        })
        .collect();
    lines.push(format!(
        "{prefix}{} created, {} updated, {} skipped, {} error(s)",
        report.summary.created, report.summary.updated, report.summary.skipped, report.summary.errors,
    ));
    lines.join("\n")
}

/// Report of a `doctor` run.
#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
    /// False when any check failed
    pub ok: bool,
}

impl Render for DoctorReport {
    fn human(&self) -> String {
        let mut lines: Vec<String> = self
            .checks
            .iter()
            .map(|check| {
                let tag = match check.status {
                    crate::models::CheckStatus::Pass => "ok",
                    crate::models::CheckStatus::Warn => "warn",
                    crate::models::CheckStatus::Fail => "FAIL",
                };
                format!("[{tag}] {}: {}", check.name, check.message)
            })
            .collect();
        lines.push(if self.ok {
            "No failures detected.".to_string()
        } else {
            "Problems found; see failures above.".to_string()
        });
        lines.join("\n")
    }
}

/// Run all health checks. Never returns an error; problems are records.
pub fn doctor(project_root: &Path) -> DoctorReport {
    let checks = doctor::diagnose(project_root);
    let ok = !doctor::has_failures(&checks);
    DoctorReport { checks, ok }
}

/// Report of a `task init` run.
#[derive(Debug, Serialize)]
pub struct TaskInitReport {
    pub id: String,
    pub title: String,
    pub task_type: TaskType,
    pub rel_path: String,
}

impl Render for TaskInitReport {
    fn human(&self) -> String {
        format!("Created {} \"{}\" at {}", self.id, self.title, self.rel_path)
    }
}

/// Allocate a task id, write the task record, refresh the backlog index.
pub fn task_init(project_root: &Path, task_type: TaskType, title: &str) -> Result<TaskInitReport> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidInput("task title must not be empty".to_string()));
    }

    let task = tasks::create_task(project_root, task_type, title)?;
    Ok(TaskInitReport {
        id: task.id,
        title: title.to_string(),
        task_type,
        rel_path: task.rel_path,
    })
}

/// True when an update report should produce a non-zero exit code.
pub fn update_failed(report: &UpdateReport) -> bool {
    report
        .outcomes
        .iter()
        .any(|o| o.decision == UpdateDecision::Error)
}
