//! Data models for Quartermaster.
//!
//! This module defines the core data structures:
//! - `FileStatus` - edit status of a managed file relative to its signature
//! - `ScanResult` - per-file classification produced by the scanner
//! - `CheckResult` - one doctor check outcome
//! - `UpdateOutcome` / `UpdateSummary` - per-file and aggregate update results
//! - `Assistant` - the AI assistants we generate instruction files for
//! - `TaskType` - category tag embedded in task record filenames

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Edit status of a managed file relative to its embedded signature.
///
/// Every consumer must handle all four cases; there is deliberately no
/// catch-all variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Signature present and matches the content.
    Pristine,
    /// Signature present but the content has been edited since signing.
    Modified,
    /// No parseable signature; the file predates signing or was hand-written.
    Legacy,
    /// The file does not exist (or its path was rejected).
    Missing,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileStatus::Pristine => "pristine",
            FileStatus::Modified => "modified",
            FileStatus::Legacy => "legacy",
            FileStatus::Missing => "missing",
        };
        write!(f, "{}", s)
    }
}

/// Classification of one scanned file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Absolute path of the scanned file
    pub path: PathBuf,

    /// Path relative to the project root, as given in the target list
    pub rel_path: String,

    /// Classification of the file content
    pub status: FileStatus,
}

/// Status of a single doctor check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Outcome of one doctor check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Stable machine-readable identifier (e.g., "structure.root")
    pub id: String,

    /// Human-readable check name
    pub name: String,

    /// Check status
    pub status: CheckStatus,

    /// Explanation of the status
    pub message: String,
}

impl CheckResult {
    pub fn pass(id: &str, name: &str, message: impl Into<String>) -> Self {
        Self::new(id, name, CheckStatus::Pass, message)
    }

    pub fn warn(id: &str, name: &str, message: impl Into<String>) -> Self {
        Self::new(id, name, CheckStatus::Warn, message)
    }

    pub fn fail(id: &str, name: &str, message: impl Into<String>) -> Self {
        Self::new(id, name, CheckStatus::Fail, message)
    }

    fn new(id: &str, name: &str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            status,
            message: message.into(),
        }
    }
}

/// Per-file verdict of an update run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateDecision {
    Created,
    Updated,
    Skipped,
    Error,
}

impl fmt::Display for UpdateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpdateDecision::Created => "created",
            UpdateDecision::Updated => "updated",
            UpdateDecision::Skipped => "skipped",
            UpdateDecision::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Result of processing one update target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOutcome {
    /// Path relative to the project root
    pub rel_path: String,

    /// What the engine did (or declined to do)
    pub decision: UpdateDecision,

    /// Why, for skipped and errored targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Aggregate counts for an update run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl UpdateSummary {
    /// Tally outcomes into a summary.
    pub fn from_outcomes(outcomes: &[UpdateOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome.decision {
                UpdateDecision::Created => summary.created += 1,
                UpdateDecision::Updated => summary.updated += 1,
                UpdateDecision::Skipped => summary.skipped += 1,
                UpdateDecision::Error => summary.errors += 1,
            }
        }
        summary
    }
}

/// AI assistants we maintain instruction files for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Assistant {
    Claude,
    Agents,
    Gemini,
}

impl Assistant {
    /// All known assistants, in scan order.
    pub const ALL: [Assistant; 3] = [Assistant::Claude, Assistant::Agents, Assistant::Gemini];

    /// Project-relative filename of this assistant's instruction file.
    pub fn file_name(&self) -> &'static str {
        match self {
            Assistant::Claude => "CLAUDE.md",
            Assistant::Agents => "AGENTS.md",
            Assistant::Gemini => "GEMINI.md",
        }
    }

    /// Display name used inside generated content.
    pub fn display_name(&self) -> &'static str {
        match self {
            Assistant::Claude => "Claude Code",
            Assistant::Agents => "generic coding agents",
            Assistant::Gemini => "Gemini",
        }
    }
}

/// Category tag for a task record, embedded in its filename and header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Feature,
    Bug,
    Chore,
    Spike,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Feature => "feature",
            TaskType::Bug => "bug",
            TaskType::Chore => "chore",
            TaskType::Spike => "spike",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
