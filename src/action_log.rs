//! Action logging for Quartermaster commands.
//!
//! Every CLI invocation appends one JSONL record to a log file outside the
//! project, which makes it possible to reconstruct what the tool did to a
//! project and when. Logging is best-effort: failures are reported as
//! warnings on stderr and never fail the command itself.
//!
//! Environment:
//! - `QM_ACTION_LOG=0` disables logging entirely
//! - `QM_ACTION_LOG_PATH` overrides the default log location

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A single logged command invocation.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionRecord {
    /// When the command ran
    pub timestamp: DateTime<Utc>,

    /// Project root the command operated on
    pub root: String,

    /// Command name (e.g., "update", "task init")
    pub command: String,

    /// Raw command-line arguments
    pub args: Vec<String>,

    /// Whether the command succeeded
    pub success: bool,

    /// Error message if the command failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution duration in milliseconds
    pub duration_ms: u64,
}

/// Append a record for one command run. Never fails the caller.
pub fn log_action(
    root: &Path,
    command: &str,
    args: Vec<String>,
    success: bool,
    error: Option<String>,
    duration_ms: u64,
) {
    if !enabled() {
        return;
    }
    let Some(path) = log_path() else {
        return;
    };

    let record = ActionRecord {
        timestamp: Utc::now(),
        root: root.to_string_lossy().to_string(),
        command: command.to_string(),
        args,
        success,
        error,
        duration_ms,
    };

    if let Err(e) = append_record(&path, &record) {
        eprintln!("Warning: failed to write action log: {e}");
    }
}

fn enabled() -> bool {
    match std::env::var("QM_ACTION_LOG") {
        Ok(value) => !matches!(value.as_str(), "0" | "false" | "no"),
        Err(_) => true,
    }
}

/// Log location: `QM_ACTION_LOG_PATH`, else the XDG data directory.
fn log_path() -> Option<PathBuf> {
    if let Ok(custom) = std::env::var("QM_ACTION_LOG_PATH") {
        return Some(PathBuf::from(custom));
    }
    dirs::data_local_dir().map(|dir| dir.join("quartermaster").join("action.log"))
}

fn append_record(path: &Path, record: &ActionRecord) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string(record)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{json}")?;
    Ok(())
}
