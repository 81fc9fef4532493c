//! Quartermaster - scaffolding and upkeep for AI-assistant project files.
//!
//! This library provides the core functionality for the `qm` CLI tool:
//! generating instruction files for AI coding assistants, keeping them up to
//! date without destroying user edits, and managing a lightweight task
//! backlog inside the project.

pub mod action_log;
pub mod cli;
pub mod commands;
pub mod doctor;
pub mod models;
pub mod paths;
pub mod scanner;
pub mod signature;
pub mod tasks;
pub mod templates;
pub mod update;

use std::path::PathBuf;

/// Name of the managed directory created inside a project root.
pub const MANAGED_DIR: &str = ".quartermaster";

/// Name of the sibling directory holding pre-update snapshots.
pub const BACKUP_DIR: &str = ".quartermaster-backups";

/// Subdirectories that must exist under the managed directory.
pub const REQUIRED_SUBDIRS: [&str; 4] = ["backlog", "completed", "docs", "scripts"];

/// Maintenance scripts installed under the managed directory.
/// Paths are relative to the managed directory.
pub const MAINTENANCE_SCRIPTS: [&str; 2] = ["scripts/backup.sh", "scripts/archive-task.sh"];

/// Library-level error type for Quartermaster operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Security violation: path escapes project root: {}", .0.display())]
    SecurityViolation(PathBuf),

    #[error("Not initialized: run `qm init` first")]
    NotInitialized,

    #[error("Could not allocate a unique task id after {0} attempts")]
    TaskIdExhausted(u32),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Quartermaster operations.
pub type Result<T> = std::result::Result<T, Error>;
