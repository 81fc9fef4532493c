//! CLI argument definitions for Quartermaster.

use crate::models::{Assistant, TaskType};
use clap::{Parser, Subcommand};

/// Quartermaster - scaffolding and upkeep for AI-assistant project files.
///
/// Run `qm init` once per project, then `qm update` after upgrading the tool
/// and `qm doctor` to check the managed tree's health.
#[derive(Parser, Debug)]
#[command(name = "qm")]
#[command(author, version, about = "Scaffold and maintain AI assistant instruction files and a task backlog", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Run as if qm was started in <path> instead of the current directory.
    /// Can also be set via the QM_REPO environment variable.
    #[arg(short = 'C', long = "repo", global = true, env = "QM_REPO")]
    pub repo_path: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the managed directory and instruction files
    Init {
        /// Assistants to generate instruction files for (default: claude, agents)
        #[arg(short, long = "assistant", value_enum)]
        assistants: Vec<Assistant>,

        /// Overwrite existing files even if they carry user edits
        #[arg(long)]
        force: bool,
    },

    /// Regenerate managed files, preserving user edits
    Update {
        /// Overwrite files even if they were edited or carry no signature
        #[arg(long)]
        force: bool,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Health check for the managed directory
    Doctor,

    /// Task backlog commands
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a new task record in the backlog
    Init {
        /// Task category
        #[arg(value_enum)]
        task_type: TaskType,

        /// Task title
        title: String,
    },
}
