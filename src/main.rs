//! Quartermaster CLI - scaffolding and upkeep for AI-assistant project files.

use clap::Parser;
use quartermaster::cli::{Cli, Commands, TaskCommands};
use quartermaster::commands::{self, output};
use quartermaster::action_log;
use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    let root = resolve_project_root(cli.repo_path, human);
    let (command_name, raw_args) = describe_command(&cli.command);

    let start = Instant::now();
    let result = run_command(cli.command, &root, human);
    let duration = start.elapsed().as_millis() as u64;

    let (success, error) = match &result {
        Ok(exit) => (*exit == 0, None),
        Err(e) => (false, Some(e.to_string())),
    };
    action_log::log_action(&root, &command_name, raw_args, success, error, duration);

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            if human {
                eprintln!("Error: {e}");
            } else {
                eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
            }
            process::exit(1);
        }
    }
}

/// Resolve the project root: --repo flag (or QM_REPO) wins, else the current
/// working directory. An explicit path must exist.
fn resolve_project_root(explicit_path: Option<PathBuf>, human: bool) -> PathBuf {
    match explicit_path {
        Some(path) => {
            if !path.exists() {
                if human {
                    eprintln!("Error: specified repo path does not exist: {}", path.display());
                } else {
                    eprintln!(
                        "{}",
                        serde_json::json!({
                            "error": format!("specified repo path does not exist: {}", path.display())
                        })
                    );
                }
                process::exit(1);
            }
            path
        }
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Name and raw arguments of the command, for the action log.
fn describe_command(command: &Commands) -> (String, Vec<String>) {
    let name = match command {
        Commands::Init { .. } => "init",
        Commands::Update { .. } => "update",
        Commands::Doctor => "doctor",
        Commands::Task {
            command: TaskCommands::Init { .. },
        } => "task init",
    };
    let args = env::args().skip(1).collect();
    (name.to_string(), args)
}

/// Execute the command and return the process exit code.
fn run_command(
    command: Commands,
    root: &std::path::Path,
    human: bool,
) -> Result<i32, quartermaster::Error> {
    match command {
        Commands::Init { assistants, force } => {
            let report = commands::init(root, &assistants, force)?;
            output(&report, human);
            Ok(if commands::update_failed(&report.update) {
                1
            } else {
                0
            })
        }

        Commands::Update { force, dry_run } => {
            let report = commands::update(root, force, dry_run)?;
            output(&report, human);
            Ok(if commands::update_failed(&report) { 1 } else { 0 })
        }

        Commands::Doctor => {
            let report = commands::doctor(root);
            output(&report, human);
            Ok(if report.ok { 0 } else { 1 })
        }

        Commands::Task {
            command: TaskCommands::Init { task_type, title },
        } => {
            let report = commands::task_init(root, task_type, &title)?;
            output(&report, human);
            Ok(0)
        }
    }
}
