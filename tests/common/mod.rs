//! Common test utilities for quartermaster integration tests.
//!
//! Provides `TestEnv` for isolated project directories that don't pollute
//! the user's real action log.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with an isolated project root.
///
/// The `qm()` method returns a `Command` running in the project directory
/// with the action log redirected into the same temp tree, making tests
/// parallel-safe.
pub struct TestEnv {
    pub project_dir: TempDir,
}

impl TestEnv {
    /// Create a new empty project directory.
    pub fn new() -> Self {
        Self {
            project_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a new project directory and run `qm init` in it.
    pub fn init() -> Self {
        let env = Self::new();
        env.qm().arg("init").assert().success();
        env
    }

    /// Get a Command for the qm binary in this project.
    pub fn qm(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_qm"));
        cmd.current_dir(self.project_dir.path());
        cmd.env(
            "QM_ACTION_LOG_PATH",
            self.project_dir.path().join("test-action.log"),
        );
        cmd
    }

    /// Path to the project root.
    pub fn path(&self) -> &std::path::Path {
        self.project_dir.path()
    }

    /// Path to the managed directory.
    pub fn managed_path(&self) -> std::path::PathBuf {
        self.project_dir.path().join(".quartermaster")
    }

    /// Number of snapshot directories under the backup root.
    pub fn snapshot_count(&self) -> usize {
        match std::fs::read_dir(self.path().join(".quartermaster-backups")) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
