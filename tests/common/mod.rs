//! Common test utilities for tools-cli integration tests.
//!
//! Provides `TestEnv` for isolated test environments that never touch
//! `/etc/cockpit-tools.xml`.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
pub use tempfile::TempDir;

/// A test environment with an isolated tools file.
///
/// The `tools()` method returns a `Command` that sets `COCKPIT_TOOLS_FILE`
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an empty directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the tools-cli binary pointed at this environment.
    pub fn tools(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tools-cli"));
        cmd.current_dir(self.dir.path());
        cmd.env("COCKPIT_TOOLS_FILE", self.store_path());
        cmd.env_remove("COCKPIT_TOOLS_LOG");
        cmd.env_remove("COCKPIT_TOOLS_LOG_JSON");
        cmd
    }

    /// Path of the tools file (may not exist yet).
    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("cockpit-tools.xml")
    }

    /// Overwrite the tools file with raw text.
    pub fn write_raw(&self, raw: &str) {
        std::fs::write(self.store_path(), raw).unwrap();
    }

    /// Read the tools file as text.
    pub fn read_raw(&self) -> String {
        std::fs::read_to_string(self.store_path()).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
