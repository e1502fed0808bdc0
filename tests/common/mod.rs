//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Run the lockmend binary with the given arguments
    pub fn run_lockmend(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_lockmend"));
        cmd.current_dir(self.path());
        for arg in args {
            cmd.arg(arg);
        }
        cmd.output().expect("Failed to execute lockmend")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample manifest requesting `no-deps@*`
#[allow(dead_code)]
pub const SAMPLE_MANIFEST: &str = r#"
[project]
name = "test-project"
version = "1.0.0"

[dependencies]
no-deps = "*"
"#;

/// A clean current-schema lockfile pinning `no-deps` to 1.0.0
#[allow(dead_code)]
pub const CLEAN_LOCKFILE: &str = r#"# This file is generated by lockmend. Do not edit by hand.

[meta]
schema = 2

[[package]]
requests = ["no-deps@*"]
version = "1.0.0"
source = "https://registry.example/no-deps/no-deps-1.0.0.tar.gz"
checksum = "sha256:8d556c1e3e6c953ea16689c506073d5f"
"#;

/// The same lockfile after a merge where one branch picked 1.0.0 and the
/// other 2.0.0
#[allow(dead_code)]
pub const CONFLICTED_LOCKFILE: &str = r#"# This file is generated by lockmend. Do not edit by hand.

[meta]
schema = 2

<<<<<<< HEAD
[[package]]
requests = ["no-deps@*"]
version = "1.0.0"
source = "https://registry.example/no-deps/no-deps-1.0.0.tar.gz"
checksum = "sha256:8d556c1e3e6c953ea16689c506073d5f"
=======
[[package]]
requests = ["no-deps@*"]
version = "2.0.0"
source = "https://registry.example/no-deps/no-deps-2.0.0.tar.gz"
checksum = "sha256:f3b8f24d76b21b04748e6888672752b8"
>>>>>>> commit-2.0.0
"#;
