//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// A library `core` linked into the root executable `app`.
pub const ROOT_DESCRIPTOR: &str = r#"
target:
- name: app
  type: execute
variable:
- name: compiler
  value: clang++
- name: archiver
  value: ar
- name: linker
  value: clang++
subdir:
- list: [core]
source:
- list: [main.cpp]
"#;

pub const CORE_DESCRIPTOR: &str = r#"
target:
- name: core
  type: library
source:
- list: [core.cpp, util.cpp]
"#;

/// Isolated project directory.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create an empty test environment.
  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// The `app`/`core` project.
  pub fn app_with_core() -> Self {
    let env = Self::empty();
    env.write_file("make.yml", ROOT_DESCRIPTOR);
    env.write_file("core/make.yml", CORE_DESCRIPTOR);
    env
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Canonical project root, as the CLI reports it.
  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  /// A cbuild command pointed at this project.
  pub fn cmd(&self, subcommand: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("cbuild");
    cmd.arg(subcommand).arg("-C").arg(self.temp.path());
    cmd.env_remove("RUST_LOG");
    cmd
  }

  pub fn read(&self, relative_path: &str) -> String {
    read(&self.path(relative_path))
  }
}

pub fn read(path: &Path) -> String {
  std::fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}
