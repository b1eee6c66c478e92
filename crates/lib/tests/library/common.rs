//! Shared helpers for library integration tests.

use std::path::Path;

use cbuild_lib::resolve::{BuildConfig, Resolution, ResolveError, Resolver};
use cbuild_lib::util::paths::{join_paths, path_to_slash};
use tempfile::TempDir;

/// Toolchain variables most fixtures need.
pub const TOOLCHAIN: &str = r#"
variable:
- name: compiler
  value: clang++
- name: archiver
  value: ar
- name: linker
  value: clang++
"#;

/// A project tree in a temporary directory.
pub struct Project {
  pub temp: TempDir,
}

impl Project {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  /// Write a file relative to the project root.
  pub fn write(&self, relative_path: &str, content: &str) -> &Self {
    let path = self.root().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    self
  }

  pub fn config(&self, platform: &str) -> BuildConfig {
    BuildConfig {
      root: self.root().to_path_buf(),
      platform: platform.to_string(),
      ..BuildConfig::default()
    }
  }

  pub fn resolve(&self, config: BuildConfig) -> Result<Resolution, ResolveError> {
    Resolver::new(config).resolve_root()
  }

  /// The absolute, forward-slash form of a project path.
  pub fn abs(&self, relative_path: &str) -> String {
    join_paths(&[path_to_slash(self.root()).as_str(), relative_path])
  }
}

/// A two-directory project: `core` is a library linked into the root `app`.
pub fn app_with_core() -> Project {
  let project = Project::new();
  project.write(
    "make.yml",
    &format!(
      r#"
target:
- name: app
  type: execute
{TOOLCHAIN}
option:
- list: [c, Wall]
subdir:
- list: [core]
source:
- list: [main.cpp]
"#
    ),
  );
  project.write(
    "core/make.yml",
    r#"
target:
- name: core
  type: library
source:
- list: [core.cpp]
"#,
  );
  project
}
