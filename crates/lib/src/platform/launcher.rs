//! Compiler launcher detection.
//!
//! Some toolchains ship a distributing launcher that wraps compiler
//! invocations. Detection is advisory: callers decide whether to use it.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Environment variable naming the SDK root that may contain a launcher.
pub const SDK_ROOT_ENV: &str = "SCE_ROOT_DIR";

/// Look for the SN-DBS launcher under `$SCE_ROOT_DIR`.
///
/// Returns `None` when the variable is unset or the binary is absent.
pub fn find_compiler_launcher() -> Option<PathBuf> {
  let root = std::env::var_os(SDK_ROOT_ENV)?;
  launcher_in(Path::new(&root))
}

fn launcher_in(root: &Path) -> Option<PathBuf> {
  let candidate = root.join("Common").join("SN-DBS").join("bin").join("dbsbuild.exe");
  if candidate.is_file() {
    debug!(path = %candidate.display(), "compiler launcher found");
    Some(dunce::simplified(&candidate).to_path_buf())
  } else {
    None
  }
}
