//! JSON compilation database (`compile_commands.json`).

use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use thiserror::Error;
use tracing::info;

use crate::build::{BuildCommand, CommandKind};

use super::transient::{TransientError, TransientOutput};

#[derive(Debug, Error)]
pub enum CompileDbError {
  #[error("failed to serialize the compilation database")]
  Serialize(#[source] serde_json::Error),

  #[error("failed to write the compilation database")]
  Write(#[source] io::Error),

  #[error(transparent)]
  Transient(#[from] TransientError),
}

/// One entry of the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileDbItem {
  /// Working directory of the compile.
  pub directory: String,
  pub file: String,
  pub output: String,
  /// The compiler followed by its arguments.
  pub arguments: Vec<String>,
}

/// Entries for every compile and precompiled header command.
///
/// The command string may carry a launcher (`ccache clang++`), so it is
/// split on spaces into leading arguments.
pub fn compile_db_items(commands: &[BuildCommand], directory: &str) -> Vec<CompileDbItem> {
  commands
    .iter()
    .filter(|c| matches!(c.kind, CommandKind::Compile | CommandKind::Pch))
    .map(|c| CompileDbItem {
      directory: directory.to_string(),
      file: c.in_files.first().cloned().unwrap_or_default(),
      output: c.out_file.clone(),
      arguments: c
        .command
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .chain(c.args.iter().cloned())
        .collect(),
    })
    .collect()
}

/// Write `items` as a 4-space indented JSON array.
pub fn write_compile_db<W: Write>(writer: W, items: &[CompileDbItem]) -> Result<(), CompileDbError> {
  let mut serializer = serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
  items.serialize(&mut serializer).map_err(CompileDbError::Serialize)?;
  serializer.into_inner().flush().map_err(CompileDbError::Write)
}

/// Atomically replace `path` with the database for `items`.
pub fn create_compile_db_file(path: &Path, items: &[CompileDbItem]) -> Result<(), CompileDbError> {
  let mut out = TransientOutput::new(path)?;
  write_compile_db(&mut out, items)?;
  out.commit()?;
  info!(path = %path.display(), entries = items.len(), "compilation database written");
  Ok(())
}
