//! Implementation of the `cbuild compdb` command.

use std::path::Path;

use anyhow::{Context, Result};

use cbuild_lib::outputs::{compile_db_items, create_compile_db_file};
use cbuild_lib::util::paths::path_to_slash;

use super::{ProjectArgs, project_path, resolve_project};
use crate::output::{print_stat, print_success};

pub fn cmd_compdb(project: &ProjectArgs, file: &Path) -> Result<()> {
  let (config, resolution) = resolve_project(project)?;

  let items = compile_db_items(resolution.commands.commands(), &path_to_slash(&config.root));
  let path = project_path(&config, file);
  create_compile_db_file(&path, &items)
    .with_context(|| format!("Failed to write compilation database: {}", path.display()))?;

  print_success(&format!("Wrote {}", path.display()));
  print_stat("Entries", &items.len().to_string());
  Ok(())
}
