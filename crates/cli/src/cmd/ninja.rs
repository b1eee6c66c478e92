//! Implementation of the `cbuild ninja` command.
//!
//! Writes a ninja file whose regeneration rule re-runs this command with the
//! same settings whenever a scanned `make.yml` changes.

use std::path::Path;

use anyhow::{Context, Result};

use cbuild_lib::build::quote_arg;
use cbuild_lib::outputs::create_ninja_file;
use cbuild_lib::resolve::BuildConfig;
use cbuild_lib::util::paths::path_to_slash;

use super::{ProjectArgs, project_path, resolve_project};
use crate::output::{print_info, print_stat, print_success};

pub fn cmd_ninja(project: &ProjectArgs, file: &Path) -> Result<()> {
  let (config, resolution) = resolve_project(project)?;
  let commands = &resolution.commands;

  if commands.is_empty() {
    print_info("No commands to run.");
    return Ok(());
  }

  let path = project_path(&config, file);
  let regenerate = regenerate_command(&config, &path)?;
  create_ninja_file(&path, commands, &regenerate)
    .with_context(|| format!("Failed to write ninja file: {}", path.display()))?;

  print_success(&format!("Wrote {}", path.display()));
  print_stat("Edges", &commands.len().to_string());
  print_stat("Descriptors", &commands.descriptors().len().to_string());
  Ok(())
}

/// The command line that rebuilds `ninja_file` with `config`.
fn regenerate_command(config: &BuildConfig, ninja_file: &Path) -> Result<String> {
  let exe = std::env::current_exe().context("Failed to locate the cbuild executable")?;

  let mut words = vec![
    path_to_slash(&exe),
    "ninja".to_string(),
    "-C".to_string(),
    path_to_slash(&config.root),
    "-f".to_string(),
    path_to_slash(ninja_file),
    "--type".to_string(),
    config.platform.clone(),
    "-o".to_string(),
    config.output_dir.clone(),
    format!("--{}", config.variant),
  ];
  if let Some(target) = &config.target {
    words.push("-t".to_string());
    words.push(target.clone());
  }

  Ok(words.iter().map(|w| quote_arg(w)).collect::<Vec<_>>().join(" "))
}
