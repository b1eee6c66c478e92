//! Implementation of the `cbuild msbuild` command.
//!
//! Writes a Visual Studio makefile project listing every compiled source.
//! Building from the IDE runs `cbuild build` with the same settings.

use std::path::Path;

use anyhow::{Context, Result};

use cbuild_lib::build::quote_arg;
use cbuild_lib::outputs::{VcxprojOptions, create_vcxproj_file, vcxproj_from_commands};
use cbuild_lib::resolve::BuildConfig;
use cbuild_lib::util::paths::path_to_slash;

use super::{ProjectArgs, project_path, resolve_project};
use crate::output::{print_info, print_stat, print_success};

pub fn cmd_msbuild(project: &ProjectArgs, dir: &Path, name: &str, vs_platform: &str) -> Result<()> {
  let (config, resolution) = resolve_project(project)?;
  let commands = &resolution.commands;

  if commands.is_empty() {
    print_info("No commands to run.");
    return Ok(());
  }

  let dir = project_path(&config, dir);
  std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
  let path = dir.join(format!("{name}.vcxproj"));

  let options = VcxprojOptions {
    name: name.to_string(),
    configuration: config.variant.dir_name().to_string(),
    platform: vs_platform.to_string(),
    build_command: build_command(&config)?,
    directory: path_to_slash(&config.root),
  };
  let vcxproj = vcxproj_from_commands(commands.commands(), &options);
  create_vcxproj_file(&path, &vcxproj).with_context(|| format!("Failed to write project: {}", path.display()))?;

  print_success(&format!("Wrote {}", path.display()));
  print_stat("Sources", &vcxproj.sources().count().to_string());
  Ok(())
}

/// The command line that builds the project with `config`.
fn build_command(config: &BuildConfig) -> Result<String> {
  let exe = std::env::current_exe().context("Failed to locate the cbuild executable")?;

  let mut words = vec![
    path_to_slash(&exe),
    "build".to_string(),
    "-C".to_string(),
    path_to_slash(&config.root),
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
