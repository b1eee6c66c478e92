//! Implementation of the `cbuild build` command.
//!
//! Resolves the project and runs every emitted command in order, stopping at
//! the first failure.

use std::time::Instant;

use anyhow::{Context, Result};

use cbuild_lib::build::execute::{ExecuteOptions, execute_commands};

use super::{ProjectArgs, resolve_project};
use crate::output::{format_duration, print_info, print_step, print_success};

pub fn cmd_build(project: &ProjectArgs, dry_run: bool, shell: Option<String>) -> Result<()> {
  let (config, resolution) = resolve_project(project)?;
  let commands = resolution.commands.commands();

  if commands.is_empty() {
    print_info("No commands to run.");
    return Ok(());
  }

  if dry_run {
    for command in commands {
      println!("{}", command.command_line());
    }
    return Ok(());
  }

  let options = ExecuteOptions {
    working_dir: Some(config.root.clone()),
    shell,
  };

  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;

  let started = Instant::now();
  let total = commands.len();
  let count = rt
    .block_on(execute_commands(commands, &options, |idx, command| {
      print_step(idx + 1, total, command)
    }))
    .context("Build failed")?;

  print_success(&format!(
    "{} command(s) completed in {}",
    count,
    format_duration(started.elapsed())
  ));
  Ok(())
}
