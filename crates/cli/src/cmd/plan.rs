//! Implementation of the `cbuild plan` command.

use anyhow::Result;
use serde::Serialize;

use cbuild_lib::build::BuildCommand;

use super::{ProjectArgs, resolve_project};
use crate::output::{OutputFormat, print_info, print_json, print_stat};

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
  platform: &'a str,
  output_root: &'a str,
  artifacts: &'a [String],
  commands: &'a [BuildCommand],
}

pub fn cmd_plan(project: &ProjectArgs, format: OutputFormat) -> Result<()> {
  let (_, resolution) = resolve_project(project)?;
  let commands = resolution.commands.commands();

  if format.is_json() {
    return print_json(&PlanOutput {
      platform: &resolution.platform,
      output_root: &resolution.output_root,
      artifacts: &resolution.artifacts,
      commands,
    });
  }

  if commands.is_empty() {
    print_info("No commands to run.");
    return Ok(());
  }

  for command in commands {
    println!("{}", command.command_line());
  }
  println!();
  print_stat("Platform", &resolution.platform);
  print_stat("Output", &resolution.output_root);
  print_stat("Commands", &commands.len().to_string());
  Ok(())
}
