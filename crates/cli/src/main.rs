mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::ProjectArgs;
use output::{OutputFormat, print_error};

/// cbuild - YAML-driven build rule interpreter
#[derive(Parser)]
#[command(name = "cbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Resolve the descriptor tree and run every command in order
  Build {
    #[command(flatten)]
    project: ProjectArgs,

    /// Print the command lines instead of running them
    #[arg(long)]
    dry_run: bool,

    /// Shell used to run commands (default: /bin/sh or cmd.exe)
    #[arg(long, value_name = "SHELL")]
    shell: Option<String>,
  },

  /// Show the resolved commands without running them
  Plan {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
  },

  /// Write a ninja build file
  Ninja {
    #[command(flatten)]
    project: ProjectArgs,

    /// Ninja file to write, relative to the project directory
    #[arg(short = 'f', long, default_value = "build.ninja")]
    file: PathBuf,
  },

  /// Write a JSON compilation database
  Compdb {
    #[command(flatten)]
    project: ProjectArgs,

    /// Database file to write, relative to the project directory
    #[arg(short = 'f', long, default_value = "compile_commands.json")]
    file: PathBuf,
  },

  /// Write a Visual Studio makefile project (.vcxproj)
  Msbuild {
    #[command(flatten)]
    project: ProjectArgs,

    /// Directory for the project file, relative to the project directory
    #[arg(long = "msbuild-dir", value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Project name; the file is <NAME>.vcxproj
    #[arg(long = "msbuild-proj", value_name = "NAME", default_value = "out")]
    name: String,

    /// Visual Studio platform
    #[arg(long = "vs-platform", value_name = "PLATFORM", default_value = "x64")]
    vs_platform: String,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(cli.command) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("error: {err:#}"));
      ExitCode::FAILURE
    }
  }
}

fn run(command: Commands) -> Result<()> {
  match command {
    Commands::Build {
      project,
      dry_run,
      shell,
    } => cmd::cmd_build(&project, dry_run, shell),
    Commands::Plan { project, format } => cmd::cmd_plan(&project, format),
    Commands::Ninja { project, file } => cmd::cmd_ninja(&project, &file),
    Commands::Compdb { project, file } => cmd::cmd_compdb(&project, &file),
    Commands::Msbuild {
      project,
      dir,
      name,
      vs_platform,
    } => cmd::cmd_msbuild(&project, &dir, &name, &vs_platform),
  }
}
