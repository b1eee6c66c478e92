mod build;
mod compdb;
mod msbuild;
mod ninja;
mod plan;

pub use build::cmd_build;
pub use compdb::cmd_compdb;
pub use msbuild::cmd_msbuild;
pub use ninja::cmd_ninja;
pub use plan::cmd_plan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use tracing::info;

use cbuild_lib::consts::{DEFAULT_PLATFORM, DESCRIPTOR_FILENAME};
use cbuild_lib::descriptor::BuildType;
use cbuild_lib::platform::launcher::find_compiler_launcher;
use cbuild_lib::resolve::{BuildConfig, Resolution, Resolver};

/// Flags shared by every command that resolves a project.
#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("variant").multiple(false)))]
pub struct ProjectArgs {
  /// Target to build (takes precedence over TARGET)
  #[arg(short = 't', long = "target", value_name = "NAME")]
  target: Option<String>,

  /// Target to build
  #[arg(value_name = "TARGET")]
  target_name: Option<String>,

  /// Platform type
  #[arg(long = "type", value_name = "PLATFORM", default_value = DEFAULT_PLATFORM)]
  platform: String,

  /// Output directory, relative to the project directory
  #[arg(short, long, value_name = "DIR", default_value = "build")]
  output: String,

  /// Project directory holding the root make.yml
  #[arg(short = 'C', long = "directory", value_name = "DIR", default_value = ".")]
  directory: PathBuf,

  /// Debug build (default)
  #[arg(long, group = "variant")]
  debug: bool,

  /// Release build
  #[arg(long, group = "variant")]
  release: bool,

  /// Develop (beta) build
  #[arg(long, group = "variant")]
  develop: bool,

  /// Develop (beta) release build
  #[arg(long, group = "variant", alias = "develop_release")]
  develop_release: bool,

  /// Production build
  #[arg(long, group = "variant")]
  product: bool,
}

impl ProjectArgs {
  pub fn variant(&self) -> BuildType {
    [
      (self.develop, BuildType::Develop),
      (self.develop_release, BuildType::DevelopRelease),
      (self.release, BuildType::Release),
      (self.product, BuildType::Product),
      (self.debug, BuildType::Debug),
    ]
    .into_iter()
    .find_map(|(set, variant)| set.then_some(variant))
    .unwrap_or_default()
  }

  /// The session settings, with the project directory made absolute.
  pub fn config(&self) -> Result<BuildConfig> {
    let root = dunce::canonicalize(&self.directory)
      .with_context(|| format!("Project directory not found: {}", self.directory.display()))?;

    Ok(BuildConfig {
      root,
      platform: self.platform.clone(),
      variant: self.variant(),
      output_dir: self.output.clone(),
      target: self
        .target
        .clone()
        .or_else(|| self.target_name.clone())
        .filter(|t| !t.is_empty()),
    })
  }
}

/// Resolve the project described by `project`.
pub fn resolve_project(project: &ProjectArgs) -> Result<(BuildConfig, Resolution)> {
  let config = project.config()?;

  if let Some(launcher) = find_compiler_launcher() {
    info!(launcher = %launcher.display(), "compiler launcher available");
  }
  if let Some(target) = &config.target {
    info!(target = %target, "target requested");
  }

  let descriptor = config.root.join(DESCRIPTOR_FILENAME);
  let resolution = Resolver::new(config.clone())
    .resolve_root()
    .with_context(|| format!("Failed to resolve {}", descriptor.display()))?;

  info!(
    platform = %resolution.platform,
    output = %resolution.output_root,
    commands = resolution.commands.len(),
    "resolved"
  );
  Ok((config, resolution))
}

/// `path` relative to the project root unless already absolute.
pub fn project_path(config: &BuildConfig, path: &Path) -> PathBuf {
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    config.root.join(path)
  }
}
