use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::build::CommandList;
use crate::consts::DEFAULT_PLATFORM;
use crate::descriptor::{BuildType, DescriptorError};
use crate::interpolate::InterpolateError;

/// Session-wide settings for one resolution.
#[derive(Debug, Clone)]
pub struct BuildConfig {
  /// Directory holding the root `make.yml`. Descriptor directories and
  /// output paths are relative to it.
  pub root: PathBuf,
  /// Platform type (`--type`). `default` defers to the root descriptor's
  /// `default_type` variable.
  pub platform: String,
  pub variant: BuildType,
  /// Output directory (`-o`), relative to `root` unless absolute.
  pub output_dir: String,
  /// Requested target name, if any.
  pub target: Option<String>,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      root: PathBuf::from("."),
      platform: DEFAULT_PLATFORM.to_string(),
      variant: BuildType::Debug,
      output_dir: "build".to_string(),
      target: None,
    }
  }
}

/// Everything a resolution produced.
#[derive(Debug, Clone)]
pub struct Resolution {
  pub commands: CommandList,
  /// Artifacts the resolved directory contributes upward.
  pub artifacts: Vec<String>,
  /// `<output>/<platform>/<Variant>`.
  pub output_root: String,
  /// Platform type after `default_type` substitution.
  pub platform: String,
}

/// Errors that abort a resolution. Each names the directory or path involved.
#[derive(Debug, Error)]
pub enum ResolveError {
  #[error(transparent)]
  Descriptor(#[from] DescriptorError),

  #[error("no target found in \"{dir}\"{}", requested(.selector))]
  NoTarget { dir: String, selector: Option<String> },

  #[error("variable \"{name}\" was not defined (required in \"{dir}\")")]
  MissingVariable { name: String, dir: String },

  #[error("no sources for command `{rule}` in \"{dir}\"")]
  NoSources { rule: String, dir: String },

  #[error("interpolation failed in \"{dir}\": {source}")]
  Interpolate {
    dir: String,
    #[source]
    source: InterpolateError,
  },

  #[error("failed to obtain the absolute path for \"{path}\": {source}")]
  AbsolutePath {
    path: String,
    #[source]
    source: io::Error,
  },
}

fn requested(selector: &Option<String>) -> String {
  match selector {
    Some(name) => format!(" (requested \"{name}\")"),
    None => String::new(),
  }
}
