//! Reading `make.yml` files.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::trace;

use super::Descriptor;

#[derive(Debug, Error)]
pub enum DescriptorError {
  #[error("failed to read \"{}\": {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse \"{}\": {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },
}

impl DescriptorError {
  pub fn path(&self) -> &Path {
    match self {
      DescriptorError::Read { path, .. } | DescriptorError::Parse { path, .. } => path,
    }
  }
}

/// Parse a descriptor from YAML text. Blank or comment-only documents yield
/// an empty descriptor.
pub fn parse_descriptor(text: &str) -> Result<Descriptor, serde_yaml::Error> {
  if text.trim().is_empty() {
    return Ok(Descriptor::default());
  }
  match serde_yaml::from_str::<serde_yaml::Value>(text)? {
    serde_yaml::Value::Null => Ok(Descriptor::default()),
    value => serde_yaml::from_value(value),
  }
}

/// Read and parse the descriptor at `path`.
pub fn load_descriptor(path: &Path) -> Result<Descriptor, DescriptorError> {
  let text = std::fs::read_to_string(path).map_err(|source| DescriptorError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  trace!(path = %path.display(), bytes = text.len(), "descriptor read");

  parse_descriptor(&text).map_err(|source| DescriptorError::Parse {
    path: path.to_path_buf(),
    source,
  })
}
