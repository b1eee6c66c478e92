//! Atomic file replacement.
//!
//! Output is written to a uniquely named sibling file and renamed over the
//! destination on [`TransientOutput::commit`], so readers never observe a
//! partially written file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::trace;

use crate::util::paths::{clean, path_to_slash};

#[derive(Debug, Error)]
pub enum TransientError {
  #[error("failed to create temporary output in \"{}\"", dir.display())]
  Create {
    dir: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to rename \"{}\" to \"{}\"", temp.display(), output.display())]
  Commit {
    temp: PathBuf,
    output: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to remove \"{}\"", temp.display())]
  Abort {
    temp: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// A one-shot token for writing `output` atomically.
///
/// Once committed or aborted it is done and further calls are no-ops.
/// Dropping an unfinished output removes the temporary file.
#[derive(Debug)]
pub struct TransientOutput {
  output: PathBuf,
  temp: Option<NamedTempFile>,
}

impl TransientOutput {
  /// Create the temporary sibling (`cb-*.tmp`) of `path`.
  pub fn new(path: impl AsRef<Path>) -> Result<Self, TransientError> {
    let output = PathBuf::from(clean(&path_to_slash(path.as_ref())));
    let dir = match output.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
      _ => PathBuf::from("."),
    };

    let temp = tempfile::Builder::new()
      .prefix("cb-")
      .suffix(".tmp")
      .tempfile_in(&dir)
      .map_err(|source| TransientError::Create { dir, source })?;
    trace!(output = %output.display(), temp = %temp.path().display(), "transient output");

    Ok(Self {
      output,
      temp: Some(temp),
    })
  }

  /// The final destination.
  pub fn output(&self) -> &Path {
    &self.output
  }

  /// The temporary file, until the output is done.
  pub fn temp_path(&self) -> Option<&Path> {
    self.temp.as_ref().map(NamedTempFile::path)
  }

  pub fn is_done(&self) -> bool {
    self.temp.is_none()
  }

  /// Rename the temporary file over the destination.
  pub fn commit(&mut self) -> Result<(), TransientError> {
    let Some(mut temp) = self.temp.take() else {
      return Ok(());
    };
    let temp_path = temp.path().to_path_buf();
    temp.flush().map_err(|source| TransientError::Commit {
      temp: temp_path.clone(),
      output: self.output.clone(),
      source,
    })?;
    temp.persist(&self.output).map_err(|e| TransientError::Commit {
      temp: temp_path,
      output: self.output.clone(),
      source: e.error,
    })?;
    trace!(output = %self.output.display(), "committed");
    Ok(())
  }

  /// Discard the temporary file.
  pub fn abort(&mut self) -> Result<(), TransientError> {
    let Some(temp) = self.temp.take() else {
      return Ok(());
    };
    let temp_path = temp.path().to_path_buf();
    temp
      .close()
      .map_err(|source| TransientError::Abort { temp: temp_path, source })
  }
}

impl Write for TransientOutput {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    match &mut self.temp {
      Some(temp) => temp.write(buf),
      None => Err(io::Error::other("transient output is already done")),
    }
  }

  fn flush(&mut self) -> io::Result<()> {
    match &mut self.temp {
      Some(temp) => temp.flush(),
      None => Ok(()),
    }
  }
}
