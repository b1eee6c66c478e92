//! Sequential command execution.
//!
//! Commands run one at a time in emission order through the platform shell.
//! The first non-zero exit status stops the run.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::BuildCommand;

/// Errors that can occur while running build commands.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The shell could not be started.
  #[error("failed to spawn `{cmd}`: {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  /// Command exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  /// I/O error while preparing output directories.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// How commands are run.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
  /// Working directory for every command. Relative output paths are created
  /// under it. Defaults to the process's current directory.
  pub working_dir: Option<PathBuf>,
  /// Shell override (e.g. `/bin/bash`).
  pub shell: Option<String>,
}

/// Run every command in order, calling `on_start` before each one.
///
/// Returns the number of commands run.
pub async fn execute_commands<F>(
  commands: &[BuildCommand],
  options: &ExecuteOptions,
  mut on_start: F,
) -> Result<usize, ExecuteError>
where
  F: FnMut(usize, &BuildCommand),
{
  let cwd = match &options.working_dir {
    Some(dir) => dir.clone(),
    None => std::env::current_dir()?,
  };

  for (idx, command) in commands.iter().enumerate() {
    on_start(idx, command);
    execute_command(command, &cwd, options.shell.as_deref()).await?;
  }

  info!(count = commands.len(), "all commands completed");
  Ok(commands.len())
}

/// Run one command in `cwd`, creating its output directory first.
pub async fn execute_command(command: &BuildCommand, cwd: &Path, shell: Option<&str>) -> Result<(), ExecuteError> {
  if let Some(parent) = Path::new(&command.out_file).parent() {
    if !parent.as_os_str().is_empty() {
      tokio::fs::create_dir_all(cwd.join(parent)).await?;
    }
  }

  let line = command.command_line();
  let (shell_cmd, shell_args) = get_shell(shell);
  debug!(kind = %command.kind, cmd = %line, "spawning process");

  let output = Command::new(&shell_cmd)
    .args(&shell_args)
    .arg(&line)
    .current_dir(cwd)
    .output()
    .await
    .map_err(|source| ExecuteError::Spawn {
      cmd: line.clone(),
      source,
    })?;

  let stdout = String::from_utf8_lossy(&output.stdout);
  let stderr = String::from_utf8_lossy(&output.stderr);

  if !output.status.success() {
    if !stderr.is_empty() {
      warn!(stderr = %stderr.trim_end(), "command stderr");
    }
    if !stdout.is_empty() {
      debug!(stdout = %stdout.trim_end(), "command stdout");
    }
    return Err(ExecuteError::CmdFailed {
      cmd: line,
      code: output.status.code(),
    });
  }

  if !stderr.is_empty() {
    debug!(stderr = %stderr.trim_end(), "command stderr");
  }
  if !stdout.is_empty() {
    debug!(stdout = %stdout.trim_end(), "command output");
  }
  Ok(())
}

fn get_shell(override_shell: Option<&str>) -> (String, Vec<String>) {
  if let Some(shell) = override_shell {
    let args = if shell.contains("cmd") {
      vec!["/C".to_string()]
    } else {
      vec!["-c".to_string()]
    };
    return (shell.to_string(), args);
  }

  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    ("cmd.exe".to_string(), vec!["/C".to_string()])
  }
}
