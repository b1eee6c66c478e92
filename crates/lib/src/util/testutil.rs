//! Test helpers for cbuild-lib.
//!
//! Command lines run through the platform shell, so the helpers here return
//! shell text that works under both `/bin/sh -c` and `cmd.exe /C`.

/// A command line that writes `content` into `path`.
#[cfg(unix)]
pub fn write_file_cmd(path: &str, content: &str) -> String {
  format!("printf '%s' '{content}' > '{path}'")
}

#[cfg(windows)]
pub fn write_file_cmd(path: &str, content: &str) -> String {
  format!("echo|set /p=\"{content}\"> \"{path}\"")
}

/// A command line that exits with `code`.
pub fn exit_cmd(code: i32) -> String {
  format!("exit {code}")
}

/// A command line that appends `line` to `path`.
#[cfg(unix)]
pub fn append_line_cmd(path: &str, line: &str) -> String {
  format!("echo {line} >> '{path}'")
}

#[cfg(windows)]
pub fn append_line_cmd(path: &str, line: &str) -> String {
  format!("echo {line}>> \"{path}\"")
}
