//! Lexical path helpers.
//!
//! Paths inside commands are kept as forward-slash strings so generated
//! command lines look the same on every host.

use std::io;
use std::path::Path;

/// Join `parts` and clean the result lexically.
///
/// Empty parts are skipped, `.` components dropped and `..` folded into the
/// preceding component. An empty result becomes `"."`.
pub fn join_paths<S: AsRef<str>>(parts: &[S]) -> String {
  let joined = parts
    .iter()
    .map(AsRef::as_ref)
    .filter(|p| !p.is_empty())
    .collect::<Vec<_>>()
    .join("/");
  clean(&joined)
}

/// Clean `path` lexically (the equivalent of joining it with nothing).
pub fn clean(path: &str) -> String {
  let path = to_slash(path);
  let rooted = path.starts_with('/');
  let mut out: Vec<&str> = Vec::new();

  for component in path.split('/') {
    match component {
      "" | "." => {}
      ".." => match out.last() {
        Some(&last) if last != ".." => {
          out.pop();
        }
        _ if rooted => {}
        _ => out.push(".."),
      },
      other => out.push(other),
    }
  }

  let body = out.join("/");
  match (rooted, body.is_empty()) {
    (true, _) => format!("/{body}"),
    (false, true) => ".".to_string(),
    (false, false) => body,
  }
}

/// Render a filesystem path with forward slashes.
pub fn path_to_slash(path: &Path) -> String {
  to_slash(&dunce::simplified(path).to_string_lossy())
}

fn to_slash(path: &str) -> String {
  if cfg!(windows) { path.replace('\\', "/") } else { path.to_string() }
}

/// Make `path` absolute (relative to the current directory) and clean it.
pub fn absolute(path: &Path) -> io::Result<String> {
  let abs = std::path::absolute(path)?;
  Ok(clean(&path_to_slash(&abs)))
}

/// Make `path` absolute against `base` unless it already is.
pub fn absolute_from(base: &Path, path: &str) -> io::Result<String> {
  let p = Path::new(path);
  if p.is_absolute() {
    return Ok(clean(path));
  }
  absolute(&base.join(p))
}

/// The last component of `path`.
pub fn base_name(path: &str) -> &str {
  let trimmed = path.trim_end_matches('/');
  trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Everything before the last component of `path`, cleaned.
pub fn dir_name(path: &str) -> String {
  match path.trim_end_matches('/').rfind('/') {
    Some(0) => "/".to_string(),
    Some(idx) => clean(&path[..idx]),
    None => ".".to_string(),
  }
}

/// Extension of the last component including the dot, or `""`.
pub fn extension(path: &str) -> &str {
  let base = base_name(path);
  match base.rfind('.') {
    Some(idx) => &base[idx..],
    None => "",
  }
}

/// Replace the extension of `path` with `ext` (leading dot optional).
///
/// A path without an extension gets `ext` appended. Trailing slashes are
/// cleaned away first, so the last non-empty component is the one changed.
pub fn replace_extension(path: &str, ext: &str) -> String {
  let cleaned;
  let path = if path.ends_with('/') {
    cleaned = clean(path);
    cleaned.as_str()
  } else {
    path
  };
  let stem = &path[..path.len() - extension(path).len()];
  if ext.is_empty() || ext.starts_with('.') {
    format!("{stem}{ext}")
  } else {
    format!("{stem}.{ext}")
  }
}

/// Resolve the program (first word) of `command` against `dir`.
///
/// Returns the rewritten command line and the resolved program path.
pub fn fixup_command_path(command: &str, dir: &str) -> (String, String) {
  let mut words: Vec<String> = command.split(' ').map(str::to_string).collect();
  let program = join_paths(&[dir, words[0].as_str()]);
  words[0] = program.clone();
  (words.join(" "), program)
}
