//! `build.ninja` writer.
//!
//! Every rule runs `$cmd $args`; each edge binds its own command and
//! arguments. Archive and link edges split their arguments around the inputs
//! (`$pre $in $post`) so the inputs can move into a response file or an
//! archive group.

use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::build::{BuildCommand, CommandKind, CommandList, NinjaSettings, quote_arg};
use crate::util::paths::path_to_slash;

use super::transient::{TransientError, TransientOutput};

#[derive(Debug, Error)]
pub enum NinjaError {
  #[error("failed to write the ninja file")]
  Write(#[from] io::Error),

  #[error(transparent)]
  Transient(#[from] TransientError),
}

/// Write the ninja file for `commands`.
///
/// `ninja_file` is the file's own path (for the regeneration edge) and
/// `regenerate` the command line that rebuilds it.
pub fn write_ninja<W: Write>(
  mut w: W,
  commands: &CommandList,
  ninja_file: &str,
  regenerate: &str,
) -> Result<(), NinjaError> {
  write_rules(&mut w, commands.settings(), regenerate)?;

  write!(w, "\nbuild {}: regenerate", escape_path(ninja_file))?;
  for descriptor in commands.descriptors() {
    write!(w, " {}", escape_path(descriptor))?;
  }
  writeln!(w)?;
  writeln!(w, "  title = {}", escape_value(ninja_file))?;

  for command in commands {
    write_edge(&mut w, command)?;
  }

  if !commands.subninjas().is_empty() {
    writeln!(w)?;
    for subninja in commands.subninjas() {
      writeln!(w, "subninja {}", escape_path(subninja))?;
    }
  }
  w.flush()?;
  Ok(())
}

/// Atomically replace `path` with the ninja file for `commands`.
pub fn create_ninja_file(path: &Path, commands: &CommandList, regenerate: &str) -> Result<(), NinjaError> {
  let mut out = TransientOutput::new(path)?;
  write_ninja(&mut out, commands, &path_to_slash(path), regenerate)?;
  out.commit()?;
  info!(path = %path.display(), edges = commands.len(), "ninja file written");
  Ok(())
}

fn write_rules<W: Write>(w: &mut W, settings: &NinjaSettings, regenerate: &str) -> io::Result<()> {
  writeln!(w, "# Generated by cbuild. Do not edit.")?;
  writeln!(w, "builddir = {}", escape_value(&settings.build_dir))?;

  let with_depfile = [("depfile", "$depfile"), ("deps", "gcc")];
  rule(w, "compile", "$cmd $args", &with_depfile)?;
  rule(w, "pch", "$cmd $args", &with_depfile)?;

  let content = if settings.response_newline { "$in_newline" } else { "$in" };
  let response = [("rspfile", "$out.rsp"), ("rspfile_content", content)];
  if settings.enable_response {
    rule(w, "ar", "$cmd $pre @$out.rsp $post", &response)?;
    rule(w, "link", "$cmd $pre @$out.rsp $post", &response)?;
  } else {
    rule(w, "ar", "$cmd $pre $in $post", &[])?;
    if settings.group_archives {
      rule(w, "link", "$cmd $pre -Wl,--start-group $in -Wl,--end-group $post", &[])?;
    } else {
      rule(w, "link", "$cmd $pre $in $post", &[])?;
    }
  }

  rule(w, "package", "$cmd $args", &[])?;
  rule(w, "convert", "$cmd $args", &[])?;
  rule(w, "custom", "$cmd $args", &[])?;
  rule(w, "custom_dep", "$cmd $args", &with_depfile)?;
  rule(w, "other", "$cmd $args", &[])?;
  rule(w, "other_dep", "$cmd $args", &with_depfile)?;

  writeln!(w, "\nrule regenerate")?;
  writeln!(w, "  description = Regenerating $title")?;
  writeln!(w, "  command = {}", escape_value(regenerate))?;
  writeln!(w, "  generator = 1")?;

  writeln!(w, "\nbuild always: phony")
}

fn rule<W: Write>(w: &mut W, name: &str, command: &str, extra: &[(&str, &str)]) -> io::Result<()> {
  writeln!(w, "\nrule {name}")?;
  writeln!(w, "  description = $title")?;
  writeln!(w, "  command = {command}")?;
  for (key, value) in extra {
    writeln!(w, "  {key} = {value}")?;
  }
  Ok(())
}

fn edge_rule(command: &BuildCommand) -> &'static str {
  match (&command.kind, command.dep_file.is_some()) {
    (CommandKind::Custom(_), true) => "custom_dep",
    (CommandKind::OtherRule(_), true) => "other_dep",
    (kind, _) => kind.rule(),
  }
}

fn write_edge<W: Write>(w: &mut W, command: &BuildCommand) -> io::Result<()> {
  write!(w, "\nbuild {}: {}", escape_path(&command.out_file), edge_rule(command))?;
  for input in &command.in_files {
    write!(w, " {}", escape_path(input))?;
  }
  let mut implicit = command.depends.iter().chain(&command.implicit_depends).peekable();
  if implicit.peek().is_some() {
    write!(w, " |")?;
    for dep in implicit {
      write!(w, " {}", escape_path(dep))?;
    }
  }
  writeln!(w)?;
  writeln!(w, "  cmd = {}", escape_value(&command.command))?;
  writeln!(w, "  title = {}", escape_value(&command.title))?;

  match command.kind {
    CommandKind::Archive | CommandKind::Link => {
      let (pre, post) = match command.input_span() {
        Some(span) => (&command.args[..span.start], &command.args[span.end..]),
        None => (&command.args[..], &[][..]),
      };
      if !pre.is_empty() {
        writeln!(w, "  pre = {}", join_args(pre))?;
      }
      if !post.is_empty() {
        writeln!(w, "  post = {}", join_args(post))?;
      }
    }
    _ => {
      if !command.args.is_empty() {
        writeln!(w, "  args = {}", join_args(&command.args))?;
      }
    }
  }

  if let Some(dep_file) = &command.dep_file {
    writeln!(w, "  depfile = {}", escape_value(dep_file))?;
  }
  Ok(())
}

fn join_args(args: &[String]) -> String {
  args
    .iter()
    .map(|a| escape_value(&quote_arg(a)))
    .collect::<Vec<_>>()
    .join(" ")
}

/// Escape a variable value.
fn escape_value(s: &str) -> String {
  s.replace('$', "$$")
}

/// Escape a path in a `build` line.
fn escape_path(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    if matches!(c, '$' | ' ' | ':') {
      out.push('$');
    }
    out.push(c);
  }
  out
}
