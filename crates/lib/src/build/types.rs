use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

/// What a [`BuildCommand`] does. Drives the ninja rule an edge uses and the
/// progress label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum CommandKind {
  Compile,
  Pch,
  Archive,
  Link,
  Package,
  Convert,
  /// A `prebuild`/`postbuild` step, labelled by the variable holding its command.
  Custom(String),
  /// A per-extension compile rule, keyed by extension (`.dat`).
  OtherRule(String),
}

impl CommandKind {
  /// The ninja rule name.
  pub fn rule(&self) -> &'static str {
    match self {
      CommandKind::Compile => "compile",
      CommandKind::Pch => "pch",
      CommandKind::Archive => "ar",
      CommandKind::Link => "link",
      CommandKind::Package => "package",
      CommandKind::Convert => "convert",
      CommandKind::Custom(_) => "custom",
      CommandKind::OtherRule(_) => "other",
    }
  }
}

impl fmt::Display for CommandKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CommandKind::Custom(label) => write!(f, "custom({label})"),
      CommandKind::OtherRule(ext) => write!(f, "other({ext})"),
      other => f.write_str(other.rule()),
    }
  }
}

/// One concrete, ready-to-run build step.
///
/// `args` are stored unquoted; [`BuildCommand::command_line`] quotes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildCommand {
  pub kind: CommandKind,
  pub command: String,
  pub args: Vec<String>,
  pub title: String,
  pub in_files: Vec<String>,
  pub out_file: String,
  pub dep_file: Option<String>,
  pub depends: Vec<String>,
  pub implicit_depends: Vec<String>,
}

impl BuildCommand {
  pub fn new(kind: CommandKind, command: impl Into<String>, out_file: impl Into<String>) -> Self {
    Self {
      kind,
      command: command.into(),
      args: Vec::new(),
      title: String::new(),
      in_files: Vec::new(),
      out_file: out_file.into(),
      dep_file: None,
      depends: Vec::new(),
      implicit_depends: Vec::new(),
    }
  }

  pub fn with_title(mut self, title: impl Into<String>) -> Self {
    self.title = title.into();
    self
  }

  pub fn with_args(mut self, args: Vec<String>) -> Self {
    self.args = args;
    self
  }

  pub fn with_inputs(mut self, in_files: Vec<String>) -> Self {
    self.in_files = in_files;
    self
  }

  pub fn with_dep_file(mut self, dep_file: impl Into<String>) -> Self {
    self.dep_file = Some(dep_file.into());
    self
  }

  pub fn with_depends(mut self, depends: Vec<String>) -> Self {
    self.depends = depends;
    self
  }

  pub fn with_implicit_depends(mut self, implicit: Vec<String>) -> Self {
    self.implicit_depends = implicit;
    self
  }

  /// The full shell command line.
  pub fn command_line(&self) -> String {
    let mut line = self.command.clone();
    for arg in &self.args {
      line.push(' ');
      line.push_str(&quote_arg(arg));
    }
    line
  }

  /// Position of `in_files` as one contiguous run inside `args`.
  pub fn input_span(&self) -> Option<std::ops::Range<usize>> {
    let n = self.in_files.len();
    if n == 0 || n > self.args.len() {
      return None;
    }
    (0..=self.args.len() - n)
      .find(|&start| self.args[start..start + n] == self.in_files[..])
      .map(|start| start..start + n)
  }
}

/// Wrap `arg` in double quotes when it contains whitespace.
pub fn quote_arg(arg: &str) -> Cow<'_, str> {
  if arg.is_empty() || arg.chars().any(char::is_whitespace) {
    Cow::Owned(format!("\"{}\"", arg.replace('"', "\\\"")))
  } else {
    Cow::Borrowed(arg)
  }
}

/// Descriptor switches that change how the ninja file is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NinjaSettings {
  pub enable_response: bool,
  pub response_newline: bool,
  pub group_archives: bool,
  /// `builddir` for the generated file.
  pub build_dir: String,
}

/// The ordered output of one resolution.
///
/// Commands are kept in emission order: children before the parent steps
/// that consume them, compiles before the archive or link that uses them.
#[derive(Debug, Clone, Default)]
pub struct CommandList {
  commands: Vec<BuildCommand>,
  descriptors: Vec<String>,
  subninjas: Vec<String>,
  settings: NinjaSettings,
}

impl CommandList {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, command: BuildCommand) {
    self.commands.push(command);
  }

  pub fn len(&self) -> usize {
    self.commands.len()
  }

  pub fn is_empty(&self) -> bool {
    self.commands.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, BuildCommand> {
    self.commands.iter()
  }

  pub fn commands(&self) -> &[BuildCommand] {
    &self.commands
  }

  pub fn into_commands(self) -> Vec<BuildCommand> {
    self.commands
  }

  /// Remember a descriptor that was read, for ninja regeneration.
  pub fn record_descriptor(&mut self, path: impl Into<String>) {
    self.descriptors.push(path.into());
  }

  pub fn descriptors(&self) -> &[String] {
    &self.descriptors
  }

  pub fn add_subninja(&mut self, path: impl Into<String>) {
    self.subninjas.push(path.into());
  }

  pub fn subninjas(&self) -> &[String] {
    &self.subninjas
  }

  pub fn settings(&self) -> &NinjaSettings {
    &self.settings
  }

  pub fn settings_mut(&mut self) -> &mut NinjaSettings {
    &mut self.settings
  }
}

impl<'a> IntoIterator for &'a CommandList {
  type Item = &'a BuildCommand;
  type IntoIter = std::slice::Iter<'a, BuildCommand>;

  fn into_iter(self) -> Self::IntoIter {
    self.commands.iter()
  }
}
