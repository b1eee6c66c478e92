use std::collections::BTreeMap;

use crate::consts::{DEFAULT_OPTION_PREFIX, vars};
use crate::interpolate::{self, InterpolateError};
use crate::util::paths::{clean, join_paths};

use super::ResolveError;

/// A per-extension compile rule registered by an `other` entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OtherRule {
  /// Variable holding the compiler command.
  pub compiler: String,
  /// Command tokens after the compiler. `@include`, `@option` and `@define`
  /// expand to the accumulated lists.
  pub tokens: Vec<String>,
  pub title: String,
  pub options: Vec<String>,
  pub need_depend: bool,
}

/// The resolution context threaded through the directory walk.
///
/// Children receive a clone: what they add never leaks back to the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
  pub variables: BTreeMap<String, String>,
  pub includes: Vec<String>,
  pub defines: Vec<String>,
  pub options: Vec<String>,
  pub archive_options: Vec<String>,
  pub convert_options: Vec<String>,
  pub link_options: Vec<String>,
  pub link_depends: Vec<String>,
  pub libraries: Vec<String>,
  /// Requested target name. Consumed by the first directory that selects a
  /// target, so children never see it.
  pub select_target: Option<String>,
  /// Effective target name used for matching.
  pub target: String,
  /// Output directory of the directory being resolved.
  pub output_dir: String,
  /// Directory being resolved, relative to the project root.
  pub source_dir: String,
  pub other_rules: BTreeMap<String, OtherRule>,
}

impl Default for BuildInfo {
  fn default() -> Self {
    let mut variables = BTreeMap::new();
    variables.insert(vars::OPTION_PREFIX.to_string(), DEFAULT_OPTION_PREFIX.to_string());
    Self {
      variables,
      includes: Vec::new(),
      defines: Vec::new(),
      options: Vec::new(),
      archive_options: Vec::new(),
      convert_options: Vec::new(),
      link_options: Vec::new(),
      link_depends: Vec::new(),
      libraries: Vec::new(),
      select_target: None,
      target: String::new(),
      output_dir: String::new(),
      source_dir: ".".to_string(),
      other_rules: BTreeMap::new(),
    }
  }
}

impl BuildInfo {
  pub fn new() -> Self {
    Self::default()
  }

  /// Context for a run that requests `target` (or the first target when `None`).
  pub fn for_target(target: Option<String>) -> Self {
    Self {
      target: target.clone().unwrap_or_default(),
      select_target: target,
      ..Self::default()
    }
  }

  pub fn option_prefix(&self) -> &str {
    self
      .variables
      .get(vars::OPTION_PREFIX)
      .map(String::as_str)
      .unwrap_or(DEFAULT_OPTION_PREFIX)
  }

  pub fn add_include(&mut self, path: &str) {
    let flag = format!("{}I{}", self.option_prefix(), clean(path));
    self.includes.push(flag);
  }

  pub fn add_define(&mut self, def: &str) {
    let flag = format!("{}D{}", self.option_prefix(), def);
    self.defines.push(flag);
  }

  /// Expand `${..}` references from the first `${` on.
  ///
  /// Text before it (typically `$out`-style tokens) is left untouched.
  pub fn interpolate(&self, s: &str) -> Result<String, ResolveError> {
    match s.find("${") {
      Some(idx) => {
        let expanded = interpolate::interpolate(&s[idx..], &self.variables).map_err(|e| self.wrap(e))?;
        Ok(format!("{}{}", &s[..idx], expanded))
      }
      None => Ok(s.to_string()),
    }
  }

  /// Expand `s` strictly: unknown references and stray `$` are errors.
  pub fn strict_interpolate(&self, s: &str) -> Result<String, ResolveError> {
    interpolate::strict_interpolate(s, &self.variables).map_err(|e| self.wrap(e))
  }

  /// The interpolated value of variable `name`.
  pub fn expand_variable(&self, name: &str) -> Result<String, ResolveError> {
    let value = self.variables.get(name).ok_or_else(|| ResolveError::MissingVariable {
      name: name.to_string(),
      dir: self.source_dir.clone(),
    })?;
    self.interpolate(value)
  }

  /// Split `prefix + opt` on spaces, interpolate each word and append it to `list`.
  pub fn append_option(&self, list: &mut Vec<String>, opt: &str, prefix: &str) -> Result<(), ResolveError> {
    for word in format!("{prefix}{opt}").split(' ') {
      list.push(self.interpolate(word)?);
    }
    Ok(())
  }

  /// `<output_dir>/<name><execute_suffix>`.
  pub fn make_executable_path(&self, name: &str) -> String {
    let suffix = self.variables.get(vars::EXECUTE_SUFFIX).map(String::as_str).unwrap_or("");
    join_paths(&[self.output_dir.as_str(), format!("{name}{suffix}").as_str()])
  }

  fn wrap(&self, source: InterpolateError) -> ResolveError {
    ResolveError::Interpolate {
      dir: self.source_dir.clone(),
      source,
    }
  }
}
