//! `prebuild`/`postbuild` steps and per-extension `other` rules.

use tracing::{debug, warn};

use crate::build::{BuildCommand, CommandKind};
use crate::descriptor::{Build, Other};
use crate::util::paths::{base_name, fixup_command_path, join_paths, replace_extension};

use super::emit::ObjectPaths;
use super::{BuildInfo, OtherRule, ResolveError, Walk};

/// The phony edge custom rules depend on to run every time.
pub const ALWAYS: &str = "always";

/// Replace `$name` tokens from `tokens`.
///
/// A token only matches a whole identifier, so `$input` is left alone when
/// only `in` is bound.
pub fn substitute_tokens(s: &str, tokens: &[(&str, &str)]) -> String {
  let mut out = String::with_capacity(s.len());
  let mut rest = s;
  while let Some(idx) = rest.find('$') {
    out.push_str(&rest[..idx]);
    let after = &rest[idx + 1..];
    let len = after
      .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
      .unwrap_or(after.len());
    match tokens.iter().find(|(name, _)| *name == &after[..len]) {
      Some((_, value)) => {
        out.push_str(value);
        rest = &after[len..];
      }
      None => {
        out.push('$');
        rest = after;
      }
    }
  }
  out.push_str(rest);
  out
}

impl Walk<'_> {
  /// Register the directory's `other` entries that apply to this platform.
  ///
  /// A second entry for an extension only adds options.
  pub(super) fn register_other_rules(&self, info: &mut BuildInfo, others: &[Other]) -> Result<(), ResolveError> {
    let prefix = info.option_prefix().to_string();
    for other in others.iter().filter(|o| o.matches_platform(&self.platform)) {
      let mut options = Vec::new();
      for opt in self.items(info, &other.option) {
        info.append_option(&mut options, &opt, &prefix)?;
      }

      if let Some(rule) = info.other_rules.get_mut(&other.ext) {
        rule.options.extend(options);
        continue;
      }

      let mut words = other.command.split(' ').filter(|w| !w.is_empty());
      let rule = OtherRule {
        compiler: words.next().unwrap_or_default().to_string(),
        tokens: words.map(str::to_string).collect(),
        title: other.description.clone(),
        options,
        need_depend: other.need_depend,
      };
      debug!(ext = %other.ext, compiler = %rule.compiler, "other rule registered");
      info.other_rules.insert(other.ext.clone(), rule);
    }
    Ok(())
  }

  /// Compile one source with a registered `other` rule.
  ///
  /// Returns whether a command was emitted. A rule whose compiler variable is
  /// undefined is skipped with a warning and produces no object.
  pub(super) fn compile_with_rule(
    &mut self,
    info: &BuildInfo,
    ext: &str,
    rule: &OtherRule,
    paths: &ObjectPaths,
  ) -> Result<bool, ResolveError> {
    let Some(compiler) = info.variables.get(&rule.compiler) else {
      warn!(
        compiler = %rule.compiler,
        dir = %info.source_dir,
        "missing compiler definition for other rule"
      );
      debug!(object = %paths.obj, "object dropped");
      return Ok(false);
    };
    let command = info.interpolate(compiler)?;

    let bind = |s: &str| substitute_tokens(s, &[("in", &paths.src), ("out", &paths.obj), ("dep", &paths.dep)]);
    let mut args = Vec::new();
    for token in &rule.tokens {
      match token.as_str() {
        "@include" => args.extend(info.includes.iter().cloned()),
        "@define" => args.extend(info.defines.iter().cloned()),
        "@option" => args.extend(rule.options.iter().map(|o| bind(o))),
        other => args.push(bind(other)),
      }
    }

    let mut cmd = BuildCommand::new(CommandKind::OtherRule(ext.to_string()), command, paths.obj.clone())
      .with_args(args)
      .with_inputs(vec![paths.src.clone()])
      .with_title(format!("{}: {}", rule.title, paths.src));
    if rule.need_depend {
      cmd = cmd.with_dep_file(paths.dep.clone());
    }
    self.commands.push(cmd);
    Ok(true)
  }

  /// Emit `prebuild` or `postbuild` steps.
  pub(super) fn custom_rules(&mut self, info: &BuildInfo, builds: &[Build]) -> Result<(), ResolveError> {
    let platform = self.platform.clone();
    for build in builds.iter().filter(|b| b.matches(&info.target, &platform)) {
      let sources = self.items(info, &build.source);
      if sources.is_empty() {
        return Err(ResolveError::NoSources {
          rule: build.name.clone(),
          dir: info.source_dir.clone(),
        });
      }

      let mut inputs = Vec::new();
      let mut implicit = Vec::new();
      for src in &sources {
        if let Some(generated) = src.strip_prefix('$') {
          inputs.push(self.absolute(&join_paths(&[info.output_dir.as_str(), "output", generated]))?);
        } else if src == ALWAYS {
          implicit.push(ALWAYS.to_string());
        } else {
          let expanded = info.interpolate(src)?;
          inputs.push(join_paths(&[info.source_dir.as_str(), expanded.as_str()]));
        }
      }

      let template = info
        .variables
        .get(&build.command)
        .ok_or_else(|| ResolveError::MissingVariable {
          name: build.command.clone(),
          dir: info.source_dir.clone(),
        })?;
      let template = info.interpolate(&template.replace("${selfdir}", &info.source_dir))?;
      let (template, depends) = self.resolve_program(info, &template)?;

      let step = CustomStep {
        build,
        template: &template,
        depends: &depends,
        implicit: &implicit,
      };
      match build.name.strip_prefix('$').filter(|rest| !rest.starts_with("target/")) {
        Some(ext) => {
          for input in inputs {
            let name = replace_extension(base_name(&input), ext);
            let out = self.absolute(&join_paths(&[info.output_dir.as_str(), "output", name.as_str()]))?;
            self.push_custom(info, &step, vec![input], out);
          }
        }
        None => {
          let name = match build.name.strip_prefix("$target/") {
            Some(rest) => format!(".{}/{}", info.target, rest),
            None => build.name.clone(),
          };
          let out = self.absolute(&join_paths(&[info.output_dir.as_str(), name.as_str()]))?;
          self.push_custom(info, &step, inputs, out);
        }
      }
    }
    Ok(())
  }

  // `$tool` lives in the output directory and `./tool` next to the
  // descriptor. Either way the program becomes a dependency.
  fn resolve_program(&self, info: &BuildInfo, command: &str) -> Result<(String, Vec<String>), ResolveError> {
    if let Some(generated) = command.strip_prefix('$') {
      let dir = self.absolute(&info.output_dir)?;
      let (line, program) = fixup_command_path(generated, &dir);
      return Ok((line, vec![program]));
    }
    if command.starts_with("./") || command.starts_with("../") {
      let (line, program) = fixup_command_path(command, &info.source_dir);
      return Ok((line, vec![program]));
    }
    Ok((command.to_string(), Vec::new()))
  }

  fn push_custom(&mut self, info: &BuildInfo, step: &CustomStep<'_>, inputs: Vec<String>, out: String) {
    let line = substitute_tokens(
      step.template,
      &[("in", &inputs.join(" ")), ("out", &out), ("target", &info.target)],
    );
    let mut cmd = BuildCommand::new(CommandKind::Custom(step.build.command.clone()), line, out.clone())
      .with_inputs(inputs)
      .with_depends(step.depends.to_vec())
      .with_implicit_depends(step.implicit.to_vec())
      .with_title(format!("{}: {}", step.build.command, out));
    if !step.build.deps.is_empty() {
      cmd = cmd.with_dep_file(format!("{out}.d"));
    }
    debug!(rule = %step.build.command, out = %cmd.out_file, "custom step");
    self.commands.push(cmd);
  }
}

struct CustomStep<'a> {
  build: &'a Build,
  template: &'a str,
  depends: &'a [String],
  implicit: &'a [String],
}
