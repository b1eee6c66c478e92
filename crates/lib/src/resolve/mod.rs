//! Descriptor resolution: from a tree of `make.yml` files to commands.
//!
//! Resolution walks the descriptor tree depth-first. Each directory:
//!
//! 1. loads its descriptor and selects the active target,
//! 2. merges matching variables and option lists into a cloned [`BuildInfo`],
//! 3. resolves its `subdir` entries (children inherit the context),
//! 4. runs `prebuild` rules, compiles its sources and emits the terminal
//!    step for the target kind (archive, link, convert, tests),
//! 5. runs `postbuild` rules and returns its artifacts to the parent.
//!
//! Commands accumulate in an explicit [`CommandList`] owned by the walk, so
//! resolutions are independent of each other.
//!
//! # Example
//!
//! ```no_run
//! use cbuild_lib::resolve::{BuildConfig, Resolver};
//!
//! let resolver = Resolver::new(BuildConfig {
//!   platform: "LINUX".into(),
//!   ..BuildConfig::default()
//! });
//! let resolution = resolver.resolve_root()?;
//! for command in &resolution.commands {
//!   println!("{}", command.command_line());
//! }
//! # Ok::<(), cbuild_lib::resolve::ResolveError>(())
//! ```

mod emit;
mod info;
mod rules;
mod types;

pub use info::{BuildInfo, OtherRule};
pub use types::*;

use tracing::{debug, warn};

use crate::build::CommandList;
use crate::consts::{DEFAULT_PLATFORM, DESCRIPTOR_FILENAME, vars};
use crate::descriptor::{Descriptor, StringList, Target, TargetKind, load_descriptor, select_items};
use crate::util::boolean::to_boolean;
use crate::util::paths::{absolute_from, clean, join_paths};

/// Resolves descriptor trees under one [`BuildConfig`].
#[derive(Debug, Clone)]
pub struct Resolver {
  config: BuildConfig,
}

impl Resolver {
  pub fn new(config: BuildConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  /// Resolve the project root with the configured target request.
  pub fn resolve_root(&self) -> Result<Resolution, ResolveError> {
    self.resolve(BuildInfo::for_target(self.config.target.clone()), ".")
  }

  /// Resolve the tree rooted at `rel_dir` (relative to the project root).
  ///
  /// The first failure anywhere in the tree aborts the whole resolution.
  pub fn resolve(&self, info: BuildInfo, rel_dir: &str) -> Result<Resolution, ResolveError> {
    let mut walk = Walk {
      config: &self.config,
      platform: self.config.platform.clone(),
      output_root: String::new(),
      commands: CommandList::new(),
    };
    let artifacts = walk.traverse(info, &clean(rel_dir), 0)?;

    Ok(Resolution {
      commands: walk.commands,
      artifacts,
      output_root: walk.output_root,
      platform: walk.platform,
    })
  }
}

/// Pick the active target.
///
/// An explicit selector matches by name only. Otherwise a known target name
/// prefers a `by_target` match, then a name match, and everything falls back
/// to the first target.
pub fn select_target<'a>(selector: Option<&str>, current: &str, targets: &'a [Target]) -> Option<&'a Target> {
  if let Some(name) = selector.filter(|s| !s.is_empty()) {
    return targets.iter().find(|t| t.name == name);
  }
  if !current.is_empty() {
    if let Some(t) = targets.iter().find(|t| t.by_target == current) {
      return Some(t);
    }
    if let Some(t) = targets.iter().find(|t| t.name == current) {
      return Some(t);
    }
  }
  targets.first()
}

/// State of one resolution run.
struct Walk<'a> {
  config: &'a BuildConfig,
  platform: String,
  output_root: String,
  commands: CommandList,
}

impl Walk<'_> {
  fn traverse(&mut self, mut info: BuildInfo, rel_dir: &str, level: usize) -> Result<Vec<String>, ResolveError> {
    debug!(dir = %rel_dir, "enter");

    let descriptor_path = join_paths(&[rel_dir, DESCRIPTOR_FILENAME]);
    let descriptor = load_descriptor(&self.config.root.join(&descriptor_path))?;
    self.commands.record_descriptor(descriptor_path);
    info.source_dir = rel_dir.to_string();

    let selector = info.select_target.take();
    let current = select_target(selector.as_deref(), &info.target, &descriptor.target)
      .cloned()
      .ok_or_else(|| ResolveError::NoTarget {
        dir: rel_dir.to_string(),
        selector,
      })?;
    if info.target.is_empty() {
      info.target = current.name.clone();
      debug!(target = %info.target, "target selected");
    }

    if level == 0 {
      self.enter_root(&descriptor);
    }

    self.merge_variables(&mut info, &descriptor);
    info.output_dir = join_paths(&[self.output_root.as_str(), rel_dir]);
    self.merge_options(&mut info, &descriptor)?;

    for subninja in self.items(&info, &descriptor.subninja) {
      self.commands.add_subninja(subninja);
    }
    self.register_other_rules(&mut info, &descriptor.other)?;

    let files = self.items(&info, &descriptor.source);
    let convert_files = self.items(&info, &descriptor.convert_list);
    let test_files = self.items(&info, &descriptor.tests);

    let mut sub_artifacts = Vec::new();
    for sub in self.items(&info, &descriptor.subdirs) {
      let child_dir = join_paths(&[rel_dir, sub.as_str()]);
      sub_artifacts.extend(self.traverse(info.clone(), &child_dir, level + 1)?);
    }

    self.custom_rules(&info, &descriptor.prebuild)?;
    let objects = self.compile_files(&info, &files)?;

    let result = match &current.kind {
      TargetKind::Library => {
        if objects.is_empty() {
          warn!(dir = %rel_dir, "there are no files to build");
          Vec::new()
        } else {
          let lib = self.create_archive(&info, &objects, &current.name)?;
          sub_artifacts.push(lib);
          sub_artifacts
        }
      }
      TargetKind::Execute => {
        if objects.is_empty() && sub_artifacts.is_empty() {
          warn!(dir = %rel_dir, "there are no files to build");
        } else {
          let inputs: Vec<String> = objects.into_iter().chain(sub_artifacts).collect();
          self.create_link(&info, inputs, &current.name, Some(&current.packager))?;
        }
        Vec::new()
      }
      TargetKind::Convert => {
        if convert_files.is_empty() {
          warn!(dir = %rel_dir, "there are no files to convert");
        } else {
          self.create_convert(&info, &convert_files, &current.name)?;
        }
        Vec::new()
      }
      TargetKind::Test => {
        self.create_tests(&info, &test_files, &sub_artifacts)?;
        sub_artifacts.extend(objects);
        sub_artifacts
      }
      TargetKind::Passthrough | TargetKind::Other(_) => {
        sub_artifacts.extend(objects);
        sub_artifacts
      }
    };

    self.custom_rules(&info, &descriptor.postbuild)?;

    debug!(dir = %rel_dir, artifacts = ?result, "leave");
    Ok(result)
  }

  fn enter_root(&mut self, descriptor: &Descriptor) {
    if self.platform == DEFAULT_PLATFORM {
      if let Some(default_type) = descriptor.default_type() {
        self.platform = default_type.to_string();
      }
    }
    self.output_root = join_paths(&[
      self.config.output_dir.as_str(),
      self.platform.as_str(),
      self.config.variant.dir_name(),
    ]);
    self.commands.settings_mut().build_dir = self.output_root.clone();
    debug!(platform = %self.platform, output = %self.output_root, "output root");
  }

  fn merge_variables(&mut self, info: &mut BuildInfo, descriptor: &Descriptor) {
    for variable in &descriptor.variable {
      let Some(value) = variable.value_for(&info.target, &self.platform, self.config.variant) else {
        continue;
      };
      let settings = self.commands.settings_mut();
      match variable.name.as_str() {
        vars::ENABLE_RESPONSE => settings.enable_response = to_boolean(value),
        vars::RESPONSE_NEWLINE => settings.response_newline = to_boolean(value),
        vars::GROUP_ARCHIVES => settings.group_archives = to_boolean(value),
        _ => {}
      }
      info.variables.insert(variable.name.clone(), value.to_string());
    }
  }

  fn merge_options(&self, info: &mut BuildInfo, descriptor: &Descriptor) -> Result<(), ResolveError> {
    for path in self.items(info, &descriptor.include) {
      let path = self.include_path(info, &path)?;
      info.add_include(&path);
    }
    for def in self.items(info, &descriptor.define) {
      info.add_define(&def);
    }

    let prefix = info.option_prefix().to_string();
    let library_prefix = format!("{prefix}l");
    let categories: [(&[StringList], fn(&mut BuildInfo) -> &mut Vec<String>, &str); 6] = [
      (&descriptor.option, |i| &mut i.options, &prefix),
      (&descriptor.archive_option, |i| &mut i.archive_options, ""),
      (&descriptor.convert_option, |i| &mut i.convert_options, ""),
      (&descriptor.link_option, |i| &mut i.link_options, &prefix),
      (&descriptor.libraries, |i| &mut i.libraries, &library_prefix),
      (&descriptor.link_depend, |i| &mut i.link_depends, ""),
    ];
    for (lists, field, flag_prefix) in categories {
      let items = self.items(info, lists);
      let mut list = std::mem::take(field(info));
      let result = items
        .iter()
        .try_for_each(|item| info.append_option(&mut list, item, flag_prefix));
      *field(info) = list;
      result?;
    }
    Ok(())
  }

  // `$output...` lives under the output directory, other `$` entries are
  // used as expanded, everything else is relative to the descriptor.
  fn include_path(&self, info: &BuildInfo, path: &str) -> Result<String, ResolveError> {
    if let Some(rest) = path.strip_prefix("$output") {
      let generated = join_paths(&[info.output_dir.as_str(), format!("output{rest}").as_str()]);
      return self.absolute(&generated);
    }
    let as_is = path.starts_with('$');
    let expanded = info.strict_interpolate(path)?;
    if as_is || std::path::Path::new(&expanded).is_absolute() {
      self.absolute(&expanded)
    } else {
      self.absolute(&join_paths(&[info.source_dir.as_str(), expanded.as_str()]))
    }
  }

  fn items(&self, info: &BuildInfo, lists: &[StringList]) -> Vec<String> {
    select_items(lists, &info.target, &self.platform, self.config.variant)
  }

  fn absolute(&self, path: &str) -> Result<String, ResolveError> {
    absolute_from(&self.config.root, path).map_err(|source| ResolveError::AbsolutePath {
      path: path.to_string(),
      source,
    })
  }
}
