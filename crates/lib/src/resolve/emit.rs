//! Compile, archive, link, package, convert and test commands.

use tracing::{debug, trace};

use crate::build::{BuildCommand, CommandKind};
use crate::consts::{OBJECT_DIR, PCH_SOURCE, vars};
use crate::descriptor::Packager;
use crate::platform::PlatformId;
use crate::util::paths::{base_name, dir_name, extension, join_paths, replace_extension};

use super::{BuildInfo, ResolveError, Walk};

/// Where a compiled source and its outputs live.
pub(super) struct ObjectPaths {
  pub(super) src: String,
  pub(super) obj: String,
  pub(super) dep: String,
}

fn bind_io(opt: &str, out: &str, input: &str, dep: &str) -> String {
  match opt {
    "$out" => out.to_string(),
    "$in" => input.to_string(),
    "$dep" => dep.to_string(),
    other => other.to_string(),
  }
}

impl Walk<'_> {
  /// Compile `files` and return their objects, in order.
  ///
  /// Sources with a registered `other` extension use that rule instead of the
  /// compiler. They yield an object only when the rule emitted a command.
  pub(super) fn compile_files(&mut self, info: &BuildInfo, files: &[String]) -> Result<Vec<String>, ResolveError> {
    if files.is_empty() {
      return Ok(Vec::new());
    }
    let compiler = info.expand_variable(vars::COMPILER)?;
    let pch = self.create_pch(info, &compiler)?;

    let mut objects = Vec::with_capacity(files.len());
    for file in files {
      let paths = self.object_paths(info, file)?;

      if let Some(rule) = info.other_rules.get(extension(&paths.src)) {
        let ext = extension(&paths.src).to_string();
        if self.compile_with_rule(info, &ext, rule, &paths)? {
          objects.push(paths.obj);
        }
        continue;
      }
      objects.push(paths.obj.clone());

      let mut args: Vec<String> = info.includes.iter().chain(&info.defines).cloned().collect();
      args.extend(info.options.iter().map(|o| bind_io(o, &paths.obj, &paths.src, &paths.dep)));
      let mut implicit = Vec::new();
      if let Some(pch) = &pch {
        args.push("-include-pch".to_string());
        args.push(pch.clone());
        implicit.push(pch.clone());
      }
      args.extend(["-o".to_string(), paths.obj.clone(), paths.src.clone()]);

      trace!(src = %paths.src, obj = %paths.obj, "compile");
      self.commands.push(
        BuildCommand::new(CommandKind::Compile, compiler.clone(), paths.obj)
          .with_args(args)
          .with_inputs(vec![paths.src])
          .with_dep_file(paths.dep)
          .with_implicit_depends(implicit)
          .with_title(format!("Compile: {}", join_paths(&[info.source_dir.as_str(), file.as_str()]))),
      );
    }
    Ok(objects)
  }

  // `$target/x` and `$x` are generated under the output directory; anything
  // else is relative to the descriptor. Objects go to `.objs` next to the
  // source's output location.
  fn object_paths(&self, info: &BuildInfo, file: &str) -> Result<ObjectPaths, ResolveError> {
    let (src, obj_dir, base) = match file.strip_prefix('$') {
      Some(generated) => {
        let rel = match generated.strip_prefix("target/") {
          Some(rest) => format!(".{}/{}", info.target, rest),
          None => generated.to_string(),
        };
        let src = join_paths(&[info.output_dir.as_str(), rel.as_str()]);
        let obj_dir = join_paths(&[dir_name(&src).as_str(), OBJECT_DIR]);
        (src, obj_dir, base_name(&rel).to_string())
      }
      None => {
        let src = join_paths(&[info.source_dir.as_str(), file]);
        let out = join_paths(&[info.output_dir.as_str(), file]);
        let obj_dir = join_paths(&[dir_name(&out).as_str(), OBJECT_DIR]);
        let base = base_name(&src).to_string();
        (src, obj_dir, base)
      }
    };
    Ok(ObjectPaths {
      src: self.absolute(&src)?,
      obj: join_paths(&[obj_dir.as_str(), format!("{base}.o").as_str()]),
      dep: join_paths(&[obj_dir.as_str(), format!("{base}.d").as_str()]),
    })
  }

  /// Emit the precompiled header command when the directory has a common
  /// prefix header. Returns the `.pch` path.
  fn create_pch(&mut self, info: &BuildInfo, compiler: &str) -> Result<Option<String>, ResolveError> {
    let src = join_paths(&[info.source_dir.as_str(), PCH_SOURCE]);
    if !self.config.root.join(&src).is_file() {
      trace!(path = %src, "no precompiled header");
      return Ok(None);
    }

    let dst = join_paths(&[info.output_dir.as_str(), OBJECT_DIR, format!("{PCH_SOURCE}.pch").as_str()]);
    if self
      .commands
      .iter()
      .any(|c| c.kind == CommandKind::Pch && c.out_file == dst)
    {
      return Ok(Some(dst));
    }

    let dep = format!("{dst}.dep");
    let src_abs = self.absolute(&src)?;
    let mut args: Vec<String> = info.includes.iter().chain(&info.defines).cloned().collect();
    args.extend(info.options.iter().map(|o| bind_io(o, &dst, &src_abs, &dep)));
    args.extend(["-x", "c++-header", "-o"].map(String::from));
    args.push(dst.clone());
    args.push(src_abs.clone());

    debug!(pch = %dst, "precompiled header found");
    self.commands.push(
      BuildCommand::new(CommandKind::Pch, compiler, dst.clone())
        .with_args(args)
        .with_inputs(vec![src_abs])
        .with_dep_file(dep)
        .with_title(format!("Create PCH: {src}")),
    );
    Ok(Some(dst))
  }

  /// Archive `objects` into the platform-conventional library name.
  pub(super) fn create_archive(
    &mut self,
    info: &BuildInfo,
    objects: &[String],
    name: &str,
  ) -> Result<String, ResolveError> {
    let archiver = info.expand_variable(vars::ARCHIVER)?;
    let file_name = if PlatformId::from(self.platform.as_str()).is_windows_family() {
      format!("{name}.lib")
    } else {
      format!("lib{name}.a")
    };
    let out = join_paths(&[info.output_dir.as_str(), file_name.as_str()]);

    let mut args = info.archive_options.clone();
    args.push(out.clone());
    args.extend(objects.iter().cloned());

    self.commands.push(
      BuildCommand::new(CommandKind::Archive, archiver, out.clone())
        .with_args(args)
        .with_inputs(objects.to_vec())
        .with_title(format!("Library: {name}")),
    );
    Ok(out)
  }

  /// Link `inputs` into `<output>/<name><execute_suffix>`, then package it
  /// when the target has a packager.
  pub(super) fn create_link(
    &mut self,
    info: &BuildInfo,
    inputs: Vec<String>,
    name: &str,
    packager: Option<&Packager>,
  ) -> Result<String, ResolveError> {
    let linker = info.expand_variable(vars::LINKER)?;
    let out = info.make_executable_path(name);

    let mut args = vec!["-o".to_string(), out.clone()];
    args.extend(info.link_options.iter().map(|o| o.replace("$out", &out)));
    args.extend(inputs.iter().cloned());
    args.extend(info.libraries.iter().cloned());

    self.commands.push(
      BuildCommand::new(CommandKind::Link, linker, out.clone())
        .with_args(args)
        .with_inputs(inputs)
        .with_implicit_depends(info.link_depends.clone())
        .with_title(format!("Linking: {name}")),
    );

    if let Some(packager) = packager.filter(|p| !p.target.is_empty()) {
      self.create_package(info, &out, name, packager)?;
    }
    Ok(out)
  }

  fn create_package(
    &mut self,
    info: &BuildInfo,
    exe: &str,
    name: &str,
    packager: &Packager,
  ) -> Result<(), ResolveError> {
    let command = info.expand_variable(vars::PACKAGER)?;
    let out = join_paths(&[self.output_root.as_str(), name, packager.target.as_str()]);

    let mut args = Vec::new();
    for word in packager.option.split(' ').filter(|w| !w.is_empty()) {
      args.push(info.interpolate(word)?);
    }
    args.push(exe.to_string());
    args.push(out.clone());

    self.commands.push(
      BuildCommand::new(CommandKind::Package, command, out)
        .with_args(args)
        .with_inputs(vec![exe.to_string()])
        .with_title(format!("Package: {name}")),
    );
    Ok(())
  }

  pub(super) fn create_convert(
    &mut self,
    info: &BuildInfo,
    files: &[String],
    name: &str,
  ) -> Result<String, ResolveError> {
    let converter = info.expand_variable(vars::CONVERTER)?;
    let out = join_paths(&[info.output_dir.as_str(), name]);
    let inputs: Vec<String> = files
      .iter()
      .map(|f| join_paths(&[info.source_dir.as_str(), f.as_str()]))
      .collect();

    let mut args = info.convert_options.clone();
    args.push("-o".to_string());
    args.push(out.clone());
    args.extend(inputs.iter().cloned());

    self.commands.push(
      BuildCommand::new(CommandKind::Convert, converter, out.clone())
        .with_args(args)
        .with_inputs(inputs)
        .with_title(format!("Convert: {name}")),
    );
    Ok(out)
  }

  /// Compile each test driver and link it with the directory's
  /// sub-artifacts into its own executable.
  pub(super) fn create_tests(
    &mut self,
    info: &BuildInfo,
    tests: &[String],
    sub_artifacts: &[String],
  ) -> Result<(), ResolveError> {
    let objects = self.compile_files(info, tests)?;
    for (test, object) in tests.iter().zip(objects) {
      let name = replace_extension(test, "");
      let inputs = std::iter::once(object).chain(sub_artifacts.iter().cloned()).collect();
      self.create_link(info, inputs, &name, None)?;
    }
    Ok(())
  }
}
