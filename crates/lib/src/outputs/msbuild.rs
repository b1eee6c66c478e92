//! Visual Studio makefile project (`.vcxproj`) export.
//!
//! The project lists every compiled source so the IDE can browse and index
//! them, and delegates the build itself to cbuild through the NMake
//! properties.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::build::{BuildCommand, CommandKind};
use crate::util::paths::join_paths;

use super::transient::{TransientError, TransientOutput};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;
const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

#[derive(Debug, Error)]
pub enum MsBuildError {
  #[error("failed to serialize the project: {0}")]
  Serialize(String),

  #[error("failed to write the project file")]
  Write(#[source] io::Error),

  #[error(transparent)]
  Transient(#[from] TransientError),
}

/// Settings that don't come from the resolved commands.
#[derive(Debug, Clone)]
pub struct VcxprojOptions {
  pub name: String,
  /// `Debug`, `Release`, ...
  pub configuration: String,
  /// Visual Studio platform (`x64`, `Win32`).
  pub platform: String,
  /// Command line the IDE runs to build.
  pub build_command: String,
  /// Directory relative outputs are resolved against.
  pub directory: String,
}

/// Root `<Project>` element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename = "Project")]
pub struct VcxProject {
  #[serde(rename = "@DefaultTargets")]
  default_targets: &'static str,
  #[serde(rename = "@ToolsVersion")]
  tools_version: &'static str,
  #[serde(rename = "@xmlns")]
  xmlns: &'static str,
  #[serde(rename = "$value")]
  elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
enum Element {
  ItemGroup(ItemGroup),
  PropertyGroup(PropertyGroup),
  Import(Import),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
struct ItemGroup {
  #[serde(rename = "@Label", skip_serializing_if = "Option::is_none")]
  label: Option<&'static str>,
  #[serde(rename = "ProjectConfiguration", skip_serializing_if = "Vec::is_empty")]
  configurations: Vec<ProjectConfiguration>,
  #[serde(rename = "ClCompile", skip_serializing_if = "Vec::is_empty")]
  sources: Vec<IncludeItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ProjectConfiguration {
  #[serde(rename = "@Include")]
  include: String,
  #[serde(rename = "Configuration")]
  configuration: String,
  #[serde(rename = "Platform")]
  platform: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct IncludeItem {
  #[serde(rename = "@Include")]
  include: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PropertyGroup {
  #[serde(rename = "@Label", skip_serializing_if = "Option::is_none")]
  label: Option<&'static str>,
  #[serde(rename = "@Condition", skip_serializing_if = "Option::is_none")]
  condition: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  project_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  keyword: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  configuration_type: Option<&'static str>,
  #[serde(rename = "NMakeBuildCommandLine", skip_serializing_if = "Option::is_none")]
  nmake_build_command_line: Option<String>,
  #[serde(rename = "NMakeOutput", skip_serializing_if = "Option::is_none")]
  nmake_output: Option<String>,
  #[serde(rename = "NMakeIncludeSearchPath", skip_serializing_if = "Option::is_none")]
  nmake_include_search_path: Option<String>,
  #[serde(rename = "NMakePreprocessorDefinitions", skip_serializing_if = "Option::is_none")]
  nmake_preprocessor_definitions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Import {
  #[serde(rename = "@Project")]
  project: &'static str,
}

impl VcxProject {
  /// Sources listed as `ClCompile` items, in command order.
  pub fn sources(&self) -> impl Iterator<Item = &str> {
    self
      .elements
      .iter()
      .flat_map(|e| match e {
        Element::ItemGroup(group) => group.sources.iter(),
        _ => std::slice::Iter::default(),
      })
      .map(|item| item.include.as_str())
  }
}

/// Build the project for `commands`.
///
/// Only compile commands contribute sources. Include directories and defines
/// are read back from their `-I`/`-D` (or `/I`, `/D`) arguments, first
/// occurrence wins. The command's own input and output paths are never read
/// as switches. The last link output becomes `NMakeOutput`.
pub fn vcxproj_from_commands(commands: &[BuildCommand], options: &VcxprojOptions) -> VcxProject {
  let mut sources = Vec::new();
  let mut includes: Vec<String> = Vec::new();
  let mut defines: Vec<String> = Vec::new();
  let mut output = None;

  for command in commands {
    match command.kind {
      CommandKind::Compile => {
        sources.extend(command.in_files.iter().map(|f| IncludeItem { include: f.clone() }));
        let operands = |arg: &String| *arg == command.out_file || command.in_files.contains(arg);
        for arg in command.args.iter().filter(|a| !operands(a)) {
          if let Some(dir) = switch_value(arg, 'I') {
            push_unique(&mut includes, dir);
          } else if let Some(define) = switch_value(arg, 'D') {
            push_unique(&mut defines, define);
          }
        }
      }
      CommandKind::Link => output = Some(command.out_file.as_str()),
      _ => {}
    }
  }
  debug!(
    sources = sources.len(),
    includes = includes.len(),
    defines = defines.len(),
    "vcxproj collected"
  );

  let condition = format!(
    "'$(Configuration)|$(Platform)'=='{}|{}'",
    options.configuration, options.platform
  );
  let elements = vec![
    Element::ItemGroup(ItemGroup {
      label: Some("ProjectConfigurations"),
      configurations: vec![ProjectConfiguration {
        include: format!("{}|{}", options.configuration, options.platform),
        configuration: options.configuration.clone(),
        platform: options.platform.clone(),
      }],
      ..ItemGroup::default()
    }),
    Element::PropertyGroup(PropertyGroup {
      label: Some("Globals"),
      project_name: Some(options.name.clone()),
      keyword: Some("MakeFileProj"),
      ..PropertyGroup::default()
    }),
    Element::Import(Import {
      project: r"$(VCTargetsPath)\Microsoft.Cpp.Default.props",
    }),
    Element::PropertyGroup(PropertyGroup {
      label: Some("Configuration"),
      condition: Some(condition.clone()),
      configuration_type: Some("Makefile"),
      ..PropertyGroup::default()
    }),
    Element::Import(Import {
      project: r"$(VCTargetsPath)\Microsoft.Cpp.props",
    }),
    Element::PropertyGroup(PropertyGroup {
      condition: Some(condition),
      nmake_build_command_line: Some(options.build_command.clone()),
      nmake_output: output.map(|out| resolve_output(out, &options.directory)),
      nmake_include_search_path: Some(includes.join(";")),
      nmake_preprocessor_definitions: Some(defines.join(";")),
      ..PropertyGroup::default()
    }),
    Element::ItemGroup(ItemGroup {
      sources,
      ..ItemGroup::default()
    }),
    Element::Import(Import {
      project: r"$(VCTargetsPath)\Microsoft.Cpp.targets",
    }),
  ];

  VcxProject {
    default_targets: "Build",
    tools_version: "4.0",
    xmlns: MSBUILD_NAMESPACE,
    elements,
  }
}

fn switch_value(arg: &str, switch: char) -> Option<&str> {
  let rest = arg.strip_prefix('-').or_else(|| arg.strip_prefix('/'))?;
  rest.strip_prefix(switch).filter(|v| !v.is_empty())
}

fn push_unique(list: &mut Vec<String>, value: &str) {
  if !list.iter().any(|v| v == value) {
    list.push(value.to_string());
  }
}

fn resolve_output(out: &str, directory: &str) -> String {
  if directory.is_empty() || Path::new(out).is_absolute() {
    out.to_string()
  } else {
    join_paths(&[directory, out])
  }
}

/// Write `project` as an XML document with 2-space indentation.
pub fn write_vcxproj<W: Write>(mut writer: W, project: &VcxProject) -> Result<(), MsBuildError> {
  let mut xml = String::new();
  let mut serializer = quick_xml::se::Serializer::new(&mut xml);
  serializer.indent(' ', 2);
  project
    .serialize(serializer)
    .map_err(|e| MsBuildError::Serialize(e.to_string()))?;

  writeln!(writer, "{XML_DECLARATION}").map_err(MsBuildError::Write)?;
  writeln!(writer, "{xml}").map_err(MsBuildError::Write)?;
  writer.flush().map_err(MsBuildError::Write)
}

/// Atomically replace `path` with `project`.
pub fn create_vcxproj_file(path: &Path, project: &VcxProject) -> Result<(), MsBuildError> {
  let mut out = TransientOutput::new(path)?;
  write_vcxproj(&mut out, project)?;
  out.commit()?;
  info!(path = %path.display(), sources = project.sources().count(), "vcxproj written");
  Ok(())
}
