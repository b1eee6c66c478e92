//! Tests for the generated ninja file, compilation database and vcxproj.

use cbuild_lib::outputs::{
  CompileDbItem, VcxprojOptions, compile_db_items, create_compile_db_file, create_ninja_file, create_vcxproj_file,
  vcxproj_from_commands, write_vcxproj,
};

use super::common::{Project, TOOLCHAIN, app_with_core};

#[test]
fn ninja_file_for_a_tree() {
  let project = app_with_core();
  let resolution = project.resolve(project.config("LINUX")).unwrap();
  let path = project.root().join("build.ninja");

  create_ninja_file(&path, &resolution.commands, "cbuild ninja --type LINUX").unwrap();

  let text = std::fs::read_to_string(&path).unwrap();
  assert!(text.contains("builddir = build/LINUX/Debug\n"));
  assert!(text.contains("regenerate make.yml core/make.yml\n"));
  assert!(text.contains("build build/LINUX/Debug/core/libcore.a: ar build/LINUX/Debug/core/.objs/core.cpp.o\n"));
  assert!(text.contains(
    "build build/LINUX/Debug/app: link build/LINUX/Debug/.objs/main.cpp.o build/LINUX/Debug/core/libcore.a\n"
  ));
  assert!(text.contains("  depfile = build/LINUX/Debug/.objs/main.cpp.d\n"));
}

#[test]
fn compile_database_for_a_tree() {
  let project = app_with_core();
  let resolution = project.resolve(project.config("LINUX")).unwrap();
  let directory = project.abs(".");
  let path = project.root().join("compile_commands.json");

  let items = compile_db_items(resolution.commands.commands(), &directory);
  create_compile_db_file(&path, &items).unwrap();

  let parsed: Vec<CompileDbItem> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
  assert_eq!(parsed.len(), 2);
  assert_eq!(parsed[0].file, project.abs("core/core.cpp"));
  assert_eq!(parsed[0].output, "build/LINUX/Debug/core/.objs/core.cpp.o");
  assert_eq!(parsed[0].arguments[0], "clang++");
  assert_eq!(parsed[1].directory, directory);
}

#[test]
fn vcxproj_for_a_tree() {
  let project = app_with_core();
  project.write(
    "core/make.yml",
    r#"
target:
- name: core
  type: library
include:
- list: [include]
define:
- list: [CORE_STATIC, VERSION=3]
source:
- list: [core.cpp]
"#,
  );
  let resolution = project.resolve(project.config("WIN64")).unwrap();
  let options = VcxprojOptions {
    name: "app".to_string(),
    configuration: "Debug".to_string(),
    platform: "x64".to_string(),
    build_command: "cbuild build --type WIN64".to_string(),
    directory: project.abs("."),
  };
  let vcxproj = vcxproj_from_commands(resolution.commands.commands(), &options);
  assert_eq!(
    vcxproj.sources().collect::<Vec<_>>(),
    vec![project.abs("core/core.cpp"), project.abs("main.cpp")]
  );

  let path = project.root().join("app.vcxproj");
  create_vcxproj_file(&path, &vcxproj).unwrap();

  let text = std::fs::read_to_string(&path).unwrap();
  assert!(text.contains(&format!("<ClCompile Include=\"{}\"", project.abs("main.cpp"))));
  assert!(text.contains(&format!(
    "<NMakeIncludeSearchPath>{}</NMakeIncludeSearchPath>",
    project.abs("core/include")
  )));
  assert!(text.contains("<NMakePreprocessorDefinitions>CORE_STATIC;VERSION=3</NMakePreprocessorDefinitions>"));
  assert!(text.contains(&format!("<NMakeOutput>{}", project.abs("build/WIN64/Debug/app"))));
}

#[test]
fn vcxproj_without_links_has_no_output() {
  let project = Project::new();
  project.write(
    "make.yml",
    &format!(
      r#"
target:
- name: core
  type: library
{TOOLCHAIN}
source:
- list: [core.cpp]
"#
    ),
  );
  let resolution = project.resolve(project.config("WIN64")).unwrap();
  let options = VcxprojOptions {
    name: "core".to_string(),
    configuration: "Debug".to_string(),
    platform: "x64".to_string(),
    build_command: "cbuild build".to_string(),
    directory: project.abs("."),
  };

  let mut buf = Vec::new();
  write_vcxproj(&mut buf, &vcxproj_from_commands(resolution.commands.commands(), &options)).unwrap();
  let text = String::from_utf8(buf).unwrap();
  assert!(text.contains(&format!("<ClCompile Include=\"{}\"", project.abs("core.cpp"))));
  assert!(!text.contains("NMakeOutput"));
}
