//! Running resolved commands with a stand-in toolchain.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;

use cbuild_lib::build::execute::{ExecuteError, ExecuteOptions, execute_commands};

use super::common::Project;

// Writes a line naming its inputs to the path after `-o`.
const FAKE_CC: &str = r#"#!/bin/sh
out=""
inputs=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
    -*) ;;
    *) inputs="$inputs $1" ;;
  esac
  shift
done
echo "built:$inputs" > "$out"
"#;

// Writes its remaining arguments to its first argument.
const FAKE_AR: &str = r#"#!/bin/sh
out="$1"
shift
echo "archive: $*" > "$out"
"#;

fn install(project: &Project, name: &str, script: &str) -> String {
  project.write(&format!("tools/{name}"), script);
  let path = project.root().join("tools").join(name);
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  project.abs(&format!("tools/{name}"))
}

fn project() -> Project {
  let project = Project::new();
  let cc = install(&project, "cc", FAKE_CC);
  let ar = install(&project, "ar", FAKE_AR);
  project.write(
    "make.yml",
    &format!(
      r#"
target:
- name: app
  type: execute
variable:
- name: compiler
  value: {cc}
- name: archiver
  value: {ar}
- name: linker
  value: {cc}
subdir:
- list: [core]
source:
- list: [main.c]
"#
    ),
  );
  project.write("main.c", "int main(void) { return 0; }\n");
  project.write(
    "core/make.yml",
    r#"
target:
- name: core
  type: library
source:
- list: [core.c]
"#,
  );
  project.write("core/core.c", "int core(void) { return 1; }\n");
  project
}

#[tokio::test]
async fn builds_the_tree_in_order() {
  let project = project();
  let resolution = project.resolve(project.config("LINUX")).unwrap();
  let options = ExecuteOptions {
    working_dir: Some(project.root().to_path_buf()),
    shell: None,
  };

  let mut titles = Vec::new();
  let count = execute_commands(resolution.commands.commands(), &options, |_, cmd| {
    titles.push(cmd.title.clone())
  })
  .await
  .unwrap();

  assert_eq!(count, 4);
  assert_eq!(
    titles,
    vec!["Compile: core/core.c", "Library: core", "Compile: main.c", "Linking: app"]
  );

  let exe = std::fs::read_to_string(project.root().join("build/LINUX/Debug/app")).unwrap();
  assert!(exe.contains("build/LINUX/Debug/.objs/main.c.o"));
  assert!(exe.contains("build/LINUX/Debug/core/libcore.a"));
  let lib = std::fs::read_to_string(project.root().join("build/LINUX/Debug/core/libcore.a")).unwrap();
  assert!(lib.contains("core.c.o"));
}

#[tokio::test]
async fn failing_tool_stops_the_build() {
  let project = project();
  install(&project, "ar", "#!/bin/sh\nexit 2\n");
  let resolution = project.resolve(project.config("LINUX")).unwrap();
  let options = ExecuteOptions {
    working_dir: Some(project.root().to_path_buf()),
    shell: None,
  };

  let err = execute_commands(resolution.commands.commands(), &options, |_, _| {})
    .await
    .unwrap_err();

  assert!(matches!(err, ExecuteError::CmdFailed { code: Some(2), .. }));
  assert!(!project.root().join("build/LINUX/Debug/app").exists());
}
