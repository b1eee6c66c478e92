//! `cbuild ninja`, `cbuild compdb` and `cbuild msbuild`.

use predicates::prelude::*;
use serde_json::Value;

use super::common::TestEnv;

// =============================================================================
// ninja
// =============================================================================

#[test]
fn ninja_writes_rules_and_edges() {
  let env = TestEnv::app_with_core();

  env
    .cmd("ninja")
    .args(["--type", "LINUX"])
    .assert()
    .success()
    .stdout(predicate::str::contains("build.ninja"))
    .stdout(predicate::str::contains("Edges: 5"))
    .stdout(predicate::str::contains("Descriptors: 2"));

  let ninja = env.read("build.ninja");
  assert!(ninja.starts_with("# Generated by cbuild."));
  assert!(ninja.contains("builddir = build/LINUX/Debug"));
  assert!(ninja.contains("\nrule compile\n"));
  assert!(ninja.contains("\nrule regenerate\n"));
  assert!(ninja.contains("build always: phony"));
  assert!(ninja.contains("build build/LINUX/Debug/.objs/main.cpp.o: compile "));
  assert!(ninja.contains(": link build/LINUX/Debug/.objs/main.cpp.o"));
}

#[test]
fn ninja_regeneration_repeats_the_invocation() {
  let env = TestEnv::app_with_core();

  env
    .cmd("ninja")
    .args(["--type", "LINUX", "--product", "app"])
    .assert()
    .success();

  let ninja = env.read("build.ninja");
  let command = ninja
    .lines()
    .skip_while(|l| *l != "rule regenerate")
    .find(|l| l.trim_start().starts_with("command = "))
    .unwrap();
  assert!(command.contains(" ninja -C "));
  assert!(command.contains("--type LINUX"));
  assert!(command.contains("--product"));
  assert!(command.ends_with("-t app"));
}

#[test]
fn ninja_file_name_is_configurable() {
  let env = TestEnv::app_with_core();

  env.cmd("ninja").args(["-f", "out.ninja"]).assert().success();

  assert!(env.path("out.ninja").is_file());
  assert!(!env.path("build.ninja").exists());
}

#[test]
fn ninja_replaces_an_existing_file() {
  let env = TestEnv::app_with_core();
  env.write_file("build.ninja", "stale");

  env.cmd("ninja").assert().success();

  let ninja = env.read("build.ninja");
  assert!(!ninja.contains("stale"));
  let leftovers: Vec<_> = std::fs::read_dir(env.root())
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
    .filter(|n| n.starts_with("cb-"))
    .collect();
  assert!(leftovers.is_empty());
}

#[test]
fn ninja_skips_empty_projects() {
  let env = TestEnv::empty();
  env.write_file("make.yml", "target:\n- name: app\n  type: execute\n");

  env
    .cmd("ninja")
    .assert()
    .success()
    .stdout(predicate::str::contains("No commands to run."));

  assert!(!env.path("build.ninja").exists());
}

// =============================================================================
// compdb
// =============================================================================

#[test]
fn compdb_lists_every_compile() {
  let env = TestEnv::app_with_core();

  env
    .cmd("compdb")
    .assert()
    .success()
    .stdout(predicate::str::contains("Entries: 3"));

  let db: Value = serde_json::from_str(&env.read("compile_commands.json")).unwrap();
  let entries = db.as_array().unwrap();
  assert_eq!(entries.len(), 3);

  let root = cbuild_lib::util::paths::path_to_slash(&env.root());
  for entry in entries {
    assert_eq!(entry["directory"], root.as_str());
    assert_eq!(entry["arguments"][0], "clang++");
  }

  let files: Vec<&str> = entries.iter().map(|e| e["file"].as_str().unwrap()).collect();
  assert!(files[0].ends_with("core/core.cpp"));
  assert!(files[1].ends_with("core/util.cpp"));
  assert!(files[2].ends_with("/main.cpp"));
  assert_eq!(entries[2]["output"], "build/default/Debug/.objs/main.cpp.o");
}

#[test]
fn compdb_of_empty_project_is_an_empty_array() {
  let env = TestEnv::empty();
  env.write_file("make.yml", "target:\n- name: app\n  type: execute\n");

  env.cmd("compdb").args(["-f", "db.json"]).assert().success();

  assert_eq!(env.read("db.json"), "[]");
}

// =============================================================================
// msbuild
// =============================================================================

#[test]
fn msbuild_lists_compiled_sources() {
  let env = TestEnv::app_with_core();

  env
    .cmd("msbuild")
    .args(["--type", "WIN64", "--release"])
    .assert()
    .success()
    .stdout(predicate::str::contains("out.vcxproj"))
    .stdout(predicate::str::contains("Sources: 3"));

  let project = env.read("out.vcxproj");
  let root = cbuild_lib::util::paths::path_to_slash(&env.root());
  assert!(project.contains(&format!("<ClCompile Include=\"{root}/core/core.cpp\"")));
  assert!(project.contains(&format!("<ClCompile Include=\"{root}/core/util.cpp\"")));
  assert!(project.contains(&format!("<ClCompile Include=\"{root}/main.cpp\"")));
  assert!(project.contains("<ProjectConfiguration Include=\"Release|x64\">"));
  assert!(project.contains(&format!("<NMakeOutput>{root}/build/WIN64/Release/app")));
  assert!(project.contains(" build -C "));
  assert!(project.contains("--type WIN64"));
}

#[test]
fn msbuild_directory_and_name_are_configurable() {
  let env = TestEnv::app_with_core();

  env
    .cmd("msbuild")
    .args(["--msbuild-dir", "ide/vs", "--msbuild-proj", "game", "--vs-platform", "Win32"])
    .assert()
    .success();

  let project = env.read("ide/vs/game.vcxproj");
  assert!(project.contains("<ProjectName>game</ProjectName>"));
  assert!(project.contains("<ProjectConfiguration Include=\"Debug|Win32\">"));
  assert!(!env.path("out.vcxproj").exists());
}

#[test]
fn msbuild_skips_empty_projects() {
  let env = TestEnv::empty();
  env.write_file("make.yml", "target:\n- name: app\n  type: execute\n");

  env
    .cmd("msbuild")
    .assert()
    .success()
    .stdout(predicate::str::contains("No commands to run."));

  assert!(!env.path("out.vcxproj").exists());
}
