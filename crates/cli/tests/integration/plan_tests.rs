//! `cbuild plan` against real descriptor trees.

use predicates::prelude::*;
use serde_json::Value;
use serial_test::serial;

use super::common::TestEnv;

fn plan_json(env: &TestEnv, extra: &[&str]) -> Value {
  let output = env
    .cmd("plan")
    .args(["--format", "json"])
    .args(extra)
    .output()
    .unwrap();
  assert!(
    output.status.success(),
    "plan failed: {}",
    String::from_utf8_lossy(&output.stderr)
  );
  serde_json::from_slice(&output.stdout).unwrap()
}

// =============================================================================
// Text output
// =============================================================================

#[test]
fn prints_command_lines_and_summary() {
  let env = TestEnv::app_with_core();

  env
    .cmd("plan")
    .arg("--type")
    .arg("LINUX")
    .assert()
    .success()
    .stdout(predicate::str::contains("clang++"))
    .stdout(predicate::str::contains("-o build/LINUX/Debug/.objs/main.cpp.o"))
    .stdout(predicate::str::contains("Platform: LINUX"))
    .stdout(predicate::str::contains("Commands: 5"));
}

#[test]
fn empty_target_has_nothing_to_run() {
  let env = TestEnv::empty();
  env.write_file("make.yml", "target:\n- name: app\n  type: execute\n");

  env
    .cmd("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("No commands to run."));
}

#[test]
fn plan_writes_nothing() {
  let env = TestEnv::app_with_core();
  env.cmd("plan").assert().success();
  assert!(!env.path("build").exists());
}

// =============================================================================
// JSON output
// =============================================================================

#[test]
fn json_lists_commands_in_order() {
  let env = TestEnv::app_with_core();
  let plan = plan_json(&env, &[]);

  assert_eq!(plan["platform"], "default");
  assert_eq!(plan["output_root"], "build/default/Debug");

  let kinds: Vec<&str> = plan["commands"]
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["kind"]["kind"].as_str().unwrap())
    .collect();
  assert_eq!(kinds, vec!["compile", "compile", "archive", "compile", "link"]);
}

#[test]
fn variant_and_output_flags_shape_the_output_root() {
  let env = TestEnv::app_with_core();

  let plan = plan_json(&env, &["--release", "-o", "out", "--type", "MAC"]);
  assert_eq!(plan["output_root"], "out/MAC/Release");

  let plan = plan_json(&env, &["--develop-release"]);
  assert_eq!(plan["output_root"], "build/default/DevelopRelease");
}

#[test]
fn default_type_replaces_default_platform() {
  let env = TestEnv::empty();
  env.write_file(
    "make.yml",
    r#"
target:
- name: app
  type: execute
variable:
- name: default_type
  value: LINUX
- name: compiler
  value: clang++
- name: linker
  value: clang++
source:
- list: [main.cpp]
"#,
  );

  let plan = plan_json(&env, &[]);
  assert_eq!(plan["platform"], "LINUX");
  assert_eq!(plan["output_root"], "build/LINUX/Debug");

  let plan = plan_json(&env, &["--type", "WIN64"]);
  assert_eq!(plan["platform"], "WIN64");
}

// =============================================================================
// Target selection
// =============================================================================

#[test]
fn unknown_target_fails() {
  let env = TestEnv::app_with_core();

  env
    .cmd("plan")
    .args(["-t", "missing"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no target found"))
    .stderr(predicate::str::contains("missing"));
}

#[test]
fn positional_target_selects_by_name() {
  let env = TestEnv::empty();
  env.write_file(
    "make.yml",
    r#"
target:
- name: app
  type: execute
- name: tool
  type: library
variable:
- name: compiler
  value: clang++
- name: archiver
  value: ar
- name: linker
  value: clang++
source:
- list: [main.cpp]
"#,
  );

  let kinds = |plan: &Value| -> Vec<String> {
    plan["commands"]
      .as_array()
      .unwrap()
      .iter()
      .map(|c| c["kind"]["kind"].as_str().unwrap().to_string())
      .collect()
  };

  assert_eq!(kinds(&plan_json(&env, &[])), vec!["compile", "link"]);
  assert_eq!(kinds(&plan_json(&env, &["tool"])), vec!["compile", "archive"]);
  assert_eq!(kinds(&plan_json(&env, &["-t", "app", "tool"])), vec!["compile", "link"]);
}

// =============================================================================
// Compiler launcher detection
// =============================================================================

#[test]
#[serial]
fn launcher_is_reported_in_verbose_mode() {
  let env = TestEnv::app_with_core();
  env.write_file("sdk/Common/SN-DBS/bin/dbsbuild.exe", "");
  let sdk = env.path("sdk");

  temp_env::with_var("SCE_ROOT_DIR", Some(&sdk), || {
    env
      .cmd("plan")
      .arg("-v")
      .assert()
      .success()
      .stderr(predicate::str::contains("compiler launcher available"));
  });
}

#[test]
#[serial]
fn launcher_is_not_reported_without_sdk() {
  let env = TestEnv::app_with_core();

  temp_env::with_var_unset("SCE_ROOT_DIR", || {
    env
      .cmd("plan")
      .arg("-v")
      .assert()
      .success()
      .stderr(predicate::str::contains("compiler launcher").not());
  });
}
