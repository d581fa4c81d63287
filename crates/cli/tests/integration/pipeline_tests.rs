use predicates::prelude::*;
use serial_test::serial;

use super::common::{REVISION, TestEnv};

fn is_tool(line: &str, tool: &str) -> bool {
  line.starts_with(&format!("{} ", tool))
}

#[test]
#[serial]
fn gen_headers_from_scratch_fetches_configures_and_exports() {
  let env = TestEnv::new();

  env
    .monolith_cmd()
    .arg("--gen-headers")
    .assert()
    .success()
    .stdout(predicate::str::contains("Syncing..."))
    .stdout(predicate::str::contains("Done. Took"));

  let log = env.take_log();
  assert_eq!(log.len(), 3, "unexpected tool log: {:?}", log);
  assert_eq!(
    log[0],
    "gclient config --name v8 --unmanaged https://chromium.googlesource.com/v8/v8.git toolchain=0"
  );
  assert_eq!(
    log[1],
    format!("gclient sync --revision {} --shallow --no-history toolchain=0", REVISION)
  );
  assert!(is_tool(&log[2], "gn"));
  assert!(log[2].contains("--args=is_component_build=false v8_monolithic=true"));
  assert!(!log.iter().any(|l| is_tool(l, "ninja")));

  let include = env.header_out().join("include");
  assert!(include.join("v8.h").exists());
  assert!(include.join("libplatform/libplatform.h").exists());
  assert!(include.join("cppgc/heap.h").exists());
  assert!(!include.join("OWNERS").exists());
  assert!(!include.join("js_protocol").exists());
}

#[test]
#[serial]
fn repeated_gen_headers_is_a_no_op() {
  let env = TestEnv::new();
  env.monolith_cmd().arg("--gen-headers").assert().success();
  env.take_log();

  env
    .monolith_cmd()
    .arg("--gen-headers")
    .assert()
    .success()
    .stdout(predicate::str::contains("already up to date"));

  assert!(env.take_log().is_empty());
}

#[test]
#[serial]
fn strict_reuse_also_skips_unchanged_configuration() {
  let env = TestEnv::new();
  env.monolith_cmd().args(["--gen-headers", "--strict-reuse"]).assert().success();
  env.take_log();

  env
    .monolith_cmd()
    .args(["--gen-headers", "--strict-reuse"])
    .assert()
    .success()
    .stdout(predicate::str::contains("already up to date"));

  assert!(env.take_log().is_empty());
}

#[test]
#[serial]
fn changed_flags_trigger_reconfigure() {
  let env = TestEnv::new();
  env.monolith_cmd().arg("--gen-headers").assert().success();
  env.take_log();

  env.monolith_cmd().args(["--gen-headers", "--is-clang"]).assert().success();

  let log = env.take_log();
  assert_eq!(log.len(), 3);
  assert!(log[2].contains("is_clang=true"));
}

#[test]
#[serial]
fn build_alone_runs_only_the_executor() {
  let env = TestEnv::new();
  env.monolith_cmd().arg("--gen-headers").assert().success();
  env.take_log();

  env
    .monolith_cmd()
    .arg("--build")
    .assert()
    .success()
    .stdout(predicate::str::contains("Building v8_monolith..."));

  let log = env.take_log();
  assert_eq!(log.len(), 1, "unexpected tool log: {:?}", log);
  assert!(log[0].starts_with("ninja -C out/"));
  assert!(log[0].ends_with(" v8_monolith"));

  for name in ["libv8_monolith.a", "libv8_libplatform.a", "libv8_libbase.a"] {
    assert!(env.build_dir().join(name).exists(), "{} not copied", name);
  }
}

#[test]
#[serial]
fn no_phase_flags_runs_full_pipeline() {
  let env = TestEnv::new();
  let artifacts = env.temp.path().join("artifacts");

  env
    .monolith_cmd()
    .arg("--artifact-out")
    .arg(&artifacts)
    .assert()
    .success();

  let tools: Vec<String> = env
    .take_log()
    .iter()
    .map(|l| l.split(' ').next().unwrap().to_string())
    .collect();
  assert_eq!(tools, vec!["gclient", "gclient", "gn", "ninja"]);
  assert!(artifacts.join("libv8_monolith.a").exists());
}

#[test]
#[serial]
fn executor_failure_propagates_exit_status() {
  let env = TestEnv::new();

  env
    .monolith_cmd()
    .arg("--build")
    .env("FAKE_NINJA_EXIT", "1")
    .assert()
    .code(1)
    .stdout(predicate::str::contains("Done").not())
    .stderr(predicate::str::contains("executor failed"));

  assert!(!env.build_dir().join("libv8_monolith.a").exists());
}

#[test]
#[serial]
fn executor_status_is_passed_through_verbatim() {
  let env = TestEnv::new();

  env.monolith_cmd().arg("--build").env("FAKE_NINJA_EXIT", "3").assert().code(3);
}

#[test]
#[serial]
fn fetch_failure_stops_the_pipeline() {
  let env = TestEnv::new();

  env
    .monolith_cmd()
    .arg("--gen-headers")
    .env("FAKE_GCLIENT_EXIT", "2")
    .assert()
    .code(2);

  let log = env.take_log();
  assert_eq!(log.len(), 1);
  assert!(!env.header_out().join("include").exists());
}

#[test]
#[serial]
fn missing_tool_is_reported() {
  let env = TestEnv::new();
  std::fs::remove_file(env.tool("gn")).unwrap();

  env
    .monolith_cmd()
    .arg("--gen-headers")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("failed to start generator"));
}

#[test]
#[serial]
fn json_output_reports_decision() {
  let env = TestEnv::new();

  env
    .monolith_cmd()
    .args(["--gen-headers", "-o", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"action\": \"reconfigure\""))
    .stdout(predicate::str::contains("\"reason\": \"no_record\""))
    .stdout(predicate::str::contains("\"files_copied\": 3"))
    .stdout(predicate::str::contains("\"mode\": \"monolithic\""))
    .stdout(predicate::str::contains("Syncing").not());
}

#[test]
#[serial]
fn custom_artifact_manifest_limits_copy() {
  let env = TestEnv::new();
  let manifest = env.temp.path().join("artifacts.toml");
  std::fs::write(&manifest, "[[monolithic]]\nname = \"v8_monolith\"\nkind = \"static-library\"\n").unwrap();

  env.monolith_cmd().arg("--artifacts").arg(&manifest).assert().success();

  assert!(env.build_dir().join("libv8_monolith.a").exists());
  assert!(!env.build_dir().join("libv8_libbase.a").exists());
}
