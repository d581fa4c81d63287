//! Shared test helpers for CLI integration tests.
//!
//! The three external tools are replaced by small shell scripts that append
//! their command line to a log file and leave behind what the real tool would.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

pub const REVISION: &str = "12.4.254.21";

const FAKE_GCLIENT: &str = r#"#!/bin/sh
echo "gclient $* toolchain=$DEPOT_TOOLS_WIN_TOOLCHAIN" >> "$MONOLITH_TOOL_LOG"
if [ "$1" = "sync" ]; then
  mkdir -p v8/include/libplatform v8/include/cppgc v8/include/js_protocol
  echo v8 > v8/include/v8.h
  echo lp > v8/include/libplatform/libplatform.h
  echo heap > v8/include/cppgc/heap.h
  echo skipped > v8/include/js_protocol/protocol.h
  echo owners > v8/include/OWNERS
fi
exit "${FAKE_GCLIENT_EXIT:-0}"
"#;

const FAKE_GN: &str = r#"#!/bin/sh
echo "gn $*" >> "$MONOLITH_TOOL_LOG"
if [ -n "$FAKE_GN_EXIT" ]; then
  exit "$FAKE_GN_EXIT"
fi
mkdir -p "$2"
printf '%s\n' "${3#--args=}" | tr ' ' '\n' > "$2/args.gn"
"#;

const FAKE_NINJA: &str = r#"#!/bin/sh
echo "ninja $*" >> "$MONOLITH_TOOL_LOG"
if [ -n "$FAKE_NINJA_EXIT" ]; then
  exit "$FAKE_NINJA_EXIT"
fi
mkdir -p "$2/obj"
for name in v8_monolith v8_libplatform v8_libbase; do
  echo "$name" > "$2/obj/lib$name.a"
done
"#;

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the fake tools, the
/// build directory, the header output and the tool log.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let tools = temp.path().join("tools");
    std::fs::create_dir_all(&tools).unwrap();
    for (name, script) in [("gclient", FAKE_GCLIENT), ("gn", FAKE_GN), ("ninja", FAKE_NINJA)] {
      write_executable(&tools.join(name), script);
    }
    Self { temp }
  }

  pub fn tool(&self, name: &str) -> PathBuf {
    self.temp.path().join("tools").join(name)
  }

  pub fn build_dir(&self) -> PathBuf {
    self.temp.path().join("build")
  }

  pub fn header_out(&self) -> PathBuf {
    self.temp.path().join("headers")
  }

  pub fn log_path(&self) -> PathBuf {
    self.temp.path().join("tools.log")
  }

  /// Tool command lines in invocation order. Clears the log.
  pub fn take_log(&self) -> Vec<String> {
    let log = std::fs::read_to_string(self.log_path()).unwrap_or_default();
    let _ = std::fs::remove_file(self.log_path());
    log.lines().map(str::to_string).collect()
  }

  /// A monolith command with the three tool paths and directories filled in.
  pub fn monolith_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("monolith");
    cmd.arg(self.tool("gclient"));
    cmd.arg(self.tool("gn"));
    cmd.arg(self.tool("ninja"));
    cmd.arg("--build-dir").arg(self.build_dir());
    cmd.arg("--header-out").arg(self.header_out());
    cmd.args(["--revision", REVISION]);
    cmd.env("MONOLITH_TOOL_LOG", self.log_path());
    cmd.env_remove("RUST_LOG");
    cmd
  }
}

fn write_executable(path: &Path, script: &str) {
  std::fs::write(path, script).unwrap();
  let mut perms = std::fs::metadata(path).unwrap().permissions();
  perms.set_mode(0o755);
  std::fs::set_permissions(path, perms).unwrap();
}
