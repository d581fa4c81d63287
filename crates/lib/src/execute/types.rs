//! Types for invoking the external tools.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// The three external executables the orchestrator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
  /// Retrieves a pinned revision of the source tree.
  Fetcher,
  /// Produces the build directory and its configuration record.
  Generator,
  /// Compiles a target of the configured build directory.
  Executor,
}

impl Tool {
  pub fn as_str(&self) -> &'static str {
    match self {
      Tool::Fetcher => "fetcher",
      Tool::Generator => "generator",
      Tool::Executor => "executor",
    }
  }
}

impl fmt::Display for Tool {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Errors that can occur while running an external tool.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The tool ran and exited unsuccessfully.
  #[error("{tool} failed with exit code {code:?}: {program}")]
  ToolFailed {
    tool: Tool,
    program: String,
    code: Option<i32>,
  },

  /// The tool could not be started at all.
  #[error("failed to start {tool} ({program}): {source}")]
  Spawn {
    tool: Tool,
    program: String,
    #[source]
    source: std::io::Error,
  },
}

/// One fully specified run of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub tool: Tool,
  pub program: PathBuf,
  pub args: Vec<String>,
  pub cwd: PathBuf,
  /// Overlaid on the inherited environment for this invocation only.
  pub env: BTreeMap<String, String>,
}

impl Invocation {
  pub fn new(tool: Tool, program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      tool,
      program: program.into(),
      args: Vec::new(),
      cwd: cwd.into(),
      env: BTreeMap::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
    self.env.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
    self
  }

  /// Program and arguments as one display string, for logs and errors.
  pub fn command_line(&self) -> String {
    let mut line = self.program.display().to_string();
    for arg in &self.args {
      line.push(' ');
      line.push_str(arg);
    }
    line
  }
}
