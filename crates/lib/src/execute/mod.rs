//! External tool execution.
//!
//! The orchestrator only talks to tools through [`Runner`], so tests can swap
//! in a recorder while production uses [`ProcessRunner`].

pub mod cmd;
pub mod types;

use std::future::Future;

pub use cmd::execute_tool;
pub use types::{ExecuteError, Invocation, Tool};

/// Runs tool invocations one at a time.
pub trait Runner {
  fn run(&self, invocation: &Invocation) -> impl Future<Output = Result<(), ExecuteError>>;
}

/// Spawns real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
  async fn run(&self, invocation: &Invocation) -> Result<(), ExecuteError> {
    execute_tool(invocation).await
  }
}
