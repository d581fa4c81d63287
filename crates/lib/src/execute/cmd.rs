//! Spawning external tools.
//!
//! Tools are started directly (no intermediate shell) with the inherited
//! environment plus the invocation's own variables. Stdio is inherited so the
//! tool's progress output reaches the terminal unchanged.

use tokio::process::Command;
use tracing::{debug, info};

use crate::execute::types::{ExecuteError, Invocation};

/// Run an invocation to completion.
///
/// Blocks (asynchronously) until the child exits. There is no timeout and no
/// retry; a non-zero exit is reported as [`ExecuteError::ToolFailed`].
pub async fn execute_tool(invocation: &Invocation) -> Result<(), ExecuteError> {
  let program = invocation.program.display().to_string();
  info!(tool = %invocation.tool, cmd = %invocation.command_line(), "running tool");

  let mut command = Command::new(&invocation.program);
  command.args(&invocation.args).current_dir(&invocation.cwd);
  for (key, value) in &invocation.env {
    command.env(key, value);
  }

  debug!(working_dir = ?invocation.cwd, env = ?invocation.env, "spawning process");

  let status = command.status().await.map_err(|source| ExecuteError::Spawn {
    tool: invocation.tool,
    program: program.clone(),
    source,
  })?;

  if !status.success() {
    return Err(ExecuteError::ToolFailed {
      tool: invocation.tool,
      program,
      code: status.code(),
    });
  }

  debug!(tool = %invocation.tool, "tool finished");
  Ok(())
}
