mod cmd;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use monolith_lib::OrchestrateError;

use crate::cmd::{BuildArgs, cmd_build};
use crate::output::{OutputFormat, print_error};

/// monolith - fetch, configure and build the V8 monolith
#[derive(Parser, Debug)]
#[command(name = "monolith")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Tool paths are positional in the order FETCHER CONFIG_GENERATOR BUILD_EXECUTOR \
(gclient gn ninja). The older build.py took gn first; swap the first two paths when migrating.")]
struct Cli {
  #[command(flatten)]
  args: BuildArgs,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,

  /// Output format
  #[arg(short = 'o', long, value_enum, default_value = "text")]
  output: OutputFormat,
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(err) = cmd_build(cli.args, cli.output) {
    print_error(&format!("{:#}", err));
    std::process::exit(exit_code(&err));
  }
}

/// A failing tool's status is passed through as our own.
fn exit_code(err: &anyhow::Error) -> i32 {
  err.downcast_ref::<OrchestrateError>().map(OrchestrateError::exit_code).unwrap_or(1)
}
