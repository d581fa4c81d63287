//! Implementation of the build pipeline command.
//!
//! Resolves command-line arguments into orchestrator options, runs the
//! pipeline and reports progress and the outcome.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use serde::Serialize;
use tracing::debug;

use monolith_lib::artifacts::ArtifactManifest;
use monolith_lib::execute::ProcessRunner;
use monolith_lib::orchestrator::{DEFAULT_SOURCE_NAME, DEFAULT_SOURCE_URL, SourceSpec, ToolPaths};
use monolith_lib::platform::Capabilities;
use monolith_lib::reuse::MatchPolicy;
use monolith_lib::{BuildConfiguration, BuildMode, OrchestratorOptions, Phases, Profile, RunReport, Step};

use crate::output::{
  OutputFormat, format_duration, print_info, print_json, print_stat, print_step, print_success,
  print_warning,
};

#[derive(Args, Debug)]
pub struct BuildArgs {
  /// Path to the dependency fetcher (gclient, or gclient.bat on Windows)
  ///
  /// Tools are started directly, not through a shell, so the path must name
  /// the actual file including any script extension.
  #[arg(value_name = "FETCHER")]
  pub fetcher: PathBuf,

  /// Path to the build-file generator (gn, or gn.bat on Windows)
  #[arg(value_name = "CONFIG_GENERATOR")]
  pub generator: PathBuf,

  /// Path to the build executor (ninja, or ninja.exe on Windows)
  #[arg(value_name = "BUILD_EXECUTOR")]
  pub executor: PathBuf,

  /// Working directory for the source checkout and build tree [default: current directory]
  #[arg(long, value_name = "PATH")]
  pub build_dir: Option<PathBuf>,

  /// Destination for exported headers [default: current directory]
  #[arg(long, value_name = "PATH")]
  pub header_out: Option<PathBuf>,

  /// Build target profile ("debug" or a release-like name)
  #[arg(long, default_value = "debug")]
  pub target: String,

  /// Compile with clang
  #[arg(long)]
  pub is_clang: bool,

  /// Compiler wrapper prefix (e.g. sccache)
  #[arg(long, default_value = "")]
  pub cc_wrapper: String,

  /// Source revision to check out
  #[arg(long)]
  pub revision: Option<String>,

  /// Build a shared library instead of a static one
  #[arg(long = "shared", action = ArgAction::SetFalse)]
  pub static_library: bool,

  /// Run fetch, configure and header export
  #[arg(long)]
  pub gen_headers: bool,

  /// Run the build executor and copy artifacts
  #[arg(long)]
  pub build: bool,

  /// Build the split libraries instead of the monolith
  #[arg(long)]
  pub no_monolithic: bool,

  /// Reuse a previous configuration only if its record matches exactly
  #[arg(long)]
  pub strict_reuse: bool,

  /// Artifact manifest (TOML) overriding the built-in file list
  #[arg(long, value_name = "PATH")]
  pub artifacts: Option<PathBuf>,

  /// Where built artifacts are copied [default: build directory]
  #[arg(long, value_name = "PATH")]
  pub artifact_out: Option<PathBuf>,

  /// Name of the source checkout inside the build directory
  #[arg(long, default_value = DEFAULT_SOURCE_NAME)]
  pub source_name: String,

  /// Repository the fetcher is configured with
  #[arg(long, default_value = DEFAULT_SOURCE_URL)]
  pub source_url: String,
}

impl BuildArgs {
  pub fn configuration(&self) -> BuildConfiguration {
    BuildConfiguration {
      profile: Profile::parse(&self.target),
      mode: if self.no_monolithic {
        BuildMode::Split
      } else {
        BuildMode::Monolithic
      },
      static_library: self.static_library,
      is_clang: self.is_clang,
      cc_wrapper: self.cc_wrapper.clone(),
    }
  }

  /// Turn the arguments into orchestrator options.
  ///
  /// Only reads the current directory and the artifact manifest; nothing is
  /// spawned or written.
  pub fn resolve(self, capabilities: Capabilities) -> Result<OrchestratorOptions> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let manifest = match &self.artifacts {
      Some(path) => ArtifactManifest::load(path)?,
      None => ArtifactManifest::builtin()?,
    };

    Ok(OrchestratorOptions {
      config: self.configuration(),
      build_dir: self.build_dir.unwrap_or_else(|| cwd.clone()),
      header_out: self.header_out.unwrap_or(cwd),
      artifact_dest: self.artifact_out,
      tools: ToolPaths {
        fetcher: self.fetcher,
        generator: self.generator,
        executor: self.executor,
      },
      source: SourceSpec {
        name: self.source_name,
        url: self.source_url,
        revision: self.revision,
      },
      phases: Phases::from_flags(self.gen_headers, self.build),
      policy: if self.strict_reuse {
        MatchPolicy::Exact
      } else {
        MatchPolicy::Substring
      },
      manifest,
      capabilities,
    })
  }
}

#[derive(Debug, Serialize)]
struct BuildSummary<'a> {
  #[serde(flatten)]
  report: &'a RunReport,
  mode: BuildMode,
  phases: Phases,
  elapsed_secs: f64,
}

/// Execute the build pipeline.
///
/// Refuses to start on an unsupported host. Any tool failure ends the run
/// immediately; the error carries the tool's exit status.
pub fn cmd_build(args: BuildArgs, output: OutputFormat) -> Result<()> {
  let start = Instant::now();
  let capabilities = Capabilities::detect()?;
  let options = args.resolve(capabilities)?;
  debug!(platform = %capabilities.platform, phases = ?options.phases, "resolved options");

  if options.phases.gen_headers && options.source.revision.is_none() && !output.is_json() {
    print_warning("No --revision given, syncing the default branch");
  }

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let mut on_step = |step: Step| {
    if !output.is_json() {
      print_progress(&step, &options.config);
    }
  };
  let report = rt.block_on(monolith_lib::run(&options, &ProcessRunner, &mut on_step))?;
  let elapsed = start.elapsed();

  if output.is_json() {
    return print_json(&BuildSummary {
      report: &report,
      mode: options.config.mode,
      phases: options.phases,
      elapsed_secs: elapsed.as_secs_f64(),
    });
  }

  if let Some(headers) = &report.headers {
    print_stat("Headers exported", &headers.files_copied.to_string());
  }
  for artifact in &report.artifacts {
    print_stat("Artifact", &artifact.display().to_string());
  }
  print_success(&format!("Done. Took {}", format_duration(elapsed)));
  Ok(())
}

fn print_progress(step: &Step, config: &BuildConfiguration) {
  match step {
    Step::SettingUp { build_dir } => print_info(&format!("Setting up build directory {}...", build_dir.display())),
    Step::UpToDate => print_success("Configuration already up to date, skipping fetch and configure"),
    Step::Fetching => print_step("Configuring fetcher..."),
    Step::Syncing => print_step("Syncing..."),
    Step::Configuring => print_step(&format!("Configuring {} build with gn...", config.profile)),
    Step::ExportingHeaders { dest } => print_step(&format!("Exporting headers to {}...", dest.display())),
    Step::Building { target } => print_step(&format!("Building {}...", target)),
    Step::CopyingArtifacts { count } => print_step(&format!("Copying {} artifact(s)...", count)),
  }
}
