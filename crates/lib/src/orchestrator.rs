//! The build orchestrator.
//!
//! Runs the header/config phase (fetch, configure, export headers, unless the
//! previous configuration can be reused) and the build phase (executor, then
//! artifact copy) strictly in sequence. The first failure ends the run.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::artifacts::{ArtifactError, ArtifactManifest, copy_artifacts};
use crate::config::BuildConfiguration;
use crate::execute::{ExecuteError, Invocation, Runner, Tool};
use crate::headers::{ExportSummary, HeaderError, export_headers};
use crate::platform::{Capabilities, UnsupportedPlatform};
use crate::reuse::{MatchPolicy, ReuseDecision, decide};
use crate::state::{BuildDirectoryState, RECORD_FILENAME};

pub const DEFAULT_SOURCE_NAME: &str = "v8";
pub const DEFAULT_SOURCE_URL: &str = "https://chromium.googlesource.com/v8/v8.git";

/// Directory under the header output that receives exported headers.
pub const HEADER_DIR_NAME: &str = "include";

#[derive(Debug, Error)]
pub enum OrchestrateError {
  #[error(transparent)]
  Platform(#[from] UnsupportedPlatform),

  #[error(transparent)]
  Execute(#[from] ExecuteError),

  #[error(transparent)]
  Headers(#[from] HeaderError),

  #[error(transparent)]
  Artifacts(#[from] ArtifactError),

  #[error("failed to prepare directory {path}: {source}")]
  Directory {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to probe build directory: {0}")]
  Probe(#[source] io::Error),
}

impl OrchestrateError {
  /// Process exit status for this failure.
  ///
  /// A failing tool's own status is passed through; everything else is 1.
  pub fn exit_code(&self) -> i32 {
    match self {
      OrchestrateError::Execute(ExecuteError::ToolFailed { code: Some(code), .. }) if *code != 0 => *code,
      _ => 1,
    }
  }
}

/// Paths of the three external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
  pub fetcher: PathBuf,
  pub generator: PathBuf,
  pub executor: PathBuf,
}

/// Which source tree to fetch and at what revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
  pub name: String,
  pub url: String,
  pub revision: Option<String>,
}

impl Default for SourceSpec {
  fn default() -> Self {
    Self {
      name: DEFAULT_SOURCE_NAME.to_string(),
      url: DEFAULT_SOURCE_URL.to_string(),
      revision: None,
    }
  }
}

/// Which phases run this invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Phases {
  pub gen_headers: bool,
  pub build: bool,
}

impl Phases {
  /// Neither flag means the full pipeline.
  pub fn from_flags(gen_headers: bool, build: bool) -> Self {
    if !gen_headers && !build {
      return Self {
        gen_headers: true,
        build: true,
      };
    }
    Self { gen_headers, build }
  }
}

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
  pub build_dir: PathBuf,
  pub header_out: PathBuf,
  /// Where artifacts land; the build directory when unset.
  pub artifact_dest: Option<PathBuf>,
  pub tools: ToolPaths,
  pub source: SourceSpec,
  pub config: BuildConfiguration,
  pub phases: Phases,
  pub policy: MatchPolicy,
  pub manifest: ArtifactManifest,
  pub capabilities: Capabilities,
}

/// Progress notifications, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
  SettingUp { build_dir: PathBuf },
  UpToDate,
  Fetching,
  Syncing,
  Configuring,
  ExportingHeaders { dest: PathBuf },
  Building { target: &'static str },
  CopyingArtifacts { count: usize },
}

/// What a successful run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
  pub build_dir: PathBuf,
  /// Present when the header/config phase ran.
  pub decision: Option<ReuseDecision>,
  pub headers: Option<ExportSummary>,
  pub artifacts: Vec<PathBuf>,
}

/// Use the parent of a file path (such as a wrapper script), create the
/// directory if needed and canonicalize it.
///
/// A `.py` path counts as a script even when it does not exist yet.
pub fn resolve_build_dir(path: &Path) -> io::Result<PathBuf> {
  let is_script = path.extension().is_some_and(|ext| ext == "py");
  let dir = if path.is_file() || is_script {
    match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
      _ => PathBuf::from("."),
    }
  } else {
    path.to_path_buf()
  };
  std::fs::create_dir_all(&dir)?;
  dunce::canonicalize(&dir)
}

/// Run the selected phases.
pub async fn run<R: Runner>(
  options: &OrchestratorOptions,
  runner: &R,
  progress: &mut dyn FnMut(Step),
) -> Result<RunReport, OrchestrateError> {
  let build_dir = resolve_build_dir(&options.build_dir).map_err(|source| OrchestrateError::Directory {
    path: options.build_dir.clone(),
    source,
  })?;
  progress(Step::SettingUp {
    build_dir: build_dir.clone(),
  });

  let layout = Layout::new(&build_dir, options);
  let mut report = RunReport {
    build_dir: build_dir.clone(),
    ..Default::default()
  };

  if options.phases.gen_headers {
    let state = BuildDirectoryState::probe(&layout.record, &layout.header_dir).map_err(OrchestrateError::Probe)?;
    let decision = decide(&options.config.flags(), &state, options.phases.build, options.policy);

    match &decision {
      ReuseDecision::Skip => {
        info!(out = %layout.out_dir.display(), "reusing existing configuration");
        progress(Step::UpToDate);
      }
      ReuseDecision::Reconfigure(reason) => {
        info!(%reason, "reconfiguring");
        fetch(options, &layout, runner, progress).await?;
        configure(options, &layout, runner, progress).await?;

        progress(Step::ExportingHeaders {
          dest: layout.header_dir.clone(),
        });
        report.headers = Some(export_headers(&layout.source_include, &layout.header_dir)?);
      }
    }
    report.decision = Some(decision);
  }

  if options.phases.build {
    report.artifacts = build(options, &layout, runner, progress).await?;
  }

  Ok(report)
}

/// Paths derived from the build directory and options.
struct Layout {
  build_dir: PathBuf,
  source_dir: PathBuf,
  source_include: PathBuf,
  /// Output directory relative to `source_dir`, as the tools see it.
  out_name: String,
  out_dir: PathBuf,
  record: PathBuf,
  header_dir: PathBuf,
  artifact_dest: PathBuf,
}

impl Layout {
  fn new(build_dir: &Path, options: &OrchestratorOptions) -> Self {
    let source_dir = build_dir.join(&options.source.name);
    let out_name = options.config.out_dir_name(options.capabilities.cpu_name());
    let out_dir = source_dir.join(&out_name);
    Self {
      build_dir: build_dir.to_path_buf(),
      source_include: source_dir.join(HEADER_DIR_NAME),
      record: out_dir.join(RECORD_FILENAME),
      header_dir: options.header_out.join(HEADER_DIR_NAME),
      artifact_dest: options.artifact_dest.clone().unwrap_or_else(|| build_dir.to_path_buf()),
      source_dir,
      out_name,
      out_dir,
    }
  }
}

async fn fetch<R: Runner>(
  options: &OrchestratorOptions,
  layout: &Layout,
  runner: &R,
  progress: &mut dyn FnMut(Step),
) -> Result<(), OrchestrateError> {
  let env = options.capabilities.tool_env();
  let source = &options.source;

  progress(Step::Fetching);
  let config = Invocation::new(Tool::Fetcher, &options.tools.fetcher, &layout.build_dir)
    .args(["config", "--name", source.name.as_str(), "--unmanaged", source.url.as_str()])
    .envs(&env);
  runner.run(&config).await?;

  progress(Step::Syncing);
  let mut sync = Invocation::new(Tool::Fetcher, &options.tools.fetcher, &layout.build_dir).arg("sync");
  match &source.revision {
    Some(revision) => sync = sync.args(["--revision", revision.as_str()]),
    None => info!("no revision pinned, syncing the default branch"),
  }
  let sync = sync.args(["--shallow", "--no-history"]).envs(&env);
  runner.run(&sync).await?;
  Ok(())
}

async fn configure<R: Runner>(
  options: &OrchestratorOptions,
  layout: &Layout,
  runner: &R,
  progress: &mut dyn FnMut(Step),
) -> Result<(), OrchestrateError> {
  progress(Step::Configuring);
  let gen_cmd = Invocation::new(Tool::Generator, &options.tools.generator, &layout.source_dir)
    .args(["gen".to_string(), layout.out_name.clone()])
    .arg(format!("--args={}", options.config.gn_args()))
    .envs(&options.capabilities.tool_env());
  runner.run(&gen_cmd).await?;
  Ok(())
}

async fn build<R: Runner>(
  options: &OrchestratorOptions,
  layout: &Layout,
  runner: &R,
  progress: &mut dyn FnMut(Step),
) -> Result<Vec<PathBuf>, OrchestrateError> {
  let target = options.config.mode.target();
  progress(Step::Building { target });

  // A build-only run may find no checkout yet; the executor reports that itself.
  std::fs::create_dir_all(&layout.source_dir).map_err(|source| OrchestrateError::Directory {
    path: layout.source_dir.clone(),
    source,
  })?;
  let ninja = Invocation::new(Tool::Executor, &options.tools.executor, &layout.source_dir)
    .args(["-C", layout.out_name.as_str(), target])
    .envs(&options.capabilities.tool_env());
  runner.run(&ninja).await?;

  let set = options
    .manifest
    .artifact_set(options.config.mode, &options.config.profile, &options.capabilities);
  progress(Step::CopyingArtifacts { count: set.files.len() });

  std::fs::create_dir_all(&layout.artifact_dest).map_err(|source| OrchestrateError::Directory {
    path: layout.artifact_dest.clone(),
    source,
  })?;
  Ok(copy_artifacts(&set, &layout.out_dir, &layout.artifact_dest)?)
}
