//! Build artifacts: which files a build produces and copying them out.
//!
//! The expected outputs per build mode live in a declarative TOML manifest.
//! A built-in manifest covers the stock targets; callers may supply their own.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{BuildMode, Profile};
use crate::platform::Capabilities;

const BUILTIN_MANIFEST: &str = include_str!("../assets/artifacts.toml");

/// Subdirectory of the output directory holding library outputs.
pub const OBJ_DIR: &str = "obj";

#[derive(Debug, Error)]
pub enum ArtifactError {
  #[error("failed to read artifact manifest {path}: {source}")]
  ReadManifest {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid artifact manifest: {0}")]
  ParseManifest(#[from] toml::de::Error),

  #[error("failed to copy artifact {from} to {to}: {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
  StaticLibrary,
  DebugSymbols,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileFilter {
  Debug,
  Release,
}

impl ProfileFilter {
  fn matches(&self, profile: &Profile) -> bool {
    match self {
      ProfileFilter::Debug => profile.is_debug(),
      ProfileFilter::Release => !profile.is_debug(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactEntry {
  pub name: String,
  pub kind: ArtifactKind,
  #[serde(default)]
  pub profile: Option<ProfileFilter>,
}

/// Expected outputs per build mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactManifest {
  #[serde(default)]
  pub monolithic: Vec<ArtifactEntry>,
  #[serde(default)]
  pub split: Vec<ArtifactEntry>,
}

impl ArtifactManifest {
  pub fn builtin() -> Result<Self, ArtifactError> {
    Self::parse(BUILTIN_MANIFEST)
  }

  pub fn parse(text: &str) -> Result<Self, ArtifactError> {
    Ok(toml::from_str(text)?)
  }

  pub fn load(path: &Path) -> Result<Self, ArtifactError> {
    let text = std::fs::read_to_string(path).map_err(|source| ArtifactError::ReadManifest {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(&text)
  }

  pub fn entries(&self, mode: BuildMode) -> &[ArtifactEntry] {
    match mode {
      BuildMode::Monolithic => &self.monolithic,
      BuildMode::Split => &self.split,
    }
  }

  /// Resolve concrete file names for one build.
  pub fn artifact_set(&self, mode: BuildMode, profile: &Profile, caps: &Capabilities) -> ArtifactSet {
    let files = self
      .entries(mode)
      .iter()
      .filter(|entry| entry.profile.is_none_or(|p| p.matches(profile)))
      .filter_map(|entry| match entry.kind {
        ArtifactKind::StaticLibrary => Some(caps.static_library_file(&entry.name)),
        ArtifactKind::DebugSymbols => caps.debug_symbols_file(&entry.name),
      })
      .collect();
    ArtifactSet { files }
  }
}

/// Ordered file names expected in `<out>/obj` after a successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactSet {
  pub files: Vec<String>,
}

/// Copy every artifact from `<out_dir>/obj` into `dest`.
///
/// Stops at the first missing or unreadable file.
pub fn copy_artifacts(set: &ArtifactSet, out_dir: &Path, dest: &Path) -> Result<Vec<PathBuf>, ArtifactError> {
  info!(count = set.files.len(), dest = %dest.display(), "copying artifacts");

  let obj_dir = out_dir.join(OBJ_DIR);
  let mut copied = Vec::with_capacity(set.files.len());
  for file in &set.files {
    let from = obj_dir.join(file);
    let to = dest.join(file);
    std::fs::copy(&from, &to).map_err(|source| ArtifactError::Copy {
      from: from.clone(),
      to: to.clone(),
      source,
    })?;
    debug!(file = %file, "copied artifact");
    copied.push(to);
  }
  Ok(copied)
}
