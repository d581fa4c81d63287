//! Public header export.
//!
//! Copies the source tree's public headers into a separate include directory.
//! Entries that are neither headers nor allow-listed subsystem directories are
//! pruned from the walk, so they are never copied in the first place.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Subdirectories of the include tree that are exported.
pub const SUBSYSTEM_DIRS: &[&str] = &["cppgc", "libplatform", "internal"];

const HEADER_EXTENSION: &str = "h";

#[derive(Debug, Error)]
pub enum HeaderError {
  #[error("header source directory not found: {0}")]
  SourceMissing(PathBuf),

  #[error("failed to walk {path}: {source}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to copy {from} to {to}: {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
  pub files_copied: usize,
}

/// Whether a walk entry below the root is kept.
fn is_exported(entry: &DirEntry) -> bool {
  if entry.file_type().is_dir() {
    return entry
      .file_name()
      .to_str()
      .is_some_and(|name| SUBSYSTEM_DIRS.contains(&name));
  }
  entry.path().extension() == Some(OsStr::new(HEADER_EXTENSION))
}

/// Copy headers from `src` into `dest`, merging into any existing tree.
///
/// Existing destination files are overwritten, so running the export twice
/// over unchanged sources yields the same tree.
pub fn export_headers(src: &Path, dest: &Path) -> Result<ExportSummary, HeaderError> {
  if !src.is_dir() {
    return Err(HeaderError::SourceMissing(src.to_path_buf()));
  }
  info!(from = %src.display(), to = %dest.display(), "exporting headers");

  let mut summary = ExportSummary::default();
  let walker = WalkDir::new(src)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|entry| entry.depth() == 0 || is_exported(entry));

  for entry in walker {
    let entry = entry.map_err(|source| HeaderError::Walk {
      path: src.to_path_buf(),
      source,
    })?;
    let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
    let target = dest.join(relative);

    if entry.file_type().is_dir() {
      std::fs::create_dir_all(&target).map_err(|source| HeaderError::Copy {
        from: entry.path().to_path_buf(),
        to: target.clone(),
        source,
      })?;
      continue;
    }

    std::fs::copy(entry.path(), &target).map_err(|source| HeaderError::Copy {
      from: entry.path().to_path_buf(),
      to: target.clone(),
      source,
    })?;
    debug!(file = %relative.display(), "copied header");
    summary.files_copied += 1;
  }

  info!(count = summary.files_copied, "headers exported");
  Ok(summary)
}
