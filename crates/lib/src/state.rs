//! On-disk evidence of a previous build attempt.

use std::io;
use std::path::Path;

use tracing::debug;

/// File name of the configuration record the generator writes into the
/// output directory.
pub const RECORD_FILENAME: &str = "args.gn";

/// Read-only snapshot of what a previous run left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildDirectoryState {
  /// Raw text of the persisted configuration record, if one exists.
  pub record: Option<String>,
  /// Whether the header export directory exists.
  pub headers_present: bool,
}

impl BuildDirectoryState {
  /// Probe the record file and header directory.
  ///
  /// A missing record is not an error; any other read failure is.
  pub fn probe(record_path: &Path, header_dir: &Path) -> io::Result<Self> {
    let record = match std::fs::read_to_string(record_path) {
      Ok(text) => Some(text),
      Err(e) if e.kind() == io::ErrorKind::NotFound => None,
      Err(e) => return Err(e),
    };
    let headers_present = header_dir.is_dir();

    debug!(
      record = %record_path.display(),
      has_record = record.is_some(),
      headers_present,
      "probed build directory"
    );

    Ok(Self { record, headers_present })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn probe_empty_directory() {
    let temp = TempDir::new().unwrap();
    let state = BuildDirectoryState::probe(&temp.path().join(RECORD_FILENAME), &temp.path().join("include")).unwrap();
    assert_eq!(state, BuildDirectoryState::default());
  }

  #[test]
  fn probe_reads_record_and_headers() {
    let temp = TempDir::new().unwrap();
    let record = temp.path().join(RECORD_FILENAME);
    std::fs::write(&record, "is_debug=true\n").unwrap();
    std::fs::create_dir(temp.path().join("include")).unwrap();

    let state = BuildDirectoryState::probe(&record, &temp.path().join("include")).unwrap();
    assert_eq!(state.record.as_deref(), Some("is_debug=true\n"));
    assert!(state.headers_present);
  }

  #[test]
  fn header_path_that_is_a_file_does_not_count() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("include"), "").unwrap();
    let state = BuildDirectoryState::probe(&temp.path().join(RECORD_FILENAME), &temp.path().join("include")).unwrap();
    assert!(!state.headers_present);
  }
}
