//! Incremental build-reuse decision.
//!
//! Decides whether a previous fetch + configure can be reused as-is. There is
//! no partial reuse: either everything is skipped or everything is redone.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::state::BuildDirectoryState;

/// How the persisted record is compared against the current flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
  /// Every flag must occur as a literal substring of the record text.
  ///
  /// This can report a match when one flag's text is contained in another's,
  /// e.g. `symbol_level=2` inside `symbol_level=20`.
  #[default]
  Substring,
  /// The record, parsed into a key -> value map, must equal the flags exactly.
  Exact,
}

/// Why a previous configuration could not be reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ReconfigureReason {
  NoRecord,
  HeadersMissing,
  BuildRequested,
  FlagMissing { flag: String },
  RecordDiffers,
}

impl fmt::Display for ReconfigureReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReconfigureReason::NoRecord => write!(f, "no configuration record"),
      ReconfigureReason::HeadersMissing => write!(f, "header directory missing"),
      ReconfigureReason::BuildRequested => write!(f, "build requested"),
      ReconfigureReason::FlagMissing { flag } => write!(f, "record lacks {}", flag),
      ReconfigureReason::RecordDiffers => write!(f, "record differs from current configuration"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReuseDecision {
  /// The existing configuration already satisfies this invocation.
  Skip,
  Reconfigure(ReconfigureReason),
}

impl ReuseDecision {
  pub fn is_skip(&self) -> bool {
    matches!(self, ReuseDecision::Skip)
  }
}

/// Decide whether fetch + configure can be skipped.
///
/// `flags` are the current configuration's `key=value` strings.
pub fn decide(
  flags: &[String],
  state: &BuildDirectoryState,
  build_requested: bool,
  policy: MatchPolicy,
) -> ReuseDecision {
  let record = match &state.record {
    None => return ReuseDecision::Reconfigure(ReconfigureReason::NoRecord),
    Some(record) => record,
  };
  if !state.headers_present {
    return ReuseDecision::Reconfigure(ReconfigureReason::HeadersMissing);
  }
  if build_requested {
    return ReuseDecision::Reconfigure(ReconfigureReason::BuildRequested);
  }

  let decision = match policy {
    MatchPolicy::Substring => match flags.iter().find(|flag| !record.contains(flag.as_str())) {
      Some(flag) => ReuseDecision::Reconfigure(ReconfigureReason::FlagMissing { flag: flag.clone() }),
      None => ReuseDecision::Skip,
    },
    MatchPolicy::Exact => {
      let wanted: Option<BTreeMap<String, String>> = flags.iter().map(|f| split_flag(f)).collect();
      match wanted {
        Some(wanted) if wanted == parse_record(record) => ReuseDecision::Skip,
        _ => ReuseDecision::Reconfigure(ReconfigureReason::RecordDiffers),
      }
    }
  };

  match &decision {
    ReuseDecision::Skip => info!("existing configuration satisfies all flags"),
    ReuseDecision::Reconfigure(reason) => debug!(%reason, "configuration record does not match"),
  }
  decision
}

/// Parse a configuration record into a key -> value map.
///
/// Accepts `key = value` or `key=value` lines; blank lines and `#` comments
/// are ignored, as are lines without `=`.
pub fn parse_record(text: &str) -> BTreeMap<String, String> {
  text
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty() && !line.starts_with('#'))
    .filter_map(split_flag)
    .collect()
}

fn split_flag(flag: &str) -> Option<(String, String)> {
  let (key, value) = flag.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  Some((key.to_string(), value.trim().to_string()))
}
