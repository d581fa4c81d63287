//! Build configuration derived from the command line.
//!
//! A [`BuildConfiguration`] is computed once per invocation and never
//! changes afterwards. Its textual flag list is what gets handed to the build
//! generator and what the reuse check looks for in the persisted record.

use std::fmt;

use serde::Serialize;

/// Target profile selected with `--target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Profile {
  Debug,
  /// Any non-debug target; the name is kept for the output directory.
  Release(String),
}

impl Profile {
  pub fn parse(target: &str) -> Self {
    if target.eq_ignore_ascii_case("debug") {
      Profile::Debug
    } else {
      Profile::Release(target.to_string())
    }
  }

  pub fn is_debug(&self) -> bool {
    matches!(self, Profile::Debug)
  }

  pub fn name(&self) -> &str {
    match self {
      Profile::Debug => "debug",
      Profile::Release(name) => name,
    }
  }

  /// Debug-symbol level passed to the generator.
  pub fn symbol_level(&self) -> u8 {
    if self.is_debug() { 2 } else { 0 }
  }
}

impl fmt::Display for Profile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Whether the library is built as one monolithic archive or as split parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildMode {
  #[default]
  Monolithic,
  Split,
}

impl BuildMode {
  /// Target name handed to the build executor.
  pub fn target(&self) -> &'static str {
    match self {
      BuildMode::Monolithic => "v8_monolith",
      BuildMode::Split => "v8",
    }
  }
}

/// The set of key-value flags one invocation configures the build with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
  pub profile: Profile,
  pub mode: BuildMode,
  pub static_library: bool,
  pub is_clang: bool,
  pub cc_wrapper: String,
}

impl Default for BuildConfiguration {
  fn default() -> Self {
    Self {
      profile: Profile::Debug,
      mode: BuildMode::Monolithic,
      static_library: true,
      is_clang: false,
      cc_wrapper: String::new(),
    }
  }
}

impl BuildConfiguration {
  /// Ordered `(key, value)` pairs, values already in generator syntax.
  pub fn pairs(&self) -> Vec<(&'static str, String)> {
    vec![
      ("is_component_build", "false".to_string()),
      ("v8_monolithic", (self.mode == BuildMode::Monolithic).to_string()),
      ("v8_static_library", self.static_library.to_string()),
      ("v8_use_external_startup_data", "false".to_string()),
      ("is_debug", self.profile.is_debug().to_string()),
      ("symbol_level", self.profile.symbol_level().to_string()),
      ("is_clang", self.is_clang.to_string()),
      ("cc_wrapper", format!("\"{}\"", self.cc_wrapper)),
    ]
  }

  /// Textual `key=value` flags, in generator order.
  pub fn flags(&self) -> Vec<String> {
    self.pairs().into_iter().map(|(k, v)| format!("{}={}", k, v)).collect()
  }

  /// Payload of the generator's `--args=` option.
  pub fn gn_args(&self) -> String {
    self.flags().join(" ")
  }

  /// Output directory relative to the source checkout.
  pub fn out_dir_name(&self, cpu: &str) -> String {
    format!("out/{}.custom-{}", cpu, self.profile.name())
  }
}
