//! Host platform detection and build capabilities.
//!
//! Rather than comparing against a single hardcoded platform string, callers
//! ask for [`Capabilities`]: how the executor names its outputs here, and
//! which environment every tool invocation receives.

pub mod arch;
pub mod os;

use std::collections::BTreeMap;
use std::fmt;

use arch::Arch;
use os::Os;
use thiserror::Error;

/// The host is outside the environments the orchestrator can drive.
#[derive(Debug, Error)]
#[error("unsupported build environment: {os}/{arch}")]
pub struct UnsupportedPlatform {
  pub os: &'static str,
  pub arch: &'static str,
}

/// Platform identifier combining architecture and OS (e.g., "x86_64-win")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
  pub arch: Arch,
  pub os: Os,
}

impl Platform {
  /// Create a new platform identifier
  pub fn new(arch: Arch, os: Os) -> Self {
    Self { arch, os }
  }

  /// Detect the current platform at runtime
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      arch: Arch::current()?,
      os: Os::current()?,
    })
  }

  /// Returns the platform triple string (e.g., "x86_64-linux")
  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }

  pub fn capabilities(&self) -> Capabilities {
    Capabilities { platform: *self }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}

/// What the current execution environment supports for a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
  pub platform: Platform,
}

impl Capabilities {
  /// Capabilities of the host, or an error if the host cannot drive a build.
  pub fn detect() -> Result<Self, UnsupportedPlatform> {
    Platform::current()
      .map(|p| p.capabilities())
      .ok_or(UnsupportedPlatform {
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
      })
  }

  pub fn cpu_name(&self) -> &'static str {
    self.platform.arch.cpu_name()
  }

  pub fn static_library_file(&self, name: &str) -> String {
    self.platform.os.static_library_file(name)
  }

  pub fn debug_symbols_file(&self, name: &str) -> Option<String> {
    self.platform.os.debug_symbols_file(name)
  }

  /// Variables overlaid on the inherited environment of every tool.
  ///
  /// The process's own environment is never modified; this map is handed to
  /// each spawn instead.
  pub fn tool_env(&self) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    // Use the locally installed toolchain instead of the Google-internal one.
    env.insert("DEPOT_TOOLS_WIN_TOOLCHAIN".to_string(), "0".to_string());
    env
  }
}
