use std::fmt;

/// Operating system variants the orchestrator can drive a build on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Returns the lowercase string identifier for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "mac",
      Self::Windows => "win",
    }
  }

  /// File name the build executor gives a static library target on this OS.
  pub fn static_library_file(&self, name: &str) -> String {
    match self {
      Self::Windows => format!("{}.lib", name),
      Self::Linux | Self::MacOs => format!("lib{}.a", name),
    }
  }

  /// File name of the standalone debug-symbol file for a target, if this OS
  /// produces one next to the library.
  pub fn debug_symbols_file(&self, name: &str) -> Option<String> {
    match self {
      Self::Windows => Some(format!("{}.pdb", name)),
      Self::Linux | Self::MacOs => None,
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
