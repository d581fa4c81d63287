//! monolith-lib: orchestration logic for building the V8 monolith
//!
//! This crate drives three external tools in a fixed sequence:
//! - the fetcher (`gclient`) retrieves a pinned source revision
//! - the generator (`gn`) writes the build directory and its `args.gn` record
//! - the executor (`ninja`) compiles the selected target
//!
//! The only real decision made here is whether a previous fetch + configure
//! can be reused, see [`reuse`].

pub mod artifacts;
pub mod config;
pub mod execute;
pub mod headers;
pub mod orchestrator;
pub mod platform;
pub mod reuse;
pub mod state;
pub mod util;

pub use config::{BuildConfiguration, BuildMode, Profile};
pub use orchestrator::{OrchestrateError, OrchestratorOptions, Phases, RunReport, Step, run};
