//! CLI integration tests driving the full pipeline against fake tools.

#![cfg(unix)]

mod common;
mod pipeline_tests;
