//! Command-line tooling
//!
//! The `netlogo-mcp` binary: serving stdio, checking configuration, and
//! listing models.

pub mod cli;

pub use cli::{CheckReport, Cli, CliContext, Commands};
