//! NetLogo MCP: a Model Context Protocol server for NetLogo
//!
//! Exposes one shared NetLogo workspace to an LLM agent as MCP tools,
//! resources and prompts: loading and authoring models, running commands and
//! reporters, stepped runs, world snapshots and exports.

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod models;
pub mod session;
pub mod tooling;
pub mod tools;
