//! Model Context Protocol surface
//!
//! JSON-RPC message types, the tool catalog, bundled resources, prompt
//! templates and the stdio serving loop.

pub mod catalog;
pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod server;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::{serve, serve_stdio, McpServer};
