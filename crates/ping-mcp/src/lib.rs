//! ping-mcp library: MCP server components for PingOne identity management.
//!
//! The binary entry point lives in `main.rs`; everything else is exposed here
//! so integration tests can drive the server loop directly.

pub mod cli;
pub mod commands;
pub mod framing;
pub mod handlers;
pub mod http;
pub mod server;
pub mod tools;
