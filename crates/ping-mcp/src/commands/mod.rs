//! Subcommand implementations, one module per CLI subcommand.

pub mod config_cmd;
pub mod serve;
pub mod tools_cmd;
