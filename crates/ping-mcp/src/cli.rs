//! CLI argument types for ping-mcp.
//!
//! Defines the top-level [`Cli`] struct and all subcommand [`Args`] using
//! clap's derive macros. Each subcommand maps to a module in [`commands`].

use clap::{Args, Parser, Subcommand};

/// MCP server exposing PingOne identity management across multiple environments
#[derive(Parser, Debug)]
#[command(name = "ping-mcp", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the MCP server
    Serve(ServeArgs),
    /// Show resolved configuration (secrets redacted)
    Config(ConfigArgs),
    /// List the available MCP tools
    Tools(ToolsArgs),
}

/// Arguments for the `serve` subcommand
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Serve over HTTP instead of stdio
    #[arg(long, conflicts_with = "stdio")]
    pub http: bool,

    /// Serve over stdio (the default)
    #[arg(long)]
    pub stdio: bool,

    /// Bind address for HTTP mode
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Bind port for HTTP mode
    #[arg(long, default_value_t = 3000)]
    pub port: u16,

    /// Acknowledge that HTTP mode exposes the server beyond the local process
    #[arg(long = "i-understand-the-risks")]
    pub i_understand_the_risks: bool,
}

/// Arguments for the `config` subcommand
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `tools` subcommand
#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Print full input schemas instead of name and description only
    #[arg(long)]
    pub schemas: bool,
}
