//! ping-mcp: MCP server for PingOne identity management.
//!
//! # Subcommands
//!
//! - `serve`: start the MCP server (stdio by default, HTTP opt-in)
//! - `config`: show resolved configuration with secrets redacted
//! - `tools`: list the available MCP tools

use clap::Parser;
use ping_mcp_core::logging;

use ping_mcp::cli::{Cli, Commands};
use ping_mcp::commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Config(args) => commands::config_cmd::run(args).await,
        Commands::Tools(args) => commands::tools_cmd::run(args).await,
    }
}
