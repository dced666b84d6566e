//! `serve` subcommand: start the MCP server.
//!
//! Reads MCP JSON-RPC messages from stdin and writes responses to stdout by
//! default. HTTP mode is opt-in and requires an explicit acknowledgement
//! flag, since it exposes the configured credentials' capabilities over the
//! network.

use std::sync::Arc;

use anyhow::Context;

use ping_mcp_core::{EnvironmentRegistry, PingClient, Settings};

use crate::cli::ServeArgs;
use crate::http;
use crate::server::McpServer;

/// Run the `serve` subcommand.
///
/// # Errors
///
/// Returns an error if configuration validation fails at startup or the
/// transport loop encounters an unrecoverable I/O error. There is no
/// partial-configuration mode; any configuration problem is fatal.
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let settings = Settings::from_env().context("invalid server configuration")?;
    let registry = EnvironmentRegistry::from_env().context("invalid environment configuration")?;
    tracing::info!(
        environments = registry.len(),
        default = %registry.default_environment().name,
        region = %settings.region,
        "configuration loaded"
    );

    let client = Arc::new(PingClient::new(settings, Arc::new(registry))?);
    let server = McpServer::new(client);

    if args.http {
        anyhow::ensure!(
            args.i_understand_the_risks,
            "HTTP mode requires --i-understand-the-risks: it exposes PingOne management \
             capabilities to anything that can reach {}:{}",
            args.host,
            args.port
        );
        http::serve(server, &args.host, args.port).await
    } else {
        server.run(tokio::io::stdin(), tokio::io::stdout()).await
    }
}
