//! `config` subcommand: show resolved configuration.
//!
//! Loads and validates the full configuration, then prints it either as JSON
//! (`--json`) or as a human-readable key=value table. Secrets are never
//! printed in either mode.

use serde_json::json;

use ping_mcp_core::{EnvironmentRegistry, Settings};

use crate::cli::ConfigArgs;

/// Run the `config` subcommand.
///
/// # Errors
///
/// Returns an error if configuration validation fails, making this the
/// quickest way to check a deployment's environment variables.
pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    let registry = EnvironmentRegistry::from_env()?;
    let environments = registry.list_configured();

    if args.json {
        let out = json!({
            "region": settings.region.to_string(),
            "organization_id": settings.org_id,
            "max_requests_per_second": settings.max_requests_per_second,
            "max_retries": settings.max_retries,
            "request_timeout_secs": settings.request_timeout_secs,
            "default_page_size": settings.default_page_size,
            "max_page_size": settings.max_page_size,
            "environments": environments,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("ping-mcp configuration:");
        println!("  region                  = {}", settings.region);
        println!("  organization_id         = {}", settings.org_id);
        println!("  max_requests_per_second = {}", settings.max_requests_per_second);
        println!("  max_retries             = {}", settings.max_retries);
        println!("  request_timeout_secs    = {}", settings.request_timeout_secs);
        println!("  default_page_size       = {}", settings.default_page_size);
        println!("  max_page_size           = {}", settings.max_page_size);
        println!();
        println!("environments:");
        for env in &environments {
            let marker = if env.is_default { " (default)" } else { "" };
            println!("  [{}]{marker}", env.name);
            println!("    id      = {}", env.id);
            if env.aliases.is_empty() {
                println!("    aliases = (none)");
            } else {
                println!("    aliases = {}", env.aliases.join(", "));
            }
        }
    }

    Ok(())
}
