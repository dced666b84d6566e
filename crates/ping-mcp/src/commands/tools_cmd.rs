//! `tools` subcommand: list the available MCP tools.

use crate::cli::ToolsArgs;
use crate::tools;

/// Run the `tools` subcommand. Needs no configuration since tool schemas are
/// static.
///
/// # Errors
///
/// Returns an error only if schema serialization fails.
pub async fn run(args: ToolsArgs) -> anyhow::Result<()> {
    let all = tools::all_tools();

    if args.schemas {
        println!("{}", serde_json::to_string_pretty(&all)?);
    } else {
        println!("{} tools available:", all.len());
        for tool in &all {
            let name = tool["name"].as_str().unwrap_or("?");
            let description = tool["description"].as_str().unwrap_or("");
            let first_sentence = description.split(". ").next().unwrap_or(description);
            println!("  {name:<40} {first_sentence}");
        }
    }

    Ok(())
}
