//! Population tools.

use serde_json::{Value, json};

use ping_mcp_core::PingClient;

use super::{ToolError, environment_arg, opt_bool, require_uuid};

/// `list_pingone_populations`: every population in the environment.
pub async fn list_populations(client: &PingClient, args: &Value) -> Result<Value, ToolError> {
    let result = client
        .get_list(environment_arg(args), "populations", Vec::new(), None)
        .await?;

    Ok(json!({
        "success": true,
        "populations": result["items"],
        "environment": result["environment"],
        "summary": {
            "population_count": result["items"].as_array().map_or(0, Vec::len),
            "usage_note": "Use population IDs to filter users with list_pingone_users"
        }
    }))
}

/// `get_pingone_population`: one population by UUID, optionally with its
/// password policy.
pub async fn get_population(client: &PingClient, args: &Value) -> Result<Value, ToolError> {
    let population_id = require_uuid(args, "population_id", "list_pingone_populations")?;
    let include_password_policy = opt_bool(args, "include_password_policy", false);

    let mut query = Vec::new();
    if include_password_policy {
        query.push(("include".to_string(), "passwordPolicy".to_string()));
    }

    let result = client
        .get_single(
            environment_arg(args),
            &format!("populations/{population_id}"),
            query,
            None,
        )
        .await?;

    Ok(json!({
        "success": true,
        "population": result["item"],
        "environment": result["environment"],
        "included_data": {
            "password_policy": include_password_policy
        }
    }))
}
