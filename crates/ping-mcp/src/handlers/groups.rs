//! Group listing and membership tools.

use serde_json::{Value, json};

use ping_mcp_core::PingClient;

use super::{ToolError, environment_arg, opt_bool, opt_str, opt_u32, require_uuid};

/// `list_pingone_groups`: groups in an environment with optional SCIM filter.
pub async fn list_groups(client: &PingClient, args: &Value) -> Result<Value, ToolError> {
    let limit = client.effective_page_size(opt_u32(args, "limit"));

    let mut filters = Vec::new();
    if let Some(population_id) = opt_str(args, "population_id") {
        filters.push(format!("population.id eq \"{population_id}\""));
    }
    if let Some(filter) = opt_str(args, "filter_by") {
        filters.push(filter.to_string());
    }

    let mut query = vec![("limit".to_string(), limit.to_string())];
    let applied_filter = if filters.is_empty() {
        "none".to_string()
    } else {
        let combined = filters.join(" and ");
        query.push(("filter".to_string(), combined.clone()));
        combined
    };

    let result = client
        .get_list(environment_arg(args), "groups", query, None)
        .await?;

    Ok(json!({
        "success": true,
        "groups": result["items"],
        "environment": result["environment"],
        "summary": {
            "returned_count": result["items"].as_array().map_or(0, Vec::len),
            "has_more": result["pagination"]["has_next"],
            "filter_applied": applied_filter,
        }
    }))
}

/// `get_pingone_group`: one group by UUID, optionally with its members.
pub async fn get_group(client: &PingClient, args: &Value) -> Result<Value, ToolError> {
    let group_id = require_uuid(args, "group_id", "list_pingone_groups")?;
    let include_members = opt_bool(args, "include_members", false);
    let environment = environment_arg(args);

    let result = client
        .get_single(environment, &format!("groups/{group_id}"), Vec::new(), None)
        .await?;

    let members = if include_members {
        let members_result = client
            .get_list(
                environment,
                &format!("groups/{group_id}/membershipUsers"),
                Vec::new(),
                None,
            )
            .await?;
        Some(members_result["items"].clone())
    } else {
        None
    };

    Ok(json!({
        "success": true,
        "group": result["item"],
        "members": members,
        "environment": result["environment"],
        "included_data": {
            "members": include_members
        }
    }))
}

/// `list_pingone_group_members`: the users belonging to a group.
pub async fn list_group_members(client: &PingClient, args: &Value) -> Result<Value, ToolError> {
    let group_id = require_uuid(args, "group_id", "list_pingone_groups")?;
    let limit = client.effective_page_size(opt_u32(args, "limit"));

    let result = client
        .get_list(
            environment_arg(args),
            &format!("groups/{group_id}/membershipUsers"),
            vec![("limit".to_string(), limit.to_string())],
            None,
        )
        .await?;

    Ok(json!({
        "success": true,
        "group_id": group_id,
        "members": result["items"],
        "environment": result["environment"],
        "summary": {
            "member_count": result["items"].as_array().map_or(0, Vec::len),
            "has_more": result["pagination"]["has_next"],
        }
    }))
}
