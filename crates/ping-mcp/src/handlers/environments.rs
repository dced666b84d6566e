//! Environment discovery and inspection tools.

use serde_json::{Value, json};

use ping_mcp_core::PingClient;

use super::{ToolError, environment_arg, opt_bool, opt_str, opt_u32};

/// `list_configured_environments`: the server-side registry, no API call.
pub fn list_configured(client: &PingClient) -> Result<Value, ToolError> {
    let registry = client.registry();
    let environments = registry.list_configured();
    let default_name = registry.default_environment().name.clone();

    Ok(json!({
        "success": true,
        "configured_environments": environments,
        "summary": {
            "total_environments": registry.len(),
            "default_environment": default_name,
            "region": client.settings().region.to_string(),
            "organization_id": client.settings().org_id,
            "usage_notes": [
                "Use environment 'name' or any 'alias' in other tools",
                "Leave the environment parameter empty to use the default",
                "Names and aliases are case-insensitive",
                "Use list_pingone_environments to see all org environments"
            ]
        }
    }))
}

/// `list_pingone_environments`: organization-level listing of every
/// environment, annotated with whether each one is configured locally.
pub async fn list_org_environments(
    client: &PingClient,
    args: &Value,
) -> Result<Value, ToolError> {
    let limit = client.effective_page_size(opt_u32(args, "limit"));
    let mut query = vec![("limit".to_string(), limit.to_string())];
    if let Some(filter) = opt_str(args, "filter_by") {
        query.push(("filter".to_string(), filter.to_string()));
    }
    let expand_bom = opt_bool(args, "expand_bill_of_materials", false);
    if expand_bom {
        query.push(("expand".to_string(), "billOfMaterials".to_string()));
    }

    let result = client
        .get_organization_list("environments", query, None)
        .await?;

    let configured_ids: Vec<String> = client
        .registry()
        .list_configured()
        .into_iter()
        .map(|e| e.id)
        .collect();

    let environments: Vec<Value> = result["items"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|mut env| {
            let configured = env
                .get("id")
                .and_then(Value::as_str)
                .is_some_and(|id| configured_ids.iter().any(|c| c == id));
            if let Some(map) = env.as_object_mut() {
                map.insert("configured_in_mcp".to_string(), json!(configured));
            }
            env
        })
        .collect();

    let configured_count = environments
        .iter()
        .filter(|e| e["configured_in_mcp"] == true)
        .count();

    Ok(json!({
        "success": true,
        "environments": environments,
        "summary": {
            "total_count": environments.len(),
            "configured_in_mcp_count": configured_count,
            "applied_filter": opt_str(args, "filter_by").unwrap_or("none"),
            "bill_of_materials_included": expand_bom,
            "has_more": result["pagination"]["has_next"],
        }
    }))
}

/// `get_pingone_environment`: details for one configured environment.
pub async fn get_environment(client: &PingClient, args: &Value) -> Result<Value, ToolError> {
    let environment = environment_arg(args);
    let include_license = opt_bool(args, "include_license", true);
    let include_bom = opt_bool(args, "include_bill_of_materials", false);

    let mut include = Vec::new();
    if include_license {
        include.push("license");
    }
    if include_bom {
        include.push("billOfMaterials");
    }
    let mut query = Vec::new();
    if !include.is_empty() {
        query.push(("include".to_string(), include.join(",")));
    }

    let result = client
        .get_single(environment, "environment", query, None)
        .await?;

    Ok(json!({
        "success": true,
        "environment_details": result["item"],
        "environment": result["environment"],
        "included_data": {
            "license": include_license,
            "bill_of_materials": include_bom
        }
    }))
}

const RESOURCE_TYPES: [&str; 2] = ["applications", "resources"];

/// `list_pingone_environment_resources`: applications or API resources.
pub async fn list_environment_resources(
    client: &PingClient,
    args: &Value,
) -> Result<Value, ToolError> {
    let resource_type = opt_str(args, "resource_type").unwrap_or("resources");
    if !RESOURCE_TYPES.contains(&resource_type) {
        return Err(ToolError::new(format!(
            "invalid resource_type '{resource_type}': expected 'applications' or 'resources'"
        )));
    }

    let limit = client.effective_page_size(opt_u32(args, "limit").or(Some(50)));
    let mut query = vec![("limit".to_string(), limit.to_string())];
    if let Some(filter) = opt_str(args, "filter_by") {
        query.push(("filter".to_string(), filter.to_string()));
    }

    let result = client
        .get_list(environment_arg(args), resource_type, query, None)
        .await?;

    Ok(json!({
        "success": true,
        "resource_type": resource_type,
        "resources": result["items"],
        "environment": result["environment"],
        "summary": {
            "resource_count": result["items"].as_array().map_or(0, Vec::len),
            "filter_applied": opt_str(args, "filter_by").unwrap_or("none"),
            "has_more": result["pagination"]["has_next"],
        }
    }))
}

/// SCIM operators the audit activities endpoint rejects with a 400.
const UNSUPPORTED_AUDIT_OPERATORS: [&str; 7] = [" ne ", " co ", " ew ", " sw ", " pr ", " in ", " not "];

/// `get_pingone_environment_activity`: audit log query. A `recordedat` date
/// range is mandatory.
pub async fn get_environment_activity(
    client: &PingClient,
    args: &Value,
) -> Result<Value, ToolError> {
    let Some(filter) = opt_str(args, "filter_by") else {
        return Err(ToolError::new(
            "audit activities require a date range filter. Use create_date_range to generate one, \
             e.g. 'recordedat gt \"2024-06-01T00:00:00Z\" and recordedat lt \"2024-06-22T23:59:59Z\"'",
        ));
    };
    let lowered = filter.to_lowercase();
    if !lowered.contains("recordedat") {
        return Err(ToolError::new(
            "audit activity filters must include a recordedat date range. \
             Use create_date_range to generate one.",
        ));
    }
    if let Some(op) = UNSUPPORTED_AUDIT_OPERATORS
        .iter()
        .find(|op| lowered.contains(*op))
    {
        return Err(ToolError::new(format!(
            "operator '{}' is not supported by the audit API. Supported: eq, gt, lt, ge, le, and, or",
            op.trim()
        )));
    }

    let limit = client.effective_page_size(opt_u32(args, "limit").or(Some(50)));
    let query = vec![
        ("limit".to_string(), limit.to_string()),
        ("filter".to_string(), filter.to_string()),
    ];

    let result = client
        .get_list(environment_arg(args), "activities", query, None)
        .await?;

    Ok(json!({
        "success": true,
        "activities": result["items"],
        "environment": result["environment"],
        "summary": {
            "activity_count": result["items"].as_array().map_or(0, Vec::len),
            "filter_applied": filter,
            "has_more": result["pagination"]["has_next"],
        }
    }))
}
