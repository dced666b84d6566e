//! MCP tool definitions for the PingOne server.
//!
//! Each function returns one tool schema as a JSON value; [`all_tools`]
//! collects them in the order they appear in `tools/list` responses. The
//! execution logic lives in [`crate::handlers`].

use serde_json::{Value, json};

/// Number of tools exposed through `tools/list`.
pub const TOOL_COUNT: usize = 18;

/// Return all tool definitions for the `tools/list` response.
pub fn all_tools() -> Vec<Value> {
    vec![
        list_configured_environments_schema(),
        list_pingone_environments_schema(),
        get_pingone_environment_schema(),
        list_pingone_environment_resources_schema(),
        get_pingone_environment_activity_schema(),
        list_pingone_users_schema(),
        get_pingone_user_schema(),
        get_pingone_user_sessions_schema(),
        list_pingone_groups_schema(),
        get_pingone_group_schema(),
        list_pingone_group_members_schema(),
        list_pingone_populations_schema(),
        get_pingone_population_schema(),
        list_pingone_user_mfa_devices_schema(),
        get_pingone_user_mfa_device_schema(),
        get_current_time_schema(),
        parse_relative_time_schema(),
        create_date_range_schema(),
    ]
}

/// Shared description for the `environment` parameter.
const ENVIRONMENT_PARAM_DESC: &str =
    "Environment name or alias from list_configured_environments. Leave empty for the default.";

fn environment_property() -> Value {
    json!({"type": "string", "description": ENVIRONMENT_PARAM_DESC})
}

fn list_configured_environments_schema() -> Value {
    json!({
        "name": "list_configured_environments",
        "description": "List the environments configured for this server: names, aliases, and which one is the default. Call this first to see what environment names the other tools accept. Secrets are never included.",
        "inputSchema": {
            "type": "object",
            "properties": {}
        }
    })
}

fn list_pingone_environments_schema() -> Value {
    json!({
        "name": "list_pingone_environments",
        "description": "List ALL environments in the PingOne organization (organization-level call), not just the ones configured for this server. Useful for discovering environments and their UUIDs.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "limit": {"type": "integer", "minimum": 1, "maximum": 500, "description": "Max environments to return (default 100)"},
                "filter_by": {"type": "string", "description": "SCIM filter, e.g. 'name sw \"Test\"' or 'status eq \"ACTIVE\"'. Supported attributes: name (sw), id (eq), organization.id (eq), license.id (eq), status (eq)."},
                "expand_bill_of_materials": {"type": "boolean", "description": "Include bill of materials (licensed products)"}
            }
        }
    })
}

fn get_pingone_environment_schema() -> Value {
    json!({
        "name": "get_pingone_environment",
        "description": "Get detailed information about one configured environment, including license details and feature breakdown.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "environment": environment_property(),
                "include_license": {"type": "boolean", "description": "Include detailed license information (default true)"},
                "include_bill_of_materials": {"type": "boolean", "description": "Include bill of materials (feature breakdown)"}
            }
        }
    })
}

fn list_pingone_environment_resources_schema() -> Value {
    json!({
        "name": "list_pingone_environment_resources",
        "description": "List applications or API resources within an environment. Applications are OAuth/OIDC/SAML connections; resources define protected endpoints and scopes.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "resource_type": {"type": "string", "enum": ["applications", "resources"], "description": "Type of resources to list (default 'resources')"},
                "limit": {"type": "integer", "minimum": 1, "maximum": 100, "description": "Max resources to return (default 50)"},
                "filter_by": {"type": "string", "description": "SCIM filter, e.g. 'type eq \"CUSTOM\"' or 'name sw \"Custom\"'. Operators: eq, sw, ew, co."},
                "environment": environment_property()
            }
        }
    })
}

fn get_pingone_environment_activity_schema() -> Value {
    json!({
        "name": "get_pingone_environment_activity",
        "description": "Get audit activity for an environment. A recordedat date range filter is REQUIRED; use create_date_range to build one. Supported operators: eq, gt, lt, ge, le, and, or. Additional filters: actors.user.id, actors.user.name, action.type, resources.type, resources.population.id, correlationid, tags.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "limit": {"type": "integer", "minimum": 1, "maximum": 100, "description": "Max activities to return (default 50)"},
                "filter_by": {"type": "string", "description": "SCIM filter. Must include a recordedat range, e.g. 'recordedat gt \"2024-06-01T00:00:00Z\" and recordedat lt \"2024-06-22T23:59:59Z\"'."},
                "environment": environment_property()
            },
            "required": ["filter_by"]
        }
    })
}

fn list_pingone_users_schema() -> Value {
    json!({
        "name": "list_pingone_users",
        "description": "Search PingOne users with SCIM filtering. Returns user IDs for get_pingone_user. Filterable attributes include username, email, enabled, name.given, name.family, population.id, type, locale (operators: eq, sw, ew, co; combine with 'and'). Timestamps such as createdAt are NOT filterable.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "limit": {"type": "integer", "minimum": 1, "maximum": 100, "description": "Max users to return (default 100)"},
                "population_id": {"type": "string", "description": "Population UUID filter"},
                "filter_by": {"type": "string", "description": "SCIM filter expression, e.g. 'enabled eq true and type eq \"Employee\"'"},
                "detail_level": {"type": "string", "enum": ["basic", "detailed", "contact"], "description": "basic=core fields, detailed=+dates/lifecycle/MFA, contact=+phone/address"},
                "environment": environment_property()
            }
        }
    })
}

fn get_pingone_user_schema() -> Value {
    json!({
        "name": "get_pingone_user",
        "description": "Get detailed user information by UUID (from list_pingone_users). Optionally include group memberships and expanded population details.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "user_id": {"type": "string", "description": "User UUID (format: 12345678-1234-1234-1234-123456789abc)"},
                "detail_level": {"type": "string", "enum": ["basic", "detailed", "contact"], "description": "basic=core fields, detailed=+lifecycle/MFA, contact=+phone/address"},
                "include_groups": {"type": "boolean", "description": "Include group memberships"},
                "expand_population": {"type": "boolean", "description": "Include population details"},
                "environment": environment_property()
            },
            "required": ["user_id"]
        }
    })
}

fn get_pingone_user_sessions_schema() -> Value {
    json!({
        "name": "get_pingone_user_sessions",
        "description": "Get active sessions for a user: login times, IP addresses, browser, OS, device, and location. Limited to the last 10 sessions, newest first.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "user_id": {"type": "string", "description": "User UUID from list_pingone_users"},
                "include_details": {"type": "boolean", "description": "Include browser, OS, device, and location details (default true)"},
                "environment": environment_property()
            },
            "required": ["user_id"]
        }
    })
}

fn list_pingone_groups_schema() -> Value {
    json!({
        "name": "list_pingone_groups",
        "description": "List groups in an environment with optional SCIM filtering. Filterable attributes: name, description (eq, sw, ew, co), population.id (eq).",
        "inputSchema": {
            "type": "object",
            "properties": {
                "limit": {"type": "integer", "minimum": 1, "maximum": 100, "description": "Max groups to return (default 100)"},
                "filter_by": {"type": "string", "description": "SCIM filter, e.g. 'name sw \"Admin\"'"},
                "population_id": {"type": "string", "description": "Filter by population UUID"},
                "environment": environment_property()
            }
        }
    })
}

fn get_pingone_group_schema() -> Value {
    json!({
        "name": "get_pingone_group",
        "description": "Get detailed group information by UUID (from list_pingone_groups). Optionally include member details.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "group_id": {"type": "string", "description": "Group UUID from list_pingone_groups"},
                "include_members": {"type": "boolean", "description": "Include group member details"},
                "environment": environment_property()
            },
            "required": ["group_id"]
        }
    })
}

fn list_pingone_group_members_schema() -> Value {
    json!({
        "name": "list_pingone_group_members",
        "description": "List the users belonging to a group.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "group_id": {"type": "string", "description": "Group UUID from list_pingone_groups"},
                "limit": {"type": "integer", "minimum": 1, "maximum": 200, "description": "Max members to return (default 100)"},
                "environment": environment_property()
            },
            "required": ["group_id"]
        }
    })
}

fn list_pingone_populations_schema() -> Value {
    json!({
        "name": "list_pingone_populations",
        "description": "List populations in an environment. Populations partition users for policy and administration.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "environment": environment_property()
            }
        }
    })
}

fn get_pingone_population_schema() -> Value {
    json!({
        "name": "get_pingone_population",
        "description": "Get detailed population information by UUID (from list_pingone_populations). Optionally include the password policy.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "population_id": {"type": "string", "description": "Population UUID from list_pingone_populations"},
                "include_password_policy": {"type": "boolean", "description": "Include password policy details"},
                "environment": environment_property()
            },
            "required": ["population_id"]
        }
    })
}

fn list_pingone_user_mfa_devices_schema() -> Value {
    json!({
        "name": "list_pingone_user_mfa_devices",
        "description": "List a user's MFA devices: type, status, and enrollment details.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "user_id": {"type": "string", "description": "User UUID from list_pingone_users"},
                "environment": environment_property()
            },
            "required": ["user_id"]
        }
    })
}

fn get_pingone_user_mfa_device_schema() -> Value {
    json!({
        "name": "get_pingone_user_mfa_device",
        "description": "Get one MFA device for a user by device UUID.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "user_id": {"type": "string", "description": "User UUID from list_pingone_users"},
                "device_id": {"type": "string", "description": "MFA device UUID from list_pingone_user_mfa_devices"},
                "environment": environment_property()
            },
            "required": ["user_id", "device_id"]
        }
    })
}

fn get_current_time_schema() -> Value {
    json!({
        "name": "get_current_time",
        "description": "Get the current UTC time formatted for PingOne API usage. Use buffer_hours for times in the past (negative) or future (positive).",
        "inputSchema": {
            "type": "object",
            "properties": {
                "buffer_hours": {"type": "integer", "description": "Hours to add or subtract from the current time (negative for past)"}
            }
        }
    })
}

fn parse_relative_time_schema() -> Value {
    json!({
        "name": "parse_relative_time",
        "description": "Parse a natural language time expression ('2 days ago', 'yesterday', 'last week') into an ISO 8601 timestamp suitable for SCIM filters.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "time_expression": {"type": "string", "description": "Time expression, e.g. '2 days ago', 'yesterday', '1 hour ago'"}
            },
            "required": ["time_expression"]
        }
    })
}

fn create_date_range_schema() -> Value {
    json!({
        "name": "create_date_range",
        "description": "Create a date range from two time expressions and return a ready-to-use recordedat SCIM filter for audit queries. Example: start='1 week ago', end='now'.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "start_expression": {"type": "string", "description": "Start time expression, e.g. '1 week ago'"},
                "end_expression": {"type": "string", "description": "End time expression (default 'now')"}
            },
            "required": ["start_expression"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_count_matches() {
        assert_eq!(all_tools().len(), TOOL_COUNT);
    }

    #[test]
    fn test_all_tools_have_name_description_schema() {
        for tool in all_tools() {
            let name = tool.get("name").and_then(Value::as_str).unwrap();
            assert!(!name.is_empty());
            assert!(
                tool.get("description").and_then(Value::as_str).is_some(),
                "{name} missing description"
            );
            let schema = tool.get("inputSchema").unwrap();
            assert_eq!(schema.get("type").and_then(Value::as_str), Some("object"));
            assert!(schema.get("properties").is_some(), "{name} missing properties");
        }
    }

    #[test]
    fn test_tool_names_are_unique() {
        let mut names: Vec<String> = all_tools()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        names.sort();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn test_required_fields_exist_in_properties() {
        for tool in all_tools() {
            let schema = &tool["inputSchema"];
            let Some(required) = schema.get("required").and_then(Value::as_array) else {
                continue;
            };
            let properties = schema["properties"].as_object().unwrap();
            for field in required {
                assert!(
                    properties.contains_key(field.as_str().unwrap()),
                    "{}: required field {field} not in properties",
                    tool["name"]
                );
            }
        }
    }

    #[test]
    fn test_environment_parameter_present_on_api_tools() {
        let env_tools = [
            "get_pingone_environment",
            "list_pingone_users",
            "get_pingone_user",
            "list_pingone_groups",
            "list_pingone_populations",
            "list_pingone_user_mfa_devices",
        ];
        let tools = all_tools();
        for name in env_tools {
            let tool = tools
                .iter()
                .find(|t| t["name"] == name)
                .unwrap_or_else(|| panic!("missing tool {name}"));
            assert!(
                tool["inputSchema"]["properties"].get("environment").is_some(),
                "{name} missing environment parameter"
            );
        }
    }
}
