//! Tool execution: dispatches `tools/call` requests to the per-domain
//! handler modules and provides shared argument parsing helpers.

pub mod datetime;
pub mod devices;
pub mod environments;
pub mod groups;
pub mod populations;
pub mod users;

use serde_json::{Value, json};

use ping_mcp_core::{ClientError, PingClient};

/// A failed tool invocation, surfaced as an MCP tool result with
/// `isError: true`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ToolError {
    pub message: String,
    pub data: Option<Value>,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(message: impl Into<String>, data: Value) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

impl From<ClientError> for ToolError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Environment(not_found) => ToolError::with_data(
                not_found.to_string(),
                json!({"configured_environments": not_found.available}),
            ),
            ClientError::Api {
                status,
                code,
                message,
                correlation_id,
            } => ToolError::with_data(
                format!("PingOne API error (HTTP {status}): {message}"),
                json!({"status": status, "code": code, "correlation_id": correlation_id}),
            ),
            other => ToolError::new(other.to_string()),
        }
    }
}

/// Execute a tool by name. Unknown names are reported as a tool error, not a
/// protocol error, so the client sees them in-band.
pub async fn call_tool(
    client: &PingClient,
    name: &str,
    args: &Value,
) -> Result<Value, ToolError> {
    match name {
        "list_configured_environments" => environments::list_configured(client),
        "list_pingone_environments" => environments::list_org_environments(client, args).await,
        "get_pingone_environment" => environments::get_environment(client, args).await,
        "list_pingone_environment_resources" => {
            environments::list_environment_resources(client, args).await
        }
        "get_pingone_environment_activity" => {
            environments::get_environment_activity(client, args).await
        }
        "list_pingone_users" => users::list_users(client, args).await,
        "get_pingone_user" => users::get_user(client, args).await,
        "get_pingone_user_sessions" => users::get_user_sessions(client, args).await,
        "list_pingone_groups" => groups::list_groups(client, args).await,
        "get_pingone_group" => groups::get_group(client, args).await,
        "list_pingone_group_members" => groups::list_group_members(client, args).await,
        "list_pingone_populations" => populations::list_populations(client, args).await,
        "get_pingone_population" => populations::get_population(client, args).await,
        "list_pingone_user_mfa_devices" => devices::list_mfa_devices(client, args).await,
        "get_pingone_user_mfa_device" => devices::get_mfa_device(client, args).await,
        "get_current_time" => datetime::get_current_time(args),
        "parse_relative_time" => datetime::parse_relative_time(args),
        "create_date_range" => datetime::create_date_range(args),
        other => Err(ToolError::new(format!("unknown tool: {other}"))),
    }
}

/// Required string argument; missing, non-string, or blank is an error.
pub(crate) fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::new(format!("missing required argument: {key}")))
}

/// Optional string argument; blank collapses to `None`.
pub(crate) fn opt_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub(crate) fn opt_bool(args: &Value, key: &str, default: bool) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(default)
}

pub(crate) fn opt_u32(args: &Value, key: &str) -> Option<u32> {
    args.get(key).and_then(Value::as_u64).map(|v| v as u32)
}

/// The `environment` argument shared by most API tools.
pub(crate) fn environment_arg<'a>(args: &'a Value) -> Option<&'a str> {
    opt_str(args, "environment")
}

/// Validate a UUID argument, pointing the caller at the discovery tool when
/// the format is wrong.
pub(crate) fn require_uuid<'a>(
    args: &'a Value,
    key: &str,
    discovery_tool: &str,
) -> Result<&'a str, ToolError> {
    let value = require_str(args, key)?;
    if uuid::Uuid::parse_str(value).is_err() {
        return Err(ToolError::new(format!(
            "invalid UUID format for {key}: '{value}'. Use {discovery_tool} to find the correct UUID."
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_str() {
        let args = json!({"name": "value", "blank": "  "});
        assert_eq!(require_str(&args, "name").unwrap(), "value");
        assert!(require_str(&args, "blank").is_err());
        assert!(require_str(&args, "missing").is_err());
    }

    #[test]
    fn test_opt_helpers() {
        let args = json!({"s": " x ", "b": true, "n": 42, "empty": ""});
        assert_eq!(opt_str(&args, "s"), Some("x"));
        assert_eq!(opt_str(&args, "empty"), None);
        assert!(opt_bool(&args, "b", false));
        assert!(opt_bool(&args, "missing", true));
        assert_eq!(opt_u32(&args, "n"), Some(42));
    }

    #[test]
    fn test_require_uuid() {
        let args = json!({"user_id": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "bad": "not-a-uuid"});
        assert!(require_uuid(&args, "user_id", "list_pingone_users").is_ok());
        let err = require_uuid(&args, "bad", "list_pingone_users").unwrap_err();
        assert!(err.message.contains("list_pingone_users"));
    }

    #[test]
    fn test_environment_not_found_carries_names() {
        let err = ping_mcp_core::EnvironmentNotFound {
            requested: "qa".into(),
            available: vec!["Production".into(), "Staging".into()],
        };
        let tool_err: ToolError = ClientError::Environment(err).into();
        let data = tool_err.data.unwrap();
        assert_eq!(
            data["configured_environments"],
            json!(["Production", "Staging"])
        );
    }
}
