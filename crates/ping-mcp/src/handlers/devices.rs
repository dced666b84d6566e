//! MFA device tools.

use serde_json::{Value, json};

use ping_mcp_core::PingClient;

use super::{ToolError, environment_arg, require_uuid};

/// `list_pingone_user_mfa_devices`: a user's enrolled MFA devices.
pub async fn list_mfa_devices(client: &PingClient, args: &Value) -> Result<Value, ToolError> {
    let user_id = require_uuid(args, "user_id", "list_pingone_users")?;

    let result = client
        .get_list(
            environment_arg(args),
            &format!("users/{user_id}/devices"),
            Vec::new(),
            None,
        )
        .await?;

    Ok(json!({
        "success": true,
        "user_id": user_id,
        "devices": result["items"],
        "environment": result["environment"],
        "summary": {
            "device_count": result["items"].as_array().map_or(0, Vec::len),
        }
    }))
}

/// `get_pingone_user_mfa_device`: one MFA device by UUID.
pub async fn get_mfa_device(client: &PingClient, args: &Value) -> Result<Value, ToolError> {
    let user_id = require_uuid(args, "user_id", "list_pingone_users")?;
    let device_id = require_uuid(args, "device_id", "list_pingone_user_mfa_devices")?;

    let result = client
        .get_single(
            environment_arg(args),
            &format!("users/{user_id}/devices/{device_id}"),
            Vec::new(),
            None,
        )
        .await?;

    Ok(json!({
        "success": true,
        "user_id": user_id,
        "device": result["item"],
        "environment": result["environment"],
    }))
}
