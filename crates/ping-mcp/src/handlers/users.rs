//! User search, lookup, and session tools.

use serde_json::{Value, json};

use ping_mcp_core::PingClient;

use super::{ToolError, environment_arg, opt_bool, opt_str, opt_u32, require_uuid};

/// Projection applied per detail level, or `None` for the raw resource.
fn detail_fields(detail_level: Option<&str>) -> Result<Option<Vec<String>>, ToolError> {
    let fields: &[&str] = match detail_level {
        None => return Ok(None),
        Some("basic") => &[
            "id",
            "username",
            "email",
            "enabled",
            "name.given",
            "name.family",
            "lifecycle.status",
        ],
        Some("detailed") => &[
            "id",
            "username",
            "email",
            "enabled",
            "createdAt",
            "updatedAt",
            "name.given",
            "name.family",
            "name.formatted",
            "lifecycle.status",
            "account.status",
            "account.canAuthenticate",
            "population.id",
            "mfaEnabled",
            "verifyStatus",
        ],
        Some("contact") => &[
            "id",
            "username",
            "email",
            "mobilePhone",
            "primaryPhone",
            "name.given",
            "name.family",
            "address",
        ],
        Some(other) => {
            return Err(ToolError::new(format!(
                "invalid detail_level '{other}': expected 'basic', 'detailed', or 'contact'"
            )));
        }
    };
    Ok(Some(fields.iter().map(|f| f.to_string()).collect()))
}

/// `list_pingone_users`: SCIM search over users.
pub async fn list_users(client: &PingClient, args: &Value) -> Result<Value, ToolError> {
    let limit = client.effective_page_size(opt_u32(args, "limit"));
    let detail_level = opt_str(args, "detail_level");
    let fields = detail_fields(detail_level)?;

    // population_id and filter_by combine into one SCIM expression.
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
        .get_list(environment_arg(args), "users", query, fields.as_deref())
        .await?;

    Ok(json!({
        "success": true,
        "users": result["items"],
        "environment": result["environment"],
        "summary": {
            "returned_count": result["items"].as_array().map_or(0, Vec::len),
            "has_more": result["pagination"]["has_next"],
            "detail_level": detail_level.unwrap_or("full"),
            "filter_applied": applied_filter,
            "scim_limitation": "PingOne SCIM does not support filtering by createdAt/updatedAt timestamps"
        }
    }))
}

/// `get_pingone_user`: one user by UUID, with optional group membership and
/// population expansion.
pub async fn get_user(client: &PingClient, args: &Value) -> Result<Value, ToolError> {
    let user_id = require_uuid(args, "user_id", "list_pingone_users")?;
    let include_groups = opt_bool(args, "include_groups", false);
    let expand_population = opt_bool(args, "expand_population", false);
    let detail_level = opt_str(args, "detail_level");

    let mut fields = detail_fields(detail_level)?;
    if let Some(fields) = fields.as_mut() {
        // Projections must not drop the data the caller asked to include.
        if include_groups {
            fields.push("memberOfGroupNames".to_string());
            fields.push("memberOfGroupIDs".to_string());
        }
        if expand_population {
            fields.push("population".to_string());
        }
    }

    let mut query = Vec::new();
    if include_groups {
        query.push((
            "include".to_string(),
            "memberOfGroupNames,memberOfGroupIDs".to_string(),
        ));
    }
    if expand_population {
        query.push(("expand".to_string(), "populations".to_string()));
    }

    let result = client
        .get_single(
            environment_arg(args),
            &format!("users/{user_id}"),
            query,
            fields.as_deref(),
        )
        .await?;

    Ok(json!({
        "success": true,
        "user": result["item"],
        "environment": result["environment"],
        "detail_level": detail_level.unwrap_or("full"),
        "included_data": {
            "groups": include_groups,
            "population_details": expand_population
        }
    }))
}

/// `get_pingone_user_sessions`: active sessions for one user, newest first,
/// at most 10 per the API.
pub async fn get_user_sessions(client: &PingClient, args: &Value) -> Result<Value, ToolError> {
    let user_id = require_uuid(args, "user_id", "list_pingone_users")?;
    let include_details = opt_bool(args, "include_details", true);

    let result = client
        .get_list(
            environment_arg(args),
            &format!("users/{user_id}/sessions"),
            Vec::new(),
            None,
        )
        .await?;

    let mut sessions = result["items"].as_array().cloned().unwrap_or_default();
    if !include_details {
        sessions = sessions.iter().map(simplify_session).collect();
    }

    Ok(json!({
        "success": true,
        "user_id": user_id,
        "sessions": sessions,
        "environment": result["environment"],
        "summary": {
            "session_count": sessions.len(),
            "max_sessions_per_user": 10,
            "details_included": include_details,
            "note": "Sessions ordered by date (newest first). Max 10 sessions per user."
        }
    }))
}

/// Reduce a session to identifiers, timestamps, and the last sign-on.
fn simplify_session(session: &Value) -> Value {
    json!({
        "id": session.get("id"),
        "createdAt": session.get("createdAt"),
        "activeAt": session.get("activeAt"),
        "lastSignOn": {
            "at": session.pointer("/lastSignOn/at"),
            "remoteIp": session.pointer("/lastSignOn/remoteIp")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_fields_levels() {
        assert!(detail_fields(None).unwrap().is_none());
        let basic = detail_fields(Some("basic")).unwrap().unwrap();
        assert!(basic.contains(&"username".to_string()));
        assert!(!basic.contains(&"createdAt".to_string()));

        let detailed = detail_fields(Some("detailed")).unwrap().unwrap();
        assert!(detailed.contains(&"createdAt".to_string()));
        assert!(detailed.contains(&"mfaEnabled".to_string()));

        let contact = detail_fields(Some("contact")).unwrap().unwrap();
        assert!(contact.contains(&"mobilePhone".to_string()));

        assert!(detail_fields(Some("everything")).is_err());
    }

    #[test]
    fn test_simplify_session() {
        let session = json!({
            "id": "s-1",
            "createdAt": "2024-06-01T00:00:00Z",
            "activeAt": "2024-06-02T00:00:00Z",
            "lastSignOn": {"at": "2024-06-02T00:00:00Z", "remoteIp": "10.0.0.1", "userAgent": "x"},
            "browser": {"name": "Firefox"},
            "operatingSystem": {"name": "Linux"}
        });
        let simplified = simplify_session(&session);
        assert_eq!(simplified["lastSignOn"]["remoteIp"], "10.0.0.1");
        assert!(simplified.get("browser").is_none());
        assert!(simplified.get("operatingSystem").is_none());
    }
}
