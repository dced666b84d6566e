//! MCP server core: JSON-RPC dispatch over stdio.
//!
//! [`McpServer::run`] drives the stdio loop; [`McpServer::handle_message`]
//! contains the method dispatch and is reused by the HTTP transport in
//! [`crate::http`].

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::io::{AsyncRead, AsyncWrite};

use ping_mcp_core::PingClient;

use crate::framing::{MessageReader, write_message};
use crate::handlers;
use crate::tools;

/// MCP protocol revision this server implements.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC error code: invalid params.
pub const ERR_INVALID_PARAMS: i64 = -32602;

/// JSON-RPC error code: method not found.
pub const ERR_METHOD_NOT_FOUND: i64 = -32601;

/// JSON-RPC error code: internal error.
pub const ERR_INTERNAL: i64 = -32603;

/// Serves MCP requests against a shared [`PingClient`].
#[derive(Debug, Clone)]
pub struct McpServer {
    client: Arc<PingClient>,
}

impl McpServer {
    pub fn new(client: Arc<PingClient>) -> Self {
        Self { client }
    }

    /// Serve until EOF on `input`. Responses are written in the same framing
    /// as the request that produced them.
    ///
    /// # Errors
    ///
    /// Returns an error on unrecoverable I/O failures; malformed JSON and
    /// unknown methods are reported to the client in-band.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> anyhow::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = MessageReader::new(input);

        loop {
            let raw = match reader.next_message().await? {
                Some(raw) => raw,
                None => {
                    tracing::info!("client EOF, shutting down");
                    break;
                }
            };

            let msg: Value = match serde_json::from_str(&raw) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!("failed to parse JSON-RPC message: {e}");
                    continue;
                }
            };

            if let Some(response) = self.handle_message(msg).await {
                write_message(&mut output, &response.to_string(), reader.framing()).await?;
            }
        }

        Ok(())
    }

    /// Dispatch one JSON-RPC message. Notifications produce no response.
    pub async fn handle_message(&self, msg: Value) -> Option<Value> {
        let method = msg.get("method").and_then(Value::as_str).unwrap_or("");
        let id = msg.get("id").cloned();

        let Some(id) = id else {
            // Notification; nothing to send back.
            if method != "notifications/initialized" {
                tracing::debug!(method, "ignoring notification");
            }
            return None;
        };

        tracing::debug!(method, "handling request");
        let response = match method {
            "initialize" => self.handle_initialize(id),
            "ping" => make_result_response(id, json!({})),
            "tools/list" => make_result_response(id, json!({"tools": tools::all_tools()})),
            "tools/call" => self.handle_tools_call(id, &msg).await,
            other => make_error_response(
                id,
                ERR_METHOD_NOT_FOUND,
                &format!("method not found: {other}"),
                Value::Null,
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Value) -> Value {
        make_result_response(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "ping-mcp",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    async fn handle_tools_call(&self, id: Value, msg: &Value) -> Value {
        let params = msg.get("params").cloned().unwrap_or(Value::Null);
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return make_error_response(
                id,
                ERR_INVALID_PARAMS,
                "tools/call requires params.name",
                Value::Null,
            );
        };
        let args = params.get("arguments").cloned().unwrap_or(json!({}));

        tracing::info!(tool = name, "executing tool");
        match handlers::call_tool(&self.client, name, &args).await {
            Ok(result) => make_result_response(id, tool_result(&result, false)),
            Err(err) => {
                tracing::warn!(tool = name, error = %err, "tool call failed");
                let mut body = json!({"error": err.message});
                if let Some(data) = err.data {
                    body["details"] = data;
                }
                make_result_response(id, tool_result(&body, true))
            }
        }
    }
}

/// Wrap a tool outcome in the MCP tool-result content envelope.
fn tool_result(value: &Value, is_error: bool) -> Value {
    json!({
        "content": [{
            "type": "text",
            "text": serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }],
        "isError": is_error
    })
}

fn make_result_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

/// Build a JSON-RPC error response.
pub fn make_error_response(id: Value, code: i64, message: &str, data: Value) -> Value {
    let mut error = json!({
        "code": code,
        "message": message
    });
    if !data.is_null() {
        error["data"] = data;
    }
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": error
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ping_mcp_core::{EnvironmentRegistry, Region, Settings};
    use std::collections::HashMap;

    fn test_server() -> McpServer {
        let vars: HashMap<String, String> = [
            ("PING_DEFAULT_ENV", "Production"),
            ("PING_ENV_1_NAME", "Production"),
            ("PING_ENV_1_ID", "env-id-1"),
            ("PING_ENV_1_CLIENT_ID", "client-1"),
            ("PING_ENV_1_CLIENT_SECRET", "secret-1"),
            ("PING_ENV_1_ALIASES", "prod,live"),
            ("PING_ENV_2_NAME", "Staging"),
            ("PING_ENV_2_ID", "env-id-2"),
            ("PING_ENV_2_CLIENT_ID", "client-2"),
            ("PING_ENV_2_CLIENT_SECRET", "secret-2"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let registry = Arc::new(EnvironmentRegistry::from_vars(&vars).unwrap());
        let settings = Settings {
            region: Region::NorthAmerica,
            org_id: "org-1".into(),
            max_requests_per_second: 50,
            max_retries: 0,
            request_timeout_secs: 5,
            default_page_size: 100,
            max_page_size: 1000,
        };
        McpServer::new(Arc::new(PingClient::new(settings, registry).unwrap()))
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = test_server();
        let response = server
            .handle_message(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}))
            .await
            .unwrap();
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(response["result"]["serverInfo"]["name"], "ping-mcp");
        assert!(response["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_ping() {
        let server = test_server();
        let response = server
            .handle_message(json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}))
            .await
            .unwrap();
        assert_eq!(response["result"], json!({}));
    }

    #[tokio::test]
    async fn test_tools_list() {
        let server = test_server();
        let response = server
            .handle_message(json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list"}))
            .await
            .unwrap();
        let tool_list = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tool_list.len(), tools::TOOL_COUNT);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = test_server();
        let response = server
            .handle_message(json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"}))
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], ERR_METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_initialized_notification_is_silent() {
        let server = test_server();
        let response = server
            .handle_message(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_tools_call_without_name() {
        let server = test_server();
        let response = server
            .handle_message(json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call", "params": {}}))
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], ERR_INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_tools_call_list_configured_environments() {
        let server = test_server();
        let response = server
            .handle_message(json!({
                "jsonrpc": "2.0",
                "id": 6,
                "method": "tools/call",
                "params": {"name": "list_configured_environments", "arguments": {}}
            }))
            .await
            .unwrap();
        assert_eq!(response["result"]["isError"], false);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("Production"));
        assert!(text.contains("Staging"));
        assert!(!text.contains("secret-1"));
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool_is_in_band_error() {
        let server = test_server();
        let response = server
            .handle_message(json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "tools/call",
                "params": {"name": "no_such_tool", "arguments": {}}
            }))
            .await
            .unwrap();
        assert_eq!(response["result"]["isError"], true);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("unknown tool"));
    }

    #[tokio::test]
    async fn test_tools_call_unknown_environment_lists_configured() {
        let server = test_server();
        let response = server
            .handle_message(json!({
                "jsonrpc": "2.0",
                "id": 8,
                "method": "tools/call",
                "params": {
                    "name": "list_pingone_users",
                    "arguments": {"environment": "qa"}
                }
            }))
            .await
            .unwrap();
        assert_eq!(response["result"]["isError"], true);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("qa"));
        assert!(text.contains("Production"));
        assert!(text.contains("Staging"));
    }

    #[tokio::test]
    async fn test_tools_call_create_date_range() {
        let server = test_server();
        let response = server
            .handle_message(json!({
                "jsonrpc": "2.0",
                "id": 9,
                "method": "tools/call",
                "params": {
                    "name": "create_date_range",
                    "arguments": {"start_expression": "1 day ago", "end_expression": "now"}
                }
            }))
            .await
            .unwrap();
        assert_eq!(response["result"]["isError"], false);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("recordedat gt"));
    }
}
