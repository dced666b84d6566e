//! Integration tests driving the full serve loop over in-memory pipes.
//!
//! These exercise the stdio transport end to end: framed bytes in, framed
//! bytes out, including the tool-call path for tools that need no network.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

use ping_mcp::framing::encode_content_length;
use ping_mcp::server::McpServer;
use ping_mcp::tools::TOOL_COUNT;
use ping_mcp_core::{EnvironmentRegistry, PingClient, Region, Settings};

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
        ("PING_ENV_2_ALIAS", "stage,test"),
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

/// Run the server over duplex pipes, feed it `input`, and collect everything
/// it writes until it shuts down on EOF.
async fn drive(input: Vec<u8>) -> Vec<u8> {
    let (mut client_in, server_in) = duplex(64 * 1024);

    let server = test_server();
    let mut output = Vec::new();

    let serve = async {
        server.run(server_in, &mut output).await.unwrap();
    };
    let feed = async {
        client_in.write_all(&input).await.unwrap();
        client_in.shutdown().await.unwrap();
    };
    tokio::join!(serve, feed);

    output
}

/// Parse newline-delimited JSON responses.
fn parse_lines(output: &[u8]) -> Vec<Value> {
    std::str::from_utf8(output)
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[tokio::test]
async fn initialize_then_tools_list_over_newline_framing() {
    let mut input = Vec::new();
    input.extend_from_slice(
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}})
            .to_string()
            .as_bytes(),
    );
    input.push(b'\n');
    input.extend_from_slice(
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"})
            .to_string()
            .as_bytes(),
    );
    input.push(b'\n');
    input.extend_from_slice(
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})
            .to_string()
            .as_bytes(),
    );
    input.push(b'\n');

    let output = drive(input).await;
    let responses = parse_lines(&output);

    // The notification produces no response.
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "ping-mcp");
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(
        responses[1]["result"]["tools"].as_array().unwrap().len(),
        TOOL_COUNT
    );
}

#[tokio::test]
async fn content_length_requests_get_content_length_responses() {
    let request = json!({"jsonrpc": "2.0", "id": 7, "method": "ping"}).to_string();
    let input = encode_content_length(&request);

    let output = drive(input).await;
    let text = String::from_utf8(output).unwrap();

    assert!(text.starts_with("Content-Length: "), "got: {text}");
    let body_start = text.find("\r\n\r\n").unwrap() + 4;
    let response: Value = serde_json::from_str(&text[body_start..]).unwrap();
    assert_eq!(response["id"], 7);
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn tool_call_resolves_alias_case_insensitively() {
    // list_configured_environments needs no network; verify the registry
    // drives resolution errors for a misspelled environment.
    let mut input = Vec::new();
    input.extend_from_slice(
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "list_configured_environments", "arguments": {}}
        })
        .to_string()
        .as_bytes(),
    );
    input.push(b'\n');
    input.extend_from_slice(
        json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": {"name": "list_pingone_users", "arguments": {"environment": "qa"}}
        })
        .to_string()
        .as_bytes(),
    );
    input.push(b'\n');

    let output = drive(input).await;
    let responses = parse_lines(&output);
    assert_eq!(responses.len(), 2);

    let listing = responses[0]["result"]["content"][0]["text"].as_str().unwrap();
    assert!(listing.contains("Production"));
    assert!(listing.contains("\"is_default\": true"));
    assert!(!listing.contains("secret-1"));

    assert_eq!(responses[1]["result"]["isError"], true);
    let error_text = responses[1]["result"]["content"][0]["text"].as_str().unwrap();
    assert!(error_text.contains("'qa' is not configured"));
    assert!(error_text.contains("Production"));
    assert!(error_text.contains("Staging"));
}

#[tokio::test]
async fn unknown_method_yields_protocol_error() {
    let mut input = json!({"jsonrpc": "2.0", "id": 3, "method": "prompts/list"})
        .to_string()
        .into_bytes();
    input.push(b'\n');

    let output = drive(input).await;
    let responses = parse_lines(&output);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["error"]["code"], -32601);
}

#[tokio::test]
async fn malformed_json_is_skipped_not_fatal() {
    let mut input = b"this is not json\n".to_vec();
    input.extend_from_slice(
        json!({"jsonrpc": "2.0", "id": 4, "method": "ping"})
            .to_string()
            .as_bytes(),
    );
    input.push(b'\n');

    let output = drive(input).await;
    let responses = parse_lines(&output);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 4);
}

#[tokio::test]
async fn http_router_serves_health_and_mcp() {
    let server = test_server();
    let app = ping_mcp::http::router(server);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let body = json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}).to_string();
    let request = format!(
        "POST /mcp HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let text = String::from_utf8_lossy(&response);
    assert!(text.starts_with("HTTP/1.1 200"), "got: {text}");
    let json_start = text.find("{\"").unwrap();
    let parsed: Value = serde_json::from_str(text[json_start..].trim()).unwrap();
    assert_eq!(
        parsed["result"]["tools"].as_array().unwrap().len(),
        TOOL_COUNT
    );

    handle.abort();
}
