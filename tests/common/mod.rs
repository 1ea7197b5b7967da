//! Shared test helpers: a mock streamable-HTTP MCP server and config fixtures.
#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;

use serde_json::json;
use tempfile::TempDir;
use wiremock::{Request, ResponseTemplate};

/// Answer MCP JSON-RPC requests the way a streamable-HTTP server does.
pub fn mock_mcp_handler(
    server_name: &'static str,
    tools: &'static [(&'static str, &'static str)],
) -> impl Fn(&Request) -> ResponseTemplate + Send + Sync {
    move |request: &Request| {
        let body: serde_json::Value = request.body_json().unwrap_or_else(|_| json!({}));
        let method = body
            .get("method")
            .and_then(|value| value.as_str())
            .unwrap_or_default();
        let id = body.get("id").cloned().unwrap_or_else(|| json!(1));

        let result = match method {
            "initialize" => json!({
                "protocolVersion": "2025-03-26",
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": { "name": server_name, "version": "0.1.0" }
            }),
            "tools/list" => {
                let listed: Vec<_> = tools
                    .iter()
                    .map(|(name, description)| {
                        json!({
                            "name": name,
                            "description": description,
                            "inputSchema": {
                                "type": "object",
                                "properties": { "a": { "type": "number" }, "b": { "type": "number" } }
                            }
                        })
                    })
                    .collect();
                json!({ "tools": listed, "nextCursor": null })
            }
            "tools/call" => {
                let params = body.get("params").cloned().unwrap_or_else(|| json!({}));
                let called = params["name"].as_str().unwrap_or_default().to_string();
                json!({
                    "content": [{ "type": "text", "text": format!("{server_name}:{called}") }],
                    "structuredContent": {
                        "server": server_name,
                        "tool": called,
                        "arguments": params.get("arguments").cloned().unwrap_or_else(|| json!({}))
                    },
                    "isError": false
                })
            }
            _ if body.get("id").is_none() => return ResponseTemplate::new(202),
            _ => serde_json::Value::Null,
        };

        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": result
        }))
    }
}

/// JSON-RPC methods seen by a mock server.
pub fn request_methods(requests: &[Request]) -> HashSet<String> {
    requests
        .iter()
        .filter_map(|request| {
            request
                .body_json::<serde_json::Value>()
                .ok()
                .and_then(|body| body.get("method").and_then(|m| m.as_str()).map(str::to_string))
        })
        .collect()
}

/// True when every request carried `header: expected`.
pub fn request_headers_match(requests: &[Request], header: &str, expected: &str) -> bool {
    !requests.is_empty()
        && requests.iter().all(|request| {
            request
                .headers
                .get(header)
                .and_then(|value| value.to_str().ok())
                == Some(expected)
        })
}

/// Write `contents` to `file_name` in a fresh temp dir.
pub fn write_config(file_name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(file_name);
    std::fs::write(&path, contents).expect("write config fixture");
    (dir, path)
}
