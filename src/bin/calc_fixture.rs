//! Minimal stdio MCP server used by the integration tests.
//!
//! Serves one tool, `add`, over newline-delimited JSON-RPC and exits when
//! stdin closes. If `CALC_FIXTURE_PID_FILE` is set, the process id is written
//! there on startup.

use std::io::{self, BufRead, Write};

use serde_json::{json, Value};

const PID_FILE_ENV: &str = "CALC_FIXTURE_PID_FILE";

fn main() -> io::Result<()> {
    if let Some(path) = std::env::var_os(PID_FILE_ENV) {
        std::fs::write(path, std::process::id().to_string())?;
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        let Ok(request) = serde_json::from_str::<Value>(&line) else {
            continue;
        };
        // Notifications carry no id and get no reply.
        let Some(id) = request.get("id").cloned() else {
            continue;
        };
        let method = request["method"].as_str().unwrap_or_default();
        let reply = match handle(method, &request["params"]) {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err((code, message)) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": code, "message": message }
            }),
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle(method: &str, params: &Value) -> Result<Value, (i64, String)> {
    match method {
        "initialize" => Ok(json!({
            "protocolVersion": params["protocolVersion"].as_str().unwrap_or("2024-11-05"),
            "capabilities": { "tools": {} },
            "serverInfo": { "name": "calc-fixture", "version": env!("CARGO_PKG_VERSION") }
        })),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({
            "tools": [{
                "name": "add",
                "description": "Add two numbers",
                "inputSchema": {
                    "type": "object",
                    "properties": { "a": { "type": "number" }, "b": { "type": "number" } },
                    "required": ["a", "b"]
                }
            }]
        })),
        "tools/call" if params["name"] == "add" => {
            let operand = |key: &str| params["arguments"][key].as_f64();
            match (operand("a"), operand("b")) {
                (Some(a), Some(b)) => Ok(json!({
                    "content": [{ "type": "text", "text": (a + b).to_string() }],
                    "structuredContent": { "sum": a + b },
                    "isError": false
                })),
                _ => Ok(json!({
                    "content": [{ "type": "text", "text": "a and b must be numbers" }],
                    "isError": true
                })),
            }
        }
        "tools/call" => Err((-32602, format!("unknown tool {}", params["name"]))),
        other => Err((-32601, format!("method not found: {other}"))),
    }
}
