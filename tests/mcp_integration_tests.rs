mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use switchboard::config::SwitchboardConfig;
use switchboard::mcp::client::MCPClient;
use switchboard::mcp::transport::StreamTransport;
use switchboard::mcp::{MCPToolAggregator, ServerStatus, StatusReport};
use switchboard::tools::ToolArguments;
use tokio::time::timeout;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{mock_mcp_handler, request_headers_match, request_methods, write_config};

fn enabled_config(path: std::path::PathBuf) -> SwitchboardConfig {
    SwitchboardConfig::builder()
        .enabled(true)
        .config_path(path)
        .connect_timeout(Duration::from_secs(5))
        .close_timeout(Duration::from_secs(1))
        .build()
}

async fn mount_mcp(
    server: &MockServer,
    name: &'static str,
    tools: &'static [(&'static str, &'static str)],
) {
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .respond_with(mock_mcp_handler(name, tools))
        .mount(server)
        .await;
}

#[tokio::test]
async fn stream_client_sends_custom_headers_on_every_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(header("authorization", "Bearer t0k"))
        .respond_with(mock_mcp_handler("docs", &[("search", "Search the docs")]))
        .mount(&server)
        .await;

    let mut client = MCPClient::new(Box::new(
        StreamTransport::new(format!("{}/mcp", server.uri())).header("authorization", "Bearer t0k"),
    ));

    timeout(Duration::from_secs(2), client.initialize())
        .await
        .expect("initialize should complete before timeout")
        .expect("MCP client should initialize");
    let tools = timeout(Duration::from_secs(2), client.list_tools())
        .await
        .expect("tools/list should complete before timeout")
        .expect("MCP client should return tools");
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "search");
    client.close().await.expect("close should succeed");

    let requests = server
        .received_requests()
        .await
        .expect("server should record requests");
    let posts: Vec<_> = requests
        .into_iter()
        .filter(|request| request.method.as_str() == "POST")
        .collect();
    let methods = request_methods(&posts);
    assert!(methods.contains("initialize"));
    assert!(methods.contains("tools/list"));
    assert!(request_headers_match(&posts, "authorization", "Bearer t0k"));
}

#[tokio::test]
async fn aggregator_namespaces_tools_across_stream_servers() {
    let alpha = MockServer::start().await;
    let beta = MockServer::start().await;
    mount_mcp(&alpha, "alpha", &[("search", "Alpha search")]).await;
    mount_mcp(&beta, "beta", &[("search", "Beta search"), ("stats", "Beta stats")]).await;

    let (_dir, config_path) = write_config(
        "mcp-config.json",
        &json!({
            "servers": [
                { "name": "Alpha Docs", "enabled": true,
                  "transport": { "type": "sse", "url": format!("{}/mcp", alpha.uri()) } },
                { "name": "beta", "enabled": true,
                  "transport": { "type": "streamable-http", "url": format!("{}/mcp", beta.uri()) } }
            ]
        })
        .to_string(),
    );
    let aggregator = Arc::new(MCPToolAggregator::from_config(enabled_config(config_path)));

    let result = aggregator
        .run_turn(Duration::from_secs(10), |tools| async move {
            let names: Vec<String> = tools.names().map(str::to_owned).collect();
            assert_eq!(names, vec!["alpha-docs_search", "beta_search", "beta_stats"]);
            tools
                .execute("beta_search", &ToolArguments::new(json!({ "a": 1 })))
                .await
        })
        .await
        .expect("turn should succeed");

    assert_eq!(result["server"], "beta");
    assert_eq!(result["tool"], "search");
    assert_eq!(result["arguments"], json!({ "a": 1 }));
    assert_eq!(aggregator.get_connected_count().await, 0);
}

#[tokio::test]
async fn missing_stdio_binary_yields_error_record_and_no_tools() {
    let (_dir, config_path) = write_config(
        "mcp-config.json",
        r#"{
            "servers": [
                { "name": "Calc", "enabled": true,
                  "transport": { "type": "stdio", "command": "calc-server", "args": [] } }
            ]
        }"#,
    );
    let aggregator = MCPToolAggregator::from_config(enabled_config(config_path));

    aggregator.initialize().await;
    let servers = aggregator.get_servers().await;
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].id, "calc");
    assert_eq!(servers[0].status, ServerStatus::Error);
    assert_eq!(servers[0].url, "stdio://calc-server");
    assert!(servers[0].tools.is_empty());
    assert_eq!(aggregator.get_connected_count().await, 0);
    assert!(aggregator.get_tools().await.is_empty());

    aggregator.close().await;
}

#[tokio::test]
async fn status_reports_healthy_and_failing_servers() {
    let healthy = MockServer::start().await;
    mount_mcp(&healthy, "calc", &[("add", "Add two numbers")]).await;
    let broken = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&broken)
        .await;

    let (_dir, config_path) = write_config(
        "mcp.toml",
        &format!(
            r#"
[[servers]]
name = "Calc"
enabled = true
transport = {{ type = "http", url = "{healthy}/mcp" }}

[[servers]]
name = "Broken"
enabled = true
transport = {{ type = "http", url = "{broken}/mcp" }}

[[servers]]
name = "Archive"
transport = {{ type = "stdio", command = "archive-server", args = [] }}
"#,
            healthy = healthy.uri(),
            broken = broken.uri()
        ),
    );
    let aggregator = MCPToolAggregator::from_config(enabled_config(config_path));

    let report = StatusReport::collect(&aggregator, Duration::from_secs(10)).await;
    aggregator.close().await;

    assert!(report.enabled);
    assert!(!report.is_error());
    let statuses: Vec<_> = report
        .servers
        .iter()
        .map(|record| (record.id.as_str(), record.status))
        .collect();
    assert_eq!(
        statuses,
        vec![("calc", ServerStatus::Connected), ("broken", ServerStatus::Error)]
    );
    assert_eq!(report.tools.len(), 1);
    assert_eq!(report.tools[0].name, "add");
    assert_eq!(report.connected_count, 1);
    assert_eq!(report.total_configured, 3);
    assert_eq!(report.message, "1 of 3 configured servers connected");
}

#[tokio::test]
async fn disabled_flag_never_contacts_servers() {
    let server = MockServer::start().await;
    mount_mcp(&server, "docs", &[("search", "Search the docs")]).await;
    let (_dir, config_path) = write_config(
        "mcp-config.json",
        &json!({
            "servers": [
                { "name": "Docs", "enabled": true,
                  "transport": { "type": "sse", "url": format!("{}/mcp", server.uri()) } }
            ]
        })
        .to_string(),
    );
    let config = SwitchboardConfig::builder().config_path(config_path).build();
    let aggregator = MCPToolAggregator::from_config(config);

    assert!(!aggregator.is_enabled());
    assert!(aggregator.get_tools().await.is_empty());
    let report = StatusReport::collect(&aggregator, Duration::from_secs(1)).await;
    assert_eq!(
        serde_json::to_value(&report).expect("report serializes"),
        json!({
            "enabled": false,
            "servers": [],
            "tools": [],
            "connectedCount": 0,
            "totalConfigured": 0,
            "message": "MCP is disabled. Set MCP_ENABLED=true to enable."
        })
    );

    let requests = server
        .received_requests()
        .await
        .expect("server should record requests");
    assert!(requests.is_empty());
}
