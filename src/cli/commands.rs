//! Handlers behind the CLI subcommands.

use std::sync::Arc;

use crate::error::SwitchboardError;
use crate::mcp::{MCPToolAggregator, StatusReport};
use crate::tools::ToolArguments;

/// Print the status payload. Connections are closed afterwards.
pub async fn handle_status(aggregator: &MCPToolAggregator) -> Result<(), SwitchboardError> {
    let report = StatusReport::collect(aggregator, aggregator.config().turn_budget).await;
    aggregator.close().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn handle_tools(aggregator: &Arc<MCPToolAggregator>) -> Result<(), SwitchboardError> {
    if !aggregator.is_enabled() {
        eprintln!("MCP is disabled. Set MCP_ENABLED=true to enable.");
        return Ok(());
    }

    let budget = aggregator.config().turn_budget;
    let definitions = aggregator
        .run_turn(budget, |tools| async move { Ok(tools.definitions()) })
        .await?;

    if definitions.is_empty() {
        println!("No MCP tools available.");
    }
    for definition in definitions {
        println!("{:<40} {}", definition.name, definition.description);
    }
    Ok(())
}

pub async fn handle_call(
    aggregator: &Arc<MCPToolAggregator>,
    tool: &str,
    arguments: Option<&str>,
) -> Result<(), SwitchboardError> {
    let args = ToolArguments::from_json_str(arguments.unwrap_or_default())?;
    let budget = aggregator.config().turn_budget;
    let result = aggregator
        .run_turn(budget, |tools| async move { tools.execute(tool, &args).await })
        .await?;

    match result {
        serde_json::Value::String(text) => println!("{text}"),
        other => println!("{}", serde_json::to_string_pretty(&other)?),
    }
    Ok(())
}
