//! Tools discovered at runtime, such as those served over MCP.

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::tool::ToolExecutionContext;
use super::types::AgentToolParameters;
use crate::error::SwitchboardError;

/// Snapshot of one discovered tool.
#[derive(Debug, Clone)]
pub struct DynamicTool {
    pub name: String,
    pub description: String,
    pub parameters: AgentToolParameters,
}

/// Source of tools whose set is only known after connecting.
///
/// Names returned by `list_tools` are the ones `execute_tool` accepts.
#[async_trait]
pub trait DynamicToolProvider: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<DynamicTool>, SwitchboardError>;

    async fn execute_tool(
        &self,
        name: &str,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, SwitchboardError>;
}
