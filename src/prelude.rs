//! Convenience re-exports for common use.

pub use crate::config::SwitchboardConfig;
pub use crate::error::{Result, SwitchboardError};
pub use crate::mcp::{
    AggregatedToolSet, MCPToolAggregator, ServerRecord, ServerStatus, StatusReport, ToolSummary,
};
pub use crate::tools::{AgentToolParameters, Tool, ToolArguments, ToolDefinition};
