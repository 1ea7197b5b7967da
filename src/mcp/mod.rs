//! Model Context Protocol (MCP) client aggregation.

pub mod aggregate;
pub mod client;
pub mod connector;
pub mod definition;
pub mod loader;
pub mod registry;
pub mod schema;
pub mod session;
pub mod status;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregate::{
    namespaced_tool_name, AggregatedToolSet, AggregatorPhase, MCPBoundTool, MCPToolAggregator,
};
pub use client::{MCPClient, MCPToolCallResult};
pub use connector::{MCPClientOps, MCPConnector, RmcpConnector};
pub use definition::{McpConfigFile, ServerDefinition, TransportDefinition, TransportSpec};
pub use registry::{ServerRecord, ServerStatus, ToolSummary};
pub use schema::MCPToolSchema;
pub use status::StatusReport;
pub use transport::{MCPTransport, StdioTransport, StreamTransport};
