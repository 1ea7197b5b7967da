//! Tool system for function calling.

pub mod arguments;
pub mod dynamic;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use dynamic::{DynamicTool, DynamicToolProvider};
pub use tool::{Tool, ToolDefinition, ToolExecutionContext};
pub use types::AgentToolParameters;
