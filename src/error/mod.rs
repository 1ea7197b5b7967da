//! Error types for Switchboard.

use thiserror::Error;

/// Primary error type for all Switchboard operations.
#[derive(Error, Debug)]
pub enum SwitchboardError {
    /// A server definition is missing fields or names an unknown transport.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The transport could not be established (spawn, handshake, refused).
    #[error("Connection to MCP server '{server}' failed: {message}")]
    Connection { server: String, message: String },

    /// Connected, but tool discovery failed.
    #[error("Listing tools from MCP server '{server}' failed: {message}")]
    ToolListing { server: String, message: String },

    /// Closing a connection handle failed or timed out.
    #[error("Closing MCP server '{server}' failed: {message}")]
    Teardown { server: String, message: String },

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config format error: {0}")]
    ConfigFormat(#[from] toml::de::Error),
}

impl SwitchboardError {
    /// Wrap any error as a connection failure for `server`.
    pub fn connection(server: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Connection {
            server: server.into(),
            message: error.to_string(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SwitchboardError>;
