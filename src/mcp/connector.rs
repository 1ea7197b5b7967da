//! Turns a server definition into a live, initialized connection.

use std::time::Duration;

use async_trait::async_trait;

use super::client::{MCPClient, MCPToolCallResult};
use super::definition::ServerDefinition;
use super::schema::MCPToolSchema;
use super::transport;
use crate::error::SwitchboardError;
use crate::util::timeout::{duration_millis, with_timeout};

/// Operations the aggregator needs from one live connection.
#[async_trait]
pub trait MCPClientOps: Send {
    async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, SwitchboardError>;
    async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, SwitchboardError>;
    /// Must be idempotent.
    async fn close(&mut self) -> Result<(), SwitchboardError>;
}

#[async_trait]
impl MCPClientOps for MCPClient {
    async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, SwitchboardError> {
        MCPClient::list_tools(self).await
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, SwitchboardError> {
        MCPClient::call_tool(self, name, arguments).await
    }

    async fn close(&mut self) -> Result<(), SwitchboardError> {
        MCPClient::close(self).await
    }
}

/// Opens connections for the aggregator.
///
/// Errors are either [`SwitchboardError::Configuration`] (bad definition,
/// nothing was attempted) or [`SwitchboardError::Connection`].
#[async_trait]
pub trait MCPConnector: Send + Sync {
    async fn connect(
        &self,
        definition: &ServerDefinition,
    ) -> Result<Box<dyn MCPClientOps>, SwitchboardError>;
}

/// Connector backed by rmcp transports.
#[derive(Debug, Clone)]
pub struct RmcpConnector {
    connect_timeout: Duration,
}

impl RmcpConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl MCPConnector for RmcpConnector {
    async fn connect(
        &self,
        definition: &ServerDefinition,
    ) -> Result<Box<dyn MCPClientOps>, SwitchboardError> {
        let spec = definition.resolve_transport()?;
        let transport = transport::from_spec(spec)?;
        tracing::debug!(
            server = %definition.name,
            url = %transport.display_url(),
            "connecting to MCP server"
        );

        let mut client = MCPClient::new(transport);
        let outcome = with_timeout(self.connect_timeout, client.initialize()).await;
        match outcome {
            Ok(()) => Ok(Box::new(client)),
            Err(SwitchboardError::Timeout(_)) => Err(SwitchboardError::connection(
                &definition.name,
                format!(
                    "handshake timed out after {}ms",
                    duration_millis(self.connect_timeout)
                ),
            )),
            Err(error) => Err(SwitchboardError::connection(&definition.name, error)),
        }
    }
}
