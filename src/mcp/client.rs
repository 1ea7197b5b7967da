//! MCP client for one server connection.

use crate::error::SwitchboardError;
use crate::util::timeout::duration_millis;
use rmcp::{
    model::{
        CallToolRequestParams, CallToolResult, ClientInfo, Content, JsonObject, ProtocolVersion,
        ResourceContents,
    },
    service::{ClientInitializeError, ServiceError},
};

use super::schema::MCPToolSchema;
use super::transport::{MCPRunningService, MCPTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MCPConnectionState {
    Disconnected,
    Initialized,
    Closed,
}

#[derive(Debug, Clone)]
pub struct MCPToolCallResult {
    pub structured_content: Option<serde_json::Value>,
    pub text_content: Option<String>,
    pub content: Vec<serde_json::Value>,
}

impl MCPToolCallResult {
    pub fn into_value_or_text(self) -> serde_json::Value {
        if let Some(structured) = self.structured_content {
            return structured;
        }
        if let Some(text) = self.text_content {
            return serde_json::Value::String(text);
        }
        serde_json::Value::Array(self.content)
    }
}

/// Client for a Model Context Protocol server.
pub struct MCPClient {
    transport: Box<dyn MCPTransport>,
    session: Option<MCPRunningService>,
    state: MCPConnectionState,
}

impl MCPClient {
    /// Create a new MCP client with the given transport.
    pub fn new(transport: Box<dyn MCPTransport>) -> Self {
        Self {
            transport,
            session: None,
            state: MCPConnectionState::Disconnected,
        }
    }

    pub fn connection_state(&self) -> MCPConnectionState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == MCPConnectionState::Initialized
    }

    pub fn display_url(&self) -> String {
        self.transport.display_url()
    }

    /// Open the connection and run the handshake. No-op once initialized.
    pub async fn initialize(&mut self) -> Result<(), SwitchboardError> {
        match self.state {
            MCPConnectionState::Initialized => return Ok(()),
            MCPConnectionState::Closed => {
                return Err(SwitchboardError::InvalidState(
                    "MCP client is closed".into(),
                ))
            }
            MCPConnectionState::Disconnected => {}
        }

        let session = self.connect_with_protocol_fallback().await?;
        if let Some(info) = session.peer_info() {
            tracing::debug!(
                server = %info.server_info.name,
                version = %info.server_info.version,
                protocol = ?info.protocol_version,
                "MCP handshake complete"
            );
        }
        self.session = Some(session);
        self.state = MCPConnectionState::Initialized;
        Ok(())
    }

    /// List available tools from the MCP server.
    pub async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, SwitchboardError> {
        let session = self.active_session()?;

        let tools = match session.list_all_tools().await {
            Ok(tools) => tools,
            Err(ServiceError::UnexpectedResponse) => session
                .list_tools(None)
                .await
                .map(|page| page.tools)
                .map_err(|error| map_service_error("list_tools", error))?,
            Err(error) => return Err(map_service_error("list_tools", error)),
        };

        Ok(tools.into_iter().map(MCPToolSchema::from).collect())
    }

    /// Execute a tool on the MCP server.
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, SwitchboardError> {
        let arguments = object_arguments(name, arguments)?;
        let session = self.active_session()?;

        let result = session
            .call_tool(CallToolRequestParams {
                meta: None,
                name: name.to_owned().into(),
                arguments,
                task: None,
            })
            .await
            .map_err(|error| map_service_error("call_tool", error))?;

        into_call_result(name, result)
    }

    /// Cancel the session. Idempotent; a never-opened client just becomes closed.
    pub async fn close(&mut self) -> Result<(), SwitchboardError> {
        self.state = MCPConnectionState::Closed;
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        session
            .cancel()
            .await
            .map(|reason| tracing::debug!(?reason, "MCP session closed"))
            .map_err(|error| SwitchboardError::Transport(format!("MCP session task failed: {error}")))
    }

    fn active_session(&mut self) -> Result<&mut MCPRunningService, SwitchboardError> {
        match (self.state, self.session.as_mut()) {
            (MCPConnectionState::Initialized, Some(session)) => Ok(session),
            (MCPConnectionState::Closed, _) => {
                Err(SwitchboardError::InvalidState("MCP client is closed".into()))
            }
            _ => Err(SwitchboardError::InvalidState(
                "MCP client must be initialized first".into(),
            )),
        }
    }

    async fn connect_with_protocol_fallback(
        &mut self,
    ) -> Result<MCPRunningService, SwitchboardError> {
        let latest_client_info = ClientInfo {
            protocol_version: ProtocolVersion::LATEST,
            ..Default::default()
        };

        match self.transport.connect(latest_client_info).await {
            Ok(session) => return Ok(session),
            Err(error) if should_retry_protocol_fallback(&error) => {
                tracing::debug!(
                    url = %self.transport.display_url(),
                    %error,
                    "server rejected protocol version, retrying with 2024-11-05"
                );
            }
            Err(error) => return Err(map_client_initialize_error(error)),
        }

        let fallback_client_info = ClientInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            ..Default::default()
        };
        self.transport
            .connect(fallback_client_info)
            .await
            .map_err(map_client_initialize_error)
    }
}

fn should_retry_protocol_fallback(error: &ClientInitializeError) -> bool {
    match error {
        ClientInitializeError::JsonRpcError(error) => {
            let message = error.message.to_ascii_lowercase();
            message.contains("protocol") && message.contains("version")
        }
        _ => false,
    }
}

/// Arguments travel as a JSON object; `null` sends none.
fn object_arguments(
    tool: &str,
    value: serde_json::Value,
) -> Result<Option<JsonObject>, SwitchboardError> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) => Ok(Some(map)),
        other => Err(SwitchboardError::InvalidArgument(format!(
            "arguments for MCP tool '{tool}' must be a JSON object, got {other}"
        ))),
    }
}

/// Text blocks and embedded text resources, newline-joined.
fn joined_text(content: &[Content]) -> Option<String> {
    let parts: Vec<&str> = content
        .iter()
        .filter_map(|item| {
            if let Some(block) = item.as_text() {
                return Some(block.text.as_str());
            }
            match &item.as_resource()?.resource {
                ResourceContents::TextResourceContents { text, .. } => Some(text.as_str()),
                _ => None,
            }
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("\n"))
}

fn into_call_result(
    tool: &str,
    result: CallToolResult,
) -> Result<MCPToolCallResult, SwitchboardError> {
    let text_content = joined_text(&result.content);

    if result.is_error == Some(true) {
        let message = match (&result.structured_content, &text_content) {
            (Some(structured), _) => structured.to_string(),
            (None, Some(text)) => text.clone(),
            (None, None) => "server reported a failed call".to_string(),
        };
        return Err(SwitchboardError::ToolExecution {
            tool_name: tool.to_string(),
            message,
        });
    }

    let content = result
        .content
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect();
    Ok(MCPToolCallResult {
        structured_content: result.structured_content,
        text_content,
        content,
    })
}

fn map_client_initialize_error(error: ClientInitializeError) -> SwitchboardError {
    match &error {
        ClientInitializeError::JsonRpcError(rejection) => SwitchboardError::Protocol(format!(
            "initialize rejected ({}): {}",
            rejection.code.0, rejection.message
        )),
        ClientInitializeError::ConnectionClosed(_)
        | ClientInitializeError::TransportError { .. }
        | ClientInitializeError::Cancelled => {
            SwitchboardError::Transport(format!("initialize failed: {error}"))
        }
        _ => SwitchboardError::Protocol(format!("initialize failed: {error}")),
    }
}

fn map_service_error(operation: &str, error: ServiceError) -> SwitchboardError {
    match &error {
        ServiceError::McpError(rejection) => SwitchboardError::Protocol(format!(
            "{operation} rejected ({}): {}",
            rejection.code.0, rejection.message
        )),
        ServiceError::Timeout { timeout } => SwitchboardError::Timeout(duration_millis(*timeout)),
        ServiceError::TransportSend(_)
        | ServiceError::TransportClosed
        | ServiceError::Cancelled { .. } => {
            SwitchboardError::Transport(format!("{operation} failed: {error}"))
        }
        _ => SwitchboardError::Protocol(format!("{operation} failed: {error}")),
    }
}
