//! Multi-server MCP aggregation.
//!
//! One [`MCPToolAggregator`] per process owns every live connection. It
//! connects to all enabled servers concurrently, records per-server health,
//! merges tools under `{server_id}_{tool}` names and tears everything down on
//! [`MCPToolAggregator::close`]. Failures stay inside the server they happened
//! on; none of the lifecycle calls return an error.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use strum::Display;
use tokio::sync::Mutex;

use crate::config::SwitchboardConfig;
use crate::error::SwitchboardError;
use crate::tools::arguments::ToolArguments;
use crate::tools::dynamic::{DynamicTool, DynamicToolProvider};
use crate::tools::tool::{Tool, ToolDefinition, ToolExecutionContext};
use crate::tools::types::AgentToolParameters;
use crate::util::timeout::with_timeout;

use super::connector::{MCPClientOps, MCPConnector, RmcpConnector};
use super::definition::{assign_server_ids, McpConfigFile, ServerDefinition};
use super::loader::{load_config_file, resolve_config_path};
use super::registry::{ServerRecord, ServerRegistry, ServerStatus, ToolSummary};

/// Lifecycle phase of the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum AggregatorPhase {
    Uninitialized,
    Initializing,
    Ready,
    Closing,
    Closed,
    /// Feature flag is off; nothing is ever connected.
    Disabled,
}

/// Namespaced name a tool is exposed under.
pub fn namespaced_tool_name(server_id: &str, tool_name: &str) -> String {
    format!("{server_id}_{tool_name}")
}

/// Split a namespaced name into `(server_id, tool_name)`.
///
/// Server ids never contain `_`, so the first `_` is the separator.
pub fn split_namespaced_tool_name(name: &str) -> Option<(&str, &str)> {
    name.split_once('_')
        .filter(|(server_id, tool_name)| !server_id.is_empty() && !tool_name.is_empty())
}

/// A live connection to one server.
struct ServerConnection {
    server_id: String,
    client: Mutex<Box<dyn MCPClientOps>>,
}

impl ServerConnection {
    async fn call_tool(
        &self,
        tool_name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, SwitchboardError> {
        let mut client = self.client.lock().await;
        let result = client.call_tool(tool_name, arguments).await?;
        Ok(result.into_value_or_text())
    }

    async fn close(&self, timeout: Duration) {
        let outcome = with_timeout(timeout, async {
            let mut client = self.client.lock().await;
            client.close().await
        })
        .await;

        if let Err(error) = outcome {
            let error = SwitchboardError::Teardown {
                server: self.server_id.clone(),
                message: error.to_string(),
            };
            tracing::warn!(server_id = %self.server_id, %error, "MCP server did not close cleanly");
        }
    }
}

/// A tool bound to the connection that serves it.
pub struct MCPBoundTool {
    name: String,
    upstream_name: String,
    server_id: String,
    description: String,
    parameters: AgentToolParameters,
    connection: Arc<ServerConnection>,
}

impl MCPBoundTool {
    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    /// Name of the tool on its server.
    pub fn upstream_name(&self) -> &str {
        &self.upstream_name
    }
}

#[async_trait]
impl Tool for MCPBoundTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, SwitchboardError> {
        tracing::debug!(tool = %self.name, server_id = %self.server_id, "executing MCP tool");
        self.connection
            .call_tool(&self.upstream_name, args.raw().clone())
            .await
    }
}

/// Tools merged from every live connection, keyed by namespaced name.
#[derive(Clone, Default)]
pub struct AggregatedToolSet {
    tools: BTreeMap<String, Arc<MCPBoundTool>>,
}

impl AggregatedToolSet {
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<MCPBoundTool>> {
        self.tools.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    /// Definitions to hand to a model.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools
            .values()
            .map(|tool| Arc::clone(tool) as Arc<dyn Tool>)
            .collect()
    }

    /// Run a tool by its namespaced name.
    pub async fn execute(
        &self,
        name: &str,
        args: &ToolArguments,
    ) -> Result<serde_json::Value, SwitchboardError> {
        let tool = self.tools.get(name).ok_or_else(|| {
            SwitchboardError::InvalidArgument(format!("Unknown MCP tool '{name}'"))
        })?;
        tool.execute(args, &ToolExecutionContext::default()).await
    }
}

impl std::fmt::Debug for AggregatedToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tools.keys()).finish()
    }
}

struct AggregatorState {
    phase: AggregatorPhase,
    registry: ServerRegistry,
    /// Live connections in configuration order.
    connections: Vec<Arc<ServerConnection>>,
}

/// Aggregates every configured MCP server behind one tool set.
pub struct MCPToolAggregator {
    config: SwitchboardConfig,
    connector: Arc<dyn MCPConnector>,
    definitions: McpConfigFile,
    state: Mutex<AggregatorState>,
}

impl MCPToolAggregator {
    /// Build from configuration, reading the definition file once.
    ///
    /// The file is not read at all when the feature flag is off.
    pub fn new(config: SwitchboardConfig, connector: Arc<dyn MCPConnector>) -> Self {
        let definitions = if config.enabled {
            load_config_file(&resolve_config_path(config.config_path.as_deref()))
        } else {
            McpConfigFile::default()
        };
        Self::with_definitions(config, connector, definitions)
    }

    /// Build from already-loaded definitions.
    pub fn with_definitions(
        config: SwitchboardConfig,
        connector: Arc<dyn MCPConnector>,
        definitions: McpConfigFile,
    ) -> Self {
        Self {
            config,
            connector,
            definitions,
            state: Mutex::new(AggregatorState {
                phase: AggregatorPhase::Uninitialized,
                registry: ServerRegistry::new(),
                connections: Vec::new(),
            }),
        }
    }

    /// Environment-driven construction with the rmcp connector.
    pub fn from_env() -> Self {
        Self::from_config(SwitchboardConfig::from_env())
    }

    pub fn from_config(config: SwitchboardConfig) -> Self {
        let connector = Arc::new(RmcpConnector::new(config.connect_timeout));
        Self::new(config, connector)
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &SwitchboardConfig {
        &self.config
    }

    pub async fn phase(&self) -> AggregatorPhase {
        self.state.lock().await.phase
    }

    /// Connect to every enabled server. No-op once ready.
    ///
    /// Concurrent callers wait for the pass in progress.
    pub async fn initialize(&self) {
        let mut state = self.state.lock().await;
        match state.phase {
            AggregatorPhase::Ready | AggregatorPhase::Disabled => return,
            _ => {}
        }

        if !self.config.enabled {
            tracing::info!("MCP disabled, skipping server initialization");
            state.registry.clear();
            state.connections.clear();
            state.phase = AggregatorPhase::Disabled;
            return;
        }

        state.phase = AggregatorPhase::Initializing;
        let enabled: Vec<&ServerDefinition> = self.definitions.enabled_servers().collect();
        let ids = assign_server_ids(enabled.iter().map(|definition| definition.name.as_str()));
        let attempts = enabled
            .into_iter()
            .zip(ids)
            .map(|(definition, server_id)| self.attempt(server_id, definition));
        let outcomes = join_all(attempts).await;

        let mut registry = ServerRegistry::new();
        let mut connections = Vec::new();
        for (record, connection) in outcomes {
            registry.insert(record);
            connections.extend(connection);
        }

        tracing::info!(
            connected = registry.connected_count(),
            attempted = registry.len(),
            "MCP initialization complete"
        );
        state.registry = registry;
        state.connections = connections;
        state.phase = AggregatorPhase::Ready;
    }

    async fn attempt(
        &self,
        server_id: String,
        definition: &ServerDefinition,
    ) -> (ServerRecord, Option<Arc<ServerConnection>>) {
        let mut record = ServerRecord {
            id: server_id.clone(),
            name: definition.name.clone(),
            description: definition.description.clone(),
            url: definition.display_url(),
            status: ServerStatus::Error,
            tools: Vec::new(),
        };

        let mut client = match self.connector.connect(definition).await {
            Ok(client) => client,
            Err(error) => {
                tracing::warn!(%server_id, %error, "MCP server unavailable");
                return (record, None);
            }
        };

        record.status = ServerStatus::Connected;
        match client.list_tools().await {
            Ok(tools) => {
                record.tools = tools
                    .into_iter()
                    .map(|tool| ToolSummary {
                        name: tool.name,
                        description: tool.description.unwrap_or_default(),
                    })
                    .collect();
                tracing::info!(%server_id, tools = record.tools.len(), "MCP server connected");
            }
            Err(error) => {
                let error = SwitchboardError::ToolListing {
                    server: server_id.clone(),
                    message: error.to_string(),
                };
                tracing::warn!(%server_id, %error, "MCP server connected but listed no tools");
            }
        }

        let connection = Arc::new(ServerConnection {
            server_id,
            client: Mutex::new(client),
        });
        (record, Some(connection))
    }

    /// Merged tool set, re-listed from every live connection.
    ///
    /// A server whose listing fails is left out of this set only.
    pub async fn get_tools(&self) -> AggregatedToolSet {
        self.initialize().await;
        let connections = self.state.lock().await.connections.clone();

        let listings = join_all(connections.into_iter().map(|connection| async move {
            let result = connection.client.lock().await.list_tools().await;
            (connection, result)
        }))
        .await;

        let mut tools = BTreeMap::new();
        for (connection, result) in listings {
            let listed = match result {
                Ok(listed) => listed,
                Err(error) => {
                    tracing::warn!(server_id = %connection.server_id, %error, "skipping MCP server tools");
                    continue;
                }
            };
            for tool in listed {
                let name = namespaced_tool_name(&connection.server_id, &tool.name);
                let bound = MCPBoundTool {
                    name: name.clone(),
                    parameters: tool.parameters(),
                    upstream_name: tool.name,
                    server_id: connection.server_id.clone(),
                    description: tool.description.unwrap_or_default(),
                    connection: Arc::clone(&connection),
                };
                tools.insert(name, Arc::new(bound));
            }
        }

        AggregatedToolSet { tools }
    }

    /// Records from the last initialization pass.
    pub async fn get_servers(&self) -> Vec<ServerRecord> {
        self.state.lock().await.registry.records().to_vec()
    }

    pub async fn get_available_tools(&self) -> Vec<ToolSummary> {
        self.state.lock().await.registry.available_tools()
    }

    pub async fn get_connected_count(&self) -> usize {
        self.state.lock().await.registry.connected_count()
    }

    /// Every definition in the file, enabled or not.
    pub fn total_configured(&self) -> usize {
        self.definitions.servers.len()
    }

    /// Close every live connection and reset. Safe to call at any time.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if state.phase == AggregatorPhase::Disabled {
            return;
        }

        state.phase = AggregatorPhase::Closing;
        let connections = std::mem::take(&mut state.connections);
        if !connections.is_empty() {
            tracing::info!(connections = connections.len(), "closing MCP connections");
        }
        let timeout = self.config.close_timeout;
        join_all(
            connections
                .iter()
                .map(|connection| connection.close(timeout)),
        )
        .await;

        state.registry.clear();
        state.phase = AggregatorPhase::Closed;
    }

    async fn connection_for(&self, server_id: &str) -> Option<Arc<ServerConnection>> {
        self.state
            .lock()
            .await
            .connections
            .iter()
            .find(|connection| connection.server_id == server_id)
            .cloned()
    }
}

#[async_trait]
impl DynamicToolProvider for MCPToolAggregator {
    async fn list_tools(&self) -> Result<Vec<DynamicTool>, SwitchboardError> {
        let tools = self.get_tools().await;
        Ok(tools
            .tools
            .values()
            .map(|tool| DynamicTool {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            })
            .collect())
    }

    async fn execute_tool(
        &self,
        name: &str,
        args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, SwitchboardError> {
        let unknown =
            || SwitchboardError::InvalidArgument(format!("Unknown MCP tool '{name}'"));
        let (server_id, tool_name) = split_namespaced_tool_name(name).ok_or_else(unknown)?;
        let connection = self.connection_for(server_id).await.ok_or_else(unknown)?;
        connection.call_tool(tool_name, args.raw().clone()).await
    }
}
