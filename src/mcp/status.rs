//! Status payload for a status endpoint or the CLI.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::aggregate::MCPToolAggregator;
use super::registry::{ServerRecord, ToolSummary};
use crate::error::SwitchboardError;
use crate::util::timeout::with_timeout;

pub const DISABLED_MESSAGE: &str = "MCP is disabled. Set MCP_ENABLED=true to enable.";
pub const FAILURE_MESSAGE: &str = "Failed to fetch MCP status";

/// Snapshot of MCP health, serialized camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub enabled: bool,
    pub servers: Vec<ServerRecord>,
    pub tools: Vec<ToolSummary>,
    pub connected_count: usize,
    pub total_configured: usize,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl StatusReport {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            servers: Vec::new(),
            tools: Vec::new(),
            connected_count: 0,
            total_configured: 0,
            message: DISABLED_MESSAGE.to_string(),
            error: None,
            details: None,
        }
    }

    pub fn failed(enabled: bool, error: &SwitchboardError) -> Self {
        Self {
            enabled,
            servers: Vec::new(),
            tools: Vec::new(),
            connected_count: 0,
            total_configured: 0,
            message: FAILURE_MESSAGE.to_string(),
            error: Some(FAILURE_MESSAGE.to_string()),
            details: Some(error.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Initialize if needed and report. Never fails; exceeding `budget`
    /// yields the error-shaped report.
    pub async fn collect(aggregator: &MCPToolAggregator, budget: Duration) -> Self {
        if !aggregator.is_enabled() {
            return Self::disabled();
        }

        let outcome = with_timeout(budget, async {
            aggregator.initialize().await;
            let servers = aggregator.get_servers().await;
            let tools = aggregator.get_available_tools().await;
            let connected_count = aggregator.get_connected_count().await;
            Ok::<_, SwitchboardError>((servers, tools, connected_count))
        })
        .await;

        match outcome {
            Ok((servers, tools, connected_count)) => {
                let total_configured = aggregator.total_configured();
                Self {
                    enabled: true,
                    servers,
                    tools,
                    connected_count,
                    total_configured,
                    message: format!(
                        "{connected_count} of {total_configured} configured servers connected"
                    ),
                    error: None,
                    details: None,
                }
            }
            Err(error) => {
                tracing::error!(%error, "failed to collect MCP status");
                Self::failed(true, &error)
            }
        }
    }
}
