//! In-memory connectors for aggregator tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use serde_json::json;

use super::client::MCPToolCallResult;
use super::connector::{MCPClientOps, MCPConnector};
use super::definition::ServerDefinition;
use super::schema::MCPToolSchema;
use crate::error::SwitchboardError;

/// How a mock server behaves, keyed by definition name.
#[derive(Clone)]
pub(crate) enum MockServer {
    Up(Vec<&'static str>),
    Refuses,
    /// Never finishes the handshake.
    Stalls,
    ListingFails,
    HangsOnClose(Vec<&'static str>),
}

#[derive(Default)]
pub(crate) struct Counters {
    pub(crate) connects: AtomicUsize,
    pub(crate) closes: AtomicUsize,
    pub(crate) calls: StdMutex<Vec<(String, String, serde_json::Value)>>,
}

impl Counters {
    pub(crate) fn open_connections(&self) -> usize {
        self.connects.load(Ordering::SeqCst) - self.closes.load(Ordering::SeqCst)
    }
}

struct MockClient {
    server: String,
    behavior: MockServer,
    counters: Arc<Counters>,
    closed: bool,
}

#[async_trait]
impl MCPClientOps for MockClient {
    async fn list_tools(&mut self) -> Result<Vec<MCPToolSchema>, SwitchboardError> {
        let names = match &self.behavior {
            MockServer::Up(names) | MockServer::HangsOnClose(names) => names.clone(),
            _ => return Err(SwitchboardError::Protocol("tools/list failed".into())),
        };
        Ok(names
            .into_iter()
            .map(|name| MCPToolSchema {
                name: name.into(),
                description: Some(format!("{name} tool")),
                input_schema: json!({ "type": "object", "properties": {} }),
            })
            .collect())
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<MCPToolCallResult, SwitchboardError> {
        self.counters
            .calls
            .lock()
            .expect("call log lock should not be poisoned")
            .push((self.server.clone(), name.to_owned(), arguments));
        Ok(MCPToolCallResult {
            structured_content: Some(json!({ "server": self.server, "tool": name })),
            text_content: None,
            content: Vec::new(),
        })
    }

    async fn close(&mut self) -> Result<(), SwitchboardError> {
        if let MockServer::HangsOnClose(_) = self.behavior {
            std::future::pending::<()>().await;
        }
        if !self.closed {
            self.closed = true;
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Connector whose servers are scripted by name. Unknown names refuse.
pub(crate) struct MockConnector {
    pub(crate) servers: HashMap<String, MockServer>,
    pub(crate) counters: Arc<Counters>,
}

impl MockConnector {
    pub(crate) fn new(servers: Vec<(&str, MockServer)>) -> (Self, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let connector = Self {
            servers: servers
                .into_iter()
                .map(|(name, behavior)| (name.to_string(), behavior))
                .collect(),
            counters: Arc::clone(&counters),
        };
        (connector, counters)
    }
}

#[async_trait]
impl MCPConnector for MockConnector {
    async fn connect(
        &self,
        definition: &ServerDefinition,
    ) -> Result<Box<dyn MCPClientOps>, SwitchboardError> {
        definition.resolve_transport()?;
        let behavior = self
            .servers
            .get(&definition.name)
            .cloned()
            .unwrap_or(MockServer::Refuses);
        match behavior {
            MockServer::Refuses => {
                return Err(SwitchboardError::connection(
                    &definition.name,
                    "connection refused",
                ))
            }
            MockServer::Stalls => std::future::pending::<()>().await,
            _ => {}
        }
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockClient {
            server: definition.name.clone(),
            behavior,
            counters: Arc::clone(&self.counters),
            closed: false,
        }))
    }
}

/// Stdio definition for `name` running `{name}-server`.
pub(crate) fn definition(name: &str, enabled: bool) -> ServerDefinition {
    serde_json::from_value(json!({
        "name": name,
        "enabled": enabled,
        "transport": { "type": "stdio", "command": format!("{name}-server"), "args": [] }
    }))
    .expect("definition fixture should deserialize")
}
