//! MCP transport layer.
//!
//! Transports only know how to open an rmcp session; framing and the
//! JSON-RPC exchange belong to rmcp.

use async_trait::async_trait;
use rmcp::model::ClientInfo;
use rmcp::service::{ClientInitializeError, DynService, RoleClient, RunningService};

use super::definition::TransportSpec;
use crate::error::SwitchboardError;

pub type DynClientService = Box<dyn DynService<RoleClient>>;
pub type MCPRunningService = RunningService<RoleClient, DynClientService>;

/// Transport trait for MCP communication.
#[async_trait]
pub trait MCPTransport: Send {
    /// Open a connection and run the MCP handshake with `client_info`.
    ///
    /// May be called more than once (protocol fallback); each call opens a
    /// fresh connection.
    async fn connect(
        &mut self,
        client_info: ClientInfo,
    ) -> Result<MCPRunningService, ClientInitializeError>;

    /// Locator shown in logs.
    fn display_url(&self) -> String;
}

mod stdio;
mod stream;

pub use stdio::StdioTransport;
pub use stream::StreamTransport;

/// Build the transport described by a resolved definition.
pub fn from_spec(spec: TransportSpec) -> Result<Box<dyn MCPTransport>, SwitchboardError> {
    match spec {
        TransportSpec::Stdio {
            command,
            args,
            env,
            working_directory,
        } => {
            let mut transport = StdioTransport::new(command, args).env(env);
            if let Some(dir) = working_directory {
                transport = transport.working_directory(dir);
            }
            Ok(Box::new(transport))
        }
        TransportSpec::Stream { url, headers } => {
            let transport = headers
                .into_iter()
                .fold(StreamTransport::new(url), |transport, (name, value)| {
                    transport.header(name, value)
                });
            transport.validate()?;
            Ok(Box::new(transport))
        }
    }
}
