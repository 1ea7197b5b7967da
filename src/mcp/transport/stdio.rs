use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use rmcp::model::ClientInfo;
use rmcp::service::{ClientInitializeError, ServiceExt};
use rmcp::transport::TokioChildProcess;
use tokio::process::Command;

use super::{MCPRunningService, MCPTransport};

/// Stdio-based MCP transport (for local MCP servers).
///
/// The child inherits the parent environment with `env` laid over it. It is
/// killed when the session is cancelled or dropped.
pub struct StdioTransport {
    command: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    working_directory: Option<PathBuf>,
}

impl StdioTransport {
    /// Create a stdio transport from command and args.
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            env: BTreeMap::new(),
            working_directory: None,
        }
    }

    /// Extra environment variables for the child.
    pub fn env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    pub fn working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn build_command(&self) -> Command {
        let mut command = Command::new(&self.command);
        command.args(&self.args).envs(&self.env);
        if let Some(dir) = &self.working_directory {
            command.current_dir(dir);
        }
        command
    }
}

#[async_trait]
impl MCPTransport for StdioTransport {
    async fn connect(
        &mut self,
        client_info: ClientInfo,
    ) -> Result<MCPRunningService, ClientInitializeError> {
        let transport = TokioChildProcess::new(self.build_command()).map_err(|error| {
            ClientInitializeError::transport::<TokioChildProcess>(error, "spawn stdio transport")
        })?;

        client_info.into_dyn().serve(transport).await
    }

    fn display_url(&self) -> String {
        if self.args.is_empty() {
            format!("stdio://{}", self.command)
        } else {
            format!("stdio://{} {}", self.command, self.args.join(" "))
        }
    }
}
