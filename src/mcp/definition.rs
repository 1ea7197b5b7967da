//! Declarative MCP server definitions.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::SwitchboardError;

/// Contents of an MCP configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpConfigFile {
    #[serde(default)]
    pub servers: Vec<ServerDefinition>,
}

impl McpConfigFile {
    /// Definitions with `enabled: true`, in file order.
    pub fn enabled_servers(&self) -> impl Iterator<Item = &ServerDefinition> {
        self.servers.iter().filter(|server| server.enabled)
    }
}

/// One configured MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub transport: TransportDefinition,
    /// Extra environment for stdio servers, applied over the process environment.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<PathBuf>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Set when the entry could not be read; reported when the server connects.
    #[serde(skip)]
    pub load_error: Option<String>,
}

/// Transport block exactly as written in the file.
///
/// A bad block is rejected by [`ServerDefinition::resolve_transport`] when
/// that server connects, not when the file is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportDefinition {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// Supported transport tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum TransportKind {
    #[strum(to_string = "stdio")]
    Stdio,
    #[strum(
        to_string = "stream",
        serialize = "sse",
        serialize = "http",
        serialize = "streamable-http"
    )]
    Stream,
}

/// A validated transport, ready to connect.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportSpec {
    Stdio {
        command: String,
        args: Vec<String>,
        env: BTreeMap<String, String>,
        working_directory: Option<PathBuf>,
    },
    Stream {
        url: String,
        headers: BTreeMap<String, String>,
    },
}

impl ServerDefinition {
    /// Read one `servers` entry.
    ///
    /// An entry that does not fit the schema keeps its `name` and `enabled`
    /// and fails in [`Self::resolve_transport`], so one bad entry never hides
    /// the rest of the file.
    pub fn from_entry(entry: serde_json::Value) -> Self {
        let error = match ServerDefinition::deserialize(&entry) {
            Ok(definition) => return definition,
            Err(error) => error,
        };
        let name = entry
            .get("name")
            .and_then(|name| name.as_str())
            .unwrap_or_default()
            .to_string();
        tracing::warn!(server = %name, %error, "invalid MCP server definition");

        Self {
            load_error: Some(format!("Invalid definition for MCP server '{name}': {error}")),
            enabled: entry
                .get("enabled")
                .and_then(|enabled| enabled.as_bool())
                .unwrap_or(false),
            name,
            description: None,
            transport: TransportDefinition::default(),
            env: BTreeMap::new(),
            working_directory: None,
            note: None,
        }
    }

    /// Validate the transport block.
    pub fn resolve_transport(&self) -> Result<TransportSpec, SwitchboardError> {
        if let Some(reason) = &self.load_error {
            return Err(SwitchboardError::Configuration(reason.clone()));
        }
        let transport = &self.transport;
        if transport.kind.trim().is_empty() {
            return Err(SwitchboardError::Configuration(format!(
                "MCP server '{}' has no transport type",
                self.name
            )));
        }
        let kind = TransportKind::from_str(transport.kind.trim()).map_err(|_| {
            SwitchboardError::Configuration(format!(
                "Unsupported transport type '{}' for MCP server '{}'",
                transport.kind, self.name
            ))
        })?;

        match kind {
            TransportKind::Stdio => {
                let command = transport
                    .command
                    .as_deref()
                    .map(str::trim)
                    .filter(|command| !command.is_empty());
                let (Some(command), Some(args)) = (command, transport.args.as_ref()) else {
                    return Err(SwitchboardError::Configuration(format!(
                        "stdio transport for MCP server '{}' requires command and args",
                        self.name
                    )));
                };
                Ok(TransportSpec::Stdio {
                    command: command.to_string(),
                    args: args.clone(),
                    env: self.env.clone(),
                    working_directory: self.working_directory.clone(),
                })
            }
            TransportKind::Stream => {
                let url = transport
                    .url
                    .as_deref()
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .ok_or_else(|| {
                        SwitchboardError::Configuration(format!(
                            "stream transport for MCP server '{}' requires url",
                            self.name
                        ))
                    })?;
                Ok(TransportSpec::Stream {
                    url: url.to_string(),
                    headers: transport.headers.clone(),
                })
            }
        }
    }

    /// Human-readable locator for status output. Never used to reconnect.
    pub fn display_url(&self) -> String {
        let transport = &self.transport;
        if matches!(
            TransportKind::from_str(transport.kind.trim()),
            Ok(TransportKind::Stream)
        ) {
            return transport
                .url
                .clone()
                .unwrap_or_else(|| "unknown".to_string());
        }

        let command = transport.command.as_deref().unwrap_or_default();
        match transport.args.as_deref() {
            Some(args) if !args.is_empty() => format!("stdio://{command} {}", args.join(" ")),
            _ => format!("stdio://{command}"),
        }
    }
}

fn separator_pattern() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[\s_]+").expect("separator pattern is valid"))
}

/// Derive a machine id from a display name.
///
/// Lowercases and collapses every run of whitespace or underscores into one
/// `-`. Ids never contain `_`, which keeps `{id}_{tool}` keys unambiguous.
pub fn derive_server_id(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "server".to_string();
    }
    separator_pattern()
        .replace_all(&trimmed.to_lowercase(), "-")
        .into_owned()
}

/// Derive ids for `names` in order, suffixing `-2`, `-3`, … on collision.
pub fn assign_server_ids<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut taken = HashSet::new();
    let mut ids = Vec::new();

    for name in names {
        let base = derive_server_id(name);
        let mut id = base.clone();
        let mut suffix = 2;
        while taken.contains(&id) {
            id = format!("{base}-{suffix}");
            suffix += 1;
        }
        if id != base {
            tracing::warn!(
                server = name,
                base_id = %base,
                server_id = %id,
                "MCP server id collides with an earlier server; suffixed"
            );
        }
        taken.insert(id.clone());
        ids.push(id);
    }

    ids
}
