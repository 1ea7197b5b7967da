//! Reads MCP server definitions from disk.
//!
//! Loading never fails: a missing or corrupt file degrades to an empty server
//! list so the process runs with no tools instead of refusing to start.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::definition::{McpConfigFile, ServerDefinition};
use crate::error::SwitchboardError;

/// File looked up in the working directory when no explicit path is set.
pub const DEFAULT_CONFIG_FILE: &str = "mcp-config.json";

/// Serialization format of a definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML, everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Pick the definition file to load.
///
/// Order: `explicit`, then `./mcp-config.json`, then
/// `~/.switchboard/mcp-config.json`. When none exists the working-directory
/// default is returned (and later loads as empty).
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let home = directories::UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    resolve_config_path_in(explicit, &cwd, home.as_deref())
}

fn resolve_config_path_in(explicit: Option<&Path>, cwd: &Path, home: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    let local = cwd.join(DEFAULT_CONFIG_FILE);
    if local.is_file() {
        return local;
    }

    if let Some(home) = home {
        let user = home.join(".switchboard").join(DEFAULT_CONFIG_FILE);
        if user.is_file() {
            return user;
        }
    }

    local
}

/// File shape before individual entries are checked.
#[derive(Deserialize)]
struct RawConfigFile {
    #[serde(default)]
    servers: Vec<serde_json::Value>,
}

/// Parse definition file contents.
///
/// Only a document that is not valid JSON/TOML, or whose `servers` is not a
/// list, is an error. Bad entries are kept and fail when they connect.
pub fn parse_config(raw: &str, format: ConfigFormat) -> Result<McpConfigFile, SwitchboardError> {
    let file: RawConfigFile = match format {
        ConfigFormat::Json => serde_json::from_str(raw)?,
        ConfigFormat::Toml => toml::from_str(raw)?,
    };
    Ok(McpConfigFile {
        servers: file
            .servers
            .into_iter()
            .map(ServerDefinition::from_entry)
            .collect(),
    })
}

/// Load definitions from `path`, degrading to an empty list on any failure.
pub fn load_config_file(path: &Path) -> McpConfigFile {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no MCP config file found, using empty configuration");
            return McpConfigFile::default();
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "failed to read MCP config, using empty configuration");
            return McpConfigFile::default();
        }
    };

    match parse_config(&raw, ConfigFormat::from_path(path)) {
        Ok(config) => {
            tracing::info!(
                path = %path.display(),
                servers = config.servers.len(),
                "MCP config loaded"
            );
            config
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "failed to parse MCP config, using empty configuration");
            McpConfigFile::default()
        }
    }
}
