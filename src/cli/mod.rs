//! CLI entry point for Switchboard.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Switchboard MCP CLI
#[derive(Parser, Debug)]
#[command(
    name = "switchboard",
    version,
    about = "Inspect and exercise configured MCP servers"
)]
pub struct Cli {
    /// MCP server definition file (overrides MCP_CONFIG_PATH)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the status payload as JSON
    Status,
    /// List the aggregated tools
    Tools,
    /// Call one namespaced tool (e.g. calc_add)
    Call(CallArgs),
}

/// Arguments for `switchboard call`.
#[derive(Parser, Debug)]
pub struct CallArgs {
    /// Namespaced tool name
    pub tool: String,

    /// Tool arguments as a JSON object
    pub arguments: Option<String>,
}
