//! Switchboard: MCP tool aggregation for chat backends
//!
//! Connects to every configured Model Context Protocol server (local
//! subprocesses over stdio or remote streamable HTTP endpoints), merges their
//! tools into one namespaced set a model can call, tracks per-server health
//! and tears connections down after each turn.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use switchboard::prelude::*;
//!
//! # async fn example() -> switchboard::error::Result<()> {
//! let aggregator = Arc::new(MCPToolAggregator::from_env());
//! let budget = aggregator.config().turn_budget;
//! let names = aggregator
//!     .run_turn(budget, |tools| async move {
//!         Ok(tools.names().map(str::to_owned).collect::<Vec<_>>())
//!     })
//!     .await?;
//! println!("{names:?}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod mcp;
pub mod prelude;
pub mod tools;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
