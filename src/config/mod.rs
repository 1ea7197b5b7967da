//! Process configuration (layered: code > env > `.env` file).

use std::path::PathBuf;
use std::time::Duration;

use bon::Builder;

/// Feature flag that gates all MCP activity.
pub const ENABLED_ENV: &str = "MCP_ENABLED";
/// Explicit path to the server definition file.
pub const CONFIG_PATH_ENV: &str = "MCP_CONFIG_PATH";
pub const CONNECT_TIMEOUT_ENV: &str = "MCP_CONNECT_TIMEOUT_MS";
pub const CLOSE_TIMEOUT_ENV: &str = "MCP_CLOSE_TIMEOUT_MS";
pub const TURN_BUDGET_ENV: &str = "MCP_TURN_BUDGET_MS";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);
/// Wall-clock budget for one chat turn, tool use included.
pub const DEFAULT_TURN_BUDGET: Duration = Duration::from_secs(30);

/// Runtime configuration for the MCP aggregator.
///
/// ```
/// use std::time::Duration;
/// use switchboard::config::SwitchboardConfig;
///
/// let config = SwitchboardConfig::builder()
///     .enabled(true)
///     .connect_timeout(Duration::from_secs(5))
///     .build();
/// assert!(config.enabled);
/// assert!(config.config_path.is_none());
/// ```
#[derive(Debug, Clone, Builder)]
pub struct SwitchboardConfig {
    /// Whether MCP servers are consulted at all.
    #[builder(default)]
    pub enabled: bool,
    /// Explicit definition file; `None` falls back to the search order in
    /// [`crate::mcp::loader::resolve_config_path`].
    pub config_path: Option<PathBuf>,
    /// Bound on one server's connect + handshake.
    #[builder(default = DEFAULT_CONNECT_TIMEOUT)]
    pub connect_timeout: Duration,
    /// Bound on closing one connection.
    #[builder(default = DEFAULT_CLOSE_TIMEOUT)]
    pub close_timeout: Duration,
    #[builder(default = DEFAULT_TURN_BUDGET)]
    pub turn_budget: Duration,
}

impl Default for SwitchboardConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SwitchboardConfig {
    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup(ENABLED_ENV)
            .map(|value| parse_flag(&value))
            .unwrap_or(false);
        let config_path = lookup(CONFIG_PATH_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Self {
            enabled,
            config_path,
            connect_timeout: duration_from(&lookup, CONNECT_TIMEOUT_ENV, DEFAULT_CONNECT_TIMEOUT),
            close_timeout: duration_from(&lookup, CLOSE_TIMEOUT_ENV, DEFAULT_CLOSE_TIMEOUT),
            turn_budget: duration_from(&lookup, TURN_BUDGET_ENV, DEFAULT_TURN_BUDGET),
        }
    }
}

/// `true` and `1` (any case, surrounding whitespace ignored) enable a flag.
pub fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("true") || value == "1"
}

fn duration_from(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Duration {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Duration::from_millis(ms),
        _ => {
            tracing::warn!(key, value = %raw, "ignoring invalid duration, using default");
            default
        }
    }
}
