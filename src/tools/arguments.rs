//! Typed access to tool call arguments.

use crate::error::SwitchboardError;

/// Wrapper around tool call arguments.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Parse arguments from raw JSON text. Blank input means "no arguments".
    pub fn from_json_str(raw: &str) -> Result<Self, SwitchboardError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::new(serde_json::json!({})));
        }
        let value = serde_json::from_str(trimmed).map_err(|e| {
            SwitchboardError::InvalidArgument(format!("Tool arguments must be valid JSON: {e}"))
        })?;
        Ok(Self::new(value))
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }
}

impl Default for ToolArguments {
    fn default() -> Self {
        Self::new(serde_json::json!({}))
    }
}
