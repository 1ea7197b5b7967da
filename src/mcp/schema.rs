//! Tool schemas as advertised by MCP servers.

use serde::{Deserialize, Serialize};

use crate::tools::types::AgentToolParameters;

/// One tool as listed by an MCP server, before namespacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MCPToolSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Opaque JSON Schema; forwarded to the model untouched.
    pub input_schema: serde_json::Value,
}

impl MCPToolSchema {
    pub fn parameters(&self) -> AgentToolParameters {
        AgentToolParameters::from_schema(self.input_schema.clone())
    }
}

impl From<rmcp::model::Tool> for MCPToolSchema {
    fn from(tool: rmcp::model::Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool.description.map(|d| d.to_string()),
            input_schema: serde_json::Value::Object((*tool.input_schema).clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_rmcp_tool_copies_fields() {
        let mut schema = serde_json::Map::new();
        schema.insert("type".into(), json!("object"));
        let tool = rmcp::model::Tool::new("add", "add two numbers", schema);

        let mapped = MCPToolSchema::from(tool);
        assert_eq!(mapped.name, "add");
        assert_eq!(mapped.description.as_deref(), Some("add two numbers"));
        assert_eq!(mapped.parameters().schema["type"], "object");
    }

    #[test]
    fn serializes_camel_case_and_omits_missing_description() {
        let schema = MCPToolSchema {
            name: "ping".into(),
            description: None,
            input_schema: json!({ "type": "object" }),
        };
        assert_eq!(
            serde_json::to_value(&schema).expect("schema serializes"),
            json!({ "name": "ping", "inputSchema": { "type": "object" } })
        );
    }
}
