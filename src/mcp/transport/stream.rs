use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use rmcp::model::ClientInfo;
use rmcp::service::{ClientInitializeError, ServiceExt};
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use rmcp::transport::StreamableHttpClientTransport;

use super::{MCPRunningService, MCPTransport};
use crate::error::SwitchboardError;

/// Streamable HTTP transport (for remote MCP servers).
///
/// Configured headers ride on every request, including the event stream.
pub struct StreamTransport {
    url: String,
    headers: Vec<(String, String)>,
}

impl StreamTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check that every header is representable on the wire.
    pub fn validate(&self) -> Result<(), SwitchboardError> {
        self.header_map().map(|_| ())
    }

    fn header_map(&self) -> Result<HashMap<HeaderName, HeaderValue>, SwitchboardError> {
        self.headers
            .iter()
            .map(|(name, value)| {
                let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                    SwitchboardError::Configuration(format!("Invalid MCP header name '{name}': {e}"))
                })?;
                let header_value = HeaderValue::from_str(value).map_err(|e| {
                    SwitchboardError::Configuration(format!(
                        "Invalid value for MCP header '{name}': {e}"
                    ))
                })?;
                Ok((header_name, header_value))
            })
            .collect()
    }
}

#[async_trait]
impl MCPTransport for StreamTransport {
    async fn connect(
        &mut self,
        client_info: ClientInfo,
    ) -> Result<MCPRunningService, ClientInitializeError> {
        let headers = self.header_map().map_err(|error| {
            ClientInitializeError::ConnectionClosed(format!("invalid MCP headers: {error}"))
        })?;
        let config =
            StreamableHttpClientTransportConfig::with_uri(self.url.clone()).custom_headers(headers);
        let transport = StreamableHttpClientTransport::from_config(config);

        client_info.into_dyn().serve(transport).await
    }

    fn display_url(&self) -> String {
        self.url.clone()
    }
}
