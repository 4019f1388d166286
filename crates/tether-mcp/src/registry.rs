//! Capability registry backed by an MCP server.
//!
//! [`McpRegistry`] owns the client session for one provider. Connecting
//! performs the protocol handshake and lists the provider's tools; each tool
//! becomes a [`CallableTool`] that validates its arguments locally before
//! forwarding the call through a shared [`McpInvoker`].

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, Content, RawContent, Tool},
    service::{Peer, RoleClient, RunningService},
    transport::{IntoTransport, TokioChildProcess},
};
use serde_json::{Map, Value};
use tether_core::{
    CallableTool, CapabilityDescriptor, CapabilityInvoker, CapabilityOutput, CapabilityRegistry,
    ConnectionError, ContentItem, ToolResult,
};
use tracing::{debug, info, warn};

use crate::config::McpServerConfig;
use crate::error::{McpError, McpResult};

type McpClientService = RunningService<RoleClient, ()>;

/// Registry of capabilities exposed by a single MCP server.
pub struct McpRegistry {
    config: McpServerConfig,
    service: Option<McpClientService>,
    descriptors: Vec<CapabilityDescriptor>,
    tools: Vec<CallableTool>,
}

impl McpRegistry {
    pub fn new(config: McpServerConfig) -> Self {
        Self {
            config,
            service: None,
            descriptors: Vec::new(),
            tools: Vec::new(),
        }
    }

    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.service.is_some()
    }

    /// Capabilities listed at connect time, in listing order.
    pub fn descriptors(&self) -> &[CapabilityDescriptor] {
        &self.descriptors
    }

    /// Spawn the configured server and connect over its stdio.
    pub async fn connect_stdio(&mut self) -> McpResult<()> {
        let cmd = self.config.command()?;
        let command = self.config.display_command();
        debug!(command = %command, "Spawning MCP server");

        let transport =
            TokioChildProcess::new(cmd).map_err(|source| McpError::SpawnFailed { command, source })?;
        self.connect_with(transport).await
    }

    /// Connect over an already established transport.
    ///
    /// The handshake and the full tool listing share the configured timeout.
    /// Any previous session is closed first.
    pub async fn connect_with<T, E, A>(&mut self, transport: T) -> McpResult<()>
    where
        T: IntoTransport<RoleClient, E, A> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        if self.service.is_some() {
            self.close_session().await;
        }

        let timeout = self.config.handshake_timeout;
        let handshake = async {
            let service = ()
                .serve(transport)
                .await
                .map_err(|e| McpError::ConnectionError(e.to_string()))?;
            let tools = service
                .peer()
                .list_all_tools()
                .await
                .map_err(McpError::from_rmcp_error)?;
            Ok::<_, McpError>((service, tools))
        };

        let (service, tools) = tokio::time::timeout(timeout, handshake)
            .await
            .map_err(|_| McpError::HandshakeTimeout { timeout })??;

        let invoker: Arc<dyn CapabilityInvoker> = Arc::new(McpInvoker::new(service.peer().clone()));
        self.descriptors = tools.iter().map(descriptor_from_tool).collect();
        self.tools = self
            .descriptors
            .iter()
            .cloned()
            .map(|descriptor| CallableTool::new(descriptor, Arc::clone(&invoker)))
            .collect();
        self.service = Some(service);

        info!(
            command = %self.config.display_command(),
            tools = self.tools.len(),
            "Connected to MCP server"
        );
        Ok(())
    }

    async fn close_session(&mut self) {
        self.descriptors.clear();
        self.tools.clear();

        if let Some(service) = self.service.take() {
            if let Err(e) = service.cancel().await {
                warn!(error = %e, "MCP client task ended abnormally during shutdown");
            }
            info!(command = %self.config.display_command(), "Disconnected from MCP server");
        }
    }
}

#[async_trait]
impl CapabilityRegistry for McpRegistry {
    async fn connect(&mut self) -> Result<(), ConnectionError> {
        if self.is_connected() {
            debug!("MCP registry already connected");
            return Ok(());
        }
        self.connect_stdio().await.map_err(ConnectionError::from)
    }

    fn callable_tools(&self) -> Vec<CallableTool> {
        self.tools.clone()
    }

    async fn close(&mut self) {
        self.close_session().await;
    }
}

/// Forwards validated calls to the server over a client peer.
#[derive(Clone)]
pub struct McpInvoker {
    peer: Peer<RoleClient>,
}

impl McpInvoker {
    pub fn new(peer: Peer<RoleClient>) -> Self {
        Self { peer }
    }
}

#[async_trait]
impl CapabilityInvoker for McpInvoker {
    async fn call_capability(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> ToolResult<CapabilityOutput> {
        let result = self
            .peer
            .call_tool(CallToolRequestParams {
                meta: None,
                name: name.to_string().into(),
                arguments: Some(arguments),
                task: None,
            })
            .await
            .map_err(|e| McpError::from_rmcp_error(e).into_tool_error(name))?;

        Ok(CapabilityOutput {
            content: result.content.iter().map(content_item).collect(),
            is_error: result.is_error.unwrap_or(false),
        })
    }
}

fn descriptor_from_tool(tool: &Tool) -> CapabilityDescriptor {
    CapabilityDescriptor::new(
        tool.name.to_string(),
        tool.description.as_deref().unwrap_or_default(),
        Value::Object((*tool.input_schema).clone()),
    )
}

fn content_item(content: &Content) -> ContentItem {
    match &content.raw {
        RawContent::Text(text) => ContentItem::Text(text.text.clone()),
        other => ContentItem::Other {
            kind: serde_json::to_value(other)
                .ok()
                .as_ref()
                .and_then(|v| v.get("type"))
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_content_item_kinds() {
        let text = Content::text("hello");
        assert_eq!(content_item(&text), ContentItem::Text("hello".into()));

        let image = Content::image("aGVsbG8=", "image/png");
        assert_eq!(
            content_item(&image),
            ContentItem::Other {
                kind: "image".into()
            }
        );
    }

    #[tokio::test]
    async fn test_new_registry_is_empty() {
        let registry = McpRegistry::new(McpServerConfig::new("node"));
        assert!(!registry.is_connected());
        assert!(registry.descriptors().is_empty());
        assert!(registry.callable_tools().is_empty());
    }

    #[tokio::test]
    async fn test_close_without_connect_is_noop() {
        let mut registry = McpRegistry::new(
            McpServerConfig::new("node").with_handshake_timeout(Duration::from_secs(1)),
        );
        registry.close().await;
        registry.close().await;
        assert!(!registry.is_connected());
    }
}
