//! # Tether
//!
//! Tether lets a conversational agent discover and call the tools of an MCP
//! server, keeps a durable conversation log across restarts, and bounds how
//! many tool rounds a single user turn may take.
//!
//! ## Core Components
//!
//! - **[AgentLoop]**: runs one user turn at a time against a [`ChatModel`]
//! - **[McpRegistry]**: connects to an MCP server and exposes its tools as
//!   validated [`CallableTool`]s
//! - **[ConversationStore]**: JSON-file conversation history
//! - **[translate]**: declared input schema to [`ParamSpec`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tether::{AgentConfig, AgentLoop, ConversationStore, McpRegistry, McpServerConfig};
//! # use tether::ChatModel;
//!
//! # async fn example(model: Arc<dyn ChatModel>) -> Result<(), Box<dyn std::error::Error>> {
//! let registry = McpRegistry::new(McpServerConfig::from_command_line("node mcp-server/index.js")?);
//! let store = ConversationStore::new("conversation-state.json");
//! let mut agent = AgentLoop::new(model, Box::new(registry), store, AgentConfig::default());
//!
//! agent.initialize().await?;
//! println!("{}", agent.chat("Show all expenses").await?);
//! agent.shutdown().await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Module aliases for namespaced access
// ============================================================================

pub use tether_agent as agent;
pub use tether_core as core;
pub use tether_mcp as mcp;
pub use tether_memory as memory;

// ============================================================================
// Capabilities and schemas
// ============================================================================

pub use tether_core::{
    CallableTool, CapabilityDescriptor, CapabilityInvoker, CapabilityOutput, CapabilityRegistry,
    ContentItem, NO_OUTPUT, ParamField, ParamSpec, PrimitiveKind, ToolCallResult, ToolSet,
    translate,
};

// ============================================================================
// Model boundary
// ============================================================================

pub use tether_core::{
    ChatMessage, ChatModel, ChatRole, ModelContent, ModelResponse, ToolCallRequest, ToolDefinition,
};

// ============================================================================
// Errors
// ============================================================================

pub use tether_agent::{AgentError, AgentResult};
pub use tether_core::{
    ConnectionError, FieldIssue, ModelError, ModelResult, ToolError, ToolResult, ValidationError,
};
pub use tether_mcp::{McpError, McpResult};
pub use tether_memory::{StateLoadError, StoreError, StoreResult};

// ============================================================================
// Components
// ============================================================================

pub use tether_agent::{
    AgentConfig, AgentLoop, AgentState, DEFAULT_MAX_ITERATIONS, FALLBACK_ANSWER, TaskHint,
    WorkingContext, system_prompt,
};
pub use tether_mcp::{DEFAULT_HANDSHAKE_TIMEOUT, McpInvoker, McpRegistry, McpServerConfig};
pub use tether_memory::{
    ConversationMessage, ConversationRole, ConversationState, ConversationStore,
};
