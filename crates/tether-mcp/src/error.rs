//! MCP error types
//!
//! Errors raised while talking to a capability provider over MCP, and their
//! mapping onto the Tether error taxonomy.

use std::time::Duration;

use tether_core::{ConnectionError, ToolError};
use thiserror::Error;

/// MCP operation result type
pub type McpResult<T> = Result<T, McpError>;

/// Errors that can occur during MCP operations
#[derive(Debug, Error)]
pub enum McpError {
    /// No provider command was configured
    #[error("Empty server command")]
    EmptyCommand,

    /// The provider process could not be started
    #[error("Failed to spawn MCP server '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Handshake and capability listing did not finish in time
    #[error("MCP handshake timed out after {timeout:?}")]
    HandshakeTimeout { timeout: Duration },

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The provider does not know the requested tool
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Any other client-side failure reported by rmcp
    #[error("Client error: {0}")]
    ClientError(String),
}

impl McpError {
    /// Create an error from an rmcp error message
    pub fn from_rmcp_error(error: impl std::fmt::Display) -> Self {
        let msg = error.to_string();

        if msg.contains("not found") || msg.contains("NotFound") {
            McpError::ToolNotFound(msg)
        } else {
            McpError::ClientError(msg)
        }
    }

    /// Fold into the tool-scoped error for a failed call.
    ///
    /// A provider-side "not found" becomes [`ToolError::NotFound`] so the
    /// model sees the same message as for a locally unknown tool.
    pub fn into_tool_error(self, tool: &str) -> ToolError {
        match self {
            McpError::ToolNotFound(_) => ToolError::not_found(tool),
            other => ToolError::execution_failed(tool, other.to_string()),
        }
    }
}

impl From<McpError> for ConnectionError {
    fn from(err: McpError) -> Self {
        ConnectionError::new(err.to_string())
    }
}
