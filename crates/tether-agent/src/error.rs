//! Error types for the agent loop.

use tether_core::{ConnectionError, ModelError};
use tether_memory::StoreError;
use thiserror::Error;

/// Errors surfaced by [`AgentLoop`](crate::AgentLoop).
///
/// Tool failures never appear here; they are folded into the turn.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The capability provider could not be reached.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The provider connected but listed no capabilities.
    #[error("No tools found")]
    NoCapabilities,

    /// `chat` was called before `initialize` or after `shutdown`.
    #[error("Agent not initialized. Call initialize() first")]
    Uninitialized,

    /// Model invocation failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Conversation history could not be persisted.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AgentError {
    /// Get the error code suitable for logging or reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            AgentError::Connection(_) => "CONNECTION_ERROR",
            AgentError::NoCapabilities => "NO_CAPABILITIES",
            AgentError::Uninitialized => "UNINITIALIZED",
            AgentError::Model(_) => "MODEL_ERROR",
            AgentError::Store(_) => "STORE_ERROR",
        }
    }
}

/// Result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
