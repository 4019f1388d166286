//! The model invocation boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelResult;
use crate::message::{ChatMessage, ModelResponse};

/// A capability as presented to the model: name, description and a JSON
/// schema for its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A chat model that can be bound to capabilities.
///
/// The inference engine itself is external; implementations only adapt
/// `invoke` to whatever transport the engine speaks.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one inference over the working context with the given
    /// capabilities bound.
    async fn invoke(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> ModelResult<ModelResponse>;

    /// Human-readable identifier used in logs.
    fn model_name(&self) -> &str {
        "chat-model"
    }
}
