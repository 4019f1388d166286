//! Working-context messages exchanged with the model.
//!
//! These types only live for the duration of one turn. The durable
//! conversation log has its own, narrower message type in `tether-memory`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Role of an entry in the turn-local working context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    /// Result of a capability call.
    Tool,
    /// A capability call that failed; carries the failure message.
    Error,
}

/// A capability call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Correlation id tying the request to its result entry.
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCallRequest {
    /// Create a request with a generated correlation id.
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            arguments,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// One entry of the working context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    /// Successful capability output, correlated to its request.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::new(ChatRole::Tool, content)
        }
    }

    /// Failed capability call, correlated to its request.
    pub fn error(call_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::new(ChatRole::Error, message)
        }
    }

    /// The model's own response, kept in context while its tool calls run.
    pub fn from_response(response: &ModelResponse) -> Self {
        Self {
            tool_calls: response.tool_calls.clone(),
            ..Self::new(ChatRole::Assistant, response.content.to_text())
        }
    }
}

/// Content of a model response.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelContent {
    Text(String),
    Structured(Value),
}

impl ModelContent {
    /// Plain text form; structured content is JSON-encoded.
    pub fn to_text(&self) -> String {
        match self {
            ModelContent::Text(text) => text.clone(),
            ModelContent::Structured(value) => value.to_string(),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ModelContent::Text(text) => text,
            ModelContent::Structured(value) => value.to_string(),
        }
    }
}

impl From<String> for ModelContent {
    fn from(text: String) -> Self {
        ModelContent::Text(text)
    }
}

impl From<&str> for ModelContent {
    fn from(text: &str) -> Self {
        ModelContent::Text(text.to_string())
    }
}

/// What one model invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub content: ModelContent,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ModelResponse {
    /// A plain answer with no tool calls.
    pub fn text(content: impl Into<ModelContent>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// A response requesting capability calls.
    pub fn with_tool_calls(content: impl Into<ModelContent>, calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: content.into(),
            tool_calls: calls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_content_is_json_encoded() {
        let value = json!([{ "type": "text", "text": "hi" }]);
        let content = ModelContent::Structured(value.clone());
        let decoded: Value = serde_json::from_str(&content.to_text()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_response_message_keeps_tool_calls() {
        let call = ToolCallRequest::new("list_expenses", json!({})).with_id("call-1");
        let response = ModelResponse::with_tool_calls("", vec![call.clone()]);
        let message = ChatMessage::from_response(&response);

        assert_eq!(message.role, ChatRole::Assistant);
        assert_eq!(message.tool_calls, vec![call]);
        assert!(response.has_tool_calls());
    }

    #[test]
    fn test_error_entry_is_correlated() {
        let entry = ChatMessage::error("call-7", "Capability 'x' not found");
        assert_eq!(entry.role, ChatRole::Error);
        assert_eq!(entry.tool_call_id.as_deref(), Some("call-7"));
    }
}
