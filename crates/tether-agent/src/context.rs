//! Turn-local message buffer.

use tether_core::{ChatMessage, ModelResponse, ToolCallRequest};
use tether_memory::{ConversationMessage, ConversationRole};

/// Messages shown to the model during one turn.
///
/// Owned by the turn and dropped when it ends; only the user input and the
/// final answer are ever persisted.
#[derive(Debug, Clone, Default)]
pub struct WorkingContext {
    messages: Vec<ChatMessage>,
}

impl WorkingContext {
    /// System instructions, then prior history, then the new user input.
    pub fn new(system: impl Into<String>, history: &[ConversationMessage], input: &str) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system));
        messages.extend(history.iter().map(from_history));
        messages.push(ChatMessage::user(input));
        Self { messages }
    }

    pub fn push_response(&mut self, response: &ModelResponse) {
        self.messages.push(ChatMessage::from_response(response));
    }

    pub fn push_tool_result(&mut self, call: &ToolCallRequest, output: impl Into<String>) {
        self.messages.push(ChatMessage::tool_result(&call.id, output));
    }

    pub fn push_error(&mut self, call: &ToolCallRequest, message: impl Into<String>) {
        self.messages.push(ChatMessage::error(&call.id, message));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

fn from_history(message: &ConversationMessage) -> ChatMessage {
    match message.role {
        ConversationRole::User => ChatMessage::user(&message.content),
        ConversationRole::Assistant => ChatMessage::assistant(&message.content),
        ConversationRole::System => ChatMessage::system(&message.content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tether_core::ChatRole;

    #[test]
    fn test_layout() {
        let history = vec![
            ConversationMessage::new(ConversationRole::User, "hi"),
            ConversationMessage::new(ConversationRole::Assistant, "hello"),
        ];
        let context = WorkingContext::new("rules", &history, "list expenses");

        let roles: Vec<ChatRole> = context.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::System, ChatRole::User, ChatRole::Assistant, ChatRole::User]
        );
        assert_eq!(context.messages()[3].content, "list expenses");
    }

    #[test]
    fn test_tool_entries_are_correlated() {
        let mut context = WorkingContext::new("rules", &[], "q");
        let call = ToolCallRequest::new("list_expenses", json!({})).with_id("call-1");
        let response = ModelResponse::with_tool_calls("", vec![call.clone()]);

        context.push_response(&response);
        context.push_tool_result(&call, "3 expenses");
        context.push_error(&call, "Tool not found: nope");

        let messages = context.messages();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[2].tool_calls, vec![call]);
        assert_eq!(messages[3].role, ChatRole::Tool);
        assert_eq!(messages[3].tool_call_id.as_deref(), Some("call-1"));
        assert_eq!(messages[4].role, ChatRole::Error);
        assert_eq!(messages[4].content, "Tool not found: nope");
    }
}
