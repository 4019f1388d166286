//! Scripted chat model.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tether_core::{
    ChatMessage, ChatModel, ModelError, ModelResponse, ModelResult, ToolCallRequest,
    ToolDefinition,
};

/// What the model was shown on one invocation.
#[derive(Debug, Clone)]
pub struct ModelInvocation {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Clone)]
enum Step {
    Respond(ModelResponse),
    Fail(String),
}

#[derive(Debug, Default)]
struct Script {
    steps: VecDeque<Step>,
    repeat: Option<Step>,
    invocations: Vec<ModelInvocation>,
}

/// A chat model that replays queued steps in order.
///
/// Once the queue is drained the model keeps returning the step set with
/// [`repeat`](Self::repeat), or fails if none was set.
#[derive(Debug, Clone, Default)]
pub struct ScriptedModel {
    script: Arc<Mutex<Script>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A model that answers every invocation with `response`.
    pub fn always(response: ModelResponse) -> Self {
        Self::new().repeat(response)
    }

    /// A model that requests `tool` with `arguments` on every invocation.
    pub fn always_calling(tool: &str, arguments: Value) -> Self {
        Self::always(ModelResponse::with_tool_calls(
            "",
            vec![ToolCallRequest::new(tool, arguments)],
        ))
    }

    /// Queue a plain text answer.
    pub fn then_text(self, text: impl Into<String>) -> Self {
        let text: String = text.into();
        self.then(ModelResponse::text(text))
    }

    /// Queue a single tool call request.
    pub fn then_tool_call(self, tool: &str, arguments: Value) -> Self {
        self.then(ModelResponse::with_tool_calls(
            "",
            vec![ToolCallRequest::new(tool, arguments)],
        ))
    }

    /// Queue an arbitrary response.
    pub fn then(self, response: ModelResponse) -> Self {
        self.lock().steps.push_back(Step::Respond(response));
        self
    }

    /// Queue an invocation failure.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.lock().steps.push_back(Step::Fail(message.into()));
        self
    }

    /// Response to give once the queue is drained.
    pub fn repeat(self, response: ModelResponse) -> Self {
        self.lock().repeat = Some(Step::Respond(response));
        self
    }

    pub fn call_count(&self) -> usize {
        self.lock().invocations.len()
    }

    pub fn invocations(&self) -> Vec<ModelInvocation> {
        self.lock().invocations.clone()
    }

    pub fn last_invocation(&self) -> Option<ModelInvocation> {
        self.lock().invocations.last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn invoke(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> ModelResult<ModelResponse> {
        let mut guard = self.lock();
        let script = &mut *guard;
        script.invocations.push(ModelInvocation {
            messages: messages.to_vec(),
            tools: tools.to_vec(),
        });

        let step = script.steps.pop_front().or_else(|| script.repeat.clone());
        match step {
            Some(Step::Respond(response)) => Ok(response),
            Some(Step::Fail(message)) => Err(ModelError::Unavailable(message)),
            None => Err(ModelError::Unavailable("script exhausted".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
