//! Chat model backed by an Ollama `/api/chat` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tether_core::{
    ChatMessage, ChatModel, ChatRole, ModelError, ModelResponse, ModelResult, ToolCallRequest,
    ToolDefinition,
};
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct OllamaChatModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f64,
}

impl OllamaChatModel {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f64,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            temperature,
        })
    }

    fn request_body(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Value {
        let messages: Vec<OllamaMessage> = messages.iter().map(OllamaMessage::from).collect();
        let tools: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    }
                })
            })
            .collect();

        json!({
            "model": self.model,
            "messages": messages,
            "tools": tools,
            "stream": false,
            "options": { "temperature": self.temperature },
        })
    }
}

#[async_trait]
impl ChatModel for OllamaChatModel {
    async fn invoke(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> ModelResult<ModelResponse> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(url = %url, model = %self.model, messages = messages.len(), "Sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&self.request_body(messages, tools))
            .send()
            .await
            .map_err(|e| ModelError::Request(format!("Ollama unavailable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Unavailable(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let result: OllamaResponse = response.json().await.map_err(|e| {
            ModelError::InvalidResponse(format!("Failed to parse Ollama response: {e}"))
        })?;

        let calls = result
            .message
            .tool_calls
            .into_iter()
            .map(|call| {
                let arguments = match call.function.arguments {
                    Value::String(raw) => serde_json::from_str(&raw).map_err(|e| {
                        ModelError::InvalidResponse(format!(
                            "Tool call arguments for '{}' are not JSON: {e}",
                            call.function.name
                        ))
                    })?,
                    other => other,
                };
                Ok(ToolCallRequest::new(call.function.name, arguments))
            })
            .collect::<ModelResult<Vec<_>>>()?;

        debug!(tool_calls = calls.len(), "Received chat response");
        Ok(ModelResponse::with_tool_calls(result.message.content, calls))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OllamaToolCall>,
}

impl From<&ChatMessage> for OllamaMessage {
    fn from(message: &ChatMessage) -> Self {
        let (role, content) = match message.role {
            ChatRole::System => ("system", message.content.clone()),
            ChatRole::User => ("user", message.content.clone()),
            ChatRole::Assistant => ("assistant", message.content.clone()),
            ChatRole::Tool => ("tool", message.content.clone()),
            ChatRole::Error => ("tool", format!("Error: {}", message.content)),
        };
        let tool_calls = message
            .tool_calls
            .iter()
            .map(|call| OllamaToolCall {
                function: OllamaFunction {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                },
            })
            .collect();

        Self {
            role,
            content,
            tool_calls,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<OllamaToolCall>,
}
