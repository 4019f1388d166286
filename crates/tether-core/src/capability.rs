//! Capabilities discovered from a provider and the callable stubs built
//! around them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ConnectionError, ToolError, ToolResult};
use crate::model::ToolDefinition;
use crate::schema::{self, ParamSpec};

/// Returned by a stub when a call produced no text content.
pub const NO_OUTPUT: &str = "No output";

/// A capability as listed by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    pub name: String,
    pub description: String,
    /// Declared input schema, exactly as the provider sent it.
    pub input_schema: Value,
}

impl CapabilityDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    pub fn param_spec(&self) -> ParamSpec {
        schema::translate(&self.input_schema)
    }
}

/// One item of a provider's call result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    Text(String),
    /// Non-text content (images, resources, ...); only its kind is kept.
    Other { kind: String },
}

/// Raw result of a call as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapabilityOutput {
    pub content: Vec<ContentItem>,
    pub is_error: bool,
}

impl CapabilityOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::Text(text.into())],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::Text(text.into())],
            is_error: true,
        }
    }
}

/// Flattened result of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallResult {
    pub text: String,
    pub is_error: bool,
}

impl From<CapabilityOutput> for ToolCallResult {
    fn from(output: CapabilityOutput) -> Self {
        let text = output
            .content
            .into_iter()
            .filter_map(|item| match item {
                ContentItem::Text(text) => Some(text),
                ContentItem::Other { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            text: if text.is_empty() {
                NO_OUTPUT.to_string()
            } else {
                text
            },
            is_error: output.is_error,
        }
    }
}

/// Sends an already validated call over an open transport.
#[async_trait]
pub trait CapabilityInvoker: Send + Sync {
    async fn call_capability(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> ToolResult<CapabilityOutput>;
}

/// A capability bound to a transport, validating its arguments before
/// every call.
#[derive(Clone)]
pub struct CallableTool {
    descriptor: Arc<CapabilityDescriptor>,
    param_spec: ParamSpec,
    invoker: Arc<dyn CapabilityInvoker>,
}

impl fmt::Debug for CallableTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableTool")
            .field("name", &self.descriptor.name)
            .field("param_spec", &self.param_spec)
            .finish()
    }
}

impl CallableTool {
    pub fn new(descriptor: CapabilityDescriptor, invoker: Arc<dyn CapabilityInvoker>) -> Self {
        let param_spec = descriptor.param_spec();
        Self {
            descriptor: Arc::new(descriptor),
            param_spec,
            invoker,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn description(&self) -> &str {
        &self.descriptor.description
    }

    pub fn param_spec(&self) -> &ParamSpec {
        &self.param_spec
    }

    pub fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.descriptor.name.clone(),
            description: self.descriptor.description.clone(),
            parameters: self.param_spec.to_json_schema(),
        }
    }

    /// Validate `args`, call the capability and return its text output.
    ///
    /// A result the provider flags as an error is returned as text; only
    /// validation and transport failures become `Err`.
    pub async fn invoke(&self, args: &Value) -> ToolResult<String> {
        let arguments =
            self.param_spec
                .validate(args)
                .map_err(|source| ToolError::InvalidArguments {
                    tool: self.name().to_string(),
                    source,
                })?;

        debug!(tool = %self.name(), arguments = %serde_json::Value::Object(arguments.clone()), "Calling capability");
        let output = self.invoker.call_capability(self.name(), arguments).await?;
        let result = ToolCallResult::from(output);

        if result.is_error {
            warn!(tool = %self.name(), output = %result.text, "Capability reported an error result");
        }

        Ok(result.text)
    }
}

/// Callable tools indexed by name.
///
/// Built once per connection. When two capabilities share a name the first
/// one listed wins.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    tools: Vec<CallableTool>,
    index: HashMap<String, usize>,
}

impl ToolSet {
    pub fn new(tools: impl IntoIterator<Item = CallableTool>) -> Self {
        let mut set = Self::default();
        for tool in tools {
            if set.index.contains_key(tool.name()) {
                warn!(tool = %tool.name(), "Duplicate capability name, keeping the first one listed");
                continue;
            }
            set.index.insert(tool.name().to_string(), set.tools.len());
            set.tools.push(tool);
        }
        set
    }

    pub fn get(&self, name: &str) -> Option<&CallableTool> {
        self.index.get(name).map(|&position| &self.tools[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CallableTool> {
        self.tools.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(CallableTool::name).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(CallableTool::definition).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Source of callable capabilities with an explicit connection lifetime.
#[async_trait]
pub trait CapabilityRegistry: Send + Sync {
    /// Open the transport and discover capabilities.
    async fn connect(&mut self) -> Result<(), ConnectionError>;

    /// One callable stub per discovered capability, in listing order.
    fn callable_tools(&self) -> Vec<CallableTool>;

    /// Release the transport. Safe to call more than once.
    async fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingInvoker {
        calls: Mutex<Vec<(String, Map<String, Value>)>>,
        output: CapabilityOutput,
    }

    #[async_trait]
    impl CapabilityInvoker for RecordingInvoker {
        async fn call_capability(
            &self,
            name: &str,
            arguments: Map<String, Value>,
        ) -> ToolResult<CapabilityOutput> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), arguments));
            Ok(self.output.clone())
        }
    }

    fn by_category() -> CapabilityDescriptor {
        CapabilityDescriptor::new(
            "list_expenses_by_category",
            "List all expenses by category",
            json!({
                "type": "object",
                "properties": { "category": { "type": "string" } },
                "required": ["category"]
            }),
        )
    }

    #[tokio::test]
    async fn test_invoke_forwards_validated_arguments() {
        let invoker = Arc::new(RecordingInvoker {
            output: CapabilityOutput::text("3 expenses"),
            ..Default::default()
        });
        let tool = CallableTool::new(by_category(), invoker.clone());

        let text = tool
            .invoke(&json!({ "category": "food", "junk": true }))
            .await
            .unwrap();

        assert_eq!(text, "3 expenses");
        let calls = invoker.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "list_expenses_by_category");
        assert_eq!(Value::Object(calls[0].1.clone()), json!({ "category": "food" }));
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_reach_transport() {
        let invoker = Arc::new(RecordingInvoker::default());
        let tool = CallableTool::new(by_category(), invoker.clone());

        let err = tool.invoke(&json!({ "category": 7 })).await.unwrap_err();

        assert!(matches!(err, ToolError::InvalidArguments { .. }));
        assert!(invoker.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_results_are_returned_as_text() {
        let invoker = Arc::new(RecordingInvoker {
            output: CapabilityOutput::error("upstream API returned 500"),
            ..Default::default()
        });
        let tool = CallableTool::new(by_category(), invoker);

        let text = tool.invoke(&json!({ "category": "food" })).await.unwrap();
        assert_eq!(text, "upstream API returned 500");
    }

    #[test]
    fn test_result_flattening() {
        let output = CapabilityOutput {
            content: vec![
                ContentItem::Text("first".into()),
                ContentItem::Other {
                    kind: "image".into(),
                },
                ContentItem::Text("second".into()),
            ],
            is_error: false,
        };
        assert_eq!(ToolCallResult::from(output).text, "first\nsecond");

        let only_image = CapabilityOutput {
            content: vec![ContentItem::Other {
                kind: "image".into(),
            }],
            is_error: false,
        };
        assert_eq!(ToolCallResult::from(only_image).text, NO_OUTPUT);
        assert_eq!(ToolCallResult::from(CapabilityOutput::default()).text, NO_OUTPUT);
    }

    #[test]
    fn test_tool_set_keeps_first_duplicate() {
        let invoker: Arc<dyn CapabilityInvoker> = Arc::new(RecordingInvoker::default());
        let first = CallableTool::new(
            CapabilityDescriptor::new("dup", "first", json!({})),
            invoker.clone(),
        );
        let second = CallableTool::new(
            CapabilityDescriptor::new("dup", "second", json!({})),
            invoker.clone(),
        );
        let other = CallableTool::new(
            CapabilityDescriptor::new("other", "", json!({})),
            invoker,
        );

        let set = ToolSet::new([first, second, other]);

        assert_eq!(set.len(), 2);
        assert_eq!(set.names(), vec!["dup", "other"]);
        assert_eq!(set.get("dup").unwrap().description(), "first");
        assert!(set.get("missing").is_none());
    }
}
