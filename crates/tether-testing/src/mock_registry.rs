//! Fixed capability registry with canned outputs.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tether_core::{
    CallableTool, CapabilityDescriptor, CapabilityInvoker, CapabilityOutput, CapabilityRegistry,
    ConnectionError, ToolError, ToolResult,
};
use tracing::debug;

#[derive(Debug, Clone)]
enum Outcome {
    Output(CapabilityOutput),
    Fail(String),
}

/// A capability with a fixed outcome for every call.
#[derive(Debug, Clone)]
pub struct MockCapability {
    descriptor: CapabilityDescriptor,
    outcome: Outcome,
}

impl MockCapability {
    /// A capability taking no arguments.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            descriptor: CapabilityDescriptor::new(
                name,
                description,
                serde_json::json!({ "type": "object", "properties": {} }),
            ),
            outcome: Outcome::Output(CapabilityOutput::default()),
        }
    }

    pub fn with_schema(mut self, input_schema: Value) -> Self {
        self.descriptor.input_schema = input_schema;
        self
    }

    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.outcome = Outcome::Output(CapabilityOutput::text(text));
        self
    }

    /// Return a result the provider flags as an error.
    pub fn with_error_result(mut self, text: impl Into<String>) -> Self {
        self.outcome = Outcome::Output(CapabilityOutput::error(text));
        self
    }

    /// Fail the call at the transport level.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.outcome = Outcome::Fail(message.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

#[derive(Debug, Default)]
struct MockInvoker {
    outcomes: HashMap<String, Outcome>,
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
}

#[async_trait]
impl CapabilityInvoker for MockInvoker {
    async fn call_capability(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> ToolResult<CapabilityOutput> {
        debug!(tool = %name, "Mock capability called");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), arguments));

        match self.outcomes.get(name) {
            Some(Outcome::Output(output)) => Ok(output.clone()),
            Some(Outcome::Fail(message)) => Err(ToolError::execution_failed(name, message.clone())),
            None => Err(ToolError::not_found(name)),
        }
    }
}

/// A registry serving a fixed list of capabilities.
///
/// Clones share call history and connection counters.
#[derive(Debug, Clone)]
pub struct StaticRegistry {
    capabilities: Vec<MockCapability>,
    invoker: Arc<MockInvoker>,
    connect_failure: Option<String>,
    connected: Arc<AtomicBool>,
    close_count: Arc<AtomicUsize>,
}

impl StaticRegistry {
    pub fn new(capabilities: impl IntoIterator<Item = MockCapability>) -> Self {
        let capabilities: Vec<_> = capabilities.into_iter().collect();
        let mut outcomes = HashMap::new();
        for capability in &capabilities {
            outcomes
                .entry(capability.name().to_string())
                .or_insert_with(|| capability.outcome.clone());
        }

        Self {
            capabilities,
            invoker: Arc::new(MockInvoker {
                outcomes,
                calls: Mutex::default(),
            }),
            connect_failure: None,
            connected: Arc::new(AtomicBool::new(false)),
            close_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A registry that lists nothing.
    pub fn empty() -> Self {
        Self::new([])
    }

    /// Make `connect` fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            connect_failure: Some(message.into()),
            ..Self::empty()
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    /// Every call that reached the transport, in order.
    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.invoker
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

#[async_trait]
impl CapabilityRegistry for StaticRegistry {
    async fn connect(&mut self) -> Result<(), ConnectionError> {
        if let Some(message) = &self.connect_failure {
            return Err(ConnectionError::new(message.clone()));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn callable_tools(&self) -> Vec<CallableTool> {
        if !self.is_connected() {
            return Vec::new();
        }
        let invoker: Arc<dyn CapabilityInvoker> = self.invoker.clone();
        self.capabilities
            .iter()
            .map(|capability| CallableTool::new(capability.descriptor.clone(), Arc::clone(&invoker)))
            .collect()
    }

    async fn close(&mut self) {
        self.connected.store(false, Ordering::SeqCst);
        self.close_count.fetch_add(1, Ordering::SeqCst);
    }
}
