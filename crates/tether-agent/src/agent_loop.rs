//! The bounded tool-calling turn loop.

use std::fmt;
use std::sync::Arc;

use tether_core::{
    CapabilityRegistry, ChatModel, ToolCallRequest, ToolDefinition, ToolError, ToolResult, ToolSet,
};
use tether_memory::{ConversationMessage, ConversationRole, ConversationStore};
use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::context::WorkingContext;
use crate::error::{AgentError, AgentResult};
use crate::prompt::system_prompt;

/// Lifecycle of an [`AgentLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Idle,
    Initializing,
    Ready,
    /// Waiting on a model invocation.
    Dispatching,
    /// Running the tool calls of one model response.
    ExecutingTools,
    Terminated,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentState::Idle => "idle",
            AgentState::Initializing => "initializing",
            AgentState::Ready => "ready",
            AgentState::Dispatching => "dispatching",
            AgentState::ExecutingTools => "executing_tools",
            AgentState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Drives user turns against a model, a capability registry and a durable
/// conversation store.
///
/// Each successful [`chat`](Self::chat) persists exactly one user message and
/// one assistant message, however many tool rounds the turn took.
pub struct AgentLoop {
    model: Arc<dyn ChatModel>,
    registry: Box<dyn CapabilityRegistry>,
    store: ConversationStore,
    config: AgentConfig,
    tools: ToolSet,
    definitions: Vec<ToolDefinition>,
    state: AgentState,
}

impl AgentLoop {
    pub fn new(
        model: Arc<dyn ChatModel>,
        registry: Box<dyn CapabilityRegistry>,
        store: ConversationStore,
        config: AgentConfig,
    ) -> Self {
        Self {
            model,
            registry,
            store,
            config,
            tools: ToolSet::default(),
            definitions: Vec::new(),
            state: AgentState::Idle,
        }
    }

    /// Connect the registry, load history and bind the discovered tools.
    pub async fn initialize(&mut self) -> AgentResult<()> {
        self.state = AgentState::Initializing;

        if let Err(e) = self.registry.connect().await {
            self.state = AgentState::Idle;
            return Err(e.into());
        }
        debug!("Capability provider connected");

        let loaded = self.store.load().await;
        debug!(
            session_id = %loaded.session_id,
            messages = loaded.messages.len(),
            "Conversation state loaded"
        );

        let tools = ToolSet::new(self.registry.callable_tools());
        if tools.is_empty() {
            self.registry.close().await;
            self.state = AgentState::Idle;
            return Err(AgentError::NoCapabilities);
        }

        self.definitions = tools.definitions();
        self.tools = tools;
        self.state = AgentState::Ready;

        info!(
            model = %self.model.model_name(),
            tools = ?self.tools.names(),
            "Agent initialized"
        );
        Ok(())
    }

    /// Run one user turn and return the final answer.
    ///
    /// A turn dropped mid-flight (for example by a timeout) leaves the loop
    /// usable; only the user message it already persisted remains.
    pub async fn chat(&mut self, input: &str) -> AgentResult<String> {
        if !self.is_initialized() {
            return Err(AgentError::Uninitialized);
        }

        let result = self.run_turn(input).await;
        self.state = AgentState::Ready;
        result
    }

    async fn run_turn(&mut self, input: &str) -> AgentResult<String> {
        self.store.add_message(ConversationRole::User, input).await?;

        let history = self.store.messages();
        let prior = &history[..history.len().saturating_sub(1)];
        let mut context =
            WorkingContext::new(system_prompt(&self.config, &self.tools), prior, input);

        let max_iterations = self.config.max_iterations();
        let mut answer = None;

        for iteration in 1..=max_iterations {
            self.state = AgentState::Dispatching;
            debug!(
                iteration,
                max_iterations,
                messages = context.len(),
                "Invoking model"
            );
            let response = self
                .model
                .invoke(context.messages(), &self.definitions)
                .await?;

            if !response.has_tool_calls() {
                answer = Some(response.content.into_text());
                break;
            }

            self.state = AgentState::ExecutingTools;
            debug!(iteration, calls = response.tool_calls.len(), "Executing tool calls");
            context.push_response(&response);

            for call in &response.tool_calls {
                match self.execute(call).await {
                    Ok(output) => context.push_tool_result(call, output),
                    Err(e) => {
                        warn!(
                            tool = %call.name,
                            code = e.error_code(),
                            error = %e,
                            "Tool call failed, reporting to model"
                        );
                        context.push_error(call, e.to_string());
                    }
                }
            }
        }

        let answer = match answer {
            Some(text) if !text.trim().is_empty() => text,
            Some(_) => {
                info!("Model returned an empty answer, using fallback");
                self.config.fallback_answer.clone()
            }
            None => {
                info!(max_iterations, "Iteration limit reached, using fallback");
                self.config.fallback_answer.clone()
            }
        };

        self.store
            .add_message(ConversationRole::Assistant, answer.as_str())
            .await?;
        Ok(answer)
    }

    async fn execute(&self, call: &ToolCallRequest) -> ToolResult<String> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::not_found(&call.name))?;
        debug!(tool = %call.name, call_id = %call.id, "Executing tool");
        tool.invoke(&call.arguments).await
    }

    /// Reset the durable history to a fresh session.
    pub async fn clear_conversation_history(&mut self) -> AgentResult<()> {
        self.store.clean().await?;
        Ok(())
    }

    /// Close the registry. The loop cannot chat again until re-initialized.
    pub async fn shutdown(&mut self) {
        self.registry.close().await;
        self.tools = ToolSet::default();
        self.definitions.clear();
        self.state = AgentState::Terminated;
        info!("Agent shut down");
    }

    /// Alias for [`shutdown`](Self::shutdown).
    pub async fn clean_resources(&mut self) {
        self.shutdown().await;
    }

    /// Durable messages of the current session.
    pub fn history(&self) -> &[ConversationMessage] {
        self.store.messages()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.store.session_id()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.names()
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    /// True between a successful `initialize` and `shutdown`.
    pub fn is_initialized(&self) -> bool {
        matches!(
            self.state,
            AgentState::Ready | AgentState::Dispatching | AgentState::ExecutingTools
        )
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}
