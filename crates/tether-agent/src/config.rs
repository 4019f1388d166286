//! Agent loop settings.

use serde::{Deserialize, Serialize};

/// Model rounds allowed per user turn.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Answer used when the model never produces usable text.
pub const FALLBACK_ANSWER: &str =
    "I apologize, but I couldn't find the information you requested. Please try again.";

/// A phrase users might say and the capability call it should map to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHint {
    pub request: String,
    pub call: String,
}

impl TaskHint {
    pub fn new(request: impl Into<String>, call: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            call: call.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    max_iterations: usize,
    pub fallback_answer: String,
    pub assistant_name: String,
    /// Extra task-to-capability lines, placed before the generated ones.
    pub task_hints: Vec<TaskHint>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            fallback_answer: FALLBACK_ANSWER.to_string(),
            assistant_name: "Tether assistant".to_string(),
            task_hints: Vec::new(),
        }
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum model rounds per turn. Zero is raised to one.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Model rounds allowed per turn, never less than one.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations.max(1)
    }

    pub fn with_fallback_answer(mut self, answer: impl Into<String>) -> Self {
        self.fallback_answer = answer.into();
        self
    }

    pub fn with_assistant_name(mut self, name: impl Into<String>) -> Self {
        self.assistant_name = name.into();
        self
    }

    pub fn with_task_hint(mut self, hint: TaskHint) -> Self {
        self.task_hints.push(hint);
        self
    }
}
