//! # Tether Agent
//!
//! The bounded tool-calling loop. One [`AgentLoop::chat`] call is one user
//! turn: the input is persisted, the model is invoked with the conversation
//! and the bound capabilities, requested tool calls run in order, and the
//! final answer is persisted. A turn never takes more than
//! [`AgentConfig::max_iterations`] model rounds and always ends with an
//! answer, falling back to a fixed apology when the model produces none.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tether_agent::{AgentConfig, AgentLoop};
//! use tether_memory::ConversationStore;
//! use tether_testing::{MockCapability, ScriptedModel, StaticRegistry};
//!
//! # async fn example() -> Result<(), tether_agent::AgentError> {
//! let registry = StaticRegistry::new([MockCapability::new("list_expenses", "List all expenses")]);
//! let model = ScriptedModel::new().then_text("No expenses yet.");
//! let mut agent = AgentLoop::new(
//!     Arc::new(model),
//!     Box::new(registry),
//!     ConversationStore::new("conversation-state.json"),
//!     AgentConfig::default(),
//! );
//!
//! agent.initialize().await?;
//! let answer = agent.chat("Show all expenses").await?;
//! println!("{answer}");
//! agent.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod agent_loop;
pub mod config;
mod context;
mod error;
pub mod prompt;

pub use agent_loop::{AgentLoop, AgentState};
pub use config::{AgentConfig, DEFAULT_MAX_ITERATIONS, FALLBACK_ANSWER, TaskHint};
pub use context::WorkingContext;
pub use error::{AgentError, AgentResult};
pub use prompt::system_prompt;
