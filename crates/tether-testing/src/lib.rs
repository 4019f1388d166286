//! # Tether Testing
//!
//! Predictable stand-ins for the two external boundaries of the agent loop.
//!
//! - **[ScriptedModel]**: a [`ChatModel`](tether_core::ChatModel) replaying
//!   queued responses and recording every invocation
//! - **[StaticRegistry]**: a [`CapabilityRegistry`](tether_core::CapabilityRegistry)
//!   serving fixed capabilities with canned outputs
//!
//! Both are cheap to clone and share their recorded state between clones, so
//! a test can keep a handle after moving one into an agent.

mod mock_model;
mod mock_registry;

pub use mock_model::{ModelInvocation, ScriptedModel};
pub use mock_registry::{MockCapability, StaticRegistry};
