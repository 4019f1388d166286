//! # Tether Core
//!
//! Core traits and types for the Tether agent loop.
//!
//! - [`schema`]: translation of declared capability schemas into validating
//!   parameter specs
//! - [`capability`]: descriptors, callable stubs and the registry trait
//! - [`message`]: the turn-local working context exchanged with a model
//! - [`model`]: the model invocation boundary
//! - [`error`]: the shared error taxonomy

pub mod capability;
pub mod error;
pub mod message;
pub mod model;
pub mod schema;

pub use capability::{
    CallableTool, CapabilityDescriptor, CapabilityInvoker, CapabilityOutput, CapabilityRegistry,
    ContentItem, NO_OUTPUT, ToolCallResult, ToolSet,
};
pub use error::{
    ConnectionError, FieldIssue, ModelError, ModelResult, ToolError, ToolResult, ValidationError,
};
pub use message::{ChatMessage, ChatRole, ModelContent, ModelResponse, ToolCallRequest};
pub use model::{ChatModel, ToolDefinition};
pub use schema::{ParamField, ParamSpec, PrimitiveKind, translate};
