//! # Tether MCP
//!
//! Connects Tether to a capability provider speaking the Model Context
//! Protocol over stdio, using the official Rust SDK (`rmcp`).
//!
//! ```rust,no_run
//! use tether_core::CapabilityRegistry;
//! use tether_mcp::{McpRegistry, McpServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = McpServerConfig::from_command_line("node mcp-server/index.js")?;
//! let mut registry = McpRegistry::new(config);
//! registry.connect().await?;
//! for tool in registry.callable_tools() {
//!     println!("{}: {}", tool.name(), tool.description());
//! }
//! registry.close().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod registry;

pub use config::{DEFAULT_HANDSHAKE_TIMEOUT, McpServerConfig};
pub use error::{McpError, McpResult};
pub use registry::{McpInvoker, McpRegistry};
