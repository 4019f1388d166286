//! # Tether Memory
//!
//! Durable conversation history for the Tether agent loop.
//!
//! - **[ConversationStore]**: one JSON document per conversation, rewritten
//!   atomically on every mutation and recovered leniently on load
//! - **[ConversationState]**: the persisted session (id, ordered messages,
//!   timestamps)
//!
//! ## Example
//!
//! ```rust,no_run
//! use tether_memory::{ConversationRole, ConversationStore};
//!
//! # async fn example() -> Result<(), tether_memory::StoreError> {
//! let mut store = ConversationStore::new("conversation-state.json");
//! store.load().await;
//! store.add_message(ConversationRole::User, "How much did I spend on food?").await?;
//! println!("{} messages", store.messages().len());
//! # Ok(())
//! # }
//! ```

mod error;
mod state;
mod store;

pub use error::{StateLoadError, StoreError, StoreResult};
pub use state::{ConversationMessage, ConversationRole, ConversationState};
pub use store::ConversationStore;
