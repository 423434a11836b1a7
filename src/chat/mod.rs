//! Chat module — `POST /api/chat` proxy to a hosted model.
//!
//! ```text
//! {"messages": [...]}
//!   → Inject the system prompt (if no system message)
//!   → Stream a generation from the inference backend
//!   → Relay the backend's bytes to the caller
//! ```

pub mod conversation;
pub mod handler;

pub use conversation::{prepare_conversation, ChatMessage, ChatRequest, Role};
pub use handler::chat_handler;
