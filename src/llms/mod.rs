//! Inference backends.
//!
//! - [`streaming`] - The backend trait and the byte relay used by the chat proxy
//! - [`providers`] - Concrete backends (Cloudflare Workers AI)

pub mod providers;
pub mod streaming;

// Re-exports for convenience
pub use providers::workers_ai::WorkersAiBackend;
pub use streaming::{ByteStream, InferenceBackend, InferenceRequest, InferenceStream, RelayStream};
