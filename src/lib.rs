//! # SoulFire
//!
//! HTTP edge server with three behaviors:
//!
//! - lunar keyword replies: `?q=moon` and friends answer with tonight's
//!   phase and a ritual
//! - static assets: the web UI and favicon
//! - chat proxy: `POST /api/chat` streams a completion from Cloudflare
//!   Workers AI after injecting the SoulFire system prompt
//!
//! Requests are stateless; nothing is persisted between them.

pub mod assets;
pub mod chat;
pub mod llms;
pub mod lunar;
pub mod server;
pub mod utilities;

pub use assets::{AssetFetcher, DirAssets};
pub use chat::{ChatMessage, ChatRequest, Role};
pub use llms::{InferenceBackend, InferenceRequest, InferenceStream, WorkersAiBackend};
pub use lunar::{moon_phase, ritual_for, LunarPhase};
pub use server::{app_router, AppState};
pub use utilities::config::ServerConfig;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
