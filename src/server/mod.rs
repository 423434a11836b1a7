//! HTTP edge server.
//!
//! A single dispatcher handles every request, checking rules in order:
//!
//! 1. `?message=` / `?q=` lunar keywords — plain-text phase reply
//! 2. Static paths — delegated to the asset server
//! 3. `/api/chat` — `POST` streams a chat completion, other methods get 405
//! 4. Anything else — 404

pub mod routes;

pub use routes::{app_router, AppState};
