//! Inference provider implementations.
//!
//! | Provider | Module | Transport |
//! |----------|--------|-----------|
//! | Cloudflare Workers AI | [`workers_ai`] | REST, Server-Sent Events |

pub mod workers_ai;
