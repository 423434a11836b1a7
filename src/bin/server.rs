//! soulfire HTTP server binary.
//!
//! Starts an axum HTTP server that answers lunar keyword queries, serves
//! the static UI and proxies chat to Cloudflare Workers AI.
//!
//! # Environment Variables
//!
//! See [`soulfire::utilities::config`] for the full list. The required ones:
//!
//! - `CLOUDFLARE_ACCOUNT_ID` — Workers AI account
//! - `CLOUDFLARE_API_TOKEN` — Workers AI token
//! - `RUST_LOG` — Tracing filter (default: "info,soulfire=debug,tower_http=debug")
//!
//! # Usage
//!
//! ```bash
//! CLOUDFLARE_ACCOUNT_ID=... CLOUDFLARE_API_TOKEN=... cargo run --bin server
//! ```

use std::sync::Arc;

use anyhow::Context;
use soulfire::server::{app_router, AppState};
use soulfire::utilities::{config::ServerConfig, logger::init_tracing};
use soulfire::{DirAssets, WorkersAiBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::from_env().context("Failed to load configuration")?;
    let bind_addr = config.bind_addr();

    let backend = WorkersAiBackend::new(&config.workers_ai)
        .context("Failed to build Workers AI client")?;
    let assets = DirAssets::new(&config.assets_dir);

    let state = AppState::new(
        config.chat.clone(),
        config.static_scope,
        Arc::new(backend),
        Arc::new(assets),
    );
    let app = app_router(state);

    tracing::info!(version = soulfire::VERSION, "soulfire server starting on {}", bind_addr);
    tracing::info!(
        model = %config.chat.model_id,
        max_tokens = config.chat.max_tokens,
        assets_dir = %config.assets_dir.display(),
        static_scope = %config.static_scope,
        "configuration loaded"
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    tracing::info!("soulfire server stopped");
    Ok(())
}

/// Resolves on SIGINT (Ctrl-C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => tracing::warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("shutdown signal received; draining connections");
}
