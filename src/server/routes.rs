//! Request dispatch for the soulfire edge server.
//!
//! Every request goes through [`dispatch`], which evaluates the routing
//! rules in priority order; the first match answers and nothing falls
//! through. Lunar keywords are checked before the path, so
//! `/anything?q=moon` is a phase reply whatever the method.

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::{header::CONTENT_TYPE, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::assets::AssetFetcher;
use crate::chat::chat_handler;
use crate::llms::streaming::InferenceBackend;
use crate::lunar::{moon_phase, ritual_for, Clock, LunarPhase, SystemClock};
use crate::utilities::config::{ChatSettings, StaticScope};

/// Path of the chat proxy endpoint.
pub const CHAT_PATH: &str = "/api/chat";

/// Shared application state for the HTTP server.
///
/// Immutable after startup; collaborators sit behind trait objects.
#[derive(Clone)]
pub struct AppState {
    /// Model, system prompt and limits for the chat proxy.
    pub chat: Arc<ChatSettings>,
    /// Which paths are handed to `assets`.
    pub static_scope: StaticScope,
    /// Streams chat completions.
    pub backend: Arc<dyn InferenceBackend>,
    /// Serves static files.
    pub assets: Arc<dyn AssetFetcher>,
    /// Time source for lunar replies.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        chat: ChatSettings,
        static_scope: StaticScope,
        backend: Arc<dyn InferenceBackend>,
        assets: Arc<dyn AssetFetcher>,
    ) -> Self {
        Self {
            chat: Arc::new(chat),
            static_scope,
            backend,
            assets,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }
}

/// Build the axum router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Lunar keywords
// ---------------------------------------------------------------------------

/// Keywords answered with a phase reply, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LunarKeyword {
    MoonRitual,
    Moon,
    Suggestion,
}

impl LunarKeyword {
    /// Case-insensitive substring match; `"moon ritual"` beats `"moon"`
    /// beats `"suggestion"`.
    pub fn detect(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        if text.contains("moon ritual") {
            Some(LunarKeyword::MoonRitual)
        } else if text.contains("moon") {
            Some(LunarKeyword::Moon)
        } else if text.contains("suggestion") {
            Some(LunarKeyword::Suggestion)
        } else {
            None
        }
    }

    /// Plain-text reply for `phase`.
    pub fn reply(&self, phase: LunarPhase) -> String {
        let ritual = ritual_for(phase);
        match self {
            LunarKeyword::MoonRitual => {
                format!("🌙 Tonight is the {} moon. Ritual: {}", phase, ritual)
            }
            LunarKeyword::Moon => format!("🌙 Tonight is the {} moon. {}", phase, ritual),
            LunarKeyword::Suggestion => {
                format!("🌙 Tonight is the {} moon. Suggested ritual: {}", phase, ritual)
            }
        }
    }
}

/// The first `message` query value, or the first `q` value when `message`
/// is absent or empty. Later repeats of either key are ignored.
fn user_query(uri: &Uri) -> Option<String> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).ok()?;
    let first = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };
    first("message")
        .filter(|m| !m.is_empty())
        .or_else(|| first("q"))
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let keyword = user_query(request.uri())
        .as_deref()
        .and_then(LunarKeyword::detect);
    if let Some(keyword) = keyword {
        let phase = moon_phase(state.clock.now());
        tracing::debug!(?keyword, %phase, "lunar keyword reply");
        return (
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            keyword.reply(phase),
        )
            .into_response();
    }

    let path = request.uri().path().to_owned();

    if state.static_scope.serves(&path) {
        return state.assets.fetch(request).await;
    }

    if path == CHAT_PATH {
        if request.method() == Method::POST {
            return chat_handler(&state, request.into_body()).await;
        }
        return (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
    }

    (StatusCode::NOT_FOUND, "Not found").into_response()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
