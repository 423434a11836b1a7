//! Chat proxy — `POST /api/chat` implementation.
//!
//! The pipeline per request:
//! 1. Read and parse the `{"messages": [...]}` body
//! 2. Inject the system prompt when the conversation has none
//! 3. Start a streamed generation on the inference backend
//! 4. Return a response whose body is the live backend stream
//!
//! Any failure in steps 1-3 is logged and answered with a 500 and
//! `{"error": "Failed to process request"}`. Once step 4 has returned,
//! backend failures only truncate the body (see [`RelayStream`]).

use axum::{
    body::Body,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
};

use super::conversation::{prepare_conversation, ChatRequest};
use crate::llms::streaming::{InferenceRequest, RelayStream};
use crate::server::AppState;
use crate::utilities::errors::ProxyError;

/// Content type used when the backend does not name one.
pub const DEFAULT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Proxy one chat request to the inference backend.
pub async fn chat_handler(state: &AppState, body: Body) -> Response {
    match proxy_chat(state, body).await {
        Ok(response) => response,
        Err(error) => {
            tracing::error!(error = %error, "chat request failed");
            error.into_response()
        }
    }
}

async fn proxy_chat(state: &AppState, body: Body) -> Result<Response, ProxyError> {
    let settings = &state.chat;

    let bytes = axum::body::to_bytes(body, settings.body_limit)
        .await
        .map_err(ProxyError::Body)?;
    let request: ChatRequest = serde_json::from_slice(&bytes)?;

    let messages = prepare_conversation(request.messages, &settings.system_prompt);
    let inference = InferenceRequest {
        model: settings.model_id.clone(),
        messages,
        max_tokens: settings.max_tokens,
    };
    tracing::debug!(
        model = %inference.model,
        messages = inference.messages.len(),
        "forwarding conversation"
    );

    let upstream = state.backend.stream(inference).await?;
    let content_type = upstream
        .content_type
        .unwrap_or_else(|| DEFAULT_STREAM_CONTENT_TYPE.to_string());

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(RelayStream::new(upstream.body)))?;
    Ok(response)
}
