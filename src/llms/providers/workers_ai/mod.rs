//! Cloudflare Workers AI streaming provider.
//!
//! Calls the Workers AI REST API with `stream: true` and hands the raw
//! Server-Sent Events body back as an [`InferenceStream`].
//!
//! # Endpoint
//!
//! `POST {base_url}/accounts/{account_id}/ai/run/{model}` with a bearer
//! token and the body `{"messages": [...], "max_tokens": N, "stream": true}`.

use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::llms::streaming::{InferenceBackend, InferenceRequest, InferenceStream};
use crate::utilities::config::WorkersAiConfig;
use crate::utilities::errors::InferenceError;

/// Max characters of an error body kept for logs.
const ERROR_BODY_LIMIT: usize = 500;

/// Workers AI backend.
#[derive(Debug, Clone)]
pub struct WorkersAiBackend {
    http: reqwest::Client,
    base_url: String,
    account_id: String,
    api_token: String,
}

impl WorkersAiBackend {
    /// Build a backend with its own connection pool.
    ///
    /// Only a connect timeout is set; a streamed generation may legitimately
    /// run for a long time.
    pub fn new(config: &WorkersAiConfig) -> Result<Self, InferenceError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_id: config.account_id.clone(),
            api_token: config.api_token.clone(),
        })
    }

    /// Run URL for `model`.
    pub fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/accounts/{}/ai/run/{}",
            self.base_url,
            self.account_id,
            model.trim_start_matches('/')
        )
    }

    /// JSON body for a streamed run.
    pub fn build_request_body(request: &InferenceRequest) -> Value {
        serde_json::json!({
            "messages": request.messages,
            "max_tokens": request.max_tokens,
            "stream": true,
        })
    }
}

#[async_trait]
impl InferenceBackend for WorkersAiBackend {
    async fn stream(&self, request: InferenceRequest) -> Result<InferenceStream, InferenceError> {
        let endpoint = self.endpoint(&request.model);
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            max_tokens = request.max_tokens,
            "calling Workers AI"
        );

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_token)
            .json(&Self::build_request_body(&request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > ERROR_BODY_LIMIT {
                let mut cut = ERROR_BODY_LIMIT;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response
            .bytes_stream()
            .map_err(InferenceError::from)
            .boxed();

        Ok(InferenceStream { content_type, body })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
