//! Error types for the soulfire server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Body of every failed chat request. Causes are logged, never returned.
pub const CHAT_FAILURE_MESSAGE: &str = "Failed to process request";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    /// A variable is set but does not parse.
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// Errors from an inference backend.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Transport failure talking to the backend.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Inference backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response stream broke or the backend reported a failure.
    #[error("Inference stream error: {0}")]
    Stream(String),
}

/// Errors raised on the chat proxy path before streaming starts.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Reading the inbound body failed or exceeded the size limit.
    #[error("Failed to read request body: {0}")]
    Body(#[source] axum::Error),

    /// The inbound body is not a valid chat request.
    #[error("Invalid chat request: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend call failed.
    #[error(transparent)]
    Backend(#[from] InferenceError),

    /// The relay response could not be assembled.
    #[error("Failed to build response: {0}")]
    Response(#[from] axum::http::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": CHAT_FAILURE_MESSAGE })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_proxy_error_hides_cause() {
        let err = ProxyError::Backend(InferenceError::Status {
            status: 503,
            body: "secret upstream detail".into(),
        });
        assert!(err.to_string().contains("secret upstream detail"));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "application/json"
        );
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"Failed to process request"}"#);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            key: "PORT".into(),
            value: "eighty".into(),
            reason: "invalid digit found in string".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for PORT: \"eighty\" (invalid digit found in string)"
        );
    }
}
