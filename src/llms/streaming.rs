//! Streaming inference contract.
//!
//! Provides the [`InferenceBackend`] trait for services that generate a chat
//! completion as a raw byte stream, and [`RelayStream`], which forwards that
//! stream into an HTTP response body chunk by chunk.
//!
//! # Design
//!
//! - Opaque: the proxy never parses the backend's framing. Whatever the
//!   backend emits (usually Server-Sent Events) reaches the caller as is,
//!   together with the backend's content type.
//! - Unbuffered: each chunk is yielded as soon as the backend produces it.
//! - Truncating: a failure after the first byte cannot become an HTTP error
//!   any more, so the relay logs it and ends the body.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::chat::conversation::ChatMessage;
use crate::utilities::errors::InferenceError;

// ---------------------------------------------------------------------------
// Request / stream types
// ---------------------------------------------------------------------------

/// A generation request for the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    /// Model identifier, e.g. `@cf/meta/llama-3.3-70b-instruct-fp8-fast`.
    pub model: String,
    /// Conversation, system message first.
    pub messages: Vec<ChatMessage>,
    /// Max output tokens.
    pub max_tokens: u32,
}

/// Raw byte chunks from the backend.
pub type ByteStream = BoxStream<'static, Result<Bytes, InferenceError>>;

/// A live backend response.
pub struct InferenceStream {
    /// Content type chosen by the backend, if it sent one.
    pub content_type: Option<String>,
    /// Response body.
    pub body: ByteStream,
}

impl std::fmt::Debug for InferenceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceStream")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// InferenceBackend trait
// ---------------------------------------------------------------------------

/// A hosted model that streams its output.
///
/// Implementations return once the response headers are in; the body is
/// consumed later by the caller. An `Err` means nothing was streamed.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Start a streamed generation.
    async fn stream(&self, request: InferenceRequest) -> Result<InferenceStream, InferenceError>;
}

// ---------------------------------------------------------------------------
// RelayStream
// ---------------------------------------------------------------------------

/// Forwards backend chunks to the caller untouched.
///
/// Ends after the backend's last chunk, or at the first error. Errors are
/// logged and swallowed, so the item type never fails.
pub struct RelayStream {
    inner: ByteStream,
    relayed_bytes: usize,
    finished: bool,
}

impl RelayStream {
    pub fn new(inner: ByteStream) -> Self {
        Self {
            inner,
            relayed_bytes: 0,
            finished: false,
        }
    }

    /// Bytes forwarded so far.
    pub fn relayed_bytes(&self) -> usize {
        self.relayed_bytes
    }
}

impl Stream for RelayStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        match ready!(self.inner.poll_next_unpin(cx)) {
            Some(Ok(chunk)) => {
                self.relayed_bytes += chunk.len();
                Poll::Ready(Some(Ok(chunk)))
            }
            Some(Err(error)) => {
                tracing::warn!(
                    relayed_bytes = self.relayed_bytes,
                    error = %error,
                    "inference stream failed mid-response; truncating"
                );
                self.finished = true;
                Poll::Ready(None)
            }
            None => {
                tracing::debug!(relayed_bytes = self.relayed_bytes, "inference stream complete");
                self.finished = true;
                Poll::Ready(None)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunks(items: Vec<Result<&'static str, &'static str>>) -> ByteStream {
        stream::iter(items.into_iter().map(|item| {
            item.map(|s| Bytes::from_static(s.as_bytes()))
                .map_err(|e| InferenceError::Stream(e.to_string()))
        }))
        .boxed()
    }

    #[tokio::test]
    async fn test_relay_forwards_every_chunk_in_order() {
        let mut relay = RelayStream::new(chunks(vec![
            Ok("data: {\"response\":\"Hel\"}\n\n"),
            Ok("data: {\"response\":\"lo\"}\n\n"),
            Ok("data: [DONE]\n\n"),
        ]));

        let mut out = Vec::new();
        while let Some(Ok(chunk)) = relay.next().await {
            out.push(chunk);
        }
        assert_eq!(out.len(), 3);
        assert_eq!(&out[2][..], b"data: [DONE]\n\n");
        assert_eq!(relay.relayed_bytes(), out.iter().map(|c| c.len()).sum::<usize>());
    }

    #[tokio::test]
    async fn test_relay_truncates_on_error() {
        let mut relay = RelayStream::new(chunks(vec![
            Ok("data: partial\n\n"),
            Err("connection reset"),
            Ok("data: never seen\n\n"),
        ]));

        let first = relay.next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"data: partial\n\n");
        assert!(relay.next().await.is_none());
        assert!(relay.next().await.is_none());
        assert_eq!(relay.relayed_bytes(), first.len());
    }

    #[tokio::test]
    async fn test_relay_empty_stream() {
        let mut relay = RelayStream::new(chunks(vec![]));
        assert!(relay.next().await.is_none());
        assert_eq!(relay.relayed_bytes(), 0);
    }

    #[test]
    fn test_inference_request_serde() {
        let req = InferenceRequest {
            model: "@cf/test".into(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            max_tokens: 1024,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["max_tokens"], 1024);
    }
}
