//! Static asset delegation.
//!
//! The router hands static requests to an [`AssetFetcher`] and returns
//! whatever it answers, including its own not-found responses.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Request,
    response::Response,
};
use tower::ServiceExt;
use tower_http::services::ServeDir;

/// Serves static files for a request.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, request: Request) -> Response;
}

/// Files under a directory, with `index.html` for directory paths.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
    service: ServeDir,
}

impl DirAssets {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            service: ServeDir::new(&root).append_index_html_on_directories(true),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl AssetFetcher for DirAssets {
    async fn fetch(&self, request: Request) -> Response {
        let path = request.uri().path().to_owned();
        match self.service.clone().oneshot(request).await {
            Ok(response) => {
                tracing::debug!(%path, status = %response.status(), "served static asset");
                response.map(Body::new)
            }
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    async fn fetch(assets: &DirAssets, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = assets.fetch(request).await;
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_serves_index_and_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>SoulFire</h1>").unwrap();
        std::fs::write(dir.path().join("favicon.ico"), [0u8, 1, 2, 3]).unwrap();
        let assets = DirAssets::new(dir.path());
        assert_eq!(assets.root(), dir.path());

        let (status, body) = fetch(&assets, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<h1>SoulFire</h1>");

        let (status, body) = fetch(&assets, "/favicon.ico").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, vec![0u8, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let assets = DirAssets::new(dir.path());
        let (status, _) = fetch(&assets, "/nope.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
