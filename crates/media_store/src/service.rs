use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::types::{ImageKind, MediaError};

/// Trait for image store implementations. The store accepts raw bytes and
/// answers with the URL the image is served from.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores already-sniffed image bytes, returning their public URL.
    async fn store(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        kind: ImageKind,
    ) -> Result<String, MediaError>;
}

/// HTTP gateway to the hosted media store.
pub struct HttpImageStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

/// Reply from the media store's upload endpoint
#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

impl HttpImageStore {
    /// Creates a store client from `MEDIA_STORE_URL` (required) and
    /// `MEDIA_STORE_API_KEY` (optional).
    pub fn new() -> Result<Self, MediaError> {
        let base_url = env::var("MEDIA_STORE_URL").map_err(|_| {
            MediaError::Config("MEDIA_STORE_URL environment variable not set".to_string())
        })?;

        let api_key = env::var("MEDIA_STORE_API_KEY").ok();

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn store(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        kind: ImageKind,
    ) -> Result<String, MediaError> {
        let url = format!(
            "{}/upload?folder=vehicles&name={}",
            self.base_url,
            urlencoding::encode(filename)
        );

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", kind.content_type())
            .body(bytes);

        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MediaError::Upload(format!("Media store request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(MediaError::Upload(format!(
                "Media store answered {}: {}",
                status, error_text
            )));
        }

        let reply: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Upload(format!("Invalid media store reply: {}", e)))?;

        info!("Stored image {} as {}", filename, reply.url);
        Ok(reply.url)
    }
}

/// Mock image store for development/testing
pub struct MockImageStore;

#[async_trait]
impl ImageStore for MockImageStore {
    async fn store(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        kind: ImageKind,
    ) -> Result<String, MediaError> {
        info!(
            "🖼️ [MOCK MEDIA] Stored {} bytes of {} as {}",
            bytes.len(),
            kind.content_type(),
            filename
        );

        Ok(format!(
            "https://media.invalid/vehicles/{}-{}",
            uuid::Uuid::new_v4(),
            urlencoding::encode(filename)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_store_returns_filename_url() {
        let store = MockImageStore;
        let url = store
            .store(vec![0xFF, 0xD8, 0xFF], "van.jpg", ImageKind::Jpeg)
            .await
            .unwrap();

        assert!(url.starts_with("https://media.invalid/vehicles/"));
        assert!(url.ends_with("van.jpg"));
    }
}
