//! Fetching remote media by URL.
//!
//! Generated videos come back from the prediction provider as short-lived
//! download URLs; they have to be pulled into the bucket before the provider
//! expires them.

use std::time::Duration;

use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Generous timeout: generated videos can be tens of megabytes.
const FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP fetcher for remote media.
#[derive(Clone)]
pub struct MediaFetcher {
    http: reqwest::Client,
}

impl Default for MediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Download the full body at `url`. Non-2xx responses are errors.
    pub async fn fetch_bytes(&self, url: &str) -> StorageResult<Vec<u8>> {
        debug!("Fetching remote media from {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StorageError::fetch_failed(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::fetch_failed(
                url,
                format!("unexpected status {}", status.as_u16()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::fetch_failed(url, e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_bytes_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/output.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"video-bytes".to_vec()))
            .mount(&server)
            .await;

        let fetcher = MediaFetcher::new();
        let bytes = fetcher
            .fetch_bytes(&format!("{}/output.mp4", server.uri()))
            .await
            .unwrap();
        assert_eq!(bytes, b"video-bytes");
    }

    #[tokio::test]
    async fn test_fetch_bytes_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.mp4"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = MediaFetcher::new();
        let err = fetcher
            .fetch_bytes(&format!("{}/gone.mp4", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::FetchFailed { .. }));
    }
}
