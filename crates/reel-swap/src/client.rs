//! Prediction API HTTP client.
//!
//! Submits face swap predictions and polls them to completion with capped
//! backoff and an overall deadline.

use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{SwapError, SwapResult};
use crate::types::{Prediction, PredictionRequest, PredictionStatus, SwapInput};

/// Version hash of the roop face swap model.
pub const DEFAULT_MODEL_VERSION: &str =
    "11b6bf0f4e14d808f655e87e5448233cceff10a45f659d71539cafb7163b2e84";

/// Configuration for the prediction client.
#[derive(Debug, Clone)]
pub struct PredictionClientConfig {
    /// Base URL of the prediction API
    pub base_url: String,
    /// API token
    pub api_token: String,
    /// Model version hash to run
    pub model_version: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Max retries for submitting a prediction
    pub max_retries: u32,
    /// Initial poll interval
    pub poll_interval: Duration,
    /// Cap on the poll interval as backoff grows
    pub max_poll_interval: Duration,
    /// Overall deadline for a prediction to finish
    pub poll_deadline: Duration,
}

impl PredictionClientConfig {
    /// Create config from environment variables. The API token is required.
    pub fn from_env() -> SwapResult<Self> {
        let api_token = std::env::var("PREDICTION_API_TOKEN")
            .map_err(|_| SwapError::config_error("PREDICTION_API_TOKEN not set"))?;

        Ok(Self {
            base_url: std::env::var("PREDICTION_API_URL")
                .unwrap_or_else(|_| "https://api.replicate.com".to_string()),
            api_token,
            model_version: std::env::var("FACE_SWAP_MODEL_VERSION")
                .unwrap_or_else(|_| DEFAULT_MODEL_VERSION.to_string()),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            poll_interval: Duration::from_secs(1),
            max_poll_interval: Duration::from_secs(10),
            poll_deadline: Duration::from_secs(
                std::env::var("PREDICTION_POLL_DEADLINE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
        })
    }
}

/// Client for the face swap prediction API.
#[derive(Clone)]
pub struct PredictionClient {
    http: Client,
    config: PredictionClientConfig,
}

impl PredictionClient {
    /// Create a new prediction client.
    pub fn new(config: PredictionClientConfig) -> SwapResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SwapError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> SwapResult<Self> {
        Self::new(PredictionClientConfig::from_env()?)
    }

    /// Run a face swap end to end: submit, poll to completion, and return
    /// the output download URL.
    pub async fn run_swap(&self, input: SwapInput) -> SwapResult<String> {
        let prediction = self.submit(input).await?;
        let finished = self.poll_to_completion(&prediction.id).await?;

        finished
            .output_url()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                SwapError::InvalidResponse(format!(
                    "prediction {} succeeded without an output URL",
                    finished.id
                ))
            })
    }

    /// Submit a new prediction.
    pub async fn submit(&self, input: SwapInput) -> SwapResult<Prediction> {
        let url = format!("{}/v1/predictions", self.config.base_url);
        let request = PredictionRequest {
            version: self.config.model_version.clone(),
            input,
        };

        debug!("Submitting face swap prediction to {}", url);

        let prediction: Prediction = self
            .with_retry(|| async {
                let response = self
                    .http
                    .post(&url)
                    .header("Authorization", format!("Token {}", self.config.api_token))
                    .json(&request)
                    .send()
                    .await
                    .map_err(SwapError::Network)?;
                Self::parse_response(response).await
            })
            .await?;

        info!("Submitted prediction {}", prediction.id);
        Ok(prediction)
    }

    /// Fetch the current state of a prediction.
    pub async fn get(&self, prediction_id: &str) -> SwapResult<Prediction> {
        let url = format!("{}/v1/predictions/{}", self.config.base_url, prediction_id);

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Token {}", self.config.api_token))
            .send()
            .await
            .map_err(SwapError::Network)?;

        Self::parse_response(response).await
    }

    /// Poll a prediction until it reaches a terminal status.
    ///
    /// The interval grows by half each round up to the configured cap, and
    /// the whole wait is bounded by the deadline. Transient poll errors are
    /// tolerated; the next round retries.
    pub async fn poll_to_completion(&self, prediction_id: &str) -> SwapResult<Prediction> {
        let started = Instant::now();
        let mut interval = self.config.poll_interval;

        loop {
            if started.elapsed() >= self.config.poll_deadline {
                return Err(SwapError::TimedOut {
                    id: prediction_id.to_string(),
                    waited_secs: started.elapsed().as_secs(),
                });
            }

            tokio::time::sleep(interval).await;
            interval = (interval + interval / 2).min(self.config.max_poll_interval);

            let prediction = match self.get(prediction_id).await {
                Ok(p) => p,
                Err(e) if e.is_retryable() => {
                    warn!("Poll for prediction {} failed, will retry: {}", prediction_id, e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            debug!(
                "Prediction {} status: {:?} after {:?}",
                prediction_id,
                prediction.status,
                started.elapsed()
            );

            match prediction.status {
                PredictionStatus::Succeeded => return Ok(prediction),
                PredictionStatus::Failed | PredictionStatus::Canceled => {
                    return Err(SwapError::PredictionFailed {
                        id: prediction_id.to_string(),
                        reason: prediction
                            .error
                            .unwrap_or_else(|| format!("{:?}", prediction.status).to_lowercase()),
                    });
                }
                PredictionStatus::Starting | PredictionStatus::Processing => continue,
            }
        }
    }

    async fn parse_response(response: reqwest::Response) -> SwapResult<Prediction> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SwapError::api(status.as_u16(), body));
        }

        response
            .json::<Prediction>()
            .await
            .map_err(|e| SwapError::InvalidResponse(e.to_string()))
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> SwapResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = SwapResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Prediction request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| SwapError::InvalidResponse("Unknown error".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> PredictionClientConfig {
        PredictionClientConfig {
            base_url,
            api_token: "test-token".to_string(),
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            timeout: Duration::from_secs(5),
            max_retries: 1,
            poll_interval: Duration::from_millis(10),
            max_poll_interval: Duration::from_millis(20),
            poll_deadline: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn test_submit_sends_version_and_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/predictions"))
            .and(header("Authorization", "Token test-token"))
            .and(body_partial_json(serde_json::json!({
                "version": DEFAULT_MODEL_VERSION,
                "input": {
                    "swap_image": "https://i/face.jpg",
                    "detect_target_face": true
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "pred1",
                "status": "starting"
            })))
            .mount(&server)
            .await;

        let client = PredictionClient::new(test_config(server.uri())).unwrap();
        let prediction = client
            .submit(SwapInput::new("https://i/face.jpg", "https://v/clip.mp4"))
            .await
            .unwrap();
        assert_eq!(prediction.id, "pred1");
        assert_eq!(prediction.status, PredictionStatus::Starting);
    }

    #[tokio::test]
    async fn test_submit_surfaces_client_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/predictions"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid input"))
            .mount(&server)
            .await;

        let client = PredictionClient::new(test_config(server.uri())).unwrap();
        let err = client
            .submit(SwapInput::new("bad", "bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::Api { status: 422, .. }));
    }

    #[tokio::test]
    async fn test_poll_until_succeeded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/predictions/pred1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pred1",
                "status": "processing"
            })))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/predictions/pred1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pred1",
                "status": "succeeded",
                "output": "https://cdn/out.mp4"
            })))
            .mount(&server)
            .await;

        let client = PredictionClient::new(test_config(server.uri())).unwrap();
        let prediction = client.poll_to_completion("pred1").await.unwrap();
        assert_eq!(prediction.output_url(), Some("https://cdn/out.mp4"));
    }

    #[tokio::test]
    async fn test_poll_reports_failure_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/predictions/pred2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pred2",
                "status": "failed",
                "error": "no face detected"
            })))
            .mount(&server)
            .await;

        let client = PredictionClient::new(test_config(server.uri())).unwrap();
        let err = client.poll_to_completion("pred2").await.unwrap_err();
        match err {
            SwapError::PredictionFailed { id, reason } => {
                assert_eq!(id, "pred2");
                assert_eq!(reason, "no face detected");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_poll_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/predictions/pred3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pred3",
                "status": "processing"
            })))
            .mount(&server)
            .await;

        let mut config = test_config(server.uri());
        config.poll_deadline = Duration::from_millis(50);
        let client = PredictionClient::new(config).unwrap();
        let err = client.poll_to_completion("pred3").await.unwrap_err();
        assert!(matches!(err, SwapError::TimedOut { .. }));
    }

    #[tokio::test]
    async fn test_run_swap_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/predictions"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "pred4",
                "status": "starting"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/predictions/pred4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pred4",
                "status": "succeeded",
                "output": "https://cdn/swapped.mp4"
            })))
            .mount(&server)
            .await;

        let client = PredictionClient::new(test_config(server.uri())).unwrap();
        let url = client
            .run_swap(SwapInput::new("https://i/face.jpg", "https://v/clip.mp4"))
            .await
            .unwrap();
        assert_eq!(url, "https://cdn/swapped.mp4");
    }
}
