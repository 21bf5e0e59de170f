//! Retry policy with exponential backoff and jitter.
//!
//! - Exponential backoff with full jitter
//! - Respects the suggested delay on 429
//! - Configurable base and max delays

use std::time::Duration;

use tracing::{info_span, warn, Instrument};

use crate::error::{FirestoreError, FirestoreResult};
use crate::metrics::record_retry;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay cap (in milliseconds).
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 5000,
        }
    }
}

impl RetryConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let base_delay_ms: u64 = std::env::var("FIRESTORE_RETRY_BASE_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);

        let max_delay_ms: u64 = std::env::var("FIRESTORE_RETRY_MAX_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        Self {
            max_retries: 3,
            base_delay_ms,
            max_delay_ms,
        }
    }
}

/// Execute an async operation with retry.
///
/// Retries network errors, 429, and 5xx. Does not retry other 4xx, auth
/// errors, or not-found/already-exists.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    op: F,
) -> FirestoreResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = FirestoreResult<T>>,
{
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        let span = info_span!("firestore_retry", operation = %operation, attempt = attempt + 1);

        let result = op().instrument(span).await;

        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                let delay = calculate_delay(config, attempt, e.retry_after_ms());

                warn!(
                    operation = %operation,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Firestore operation failed, retrying: {}",
                    e
                );

                record_retry(operation);

                tokio::time::sleep(delay).await;
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| FirestoreError::request_failed("Unknown error")))
}

/// Calculate retry delay with exponential backoff and full jitter.
fn calculate_delay(config: &RetryConfig, attempt: u32, retry_after_ms: Option<u64>) -> Duration {
    if let Some(after) = retry_after_ms {
        return Duration::from_millis(after);
    }

    let exp_delay = config.base_delay_ms.saturating_mul(2u64.pow(attempt));
    let capped_delay = exp_delay.min(config.max_delay_ms);

    // Full jitter via time-based pseudo-randomization, avoiding a rand dependency
    let jittered = if capped_delay > 0 {
        use std::time::SystemTime;
        let nanos = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        let random_factor = (nanos % 1000) as f64 / 1000.0;
        ((capped_delay as f64) * random_factor) as u64
    } else {
        0
    };

    Duration::from_millis(jittered.max(config.base_delay_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay_ms, 100);
        assert_eq!(config.max_delay_ms, 5000);
    }

    #[test]
    fn test_calculate_delay_with_retry_after() {
        let config = RetryConfig::default();
        let delay = calculate_delay(&config, 0, Some(2000));
        assert_eq!(delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_calculate_delay_respects_max() {
        let config = RetryConfig {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 2000,
        };
        let delay = calculate_delay(&config, 10, None);
        assert!(delay.as_millis() <= 2000);
    }

    #[test]
    fn test_calculate_delay_minimum() {
        let config = RetryConfig::default();
        let delay = calculate_delay(&config, 0, None);
        assert!(delay.as_millis() >= config.base_delay_ms as u128);
    }

    #[tokio::test]
    async fn test_recovers_from_transient_failure() {
        let config = RetryConfig {
            max_retries: 3,
            base_delay_ms: 1,
            max_delay_ms: 2,
        };
        let calls = std::sync::atomic::AtomicU32::new(0);
        let result = with_retry(&config, "test_op", || {
            let n = calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(FirestoreError::ServerError(503, "unavailable".into()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let config = RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 2,
        };
        let calls = std::sync::atomic::AtomicU32::new(0);
        let result: FirestoreResult<()> = with_retry(&config, "test_op", || {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async { Err(FirestoreError::ServerError(503, "unavailable".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_client_errors() {
        let config = RetryConfig::default();
        let calls = std::sync::atomic::AtomicU32::new(0);
        let result: FirestoreResult<()> = with_retry(&config, "test_op", || {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async { Err(FirestoreError::not_found("videos/missing")) }
        })
        .await;
        assert!(matches!(result, Err(FirestoreError::NotFound(_))));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
