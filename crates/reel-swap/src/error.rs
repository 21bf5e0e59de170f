//! Prediction client error types.

use thiserror::Error;

/// Result type for prediction operations.
pub type SwapResult<T> = Result<T, SwapError>;

/// Errors from the face swap prediction API.
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("Failed to configure prediction client: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Prediction API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Prediction {id} failed: {reason}")]
    PredictionFailed { id: String, reason: String },

    #[error("Prediction {id} did not finish within {waited_secs}s")]
    TimedOut { id: String, waited_secs: u64 },

    #[error("Invalid response from prediction API: {0}")]
    InvalidResponse(String),
}

impl SwapError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Whether a submit or poll attempt may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(SwapError::api(429, "slow down").is_retryable());
        assert!(SwapError::api(503, "unavailable").is_retryable());
        assert!(!SwapError::api(401, "bad token").is_retryable());
        assert!(!SwapError::api(422, "bad input").is_retryable());
    }

    #[test]
    fn test_terminal_errors_not_retryable() {
        let err = SwapError::PredictionFailed {
            id: "p1".into(),
            reason: "no face detected".into(),
        };
        assert!(!err.is_retryable());
    }
}
