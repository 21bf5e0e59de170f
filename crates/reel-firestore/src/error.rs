//! Firestore error types.

use thiserror::Error;

/// Result type for Firestore operations.
pub type FirestoreResult<T> = Result<T, FirestoreError>;

/// Errors that can occur during Firestore operations.
#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FirestoreError {
    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    /// Map an HTTP status to the matching error variant.
    pub fn from_http_status(status: u16, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match status {
            401 | 403 => Self::PermissionDenied(msg),
            404 => Self::NotFound(msg),
            409 => Self::AlreadyExists(msg),
            412 => Self::PreconditionFailed(msg),
            429 => Self::RateLimited(1000),
            500..=599 => Self::ServerError(status, msg),
            _ => Self::RequestFailed(msg),
        }
    }

    /// HTTP status this error corresponds to, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::PermissionDenied(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::AlreadyExists(_) => Some(409),
            Self::PreconditionFailed(_) => Some(412),
            Self::RateLimited(_) => Some(429),
            Self::ServerError(code, _) => Some(*code),
            _ => None,
        }
    }

    /// Suggested retry delay, only populated for rate limiting.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FirestoreError::Network(_) | FirestoreError::RateLimited(_) | FirestoreError::ServerError(_, _)
        )
    }

    /// True if the error was caused by a failed precondition (e.g., updateTime mismatch).
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, FirestoreError::PreconditionFailed(_))
            || matches!(
                self,
                FirestoreError::RequestFailed(msg)
                if msg.contains("FAILED_PRECONDITION") || msg.contains("Precondition")
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status_mapping() {
        assert!(matches!(FirestoreError::from_http_status(404, "x"), FirestoreError::NotFound(_)));
        assert!(matches!(FirestoreError::from_http_status(409, "x"), FirestoreError::AlreadyExists(_)));
        assert!(matches!(FirestoreError::from_http_status(412, "x"), FirestoreError::PreconditionFailed(_)));
        assert!(matches!(FirestoreError::from_http_status(429, "x"), FirestoreError::RateLimited(_)));
        assert!(matches!(FirestoreError::from_http_status(503, "x"), FirestoreError::ServerError(503, _)));
        assert!(matches!(FirestoreError::from_http_status(400, "x"), FirestoreError::RequestFailed(_)));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(FirestoreError::from_http_status(429, "x").is_retryable());
        assert!(FirestoreError::from_http_status(500, "x").is_retryable());
        assert!(!FirestoreError::from_http_status(400, "x").is_retryable());
        assert!(!FirestoreError::from_http_status(404, "x").is_retryable());
    }

    #[test]
    fn test_retry_after_only_for_rate_limits() {
        assert_eq!(FirestoreError::RateLimited(5000).retry_after_ms(), Some(5000));
        assert_eq!(FirestoreError::ServerError(500, "e".into()).retry_after_ms(), None);
    }

    #[test]
    fn test_precondition_detection() {
        assert!(FirestoreError::PreconditionFailed("t".into()).is_precondition_failed());
        assert!(FirestoreError::RequestFailed("FAILED_PRECONDITION: stale".into()).is_precondition_failed());
        assert!(!FirestoreError::RequestFailed("other".into()).is_precondition_failed());
    }
}
