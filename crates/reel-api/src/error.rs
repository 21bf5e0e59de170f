//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] reel_storage::StorageError),

    #[error("Firestore error: {0}")]
    Firestore(#[from] reel_firestore::FirestoreError),

    #[error("Prediction error: {0}")]
    Swap(#[from] reel_swap::SwapError),
}

impl ApiError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Wire-level error kind, mirroring the callable error vocabulary.
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::NotFound(_) => "not-found",
            ApiError::InvalidArgument(_) => "invalid-argument",
            ApiError::RateLimited => "resource-exhausted",
            ApiError::Internal(_)
            | ApiError::Storage(_)
            | ApiError::Firestore(_)
            | ApiError::Swap(_) => "internal",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_)
            | ApiError::Storage(_)
            | ApiError::Firestore(_)
            | ApiError::Swap(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = match &self {
            ApiError::Internal(_)
            | ApiError::Storage(_)
            | ApiError::Firestore(_)
            | ApiError::Swap(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error: self.kind(),
            detail,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_and_statuses() {
        assert_eq!(
            ApiError::unauthenticated("no token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::unauthenticated("no token").kind(), "unauthenticated");

        assert_eq!(
            ApiError::invalid_argument("missing url").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::invalid_argument("missing url").kind(), "invalid-argument");

        assert_eq!(
            ApiError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::internal("boom").kind(), "internal");
    }
}
