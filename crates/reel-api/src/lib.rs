//! Axum HTTP API server.
//!
//! This crate provides:
//! - The storage-event upload trigger
//! - The face-swap callable
//! - Feed, comment, like, and profile endpoints
//! - Firebase ID token verification
//! - Rate limiting, security headers, and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
