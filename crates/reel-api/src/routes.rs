//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::comments::{create_comment, like_comment, list_comments};
use crate::handlers::events::handle_storage_event;
use crate::handlers::feed::get_feed;
use crate::handlers::likes::toggle_like;
use crate::handlers::swap::face_swap;
use crate::handlers::users::{create_user, get_user};
use crate::handlers::videos::get_video;
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let video_routes = Router::new()
        .route("/feed", get(get_feed))
        .route("/videos/:video_id", get(get_video))
        .route("/videos/:video_id/comments", get(list_comments))
        .route("/videos/:video_id/comments", post(create_comment))
        .route("/videos/:video_id/like", post(toggle_like))
        .route("/comments/:comment_id/like", post(like_comment));

    let user_routes = Router::new()
        .route("/users", post(create_user))
        .route("/users/:user_id", get(get_user));

    let swap_routes = Router::new().route("/swap", post(face_swap));

    // Create rate limiter for API routes
    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .merge(video_routes)
        .merge(user_routes)
        .merge(swap_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter.clone(),
            rate_limit_middleware,
        ));

    // Storage event delivery shares the limiter but lives outside /api
    let event_routes = Router::new()
        .route("/events/storage", post(handle_storage_event))
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(event_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Request body size limit: all payloads here are small JSON
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
