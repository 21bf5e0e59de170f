//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "reel_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "reel_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "reel_http_requests_in_flight";

    // Upload pipeline metrics
    pub const UPLOAD_EVENTS_TOTAL: &str = "reel_upload_events_total";

    // Face swap metrics
    pub const SWAPS_STARTED_TOTAL: &str = "reel_swaps_started_total";
    pub const SWAPS_COMPLETED_TOTAL: &str = "reel_swaps_completed_total";
    pub const SWAPS_FAILED_TOTAL: &str = "reel_swaps_failed_total";
    pub const SWAP_DURATION_SECONDS: &str = "reel_swap_duration_seconds";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "reel_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an upload event by outcome (merged, ignored, dropped).
pub fn record_upload_event(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::UPLOAD_EVENTS_TOTAL, &labels).increment(1);
}

/// Record a face swap submission.
pub fn record_swap_started() {
    counter!(names::SWAPS_STARTED_TOTAL).increment(1);
}

/// Record a completed face swap with its end-to-end duration.
pub fn record_swap_completed(duration_secs: f64) {
    counter!(names::SWAPS_COMPLETED_TOTAL).increment(1);
    histogram!(names::SWAP_DURATION_SECONDS).record(duration_secs);
}

/// Record a failed face swap.
pub fn record_swap_failed() {
    counter!(names::SWAPS_FAILED_TOTAL).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels (remove IDs, etc.).
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(
        r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
    )
    .unwrap()
    .replace_all(path, ":id");
    // Normalize document ids in resource paths
    let path = regex_lite::Regex::new(r"/videos/[a-zA-Z0-9_.-]+")
        .unwrap()
        .replace_all(&path, "/videos/:video_id");
    let path = regex_lite::Regex::new(r"/comments/[a-zA-Z0-9_.-]+")
        .unwrap()
        .replace_all(&path, "/comments/:comment_id");
    let path = regex_lite::Regex::new(r"/users/[a-zA-Z0-9_.-]+")
        .unwrap()
        .replace_all(&path, "/users/:user_id");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/api/videos/abc123/comments"),
            "/api/videos/:video_id/comments"
        );
        assert_eq!(
            sanitize_path("/api/comments/550e8400-e29b-41d4-a716-446655440000/like"),
            "/api/comments/:id/like"
        );
        assert_eq!(
            sanitize_path("/api/comments/c42/like"),
            "/api/comments/:comment_id/like"
        );
        assert_eq!(sanitize_path("/api/users/uid42"), "/api/users/:user_id");
        assert_eq!(sanitize_path("/api/feed"), "/api/feed");
    }
}
