//! Logging middleware
//!
//! Records HTTP request and response information

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Request logging middleware
///
/// Records method, path, status, and latency for each HTTP request under a
/// per-request span.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );
    let _enter = span.enter();

    info!("Request started: {} {}", method, path);

    let response = next.run(request).await;

    let duration = start_time.elapsed();
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        warn!(
            "Request failed: {} - Duration: {:.2}ms",
            status,
            duration.as_secs_f64() * 1000.0
        );
    } else {
        info!(
            "Request completed: {} - Duration: {:.2}ms",
            status,
            duration.as_secs_f64() * 1000.0
        );
    }

    // Vendor calls can legitimately take a while; flag the outliers
    if duration.as_secs() > 30 {
        warn!(
            "Slow request detected: {} {} - Duration: {:.2}s",
            method,
            path,
            duration.as_secs_f64()
        );
    }

    response
}
