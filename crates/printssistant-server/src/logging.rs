//! Request tracing hooks for [`tower_http::trace::TraceLayer`].
//!
//! Every request gets a span carrying the host it was addressed to, since
//! that host decides the OAuth redirect in the `auto` tier. Completed
//! requests are logged once, at a level chosen by status class.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use tracing::{Level, Span};

use crate::routes::request_host;

/// Span for one inbound request.
pub fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        host = %request_host(request.headers()),
    )
}

/// Level a completed request is logged at.
pub fn response_level(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

/// Log a completed request inside its span.
pub fn log_response(response: &Response<Body>, latency: Duration) {
    let status = response.status().as_u16();
    let duration_ms = latency.as_millis() as u64;

    match response_level(response.status()) {
        Level::ERROR => tracing::error!(status, duration_ms, "Request failed"),
        Level::WARN => tracing::warn!(status, duration_ms, "Request rejected"),
        _ => tracing::info!(status, duration_ms, "Request completed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_level_by_status_class() {
        assert_eq!(response_level(StatusCode::OK), Level::INFO);
        assert_eq!(response_level(StatusCode::SEE_OTHER), Level::INFO);
        assert_eq!(response_level(StatusCode::UNAUTHORIZED), Level::WARN);
        assert_eq!(response_level(StatusCode::SERVICE_UNAVAILABLE), Level::ERROR);
    }

    #[test]
    fn test_request_span_builds_for_forwarded_host() {
        let request = Request::builder()
            .uri("/callback?code=x")
            .header("x-forwarded-host", "printssistant-canva-backend.vercel.app")
            .body(Body::empty())
            .unwrap();
        // Without a subscriber the span is disabled; building it must not panic.
        let _span = request_span(&request);
    }
}
