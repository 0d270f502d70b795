//! Request tracing

use axum::{body::Body, Router};
use http::{Request, Response, StatusCode};
use std::time::Duration;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::trace::TraceLayer;
use tracing::info_span;

/// Wrap `router` in a `TraceLayer` that opens a span per request and logs
/// every response at a level chosen by its status.
pub fn with_request_logging(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<Body>| {
                info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    query = ?request.uri().query(),
                )
            })
            .on_response(|response: &Response<Body>, latency: Duration, _span: &tracing::Span| {
                let status = response.status();
                let latency_ms = latency.as_millis();

                // A 503 from the heartbeat is a reported outage, not a server fault.
                if status.is_success() {
                    tracing::info!(status = status.as_u16(), latency_ms, "request completed");
                } else if status.is_client_error() || status == StatusCode::SERVICE_UNAVAILABLE {
                    tracing::warn!(status = status.as_u16(), latency_ms, "request completed with error status");
                } else {
                    tracing::error!(status = status.as_u16(), latency_ms, "server error response");
                }
            })
            .on_failure(
                |error: ServerErrorsFailureClass, latency: Duration, _span: &tracing::Span| {
                    tracing::error!(
                        latency_ms = latency.as_millis(),
                        error = ?error,
                        "request failed"
                    );
                },
            ),
    )
}
