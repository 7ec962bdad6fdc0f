//! Per-request access log.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{Instrument, Span, field};

use super::RequestId;

/// Wraps the request in an `http_request` span and logs its outcome.
///
/// Server errors log at `error`, client errors at `warn`, everything else at
/// `info`. The span's `status` field is filled once the response is known.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default();

    let span = tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
        status = field::Empty,
    );

    async move {
        tracing::debug!(query = request.uri().query().unwrap_or(""), "Request received");

        let start = Instant::now();
        let response = next.run(request).await;
        let status = response.status();
        let duration_ms = start.elapsed().as_millis() as u64;
        Span::current().record("status", status.as_u16());

        if status.is_server_error() {
            tracing::error!(duration_ms, "Response sent");
        } else if status.is_client_error() {
            tracing::warn!(duration_ms, "Response sent");
        } else {
            tracing::info!(duration_ms, "Response sent");
        }
        response
    }
    .instrument(span)
    .await
}
