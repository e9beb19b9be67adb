//! Request ID middleware for correlating logs with requests.
//!
//! Each incoming request gets a UUID v4, a tracing span carrying it for the
//! whole request, and an `x-request-id` response header so a client report
//! can be matched against the logs. Handlers do not need the ID themselves;
//! the span carries it into their log lines.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use http::HeaderValue;
use tracing::Instrument;
use uuid::Uuid;

/// Response header carrying the request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that generates a request ID and wraps the request in a span.
///
/// Must be the outermost layer so the span covers every other layer.
pub async fn request_id_layer(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();

    async move {
        let mut response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::debug!(status = response.status().as_u16(), duration_ms, "Request completed");

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}
