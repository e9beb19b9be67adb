//! Health check endpoint for container orchestration.
//!
//! Reports liveness of this service only; backend connectivity is exposed
//! separately under `/api/status`.

/// Health check handler.
///
/// Returns a simple "ok" response to indicate the service is running.
pub async fn health() -> &'static str {
    "ok"
}
