//! Status card page and its JSON counterpart.

use axum::{
    extract::State,
    response::{Html, Json},
};
use chrono::SecondsFormat;
use serde::Serialize;

use crate::error::AppError;
use crate::poller::{HealthPayload, StatusSnapshot};
use crate::state::AppState;

/// What the status card shows, flattened for templates and JSON clients
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    /// One of checking, connected, error_response, unreachable
    pub state: &'static str,
    pub label: &'static str,
    pub connected: bool,
    pub api_url: String,
    pub payload: Option<HealthPayload>,
    pub service: Option<String>,
    pub version: Option<String>,
    pub backend_status: Option<String>,
    /// RFC 3339 timestamp of the applied poll
    pub last_checked: Option<String>,
    pub sequence: u64,
    pub error: Option<String>,
}

impl StatusView {
    pub fn new(snapshot: &StatusSnapshot, api_url: &str) -> Self {
        let payload = snapshot.state.payload();

        Self {
            state: snapshot.state.kind(),
            label: snapshot.state.label(),
            connected: snapshot.state.is_connected(),
            api_url: api_url.to_string(),
            payload: payload.cloned(),
            service: payload.and_then(HealthPayload::service),
            version: payload.and_then(HealthPayload::version),
            backend_status: payload.and_then(HealthPayload::status),
            last_checked: snapshot
                .last_checked
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            sequence: snapshot.sequence,
            error: snapshot.error.clone(),
        }
    }
}

/// Render the status card
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let view = StatusView::new(&state.board.snapshot(), &state.api_url);

    let mut context = tera::Context::new();
    context.insert("ui", &state.config.ui);
    context.insert("status", &view);

    let html = state.tera.render("status.html", &context)?;
    Ok(Html(html))
}

/// Current snapshot as JSON
pub async fn status_json(State(state): State<AppState>) -> Json<StatusView> {
    Json(StatusView::new(&state.board.snapshot(), &state.api_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PollError;
    use crate::poller::StatusBoard;
    use serde_json::json;

    #[test]
    fn test_view_before_first_poll() {
        let view = StatusView::new(&StatusSnapshot::default(), "http://localhost:5000");
        assert_eq!(view.state, "checking");
        assert_eq!(view.label, "Checking...");
        assert!(!view.connected);
        assert!(view.payload.is_none());
        assert!(view.last_checked.is_none());
    }

    #[test]
    fn test_view_flattens_payload_fields() {
        let board = StatusBoard::new();
        let payload = HealthPayload::from_value(json!({
            "service": "AI Dev Platform",
            "version": "1.0.0",
            "status": "healthy"
        }))
        .unwrap();
        board.apply(1, Ok(payload));

        let view = StatusView::new(&board.snapshot(), "http://b");
        assert!(view.connected);
        assert_eq!(view.service.as_deref(), Some("AI Dev Platform"));
        assert_eq!(view.version.as_deref(), Some("1.0.0"));
        assert_eq!(view.backend_status.as_deref(), Some("healthy"));
        assert!(view.last_checked.unwrap().ends_with('Z'));
    }

    #[test]
    fn test_view_carries_error_without_payload() {
        let board = StatusBoard::new();
        board.apply(1, Err(PollError::Transport("connection refused".into())));

        let view = StatusView::new(&board.snapshot(), "http://b");
        assert_eq!(view.state, "unreachable");
        assert!(view.payload.is_none());
        assert!(view.service.is_none());
        assert_eq!(
            view.error.as_deref(),
            Some("Backend unreachable: connection refused")
        );
    }
}
