//! Connectivity state and the board that holds the latest snapshot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::error::PollError;

/// Result of a single poll
pub type PollOutcome = Result<HealthPayload, PollError>;

/// JSON object returned by a successful health response.
///
/// Any keys are kept; `service`, `version` and `status` are the ones the
/// status card displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HealthPayload(Map<String, Value>);

impl HealthPayload {
    /// Parse a response body. Anything other than a JSON object is malformed.
    pub fn from_slice(body: &[u8]) -> Result<Self, PollError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| PollError::MalformedBody(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, PollError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(PollError::MalformedBody(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Field rendered as display text; strings are unquoted, other scalars
    /// use their JSON form.
    pub fn field_text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn service(&self) -> Option<String> {
        self.field_text("service")
    }

    pub fn version(&self) -> Option<String> {
        self.field_text("version")
    }

    pub fn status(&self) -> Option<String> {
        self.field_text("status")
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Connectivity to the backend as of the most recent applied poll.
///
/// The payload lives inside `Connected`, so no other state can carry one.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectivityState {
    /// No poll has completed yet
    Checking,
    /// The backend answered 2xx with a JSON object
    Connected(HealthPayload),
    /// The backend answered with a non-success status
    ErrorResponse,
    /// No usable response (transport failure or malformed body)
    Unreachable,
}

impl ConnectivityState {
    pub fn from_outcome(outcome: PollOutcome) -> Self {
        match outcome {
            Ok(payload) => ConnectivityState::Connected(payload),
            Err(PollError::Status(_)) => ConnectivityState::ErrorResponse,
            Err(PollError::Transport(_)) | Err(PollError::MalformedBody(_)) => {
                ConnectivityState::Unreachable
            }
        }
    }

    /// Stable identifier used in the JSON API and CSS classes
    pub fn kind(&self) -> &'static str {
        match self {
            ConnectivityState::Checking => "checking",
            ConnectivityState::Connected(_) => "connected",
            ConnectivityState::ErrorResponse => "error_response",
            ConnectivityState::Unreachable => "unreachable",
        }
    }

    /// Human-readable status line
    pub fn label(&self) -> &'static str {
        match self {
            ConnectivityState::Checking => "Checking...",
            ConnectivityState::Connected(_) => "Connected",
            ConnectivityState::ErrorResponse => "Backend responded with error",
            ConnectivityState::Unreachable => "Unable to connect to backend",
        }
    }

    pub fn payload(&self) -> Option<&HealthPayload> {
        match self {
            ConnectivityState::Connected(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectivityState::Connected(_))
    }
}

/// Latest published state plus bookkeeping about the poll that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub state: ConnectivityState,
    /// Sequence number of the applied poll; 0 before the first one
    pub sequence: u64,
    pub last_checked: Option<DateTime<Utc>>,
    /// Failure reason of the applied poll, for diagnostics
    pub error: Option<String>,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            state: ConnectivityState::Checking,
            sequence: 0,
            last_checked: None,
            error: None,
        }
    }
}

struct BoardInner {
    tx: watch::Sender<StatusSnapshot>,
    active: AtomicBool,
}

/// Shared holder of the latest [`StatusSnapshot`].
///
/// Cloning is cheap; all clones observe the same snapshot.
#[derive(Clone)]
pub struct StatusBoard {
    inner: Arc<BoardInner>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    /// New active board in the `Checking` state
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StatusSnapshot::default());
        Self {
            inner: Arc::new(BoardInner {
                tx,
                active: AtomicBool::new(true),
            }),
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner.tx.borrow().clone()
    }

    /// Receiver notified whenever a poll outcome is applied
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.inner.tx.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Stop accepting outcomes. Idempotent.
    pub fn deactivate(&self) {
        self.inner.active.store(false, Ordering::Release);
    }

    /// Apply the outcome of poll `sequence`.
    ///
    /// Returns `false` without touching the snapshot when the board has been
    /// deactivated or when a poll with an equal or higher sequence number was
    /// already applied.
    pub fn apply(&self, sequence: u64, outcome: PollOutcome) -> bool {
        let error = outcome.as_ref().err().map(|e| e.to_string());
        let state = ConnectivityState::from_outcome(outcome);
        let active = &self.inner.active;

        self.inner.tx.send_if_modified(|current| {
            if !active.load(Ordering::Acquire) {
                tracing::debug!(sequence, "Ignoring poll result after teardown");
                return false;
            }
            if sequence <= current.sequence {
                tracing::debug!(
                    sequence,
                    applied = current.sequence,
                    "Ignoring stale poll result"
                );
                return false;
            }

            *current = StatusSnapshot {
                state,
                sequence,
                last_checked: Some(Utc::now()),
                error,
            };
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> HealthPayload {
        HealthPayload::from_value(json!({
            "service": "x",
            "version": "1.0",
            "status": "ok"
        }))
        .unwrap()
    }

    #[test]
    fn test_payload_requires_object() {
        assert!(HealthPayload::from_slice(br#"{"status":"ok"}"#).is_ok());
        assert!(matches!(
            HealthPayload::from_slice(b"[1, 2]"),
            Err(PollError::MalformedBody(_))
        ));
        assert!(matches!(
            HealthPayload::from_slice(b"<html>"),
            Err(PollError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_payload_field_text() {
        let payload =
            HealthPayload::from_value(json!({"service": "api", "version": 2, "status": null}))
                .unwrap();
        assert_eq!(payload.service().as_deref(), Some("api"));
        assert_eq!(payload.version().as_deref(), Some("2"));
        assert_eq!(payload.status(), None);
        assert_eq!(payload.field_text("missing"), None);
    }

    #[test]
    fn test_every_outcome_maps_to_one_state() {
        let cases = vec![
            (Ok(sample_payload()), "connected"),
            (Err(PollError::Status(500)), "error_response"),
            (Err(PollError::Status(404)), "error_response"),
            (Err(PollError::Transport("refused".into())), "unreachable"),
            (Err(PollError::MalformedBody("eof".into())), "unreachable"),
        ];

        for (outcome, expected) in cases {
            let state = ConnectivityState::from_outcome(outcome);
            assert_eq!(state.kind(), expected);
            assert_eq!(state.payload().is_some(), state.is_connected());
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(ConnectivityState::Checking.label(), "Checking...");
        assert_eq!(
            ConnectivityState::Connected(sample_payload()).label(),
            "Connected"
        );
        assert_eq!(
            ConnectivityState::ErrorResponse.label(),
            "Backend responded with error"
        );
        assert_eq!(
            ConnectivityState::Unreachable.label(),
            "Unable to connect to backend"
        );
    }

    #[test]
    fn test_board_starts_checking() {
        let board = StatusBoard::new();
        let snapshot = board.snapshot();
        assert_eq!(snapshot.state, ConnectivityState::Checking);
        assert_eq!(snapshot.sequence, 0);
        assert!(snapshot.last_checked.is_none());
        assert!(board.is_active());
    }

    #[test]
    fn test_board_applies_success_then_error_drops_payload() {
        let board = StatusBoard::new();

        assert!(board.apply(1, Ok(sample_payload())));
        let snapshot = board.snapshot();
        assert_eq!(snapshot.state.payload(), Some(&sample_payload()));
        assert!(snapshot.error.is_none());
        assert!(snapshot.last_checked.is_some());

        assert!(board.apply(2, Err(PollError::Status(500))));
        let snapshot = board.snapshot();
        assert_eq!(snapshot.state, ConnectivityState::ErrorResponse);
        assert!(snapshot.state.payload().is_none());
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Backend responded with status 500")
        );
    }

    #[test]
    fn test_board_rejects_stale_sequence() {
        let board = StatusBoard::new();
        assert!(board.apply(2, Err(PollError::Transport("refused".into()))));

        // An older poll resolving late must not overwrite the newer result
        assert!(!board.apply(1, Ok(sample_payload())));
        assert!(!board.apply(2, Ok(sample_payload())));

        let snapshot = board.snapshot();
        assert_eq!(snapshot.state, ConnectivityState::Unreachable);
        assert_eq!(snapshot.sequence, 2);
    }

    #[test]
    fn test_board_ignores_updates_after_deactivate() {
        let board = StatusBoard::new();
        board.deactivate();
        board.deactivate();

        assert!(!board.apply(1, Ok(sample_payload())));
        assert_eq!(board.snapshot(), StatusSnapshot::default());
    }

    #[tokio::test]
    async fn test_subscribers_see_applied_outcomes() {
        let board = StatusBoard::new();
        let mut rx = board.subscribe();

        board.apply(1, Ok(sample_payload()));
        rx.changed().await.unwrap();
        assert!(rx.borrow().state.is_connected());

        // Rejected outcomes do not notify
        board.apply(1, Err(PollError::Status(500)));
        assert!(!rx.has_changed().unwrap());
    }
}
