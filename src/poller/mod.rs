//! Backend connectivity polling.
//!
//! A single background task probes the backend health endpoint on a fixed
//! interval and publishes the outcome to a [`StatusBoard`] that handlers read
//! from. The pieces:
//!
//! - [`HealthProbe`]: one poll, returning the parsed payload or a [`PollError`]
//! - [`StatusBoard`]: the latest [`StatusSnapshot`], guarded against stale and
//!   post-teardown updates
//! - [`StatusPoller`] / [`PollerHandle`]: the scheduling loop and its teardown
//!
//! Overlap policy: polls are serialised. The loop awaits each probe before
//! waiting for the next tick and missed ticks are skipped, so at most one
//! request is in flight. Sequence numbers on the board reject stale results
//! regardless.
//!
//! [`PollError`]: crate::error::PollError

mod probe;
mod state;
mod worker;

pub use probe::{HealthProbe, HttpHealthProbe};
pub use state::{ConnectivityState, HealthPayload, PollOutcome, StatusBoard, StatusSnapshot};
pub use worker::{PollerHandle, StatusPoller};
