//! Scheduling loop that drives the health probe.
//!
//! The first poll runs as soon as the task starts, then one per interval
//! until the handle is stopped or dropped. Stopping cancels the timer
//! immediately; a probe already in flight is allowed to finish, but the board
//! is deactivated first so its result is discarded. Shutting down also aborts
//! that probe so process exit never waits on the request timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::instrument;

use super::probe::HealthProbe;
use super::state::{PollOutcome, StatusBoard};

/// Periodic poller publishing to a [`StatusBoard`]
pub struct StatusPoller {
    probe: Arc<dyn HealthProbe>,
    interval: Duration,
    board: StatusBoard,
}

impl StatusPoller {
    /// Create a poller; nothing runs until [`StatusPoller::spawn`]
    pub fn new(probe: Arc<dyn HealthProbe>, interval: Duration) -> Self {
        Self {
            probe,
            interval,
            board: StatusBoard::new(),
        }
    }

    pub fn board(&self) -> StatusBoard {
        self.board.clone()
    }

    /// Start the polling task on the current tokio runtime
    pub fn spawn(self) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let board = self.board.clone();
        let task = tokio::spawn(self.run(shutdown_rx));

        PollerHandle {
            board,
            shutdown_tx,
            task: Some(task),
        }
    }

    #[instrument(
        name = "poller",
        skip_all,
        fields(target = %self.probe.target())
    )]
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut sequence: u64 = 0;

        tracing::info!(interval_secs = self.interval.as_secs(), "Poller starting");

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    // Err means the handle was dropped
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            sequence += 1;
            let outcome = self.probe.check().await;
            log_outcome(sequence, &outcome);

            if !self.board.apply(sequence, outcome) && !self.board.is_active() {
                break;
            }
        }

        tracing::debug!(polls = sequence, "Poller stopped");
    }
}

fn log_outcome(sequence: u64, outcome: &PollOutcome) {
    match outcome {
        Ok(payload) => {
            tracing::debug!(
                sequence,
                service = payload.service().as_deref().unwrap_or("-"),
                status = payload.status().as_deref().unwrap_or("-"),
                "Backend healthy"
            );
        }
        Err(e) => {
            tracing::warn!(sequence, kind = e.kind(), error = %e, "Backend health check failed");
        }
    }
}

/// Owner of a running poller. Dropping it stops the poller.
pub struct PollerHandle {
    board: StatusBoard,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn board(&self) -> StatusBoard {
        self.board.clone()
    }

    /// Cancel the schedule and discard any result still in flight.
    ///
    /// Returns immediately; use [`PollerHandle::shutdown`] to also wait for
    /// the task to exit.
    pub fn stop(&self) {
        self.board.deactivate();
        let _ = self.shutdown_tx.send(true);
    }

    /// Stop, abort any probe still in flight and wait for the task to exit
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            task.abort();
            match task.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => {
                    tracing::debug!("Poller aborted with a probe in flight");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Poller task failed");
                }
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map(|t| t.is_finished()).unwrap_or(true)
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::error::PollError;
    use crate::poller::state::ConnectivityState;

    struct CountingProbe {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl HealthProbe for CountingProbe {
        async fn check(&self) -> PollOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(PollError::Status(500))
        }

        fn target(&self) -> &str {
            "counting"
        }
    }

    fn counting_poller(interval: Duration) -> (StatusPoller, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let probe = CountingProbe {
            calls: calls.clone(),
        };
        (StatusPoller::new(Arc::new(probe), interval), calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_immediately_then_every_interval() {
        let (poller, calls) = counting_poller(Duration::from_secs(10));
        let handle = poller.spawn();

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_polls_after_stop() {
        let (poller, calls) = counting_poller(Duration::from_secs(10));
        let handle = poller.spawn();

        tokio::time::sleep(Duration::from_secs(15)).await;
        let board = handle.board();
        handle.shutdown().await;
        let after_stop = calls.load(Ordering::SeqCst);
        assert_eq!(after_stop, 2);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_stop);
        assert_eq!(board.snapshot().state, ConnectivityState::ErrorResponse);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_task() {
        let (poller, calls) = counting_poller(Duration::from_secs(10));
        let board = poller.board();
        let handle = poller.spawn();

        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(handle);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!board.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_polls_keep_schedule() {
        let (poller, calls) = counting_poller(Duration::from_secs(10));
        let handle = poller.spawn();

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(handle.board().snapshot().sequence, 3);
        assert!(!handle.is_finished());

        handle.shutdown().await;
    }
}
