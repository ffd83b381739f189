//! Fetch → dedup → persist loop with bounded-retry termination.
//!
//! Attempts are strictly sequential: attempt N+1 starts only after attempt N's
//! outcome (including its file write) is recorded. Between attempts the loop
//! idles on the `StopSignal`, so a stop request ends the run promptly.
//! Runs on the calling thread; call from `spawn_blocking` if used from async code.

mod report;
mod state;

pub use report::{AttemptError, AttemptOutcome, AttemptReport, CollectionSummary};
pub use state::{CollectionState, Phase, StopReason};

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::control::StopSignal;
use crate::fetch::Fetch;
use crate::fingerprint::Fingerprint;
use crate::store::ContentStore;

/// Default number of unique images to collect.
pub const DEFAULT_TARGET: u32 = 20;
/// Default give-up factor: stop after more than `target * 3` attempts.
pub const DEFAULT_GIVE_UP_FACTOR: u32 = 3;

#[derive(Debug, Clone)]
pub struct CollectSettings {
    pub target: u32,
    /// Idle time between attempts.
    pub delay: Duration,
    pub give_up_factor: u32,
}

impl Default for CollectSettings {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
            delay: Duration::from_secs(2),
            give_up_factor: DEFAULT_GIVE_UP_FACTOR,
        }
    }
}

pub struct CollectionLoop {
    endpoint: String,
    settings: CollectSettings,
    stop: Arc<StopSignal>,
    progress_tx: Option<tokio::sync::mpsc::UnboundedSender<AttemptReport>>,
}

impl CollectionLoop {
    pub fn new(endpoint: impl Into<String>, settings: CollectSettings) -> Self {
        Self {
            endpoint: endpoint.into(),
            settings,
            stop: Arc::new(StopSignal::new()),
            progress_tx: None,
        }
    }

    /// Use a shared stop signal (e.g. one wired to Ctrl-C).
    pub fn with_stop(mut self, stop: Arc<StopSignal>) -> Self {
        self.stop = stop;
        self
    }

    /// Send an `AttemptReport` after every attempt.
    pub fn with_progress(mut self, tx: tokio::sync::mpsc::UnboundedSender<AttemptReport>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn stop_signal(&self) -> Arc<StopSignal> {
        Arc::clone(&self.stop)
    }

    /// Run until the target is reached, the attempt ceiling is passed, or a stop is requested.
    pub fn run<F: Fetch + ?Sized>(&self, fetcher: &mut F, store: &mut ContentStore) -> CollectionSummary {
        let started = Instant::now();
        let mut state = CollectionState::new(self.settings.target, self.settings.give_up_factor);
        let mut stored = Vec::new();
        let mut duplicates = 0u32;
        let mut failures = 0u32;

        tracing::info!(
            endpoint = %self.endpoint,
            target = state.target,
            max_attempts = state.max_attempts,
            store = %store.root().display(),
            "collection started"
        );

        let reason = 'run: {
            // A zero target is met before any attempt.
            if let Some(reason) = state.check() {
                break 'run reason;
            }
            loop {
                if self.stop.is_stopped() {
                    break StopReason::Interrupted;
                }

                state.attempts += 1;
                let outcome = self.attempt(fetcher, store);
                match &outcome {
                    AttemptOutcome::Stored(image) => {
                        state.successes += 1;
                        tracing::info!(
                            attempt = state.attempts,
                            path = %image.path.display(),
                            bytes = image.len,
                            "stored {}/{}",
                            state.successes,
                            state.target
                        );
                        stored.push(image.clone());
                    }
                    AttemptOutcome::Duplicate(existing) => {
                        duplicates += 1;
                        tracing::info!(
                            attempt = state.attempts,
                            existing = %existing.path.display(),
                            "duplicate content, skipped"
                        );
                    }
                    AttemptOutcome::Failed(e) => {
                        failures += 1;
                        tracing::warn!(attempt = state.attempts, "attempt failed: {:#}", e);
                    }
                }
                if let Some(tx) = &self.progress_tx {
                    let _ = tx.send(AttemptReport {
                        attempt: state.attempts,
                        successes: state.successes,
                        target: state.target,
                        outcome,
                    });
                }

                if let Some(reason) = state.check() {
                    break reason;
                }
                if self.stop.wait(self.settings.delay) {
                    break StopReason::Interrupted;
                }
            }
        };

        let summary = CollectionSummary {
            phase: reason.phase(),
            stop_reason: reason,
            attempts: state.attempts,
            successes: state.successes,
            target: state.target,
            stored,
            duplicates,
            failures,
            elapsed: started.elapsed(),
        };
        match reason {
            StopReason::TargetReached => tracing::info!(
                attempts = summary.attempts,
                "collection succeeded: {} image(s)",
                summary.successes
            ),
            StopReason::AttemptsExhausted => tracing::warn!(
                attempts = summary.attempts,
                successes = summary.successes,
                "too many attempts, source likely exhausted of novel content"
            ),
            StopReason::Interrupted => tracing::info!(
                attempts = summary.attempts,
                successes = summary.successes,
                "collection interrupted"
            ),
        }
        summary
    }

    /// One fetch-validate-dedup-store cycle.
    fn attempt<F: Fetch + ?Sized>(&self, fetcher: &mut F, store: &mut ContentStore) -> AttemptOutcome {
        let payload = match fetcher.fetch(&self.endpoint) {
            Ok(p) => p,
            Err(e) => return AttemptOutcome::Failed(e.into()),
        };
        let fingerprint = Fingerprint::of(&payload.bytes);
        if let Some(existing) = store.get(&fingerprint) {
            return AttemptOutcome::Duplicate(existing.clone());
        }
        match store.put(&payload.bytes, payload.format) {
            Ok(image) => AttemptOutcome::Stored(image),
            Err(e) => AttemptOutcome::Failed(e.into()),
        }
    }
}
