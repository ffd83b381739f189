//! Per-attempt reports and the end-of-run summary.

use std::time::Duration;

use super::state::{Phase, StopReason};
use crate::fetch::FetchError;
use crate::store::{StoreError, StoredImage};

/// Why an attempt ended without a new image.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug)]
pub enum AttemptOutcome {
    /// Novel content, durably written.
    Stored(StoredImage),
    /// Content already in the store; carries the existing copy.
    Duplicate(StoredImage),
    Failed(AttemptError),
}

/// Emitted once per attempt, after its outcome is recorded.
#[derive(Debug)]
pub struct AttemptReport {
    /// 1-based attempt number.
    pub attempt: u32,
    /// Successes so far, including this attempt.
    pub successes: u32,
    pub target: u32,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone)]
pub struct CollectionSummary {
    pub phase: Phase,
    pub stop_reason: StopReason,
    pub attempts: u32,
    pub successes: u32,
    pub target: u32,
    /// Images written during this run, in order.
    pub stored: Vec<StoredImage>,
    pub duplicates: u32,
    pub failures: u32,
    pub elapsed: Duration,
}
