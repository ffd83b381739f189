//! Run counters and the termination rule.

/// Loop phase. Only `Running` has further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Succeeded,
    GaveUp,
}

/// Why a run left `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `successes == target`.
    TargetReached,
    /// `attempts > target * give_up_factor`: the source is likely out of novel content.
    AttemptsExhausted,
    /// A stop was requested between or during attempts.
    Interrupted,
}

impl StopReason {
    pub fn phase(self) -> Phase {
        match self {
            StopReason::TargetReached => Phase::Succeeded,
            StopReason::AttemptsExhausted | StopReason::Interrupted => Phase::GaveUp,
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionState {
    pub attempts: u32,
    pub successes: u32,
    pub target: u32,
    /// Give-up ceiling; the run stops once `attempts` exceeds it.
    pub max_attempts: u32,
}

impl CollectionState {
    pub fn new(target: u32, give_up_factor: u32) -> Self {
        Self {
            attempts: 0,
            successes: 0,
            target,
            // A zero factor would end every run after its first attempt.
            max_attempts: target.saturating_mul(give_up_factor.max(1)),
        }
    }

    /// Termination check after an attempt has been fully recorded.
    pub fn check(&self) -> Option<StopReason> {
        if self.successes >= self.target {
            Some(StopReason::TargetReached)
        } else if self.attempts > self.max_attempts {
            Some(StopReason::AttemptsExhausted)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceiling_is_target_times_factor() {
        let s = CollectionState::new(5, 3);
        assert_eq!(s.max_attempts, 15);
        assert_eq!(s.check(), None);
    }

    #[test]
    fn zero_target_is_already_done() {
        assert_eq!(
            CollectionState::new(0, 3).check(),
            Some(StopReason::TargetReached)
        );
    }

    #[test]
    fn gives_up_only_past_the_ceiling() {
        let mut s = CollectionState::new(5, 3);
        s.attempts = 15;
        s.successes = 1;
        assert_eq!(s.check(), None);
        s.attempts = 16;
        assert_eq!(s.check(), Some(StopReason::AttemptsExhausted));
    }

    #[test]
    fn zero_factor_allows_target_attempts() {
        let mut s = CollectionState::new(3, 0);
        assert_eq!(s.max_attempts, 3);
        s.attempts = 1;
        s.successes = 1;
        assert_eq!(s.check(), None);
        s.attempts = 4;
        assert_eq!(s.check(), Some(StopReason::AttemptsExhausted));
    }

    #[test]
    fn success_wins_over_ceiling() {
        let mut s = CollectionState::new(2, 3);
        s.attempts = 7;
        s.successes = 2;
        assert_eq!(s.check(), Some(StopReason::TargetReached));
        assert_eq!(StopReason::TargetReached.phase(), Phase::Succeeded);
        assert_eq!(StopReason::Interrupted.phase(), Phase::GaveUp);
    }
}
