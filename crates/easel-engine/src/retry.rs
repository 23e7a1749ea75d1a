//! Bounded validation retry state machine.
//!
//! Both orchestrators drive the same loop shape: produce an artifact,
//! optionally validate it, regenerate on a failing verdict while
//! attempts remain. The machine makes attempt counting and termination
//! explicit instead of burying them in loop conditions: every transition
//! is a named method, so the bound (`max_validation_retries + 1`
//! attempts) and the terminal states are directly unit-testable.
//!
//! A `ServiceError` during production is not fed into the machine at
//! all; it aborts the orchestration. Only judge verdicts move the
//! machine past `Validating`.

use easel_utils::types::{ValidationRecord, Verdict};

/// Position of one orchestration call within its produce/validate loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// Ready to produce (initially, or again after a failed verdict).
    Init,
    /// The external call succeeded and its artifact is persisted.
    Produced,
    /// A judge call is in progress for the current artifact.
    Validating,
    /// Terminal: the artifact was accepted (or validation was never
    /// requested).
    PassAccepted,
    /// Transient: the verdict was `fail` with attempts remaining; the
    /// machine passes through this state back to [`AttemptState::Init`].
    FailRetry,
    /// Terminal: the verdict was `fail` and the attempt budget is spent.
    /// The last artifact is still returned to the caller as a normal
    /// result.
    FailExhausted,
}

impl AttemptState {
    /// True for the states the loop stops in.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::PassAccepted | Self::FailExhausted)
    }
}

/// Retry bookkeeping scoped to one orchestration call, never persisted.
#[derive(Debug, Clone)]
pub struct RetryState {
    state: AttemptState,
    attempts_made: u32,
    max_attempts: u32,
    last_validation: Option<ValidationRecord>,
}

impl RetryState {
    /// A fresh machine allowing `max_validation_retries` regenerations
    /// after the first attempt.
    #[must_use]
    pub fn new(max_validation_retries: u32) -> Self {
        Self {
            state: AttemptState::Init,
            attempts_made: 0,
            max_attempts: max_validation_retries.saturating_add(1),
            last_validation: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Attempts whose production call has succeeded so far. After
    /// [`produced`](Self::produced) this is the 1-based number of the
    /// current attempt, which is what [`ValidationRecord::attempt`]
    /// carries.
    #[must_use]
    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The most recent verdict fed into the machine, if any.
    #[must_use]
    pub fn last_validation(&self) -> Option<&ValidationRecord> {
        self.last_validation.as_ref()
    }

    /// `Init → Produced`: the external production call succeeded and the
    /// artifact is persisted. Counts one attempt.
    pub fn produced(&mut self) {
        debug_assert_eq!(self.state, AttemptState::Init, "produced() outside Init");
        self.attempts_made += 1;
        self.state = AttemptState::Produced;
    }

    /// `Produced → PassAccepted`: validation was not requested, the
    /// first artifact stands.
    pub fn skip_validation(&mut self) {
        debug_assert_eq!(
            self.state,
            AttemptState::Produced,
            "skip_validation() outside Produced"
        );
        self.state = AttemptState::PassAccepted;
    }

    /// `Produced → Validating`: a judge call is about to run.
    pub fn begin_validation(&mut self) {
        debug_assert_eq!(
            self.state,
            AttemptState::Produced,
            "begin_validation() outside Produced"
        );
        self.state = AttemptState::Validating;
    }

    /// Feed a judge verdict into the machine and return the observed
    /// transition target.
    ///
    /// `pass` lands in [`AttemptState::PassAccepted`]. `fail` lands in
    /// [`AttemptState::FailRetry`] while attempts remain (the machine
    /// itself rests in `Init`, ready for the next production call) and
    /// in [`AttemptState::FailExhausted`] once the budget is spent.
    #[must_use]
    pub fn record_verdict(&mut self, record: ValidationRecord) -> AttemptState {
        debug_assert_eq!(
            self.state,
            AttemptState::Validating,
            "record_verdict() outside Validating"
        );
        let observed = match record.verdict {
            Verdict::Pass => AttemptState::PassAccepted,
            Verdict::Fail if self.attempts_made < self.max_attempts => AttemptState::FailRetry,
            Verdict::Fail => AttemptState::FailExhausted,
        };
        self.last_validation = Some(record);
        // FailRetry is pass-through: the resting state is Init so the
        // next produced() is legal.
        self.state = if observed == AttemptState::FailRetry {
            AttemptState::Init
        } else {
            observed
        };
        observed
    }
}
