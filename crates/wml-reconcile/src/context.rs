//! Per-run reconciliation state (spec.md §5).
//!
//! The spec's revision-identifier counter is described as "a module-level
//! monotonically increasing counter" with "a reset hook for deterministic
//! tests" (§5) and the Numbering Service as holding "process-local mutable
//! state for the current reconciliation run only" (§5) — both are textbook
//! symptoms of state that should be owned by the caller, not by the module.
//! [`ReconcileContext`] is that explicit owner: one value, constructed per
//! call, threaded through ingestion, splitting, and serialization, so two
//! concurrent reconciliation runs never share a counter or a clock.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};

/// Cooperative yield checkpoint policy (spec.md §5: "Long operations yield
/// cooperatively to the host's event loop when either the run count or the
/// character count exceeds configurable thresholds").
pub trait YieldPolicy: Send + Sync {
    /// Called at the current run/char counters reached during a walk;
    /// returns `true` when the caller should yield at this point.
    fn should_yield(&self, runs_seen: usize, chars_seen: usize) -> bool;
}

/// Default thresholds from spec.md §5: `runs > 50` or `chars > 5000`.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdYieldPolicy {
    pub run_threshold: usize,
    pub char_threshold: usize,
}

impl Default for ThresholdYieldPolicy {
    fn default() -> Self {
        Self { run_threshold: 50, char_threshold: 5000 }
    }
}

impl YieldPolicy for ThresholdYieldPolicy {
    fn should_yield(&self, runs_seen: usize, chars_seen: usize) -> bool {
        runs_seen > self.run_threshold || chars_seen > self.char_threshold
    }
}

/// A policy that never requests a yield, for tests and small fragments.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverYield;

impl YieldPolicy for NeverYield {
    fn should_yield(&self, _runs_seen: usize, _chars_seen: usize) -> bool {
        false
    }
}

/// Explicit, per-run mutable state threaded through the pipeline: the
/// monotonically increasing revision-id counter (spec.md §5), the injected
/// clock (spec.md §4.5), the configured author, and the yield policy.
pub struct ReconcileContext {
    next_revision_id: u32,
    author: String,
    clock: Arc<dyn Clock>,
    yield_policy: Arc<dyn YieldPolicy>,
    runs_seen: usize,
    chars_seen: usize,
}

impl ReconcileContext {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            next_revision_id: 1,
            author: author.into(),
            clock: Arc::new(SystemClock),
            yield_policy: Arc::new(ThresholdYieldPolicy::default()),
            runs_seen: 0,
            chars_seen: 0,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_yield_policy(mut self, policy: Arc<dyn YieldPolicy>) -> Self {
        self.yield_policy = policy;
        self
    }

    pub fn with_starting_revision_id(mut self, start: u32) -> Self {
        self.next_revision_id = start;
        self
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Allocate the next revision id and advance the counter.
    pub fn next_revision_id(&mut self) -> u32 {
        let id = self.next_revision_id;
        self.next_revision_id += 1;
        id
    }

    /// Reset the counter back to 1 (spec.md §5's "reset hook for
    /// deterministic tests").
    pub fn reset_revision_counter(&mut self) {
        self.next_revision_id = 1;
    }

    pub fn now_rfc3339(&self) -> String {
        self.clock.now().to_rfc3339()
    }

    /// Record progress through a walk and report whether a cooperative
    /// yield checkpoint has been reached.
    pub fn record_progress(&mut self, runs: usize, chars: usize) -> bool {
        self.runs_seen += runs;
        self.chars_seen += chars;
        self.yield_policy.should_yield(self.runs_seen, self.chars_seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_ids_increase_monotonically() {
        let mut ctx = ReconcileContext::new("reviewer");
        assert_eq!(ctx.next_revision_id(), 1);
        assert_eq!(ctx.next_revision_id(), 2);
        assert_eq!(ctx.next_revision_id(), 3);
    }

    #[test]
    fn reset_hook_restarts_counter() {
        let mut ctx = ReconcileContext::new("reviewer");
        ctx.next_revision_id();
        ctx.next_revision_id();
        ctx.reset_revision_counter();
        assert_eq!(ctx.next_revision_id(), 1);
    }

    #[test]
    fn threshold_policy_yields_past_run_count() {
        let policy = ThresholdYieldPolicy::default();
        assert!(!policy.should_yield(10, 10));
        assert!(policy.should_yield(51, 0));
        assert!(policy.should_yield(0, 5001));
    }

    #[test]
    fn context_tracks_progress_across_calls() {
        let mut ctx = ReconcileContext::new("reviewer").with_yield_policy(Arc::new(ThresholdYieldPolicy::default()));
        assert!(!ctx.record_progress(20, 2000));
        assert!(ctx.record_progress(40, 4000));
    }
}
