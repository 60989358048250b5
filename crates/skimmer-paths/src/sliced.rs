//! Time-sliced A* with run-token cancellation.
//!
//! The sliced search runs the same algorithm as [`astar_path`], but the main
//! loop executes in bounded time increments, handing control back to the
//! host between slices. Cancellation is implicit: each search captures a
//! [`RunToken`] at construction, and a [`TokenSource`] issues a fresh
//! generation for every new planning run, so an in-flight search observes a
//! stale token on its next slice and abandons the work silently.
//!
//! [`astar_path`]: crate::astar_path

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use skimmer_core::PortalId;

use crate::astar::{Advance, SearchCore};
use crate::hop::HopModel;

/// Default per-slice time budget, roughly one display frame.
pub const DEFAULT_SLICE_BUDGET: Duration = Duration::from_millis(16);

/// How many open-set expansions happen between deadline checks.
const BUDGET_CHECK_INTERVAL: u32 = 64;

// ---------------------------------------------------------------------------
// TokenSource / RunToken
// ---------------------------------------------------------------------------

/// Issues monotonically increasing run generations.
///
/// One source lives per planner; starting any new plan issues a new token,
/// which implicitly invalidates every token issued before it.
#[derive(Clone, Debug, Default)]
pub struct TokenSource {
    counter: Arc<AtomicU64>,
}

impl TokenSource {
    /// Create a source with no generations issued yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation and return its token.
    pub fn issue(&self) -> RunToken {
        let value = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        RunToken {
            counter: Arc::clone(&self.counter),
            value,
        }
    }
}

/// A captured run generation.
#[derive(Clone, Debug)]
pub struct RunToken {
    counter: Arc<AtomicU64>,
    value: u64,
}

impl RunToken {
    /// Whether this token still names the latest generation. Once false,
    /// it can never become true again.
    #[inline]
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::Relaxed) == self.value
    }
}

// ---------------------------------------------------------------------------
// SlicedAstar
// ---------------------------------------------------------------------------

/// Outcome of one [`SlicedAstar::step`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStep {
    /// Budget exhausted; call `step` again to continue.
    InProgress,
    /// A newer run generation exists; the search is abandoned. Terminal.
    Cancelled,
    /// Search finished. An empty path means the goal is unreachable.
    /// Terminal.
    Done(Vec<PortalId>),
}

/// A resumable A* run.
///
/// Holds the full open-set/score state between slices; the caller drives it
/// by calling [`step`] from its idle or timer scheduler until a terminal
/// result comes back. Suspension happens only at the top of the main loop,
/// never mid-relaxation.
///
/// [`step`]: SlicedAstar::step
pub struct SlicedAstar {
    core: SearchCore,
    token: RunToken,
    outcome: Option<SearchStep>,
}

impl SlicedAstar {
    /// Set up a search from `start` to `goal`, bound to `token`'s
    /// generation.
    pub fn new(model: &HopModel<'_>, start: &PortalId, goal: &PortalId, token: RunToken) -> Self {
        let outcome = if !model.graph().contains(start) || !model.graph().contains(goal) {
            Some(SearchStep::Done(Vec::new()))
        } else {
            None
        };
        Self {
            core: SearchCore::new(model, start, goal),
            token,
            outcome,
        }
    }

    /// Run the search for at most `budget`, then yield.
    ///
    /// Checks the run token before doing any work: a stale token makes the
    /// search return [`SearchStep::Cancelled`] forever after, without
    /// touching the search state. Terminal results are sticky — repeated
    /// calls return the same outcome.
    pub fn step(&mut self, model: &HopModel<'_>, budget: Duration) -> SearchStep {
        if !self.token.is_current() {
            self.outcome = Some(SearchStep::Cancelled);
        }
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }

        let deadline = Instant::now() + budget;
        let mut since_check = 0u32;
        loop {
            match self.core.advance(model) {
                Advance::Working => {}
                Advance::Found => {
                    let done = SearchStep::Done(self.core.path());
                    self.outcome = Some(done.clone());
                    return done;
                }
                Advance::Exhausted => {
                    let done = SearchStep::Done(Vec::new());
                    self.outcome = Some(done.clone());
                    return done;
                }
            }
            since_check += 1;
            if since_check >= BUDGET_CHECK_INTERVAL {
                since_check = 0;
                if Instant::now() >= deadline {
                    return SearchStep::InProgress;
                }
            }
        }
    }
}
