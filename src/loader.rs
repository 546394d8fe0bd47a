//! The convergence engine: repeatedly trigger more feed content, measure
//! growth, and stop when the target is met or the feed stops producing.
//!
//! The decision step is pure and owns all loader state; the async driver
//! only wires it to the capability primitives.

use crate::automation::Automation;
use crate::config::SettleTimes;
use crate::diagnostics::{report, ProgressFn};
use crate::error::Result;

/// Consecutive no-growth measurements before the feed is declared exhausted.
pub const STALL_LIMIT: u32 = 15;

/// How the loader terminated. Both are legitimate outcomes; stall-limit
/// exhaustion is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderOutcome {
    /// The measured count reached the bounded target.
    TargetMet,
    /// The feed stopped growing for the full stall allowance.
    Stalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderReport {
    pub final_count: u64,
    pub outcome: LoaderOutcome,
    /// Number of measurements taken.
    pub iterations: u32,
}

/// Private loader state; mutated only by [`LoaderState::observe`].
#[derive(Debug, Default)]
struct LoaderState {
    last_observed: Option<u64>,
    consecutive_stalls: u32,
}

impl LoaderState {
    /// Fold one measurement into the state. No growth since the previous
    /// measurement counts as a stall; any growth resets the stall run.
    fn observe(&mut self, count: u64) {
        if self.last_observed == Some(count) {
            self.consecutive_stalls += 1;
        } else {
            self.last_observed = Some(count);
            self.consecutive_stalls = 0;
        }
    }

    /// Termination check after a measurement. `target == 0` means unbounded:
    /// only the stall path terminates.
    fn decide(&self, count: u64, target: u64, stall_limit: u32) -> Option<LoaderOutcome> {
        if target > 0 && count >= target {
            return Some(LoaderOutcome::TargetMet);
        }
        if self.consecutive_stalls >= stall_limit {
            return Some(LoaderOutcome::Stalled);
        }
        None
    }
}

/// Grow the rendered feed until convergence. Each iteration measures the
/// feed, then (absent termination) scrolls to the bottom and waits out the
/// settle interval so asynchronous content injection can land.
pub async fn run<A: Automation + ?Sized>(
    automation: &A,
    feed_item_query: &str,
    target: u64,
    settle: &SettleTimes,
    stall_limit: u32,
    progress: &Option<ProgressFn>,
) -> Result<LoaderReport> {
    let mut state = LoaderState::default();
    let mut iterations = 0u32;

    loop {
        let count = automation.evaluate_count(feed_item_query).await?;
        iterations += 1;
        let grew = state.last_observed != Some(count);
        state.observe(count);
        if grew {
            report(progress, &format!("items scraped: {}", count));
        } else {
            report(
                progress,
                &format!("trying to load more (#{})", state.consecutive_stalls),
            );
        }

        if let Some(outcome) = state.decide(count, target, stall_limit) {
            return Ok(LoaderReport {
                final_count: count,
                outcome,
                iterations,
            });
        }

        automation.scroll_to_bottom().await?;
        automation.wait(settle.after_load).await;
    }
}
