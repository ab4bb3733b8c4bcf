//! Shared best-solution cell.
//!
//! Workers read the score with a relaxed atomic load for the pruning bound
//! (a slightly stale value only makes pruning less aggressive, never wrong)
//! and funnel writes through a mutex with a second improvement check under
//! the lock. Ties never replace the incumbent.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::Solution;

pub(crate) struct SharedBest {
    score_bits: AtomicU64,
    slot: Mutex<Solution>,
}

impl SharedBest {
    pub(crate) fn new() -> Self {
        Self {
            score_bits: AtomicU64::new(f64::NEG_INFINITY.to_bits()),
            slot: Mutex::new(Solution::none()),
        }
    }

    /// Current best score. May lag a concurrent writer by one update.
    pub(crate) fn score(&self) -> f64 {
        f64::from_bits(self.score_bits.load(Ordering::Relaxed))
    }

    /// Installs a candidate if it strictly improves the best.
    ///
    /// `solution` is only materialized after the improvement is re-confirmed
    /// under the lock, so losing branches never pay for cloning mappings.
    pub(crate) fn offer(&self, score: f64, solution: impl FnOnce() -> Solution) -> bool {
        if score <= self.score() {
            return false;
        }
        let mut slot = self.slot.lock().unwrap();
        if score <= slot.score {
            return false;
        }
        *slot = solution();
        self.score_bits.store(score.to_bits(), Ordering::Relaxed);
        true
    }

    /// Final synchronized result, once all workers have completed.
    pub(crate) fn into_solution(self) -> Solution {
        self.slot.into_inner().unwrap()
    }
}
