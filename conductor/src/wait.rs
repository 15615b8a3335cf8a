//! Deadline budgets and the cooperative pause used by every polling loop.

use std::time::Duration;
use tokio::time::Instant;

/// A wall-clock budget measured from the moment it is created.
///
/// Nested operations share one `Deadline` instead of taking their own
/// timeouts, so a composed operation never blocks past the budget its
/// caller handed it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    pub(crate) fn new(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    /// Time left before the budget runs out; zero once it has.
    pub(crate) fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.start.elapsed())
    }

    pub(crate) fn expired(&self) -> bool {
        self.remaining().is_zero()
    }

    pub(crate) fn budget(&self) -> Duration {
        self.budget
    }
}

/// Suspend the current operation between poll attempts.
pub(crate) async fn pause(interval: Duration) {
    tokio::time::sleep(interval).await;
}
