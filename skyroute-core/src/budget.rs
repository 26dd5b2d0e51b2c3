//! Wall-clock budget and cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared flag telling a running search to wind down.
///
/// Clones observe the same flag, so a caller can keep one clone and cancel a
/// solve running elsewhere.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Fresh, lowered signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder to stop. Raising is permanent.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the signal has been raised.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Deadline for one solve.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use skyroute_core::SearchBudget;
///
/// let budget = SearchBudget::start(Duration::from_secs(60), None);
/// assert!(!budget.should_stop());
/// budget.signal().raise();
/// assert!(budget.should_stop());
/// ```
#[derive(Debug, Clone)]
pub struct SearchBudget {
    started: Instant,
    limit: Duration,
    signal: StopSignal,
}

impl SearchBudget {
    /// Start the clock now. An external `signal` is shared rather than
    /// replaced.
    #[must_use]
    pub fn start(limit: Duration, signal: Option<StopSignal>) -> Self {
        Self {
            started: Instant::now(),
            limit,
            signal: signal.unwrap_or_default(),
        }
    }

    /// Whether the search must stop.
    ///
    /// Once the limit has elapsed the signal is raised, so every later poll
    /// and every other holder agrees.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        if self.signal.is_raised() {
            return true;
        }
        if self.started.elapsed() > self.limit {
            self.signal.raise();
            return true;
        }
        false
    }

    /// Time spent since [`SearchBudget::start`].
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Configured limit.
    #[must_use]
    pub const fn limit(&self) -> Duration {
        self.limit
    }

    /// Signal shared with the caller.
    #[must_use]
    pub const fn signal(&self) -> &StopSignal {
        &self.signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn expired_budget_raises_signal() {
        let signal = StopSignal::new();
        let budget = SearchBudget::start(Duration::ZERO, Some(signal.clone()));
        std::thread::sleep(Duration::from_millis(2));
        assert!(budget.should_stop());
        assert!(signal.is_raised());
    }

    #[rstest]
    fn external_cancellation_is_observed() {
        let signal = StopSignal::new();
        let budget = SearchBudget::start(Duration::from_secs(3600), Some(signal.clone()));
        assert!(!budget.should_stop());
        signal.raise();
        assert!(budget.should_stop());
    }
}
