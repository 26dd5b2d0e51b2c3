use std::time::Duration;

use thiserror::Error;

use crate::{BatteryConfig, Instance, Route, RouteMetrics, StopSignal, Strategy};

/// Parameters for a solve request.
///
/// The request captures the wall-clock budget, the optimisation profile, a
/// seed for stochastic solvers and an optional cancellation signal.
///
/// # Examples
/// ```rust
/// use std::time::Duration;
/// use skyroute_core::{SolveRequest, Strategy};
///
/// let request = SolveRequest::new(Duration::from_secs(5))
///     .with_strategy(Strategy::Risk)
///     .with_seed(7);
/// assert_eq!(request.strategy, Strategy::Risk);
/// ```
#[derive(Debug, Clone)]
pub struct SolveRequest {
    /// Wall-clock budget for the whole solve.
    pub time_limit: Duration,
    /// Optimisation profile.
    pub strategy: Strategy,
    /// Seed for reproducible stochastic components.
    pub seed: u64,
    /// Shared flag the caller may raise to cancel the solve.
    pub stop: Option<StopSignal>,
}

impl SolveRequest {
    /// Request with the default strategy, seed zero and no external signal.
    #[must_use]
    pub fn new(time_limit: Duration) -> Self {
        Self {
            time_limit,
            strategy: Strategy::default(),
            seed: 0,
            stop: None,
        }
    }

    /// Replace the strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replace the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Attach a cancellation signal.
    #[must_use]
    pub fn with_stop(mut self, stop: StopSignal) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Check the request against the solver's battery configuration.
    ///
    /// # Errors
    /// Returns [`SolveRequestValidationError`] for a zero time limit or an
    /// unusable battery configuration.
    pub fn validate(&self, battery: &BatteryConfig) -> Result<(), SolveRequestValidationError> {
        if self.time_limit.is_zero() {
            return Err(SolveRequestValidationError::ZeroTimeLimit);
        }
        if !battery.capacity.is_finite() || battery.capacity <= 0.0 {
            return Err(SolveRequestValidationError::NonPositiveCapacity {
                capacity: battery.capacity,
            });
        }
        if !(0.0..=battery.capacity).contains(&battery.recharge_threshold) {
            return Err(SolveRequestValidationError::ThresholdOutOfRange {
                threshold: battery.recharge_threshold,
                capacity: battery.capacity,
            });
        }
        Ok(())
    }
}

/// Reasons a [`SolveRequest`] cannot be served.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SolveRequestValidationError {
    /// The time limit was zero.
    #[error("time limit must be positive")]
    ZeroTimeLimit,
    /// The battery capacity was zero, negative or not finite.
    #[error("battery capacity must be positive, got {capacity}")]
    NonPositiveCapacity {
        /// Rejected capacity.
        capacity: f64,
    },
    /// The recharge threshold lies outside `[0, capacity]`.
    #[error("recharge threshold {threshold} must lie between 0 and the capacity {capacity}")]
    ThresholdOutOfRange {
        /// Rejected threshold.
        threshold: f64,
        /// Configured capacity.
        capacity: f64,
    },
}

/// Best tour found together with its totals.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    /// Stops from hub to hub.
    pub route: Route,
    /// Totals along the route.
    pub metrics: RouteMetrics,
    /// Strategy value the solver ranked the route by; lower is better.
    pub value: f64,
}

impl RoutePlan {
    /// Mean risk per flown edge, or zero for a route without legs.
    ///
    /// The divisor is the leg count, one less than the number of stops.
    #[must_use]
    pub fn risk_per_leg(&self) -> f64 {
        match u32::try_from(self.route.legs()) {
            Ok(0) | Err(_) => 0.0,
            Ok(legs) => self.metrics.risk / f64::from(legs),
        }
    }
}

/// Solver-specific search counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchStats {
    /// Counters of the depth-first solvers.
    Tree {
        /// Search frames popped from the work stack.
        nodes_explored: u64,
    },
    /// Counters of the annealing solver.
    Annealing {
        /// Las Vegas attempts started.
        attempts: u32,
        /// Annealing iterations run across all attempts.
        iterations: u64,
        /// Valid neighbours evaluated.
        generated: u64,
        /// Neighbours accepted as the current tour.
        accepted: u64,
        /// Temperature when the last attempt finished.
        final_temperature: f64,
    },
}

/// Instrumentation for a solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    /// Wall-clock time spent solving.
    pub solve_time: Duration,
    /// Search counters.
    pub stats: SearchStats,
}

/// Outcome of a solve; `plan` is `None` when no valid tour was found in time.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResponse {
    /// Best tour found, if any.
    pub plan: Option<RoutePlan>,
    /// Timing and counters.
    pub diagnostics: Diagnostics,
}

/// Errors returned by [`Solver::solve`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SolveError {
    /// Request parameters were invalid, e.g. zero time limit.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] SolveRequestValidationError),
}

/// Alias for the solver error type.
pub type Error = SolveError;

/// Plan a delivery tour over an instance.
///
/// Implementations return [`Error::InvalidRequest`] for unusable parameters
/// and report an infeasible instance as a response without a plan.
/// Solvers must be `Send + Sync` to operate safely across threads.
pub trait Solver: Send + Sync {
    /// Solve a request, producing a response or an error.
    fn solve(&self, instance: &Instance, request: &SolveRequest) -> Result<SolveResponse, Error>;
}
