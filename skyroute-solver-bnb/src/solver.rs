//! `BranchAndBoundSolver` and its configuration.

use skyroute_core::{
    BatteryConfig, CostPolicy, Diagnostics, Instance, SearchBudget, SearchStats, SolveError,
    SolveRequest, SolveResponse, Solver,
};

use crate::search::Search;

/// Configuration for [`BranchAndBoundSolver`].
///
/// The pruning constants are empirical; the defaults reproduce the tuned
/// behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchAndBoundConfig {
    /// Battery capacity and base recharge threshold.
    pub battery: BatteryConfig,
    /// Maximum path depth as a multiple of the number of waypoints.
    pub depth_ratio: f64,
    /// Slack applied to the incumbent distance by the optimistic bound.
    pub bound_slack: f64,
    /// Distance assumed per outstanding delivery by the optimistic bound.
    pub per_delivery_estimate: f64,
    /// Frames popped before the aggressive distance cut engages.
    pub aggressive_after_nodes: u64,
    /// Multiple of the incumbent distance beyond which branches are cut once
    /// the aggressive cut is engaged.
    pub aggressive_factor: f64,
    /// Children expanded per frame.
    pub fan_out: usize,
}

impl Default for BranchAndBoundConfig {
    fn default() -> Self {
        Self {
            battery: BatteryConfig::default(),
            depth_ratio: 1.25,
            bound_slack: 1.3,
            per_delivery_estimate: 25.0,
            aggressive_after_nodes: 10_000,
            aggressive_factor: 1.5,
            fan_out: 3,
        }
    }
}

/// Deterministic depth-first branch-and-bound solver.
#[derive(Debug, Clone, Default)]
pub struct BranchAndBoundSolver {
    config: BranchAndBoundConfig,
}

impl BranchAndBoundSolver {
    /// Construct a solver using default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BranchAndBoundConfig::default())
    }

    /// Construct a solver with explicit configuration.
    #[must_use]
    pub const fn with_config(config: BranchAndBoundConfig) -> Self {
        Self { config }
    }

    /// Configuration in force.
    #[must_use]
    pub const fn config(&self) -> &BranchAndBoundConfig {
        &self.config
    }
}

impl Solver for BranchAndBoundSolver {
    fn solve(&self, instance: &Instance, request: &SolveRequest) -> Result<SolveResponse, SolveError> {
        request.validate(&self.config.battery)?;
        let budget = SearchBudget::start(request.time_limit, request.stop.clone());
        let policy = CostPolicy::new(request.strategy, &self.config.battery);
        log::debug!(
            "branch-and-bound: strategy {}, threshold {:.1}, limit {:?}",
            request.strategy,
            policy.recharge_threshold(),
            request.time_limit
        );

        let outcome = Search::new(instance, &self.config, policy, &budget).run();
        let solve_time = budget.elapsed();
        match &outcome.best {
            Some(plan) => log::info!(
                "branch-and-bound: value {:.2} after {} nodes in {solve_time:?}",
                plan.value,
                outcome.nodes_explored
            ),
            None => log::warn!(
                "branch-and-bound: no valid route after {} nodes in {solve_time:?}",
                outcome.nodes_explored
            ),
        }

        Ok(SolveResponse {
            plan: outcome.best,
            diagnostics: Diagnostics {
                solve_time,
                stats: SearchStats::Tree {
                    nodes_explored: outcome.nodes_explored,
                },
            },
        })
    }
}
