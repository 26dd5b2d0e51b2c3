//! `VisibilitySolver` and its configuration.

use skyroute_core::{
    BatteryConfig, CostPolicy, Diagnostics, Instance, SearchBudget, SearchStats, SolveError,
    SolveRequest, SolveResponse, Solver, VisibilityFilter,
};

use crate::search::Search;

/// Configuration for [`VisibilitySolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityConfig {
    /// Battery capacity and base recharge threshold.
    pub battery: BatteryConfig,
    /// Deepest path, in moves, that is still expanded.
    pub max_depth: usize,
    /// Slack applied to the incumbent distance by the optimistic bound.
    pub bound_slack: f64,
    /// Distance assumed per outstanding delivery by the optimistic bound.
    pub per_delivery_estimate: f64,
    /// Recent vertices included in a state fingerprint.
    pub signature_history: usize,
    /// Recent vertices a delivery or hub candidate must not appear among.
    pub loop_history: usize,
    /// Revisits after which a recharge point is no longer a candidate, for
    /// ranked candidates and proactive detours alike.
    pub max_recharge_visits: usize,
    /// Extra path length tolerated beyond twice the delivery count before
    /// slow progress is cut.
    pub stall_slack: usize,
    /// Multiple of the threshold under which a recharge is offered alongside
    /// the best delivery.
    pub recharge_window: f64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            battery: BatteryConfig::default(),
            max_depth: 5000,
            bound_slack: 1.25,
            per_delivery_estimate: 20.0,
            signature_history: 5,
            loop_history: 3,
            max_recharge_visits: 2,
            stall_slack: 10,
            recharge_window: 1.5,
        }
    }
}

/// Deterministic depth-first solver over the visibility graph.
#[derive(Debug, Clone, Default)]
pub struct VisibilitySolver {
    config: VisibilityConfig,
}

impl VisibilitySolver {
    /// Construct a solver using default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(VisibilityConfig::default())
    }

    /// Construct a solver with explicit configuration.
    #[must_use]
    pub const fn with_config(config: VisibilityConfig) -> Self {
        Self { config }
    }

    /// Configuration in force.
    #[must_use]
    pub const fn config(&self) -> &VisibilityConfig {
        &self.config
    }
}

impl Solver for VisibilitySolver {
    fn solve(&self, instance: &Instance, request: &SolveRequest) -> Result<SolveResponse, SolveError> {
        request.validate(&self.config.battery)?;
        let budget = SearchBudget::start(request.time_limit, request.stop.clone());
        let policy = CostPolicy::new(request.strategy, &self.config.battery);
        let visible = VisibilityFilter::build(instance);
        log::debug!(
            "visibility: strategy {}, threshold {:.1}, {} of {} edges visible",
            request.strategy,
            policy.recharge_threshold(),
            visible.edge_count(),
            instance.graph().edge_count()
        );

        let outcome = Search::new(instance, &visible, &self.config, policy, &budget).run();
        let solve_time = budget.elapsed();
        match &outcome.best {
            Some(plan) => log::info!(
                "visibility: value {:.2} after {} nodes in {solve_time:?}",
                plan.value,
                outcome.nodes_explored
            ),
            None => log::warn!(
                "visibility: no valid route after {} nodes in {solve_time:?}",
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

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use skyroute_core::test_support::{
        blocked_delivery_instance, check_plan, exact_battery_instance, plan_ids,
        recharge_detour_instance, single_delivery_instance,
    };
    use skyroute_core::{SolveRequestValidationError, StopSignal, Strategy};
    use std::time::Duration;

    fn request() -> SolveRequest {
        SolveRequest::new(Duration::from_secs(10))
    }

    #[rstest]
    fn single_delivery_is_out_and_back() {
        let instance = single_delivery_instance();
        let response = VisibilitySolver::new()
            .solve(&instance, &request())
            .expect("valid request");
        let plan = response.plan.expect("plan");
        assert_eq!(plan_ids(&instance, &plan), vec!["HUB", "D1", "HUB"]);
        assert!((plan.metrics.risk - 0.2).abs() < 1e-9);
    }

    #[rstest]
    fn blocked_delivery_has_no_plan() {
        let instance = blocked_delivery_instance();
        let response = VisibilitySolver::new()
            .solve(&instance, &request())
            .expect("valid request");
        assert!(response.plan.is_none());
    }

    #[rstest]
    fn exact_battery_needs_no_recharge() {
        let instance = exact_battery_instance();
        let response = VisibilitySolver::new()
            .solve(&instance, &request())
            .expect("valid request");
        let plan = response.plan.expect("plan");
        assert_eq!(plan.metrics.recharges, 0);
    }

    #[rstest]
    #[case(Strategy::Distance)]
    #[case(Strategy::Risk)]
    #[case(Strategy::Balanced)]
    #[case(Strategy::EarlyRecharge)]
    #[case(Strategy::LateRecharge)]
    fn recharge_detour_is_valid_for_every_strategy(#[case] strategy: Strategy) {
        let instance = recharge_detour_instance();
        let solver = VisibilitySolver::new();
        let response = solver
            .solve(&instance, &request().with_strategy(strategy))
            .expect("valid request");
        let plan = response.plan.expect("plan");
        check_plan(&instance, &plan, strategy, &solver.config().battery).expect("valid tour");
        assert_eq!(plan.metrics.recharges, 1);
    }

    #[rstest]
    fn raised_signal_stops_on_first_frame() {
        let signal = StopSignal::new();
        signal.raise();
        let response = VisibilitySolver::new()
            .solve(&single_delivery_instance(), &request().with_stop(signal))
            .expect("valid request");
        assert!(response.plan.is_none());
        assert_eq!(
            response.diagnostics.stats,
            SearchStats::Tree { nodes_explored: 1 }
        );
    }

    #[rstest]
    fn rejects_zero_time_limit() {
        let err = VisibilitySolver::new()
            .solve(
                &single_delivery_instance(),
                &SolveRequest::new(Duration::ZERO),
            )
            .expect_err("zero time limit");
        assert_eq!(
            err,
            SolveError::InvalidRequest(SolveRequestValidationError::ZeroTimeLimit)
        );
    }
}
