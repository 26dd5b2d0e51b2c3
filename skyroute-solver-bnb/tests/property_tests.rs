//! Property-based tests for the branch-and-bound solver.
//!
//! # Invariants tested
//!
//! - **Tour validity:** every returned route starts and ends at the hub,
//!   visits each delivery once, never crosses a zone and never runs the
//!   battery below zero.
//! - **Metric agreement:** reported metrics match an independent replay.
//! - **Determinism:** repeated solves return the same plan.
#![expect(
    clippy::expect_used,
    reason = "property tests use expect for readable failures"
)]

mod proptest_support;

use std::time::Duration;

use proptest::prelude::*;
use skyroute_core::{CostPolicy, RouteSimulator, SolveRequest, Solver, Strategy};
use skyroute_solver_bnb::BranchAndBoundSolver;

use proptest_support::layout_strategy;

fn strategy_tag() -> impl proptest::strategy::Strategy<Value = Strategy> {
    proptest::sample::select(Strategy::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: any returned plan replays as a valid tour with the same
    /// metrics.
    #[test]
    fn returned_plans_are_valid_tours(layout in layout_strategy(5, 2), strategy in strategy_tag()) {
        let instance = layout.build();
        let solver = BranchAndBoundSolver::new();
        let request = SolveRequest::new(Duration::from_secs(5)).with_strategy(strategy);
        let response = solver.solve(&instance, &request).expect("valid request");

        if let Some(plan) = response.plan {
            let policy = CostPolicy::new(strategy, &solver.config().battery);
            let replayed = RouteSimulator::new(&instance, policy)
                .simulate(plan.route.stops())
                .map_err(|violation| TestCaseError::fail(format!("invalid tour: {violation}")))?;
            prop_assert!((replayed.distance - plan.metrics.distance).abs() < 1e-6);
            prop_assert_eq!(replayed.recharges, plan.metrics.recharges);
        }
    }

    /// Property: two solves of the same instance agree.
    #[test]
    fn solving_is_deterministic(layout in layout_strategy(4, 1)) {
        let instance = layout.build();
        let solver = BranchAndBoundSolver::new();
        let request = SolveRequest::new(Duration::from_secs(5));
        let first = solver.solve(&instance, &request).expect("valid request");
        let second = solver.solve(&instance, &request).expect("valid request");
        prop_assert_eq!(first.plan, second.plan);
    }
}
