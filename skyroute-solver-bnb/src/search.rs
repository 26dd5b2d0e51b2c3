//! Explicit-stack depth-first search with bound-based pruning.

use skyroute_core::{
    CostPolicy, Instance, Route, RouteMetrics, RoutePlan, SafetyCache, SearchBudget, SearchState,
};

use crate::BranchAndBoundConfig;

/// Result of one search run.
pub(crate) struct Outcome {
    pub(crate) best: Option<RoutePlan>,
    pub(crate) nodes_explored: u64,
}

/// Mutable context of one solve: incumbent, counters and safety cache.
pub(crate) struct Search<'a> {
    instance: &'a Instance,
    config: &'a BranchAndBoundConfig,
    policy: CostPolicy,
    budget: &'a SearchBudget,
    cache: SafetyCache,
    best: Option<RoutePlan>,
    nodes_explored: u64,
}

#[expect(
    clippy::cast_precision_loss,
    reason = "waypoint and delivery counts stay far below 2^52"
)]
const fn as_f64(count: usize) -> f64 {
    count as f64
}

impl<'a> Search<'a> {
    pub(crate) fn new(
        instance: &'a Instance,
        config: &'a BranchAndBoundConfig,
        policy: CostPolicy,
        budget: &'a SearchBudget,
    ) -> Self {
        Self {
            instance,
            config,
            policy,
            budget,
            cache: SafetyCache::new(),
            best: None,
            nodes_explored: 0,
        }
    }

    pub(crate) fn run(mut self) -> Outcome {
        let depth_cap = as_f64(self.instance.point_count()) * self.config.depth_ratio;
        let mut stack = vec![SearchState::start(self.instance, &self.policy)];

        while let Some(state) = stack.pop() {
            self.nodes_explored += 1;
            if self.budget.should_stop() {
                break;
            }
            if as_f64(state.depth) > depth_cap || self.aggressively_pruned(&state) {
                continue;
            }
            if state.delivered.is_complete() {
                self.try_close(&state);
                continue;
            }
            // Reverse so the best-ranked child is popped first.
            stack.extend(self.expand(&state).into_iter().rev());
        }

        Outcome {
            best: self.best,
            nodes_explored: self.nodes_explored,
        }
    }

    fn aggressively_pruned(&self, state: &SearchState) -> bool {
        self.best.as_ref().is_some_and(|best| {
            self.nodes_explored > self.config.aggressive_after_nodes
                && state.distance > self.config.aggressive_factor * best.metrics.distance
        })
    }

    fn exceeds_bound(&self, state: &SearchState, edge_distance: f64) -> bool {
        self.best.as_ref().is_some_and(|best| {
            let optimistic = state.distance
                + edge_distance
                + self.config.per_delivery_estimate * as_f64(state.delivered.remaining());
            optimistic > self.config.bound_slack * best.metrics.distance
        })
    }

    /// Ranked, truncated children of `state`.
    fn expand(&mut self, state: &SearchState) -> Vec<SearchState> {
        let instance = self.instance;
        let hub = instance.hub();
        let mut ranked: Vec<(f64, SearchState)> = Vec::new();

        for (next, weight) in instance.graph().neighbours(state.current()) {
            let next = *next;
            if next == hub || state.has_delivered(instance, next) {
                continue;
            }
            if state.battery - weight.consumption < 0.0 {
                continue;
            }
            if !self.cache.is_safe(instance, state.trail.iter(), next) {
                continue;
            }
            if self.exceeds_bound(state, weight.distance) {
                continue;
            }
            let kind = state.candidate_kind(instance, next);
            let priority = self.policy.edge_priority(weight, state.battery, kind);
            if let Some(child) = state.advance(instance, next, weight, &self.policy) {
                ranked.push((priority, child));
            }
        }

        ranked.sort_by(|(lhs, _), (rhs, _)| lhs.total_cmp(rhs));
        ranked.truncate(self.config.fan_out);
        ranked.into_iter().map(|(_, child)| child).collect()
    }

    /// Close the tour at the hub and keep it if strictly better.
    fn try_close(&mut self, state: &SearchState) {
        let instance = self.instance;
        let hub = instance.hub();
        let current = state.current();
        let Some(weight) = instance.graph().edge(current, hub) else {
            return;
        };
        if !self.cache.is_safe(instance, [current], hub) {
            return;
        }
        let Some(closed) = state.advance(instance, hub, weight, &self.policy) else {
            return;
        };
        let value = self.policy.terminal_value(closed.distance, closed.risk);
        if self.best.as_ref().is_some_and(|best| value >= best.value) {
            return;
        }
        log::debug!(
            "branch-and-bound: incumbent value {value:.2} at node {}",
            self.nodes_explored
        );
        self.best = Some(RoutePlan {
            route: Route::new(closed.trail.to_vec()),
            metrics: RouteMetrics::from(&closed),
            value,
        });
    }
}
