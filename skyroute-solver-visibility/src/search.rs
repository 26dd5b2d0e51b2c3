//! Depth-first search over the visibility graph with state fingerprinting.
//!
//! Work is kept on an explicit stack of [`Frame`]s. Entering a state applies
//! the cheap cuts and may schedule a proactive recharge flight; the ranked
//! expansion of the same state is queued underneath so it only runs once
//! that flight has been fully explored.

use std::collections::HashSet;

use skyroute_core::{
    CostPolicy, DeliverySet, EdgeWeight, Graph, Instance, NodeId, Route, RouteMetrics, RoutePlan,
    SearchBudget, SearchState,
};

use crate::VisibilityConfig;

/// Result of one search run.
pub(crate) struct Outcome {
    pub(crate) best: Option<RoutePlan>,
    pub(crate) nodes_explored: u64,
}

enum Frame {
    /// Visit a state. `estimate` is checked against the incumbent when the
    /// frame is popped; `urgent` marks a drone already heading for charge.
    Enter {
        state: SearchState,
        urgent: bool,
        estimate: Option<f64>,
    },
    /// Rank and queue the children of an entered state.
    Expand(SearchState),
}

/// Fingerprint of an entered state.
#[derive(Debug, PartialEq, Eq, Hash)]
struct Signature {
    current: NodeId,
    delivered: DeliverySet,
    battery_bits: u64,
    recent: Vec<NodeId>,
}

struct Candidate {
    priority: f64,
    node: NodeId,
    weight: EdgeWeight,
}

/// Mutable context of one solve.
pub(crate) struct Search<'a> {
    instance: &'a Instance,
    graph: &'a Graph,
    config: &'a VisibilityConfig,
    policy: CostPolicy,
    budget: &'a SearchBudget,
    seen: HashSet<Signature>,
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
        graph: &'a Graph,
        config: &'a VisibilityConfig,
        policy: CostPolicy,
        budget: &'a SearchBudget,
    ) -> Self {
        Self {
            instance,
            graph,
            config,
            policy,
            budget,
            seen: HashSet::new(),
            best: None,
            nodes_explored: 0,
        }
    }

    pub(crate) fn run(mut self) -> Outcome {
        let mut stack = vec![Frame::Enter {
            state: SearchState::start(self.instance, &self.policy),
            urgent: false,
            estimate: None,
        }];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter {
                    state,
                    urgent,
                    estimate,
                } => {
                    if estimate.is_some_and(|value| self.exceeds_bound(value)) {
                        continue;
                    }
                    self.nodes_explored += 1;
                    if self.budget.should_stop() {
                        break;
                    }
                    if state.depth > self.config.max_depth
                        || self.stalled(&state)
                        || !self.first_visit(&state)
                    {
                        continue;
                    }
                    if state.delivered.is_complete() {
                        self.try_close(&state);
                        continue;
                    }
                    let detour = if !urgent && self.policy.needs_recharge(state.battery) {
                        self.nearest_recharge(&state)
                    } else {
                        None
                    };
                    stack.push(Frame::Expand(state));
                    if let Some(child) = detour {
                        stack.push(Frame::Enter {
                            state: child,
                            urgent: false,
                            estimate: None,
                        });
                    }
                }
                Frame::Expand(state) => {
                    stack.extend(self.expand(&state).into_iter().rev());
                }
            }
        }

        Outcome {
            best: self.best,
            nodes_explored: self.nodes_explored,
        }
    }

    fn exceeds_bound(&self, estimate: f64) -> bool {
        self.best
            .as_ref()
            .is_some_and(|best| estimate > self.config.bound_slack * best.metrics.distance)
    }

    /// Long paths that have made few deliveries.
    fn stalled(&self, state: &SearchState) -> bool {
        let len = state.trail.len();
        len > 2 * self.instance.deliveries().len() + self.config.stall_slack
            && state.delivered.len() * 3 < len
    }

    /// Record the state's fingerprint, returning `false` if it was seen.
    fn first_visit(&mut self, state: &SearchState) -> bool {
        self.seen.insert(Signature {
            current: state.current(),
            delivered: state.delivered.clone(),
            battery_bits: state.battery.trunc().to_bits(),
            recent: state
                .trail
                .iter()
                .take(self.config.signature_history)
                .collect(),
        })
    }

    /// Flight to the closest directly connected recharge point the current
    /// charge can reach and the visit cap still allows.
    fn nearest_recharge(&self, state: &SearchState) -> Option<SearchState> {
        let current = state.current();
        let mut nearest: Option<(NodeId, &EdgeWeight)> = None;
        for &recharge in self.instance.recharges() {
            let Some(weight) = self.graph.edge(current, recharge) else {
                continue;
            };
            if weight.consumption > state.battery || !self.within_visit_cap(state, recharge) {
                continue;
            }
            if nearest.is_none_or(|(_, best)| weight.distance < best.distance) {
                nearest = Some((recharge, weight));
            }
        }
        let (recharge, weight) = nearest?;
        state.advance(self.instance, recharge, weight, &self.policy)
    }

    fn admissible(&self, state: &SearchState, next: NodeId, weight: &EdgeWeight) -> bool {
        let instance = self.instance;
        if next == instance.hub() || state.has_delivered(instance, next) {
            return false;
        }
        if weight.consumption > state.battery {
            return false;
        }
        if instance.is_recharge(next) {
            let mut recent = state.trail.iter();
            let bounce = match (recent.next(), recent.next()) {
                (Some(last), Some(before)) => {
                    instance.is_recharge(last) && instance.is_recharge(before) && before == next
                }
                _ => false,
            };
            !bounce && self.within_visit_cap(state, next)
        } else {
            !state
                .trail
                .iter()
                .take(self.config.loop_history)
                .any(|visited| visited == next)
        }
    }

    /// Whether one more arrival at `recharge` stays within the revisit cap.
    fn within_visit_cap(&self, state: &SearchState, recharge: NodeId) -> bool {
        state.trail.count(recharge) <= self.config.max_recharge_visits
    }

    fn priority(&self, state: &SearchState, next: NodeId, weight: &EdgeWeight) -> f64 {
        let instance = self.instance;
        let kind = state.candidate_kind(instance, next);
        let mut priority = self.policy.edge_priority(weight, state.battery, kind);
        if instance.is_recharge(next) {
            let visits = state.trail.count(next);
            if visits > 1 {
                priority *= as_f64(visits + 1);
            }
            let recent_recharges = state
                .trail
                .iter()
                .take(3)
                .filter(|&visited| instance.is_recharge(visited))
                .count();
            if recent_recharges >= 2 {
                priority *= 2.0;
            }
        }
        priority
    }

    /// Pick the best delivery, plus the best recharge when charge is getting
    /// low, or the best recharge alone once below threshold. Short picks are
    /// replaced by the two best candidates overall.
    fn select<'c>(&self, state: &SearchState, ranked: &'c [Candidate]) -> Vec<&'c Candidate> {
        let instance = self.instance;
        let threshold = self.policy.recharge_threshold();
        let best_delivery = ranked.iter().find(|c| instance.is_delivery(c.node));
        let best_recharge = ranked.iter().find(|c| instance.is_recharge(c.node));

        let mut picked = Vec::with_capacity(2);
        match best_delivery {
            Some(delivery) if state.battery > threshold => {
                picked.push(delivery);
                if state.battery < threshold * self.config.recharge_window {
                    picked.extend(best_recharge);
                }
            }
            _ => picked.extend(best_recharge),
        }
        if picked.len() < 2 {
            picked = ranked.iter().take(2).collect();
        }
        picked
    }

    fn expand(&self, state: &SearchState) -> Vec<Frame> {
        let instance = self.instance;
        let mut ranked: Vec<Candidate> = self
            .graph
            .neighbours(state.current())
            .iter()
            .filter(|(next, weight)| self.admissible(state, *next, weight))
            .map(|&(node, weight)| Candidate {
                priority: self.priority(state, node, &weight),
                node,
                weight,
            })
            .collect();
        ranked.sort_by(|lhs, rhs| lhs.priority.total_cmp(&rhs.priority));

        let outstanding = self.config.per_delivery_estimate * as_f64(state.delivered.remaining());
        self.select(state, &ranked)
            .into_iter()
            .filter_map(|candidate| {
                let child = state.advance(instance, candidate.node, &candidate.weight, &self.policy)?;
                let urgent = self.policy.needs_recharge(child.battery)
                    && !instance.is_recharge(candidate.node);
                Some(Frame::Enter {
                    state: child,
                    urgent,
                    estimate: Some(state.distance + candidate.weight.distance + outstanding),
                })
            })
            .collect()
    }

    /// Close the tour at the hub and keep it if strictly better.
    fn try_close(&mut self, state: &SearchState) {
        let hub = self.instance.hub();
        let Some(weight) = self.graph.edge(state.current(), hub) else {
            return;
        };
        let Some(closed) = state.advance(self.instance, hub, weight, &self.policy) else {
            return;
        };
        let value = self.policy.terminal_value(closed.distance, closed.risk);
        if self.best.as_ref().is_some_and(|best| value >= best.value) {
            return;
        }
        log::debug!(
            "visibility: incumbent value {value:.2} at node {}",
            self.nodes_explored
        );
        self.best = Some(RoutePlan {
            route: Route::new(closed.trail.to_vec()),
            metrics: RouteMetrics::from(&closed),
            value,
        });
    }
}
