//! Randomised greedy construction of a first tour.

use rand::Rng;
use rand::seq::SliceRandom;
use skyroute_core::{CostPolicy, Instance, NodeId, SafetyCache, SearchState, remove_short_cycles};

/// Builds hub-to-hub tours by random walks biased towards pending work.
pub(crate) struct Constructor<'a> {
    instance: &'a Instance,
    policy: CostPolicy,
    max_steps: usize,
    cache: SafetyCache,
}

impl<'a> Constructor<'a> {
    pub(crate) fn new(instance: &'a Instance, policy: CostPolicy, max_steps: usize) -> Self {
        Self {
            instance,
            policy,
            max_steps,
            cache: SafetyCache::new(),
        }
    }

    /// One walk from the hub, closed at the hub and stripped of short
    /// cycles. `None` when the drone strands or the step allowance is spent
    /// before every delivery is made.
    pub(crate) fn build<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Vec<NodeId>> {
        let instance = self.instance;
        let hub = instance.hub();
        let mut state = SearchState::start(instance, &self.policy);

        for _ in 0..self.max_steps {
            if state.delivered.is_complete() {
                break;
            }
            let next = self.choose(&state, rng)?;
            let weight = instance.graph().edge(state.current(), next)?;
            state = state.advance(instance, next, weight, &self.policy)?;
        }
        if !state.delivered.is_complete() {
            return None;
        }

        let current = state.current();
        let weight = instance.graph().edge(current, hub)?;
        if !self.cache.is_safe(instance, [current], hub) {
            return None;
        }
        let closed = state.advance(instance, hub, weight, &self.policy)?;
        Some(remove_short_cycles(&closed.trail.to_vec()))
    }

    /// Random reachable recharge point when low, otherwise a random
    /// reachable pending delivery; failing that, any safe neighbour that is
    /// not a revisit.
    fn choose<R: Rng + ?Sized>(&mut self, state: &SearchState, rng: &mut R) -> Option<NodeId> {
        let instance = self.instance;
        let current = state.current();
        let preferred: Vec<NodeId> = if self.policy.needs_recharge(state.battery) {
            instance.recharges().to_vec()
        } else {
            instance
                .deliveries()
                .iter()
                .copied()
                .filter(|&delivery| !state.has_delivered(instance, delivery))
                .collect()
        };
        let reachable: Vec<NodeId> = preferred
            .into_iter()
            .filter(|&next| self.reachable(state, next))
            .collect();
        if let Some(&next) = reachable.choose(rng) {
            return Some(next);
        }

        let fallback: Vec<NodeId> = instance
            .graph()
            .neighbours(current)
            .iter()
            .map(|&(next, _)| next)
            .filter(|&next| {
                next != current && (instance.is_recharge(next) || state.trail.count(next) == 0)
            })
            .filter(|&next| self.cache.is_safe(instance, [current], next))
            .collect();
        fallback.choose(rng).copied()
    }

    fn reachable(&mut self, state: &SearchState, next: NodeId) -> bool {
        let instance = self.instance;
        let current = state.current();
        instance
            .graph()
            .edge(current, next)
            .is_some_and(|weight| weight.consumption <= state.battery)
            && self.cache.is_safe(instance, [current], next)
    }
}
