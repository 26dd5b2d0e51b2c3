//! Search-time state shared by the tree solvers.
//!
//! A [`SearchState`] is a cheap value: cloning it clones a persistent
//! [`Trail`] handle and a small bitset, so sibling branches never observe each
//! other's moves.

use std::rc::Rc;

use crate::{CandidateKind, CostPolicy, EdgeWeight, Instance, NodeId};

/// Compact set of delivered delivery slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeliverySet {
    words: Vec<u64>,
    count: usize,
    total: usize,
}

impl DeliverySet {
    /// Empty set able to hold `total` slots.
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            words: vec![0; total.div_ceil(64)],
            count: 0,
            total,
        }
    }

    /// Mark `slot` as delivered; returns `false` if it already was.
    pub fn insert(&mut self, slot: usize) -> bool {
        let (word, bit) = (slot >> 6, slot & 63);
        let Some(cell) = self.words.get_mut(word) else {
            return false;
        };
        let mask = 1_u64 << bit;
        if *cell & mask != 0 {
            return false;
        }
        *cell |= mask;
        self.count += 1;
        true
    }

    /// Whether `slot` has been delivered.
    #[must_use]
    pub fn contains(&self, slot: usize) -> bool {
        self.words
            .get(slot >> 6)
            .is_some_and(|cell| cell & (1_u64 << (slot & 63)) != 0)
    }

    /// Number of delivered slots.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether nothing has been delivered yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Deliveries still outstanding.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.total.saturating_sub(self.count)
    }

    /// Whether every delivery has been made.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.count >= self.total
    }
}

#[derive(Debug)]
struct TrailNode {
    node: NodeId,
    parent: Option<Rc<TrailNode>>,
}

/// Persistent, never-empty path of visited vertices.
///
/// Extending a trail shares the existing prefix, so every search frame can
/// own its path without copying it.
#[derive(Debug, Clone)]
pub struct Trail {
    head: Rc<TrailNode>,
    len: usize,
}

impl Trail {
    /// Path consisting of `start` only.
    #[must_use]
    pub fn new(start: NodeId) -> Self {
        Self {
            head: Rc::new(TrailNode {
                node: start,
                parent: None,
            }),
            len: 1,
        }
    }

    /// This path extended by `node`.
    #[must_use]
    pub fn push(&self, node: NodeId) -> Self {
        Self {
            head: Rc::new(TrailNode {
                node,
                parent: Some(Rc::clone(&self.head)),
            }),
            len: self.len + 1,
        }
    }

    /// Most recent vertex.
    #[must_use]
    pub fn last(&self) -> NodeId {
        self.head.node
    }

    /// Number of vertices on the path.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Vertices from newest to oldest.
    pub fn iter(&self) -> TrailIter<'_> {
        TrailIter {
            next: Some(&self.head),
        }
    }

    /// How many times `node` occurs on the path.
    #[must_use]
    pub fn count(&self, node: NodeId) -> usize {
        self.iter().filter(|visited| *visited == node).count()
    }

    /// Vertices in travel order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<NodeId> {
        let mut stops: Vec<NodeId> = self.iter().collect();
        stops.reverse();
        stops
    }
}

impl Drop for Trail {
    // Unlink uniquely owned ancestors one at a time so long paths do not
    // recurse through `Rc` drops.
    fn drop(&mut self) {
        let mut parent = Rc::get_mut(&mut self.head).and_then(|node| node.parent.take());
        while let Some(link) = parent {
            parent = Rc::try_unwrap(link)
                .ok()
                .and_then(|mut node| node.parent.take());
        }
    }
}

/// Iterator over a [`Trail`] from newest to oldest vertex.
#[derive(Debug)]
pub struct TrailIter<'a> {
    next: Option<&'a TrailNode>,
}

impl Iterator for TrailIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.as_deref();
        Some(current.node)
    }
}

/// Position, battery and accumulated cost of one search frame.
#[derive(Debug, Clone)]
pub struct SearchState {
    /// Vertices visited so far, starting at the hub.
    pub trail: Trail,
    /// Deliveries made so far.
    pub delivered: DeliverySet,
    /// Charge left on arrival at the current vertex.
    pub battery: f64,
    /// Number of recharges performed.
    pub recharges: u32,
    /// Accumulated distance.
    pub distance: f64,
    /// Accumulated risk.
    pub risk: f64,
    /// Accumulated consumption.
    pub consumption: f64,
    /// Number of moves made.
    pub depth: usize,
}

impl SearchState {
    /// Fully charged drone parked at the hub.
    #[must_use]
    pub fn start(instance: &Instance, policy: &CostPolicy) -> Self {
        Self {
            trail: Trail::new(instance.hub()),
            delivered: DeliverySet::new(instance.deliveries().len()),
            battery: policy.capacity(),
            recharges: 0,
            distance: 0.0,
            risk: 0.0,
            consumption: 0.0,
            depth: 0,
        }
    }

    /// Vertex the drone is at.
    #[must_use]
    pub fn current(&self) -> NodeId {
        self.trail.last()
    }

    /// State after flying `weight` to `to`.
    ///
    /// Returns `None` when the flight would drain the battery below zero.
    /// Reaching a recharge point with charge under the policy threshold
    /// restores full capacity.
    #[must_use]
    pub fn advance(
        &self,
        instance: &Instance,
        to: NodeId,
        weight: &EdgeWeight,
        policy: &CostPolicy,
    ) -> Option<Self> {
        let mut battery = self.battery - weight.consumption;
        if battery < 0.0 {
            return None;
        }
        let mut delivered = self.delivered.clone();
        if let Some(slot) = instance.delivery_slot(to) {
            delivered.insert(slot);
        }
        let mut recharges = self.recharges;
        if instance.is_recharge(to) && policy.needs_recharge(battery) {
            battery = policy.capacity();
            recharges += 1;
        }
        Some(Self {
            trail: self.trail.push(to),
            delivered,
            battery,
            recharges,
            distance: self.distance + weight.distance,
            risk: self.risk + weight.risk,
            consumption: self.consumption + weight.consumption,
            depth: self.depth + 1,
        })
    }

    /// How `node` should be ranked as the next stop from this state.
    #[must_use]
    pub fn candidate_kind(&self, instance: &Instance, node: NodeId) -> CandidateKind {
        match instance.delivery_slot(node) {
            Some(slot) if !self.delivered.contains(slot) => CandidateKind::PendingDelivery,
            Some(_) => CandidateKind::Other,
            None if instance.is_recharge(node) => CandidateKind::Recharge,
            None => CandidateKind::Other,
        }
    }

    /// Whether delivery `node` has already been made on this path.
    #[must_use]
    pub fn has_delivered(&self, instance: &Instance, node: NodeId) -> bool {
        instance
            .delivery_slot(node)
            .is_some_and(|slot| self.delivered.contains(slot))
    }
}
