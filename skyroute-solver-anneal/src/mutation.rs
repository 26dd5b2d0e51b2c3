//! Neighbourhood moves on hub-to-hub tours.

use rand::Rng;
use skyroute_core::{NodeId, remove_short_cycles};

/// Random change to the interior of a tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mutation {
    /// Exchange two interior stops.
    Swap,
    /// Reverse a contiguous interior span.
    Reverse,
    /// Move one interior stop elsewhere in the interior.
    Relocate,
}

impl Mutation {
    pub(crate) fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.gen_range(0..3_u8) {
            0 => Self::Swap,
            1 => Self::Reverse,
            _ => Self::Relocate,
        }
    }

    /// Apply the move to `stops`, leaving both endpoints in place.
    ///
    /// Tours with fewer than two interior stops are left untouched.
    pub(crate) fn apply<T, R: Rng + ?Sized>(self, stops: &mut Vec<T>, rng: &mut R) {
        if stops.len() < 4 {
            return;
        }
        let last = stops.len() - 1;
        match self {
            Self::Swap => {
                let first = rng.gen_range(1..last);
                let second = other_than(rng, last - 1, first);
                stops.swap(first, second);
            }
            Self::Reverse => {
                let start = rng.gen_range(1..last - 1);
                let end = rng.gen_range(start + 1..last);
                if let Some(span) = stops.get_mut(start..=end) {
                    span.reverse();
                }
            }
            Self::Relocate => {
                let from = rng.gen_range(1..last);
                let stop = stops.remove(from);
                let to = other_than(rng, last - 1, from);
                stops.insert(to, stop);
            }
        }
    }
}

/// Uniform draw from `1..=upper` excluding `taken`, which must lie in that
/// range.
fn other_than<R: Rng + ?Sized>(rng: &mut R, upper: usize, taken: usize) -> usize {
    let drawn = rng.gen_range(1..upper);
    if drawn >= taken { drawn + 1 } else { drawn }
}

/// Random neighbour of `stops`: one mutation, hub endpoints restored and
/// short cycles removed.
pub(crate) fn neighbour<R: Rng + ?Sized>(stops: &[NodeId], hub: NodeId, rng: &mut R) -> Vec<NodeId> {
    let mut next = stops.to_vec();
    Mutation::random(rng).apply(&mut next, rng);
    if next.first() != Some(&hub) {
        next.insert(0, hub);
    }
    if next.last() != Some(&hub) {
        next.push(hub);
    }
    remove_short_cycles(&next)
}
