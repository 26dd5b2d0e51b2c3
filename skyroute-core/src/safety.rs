//! Memoised no-fly checks for candidate edges.

use std::collections::HashMap;

use crate::geometry::crosses_no_fly;
use crate::{Instance, NodeId};

/// Number of trailing path vertices folded into a cache key.
pub const SAFETY_HISTORY: usize = 3;

/// Cache key: the newest path vertices (newest first) and the candidate.
///
/// Only the newest vertex and the candidate decide the outcome; the older
/// vertices just widen the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SafetyKey {
    recent: [Option<NodeId>; SAFETY_HISTORY],
    candidate: NodeId,
}

impl SafetyKey {
    /// Key for flying from the newest vertex of `history` to `candidate`.
    ///
    /// `history` is read newest first and truncated to [`SAFETY_HISTORY`]
    /// vertices.
    pub fn new<I>(history: I, candidate: NodeId) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut recent = [None; SAFETY_HISTORY];
        for (slot, node) in recent.iter_mut().zip(history) {
            *slot = Some(node);
        }
        Self { recent, candidate }
    }

    const fn origin(&self) -> Option<NodeId> {
        self.recent[0]
    }
}

/// Append-only record of which segments avoid every no-fly zone.
///
/// One cache lives for the duration of a single solve.
#[derive(Debug, Default)]
pub struct SafetyCache {
    entries: HashMap<SafetyKey, bool>,
}

impl SafetyCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether flying from the newest vertex of `history` to `candidate`
    /// stays clear of every zone.
    ///
    /// An empty history has no segment to test and counts as safe. Handles
    /// unknown to `instance` count as unsafe.
    pub fn is_safe<I>(&mut self, instance: &Instance, history: I, candidate: NodeId) -> bool
    where
        I: IntoIterator<Item = NodeId>,
    {
        let key = SafetyKey::new(history, candidate);
        let Some(from) = key.origin() else {
            return true;
        };
        *self.entries.entry(key).or_insert_with(|| {
            match (instance.position(from), instance.position(candidate)) {
                (Some(a), Some(b)) => !crosses_no_fly(a, b, instance.zones()),
                _ => false,
            }
        })
    }

    /// Number of memoised segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been memoised yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
