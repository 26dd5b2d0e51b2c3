//! Pre-filtered adjacency with zone-crossing edges removed.

use std::collections::HashMap;

use crate::geometry::crosses_no_fly;
use crate::{Graph, Instance, NodeId};

/// Builds the visibility graph of an [`Instance`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityFilter;

impl VisibilityFilter {
    /// Copy of the instance graph keeping only edges whose straight segment
    /// stays clear of every no-fly zone.
    ///
    /// Each undirected edge is tested once and the verdict reused for its
    /// mirror, so the result stays symmetric.
    #[must_use]
    pub fn build(instance: &Instance) -> Graph {
        let mut verdicts: HashMap<(NodeId, NodeId), bool> = HashMap::new();
        let graph = instance.graph().retain_edges(|from, to| {
            let key = if from <= to { (from, to) } else { (to, from) };
            *verdicts.entry(key).or_insert_with(|| {
                match (instance.position(from), instance.position(to)) {
                    (Some(a), Some(b)) => !crosses_no_fly(a, b, instance.zones()),
                    _ => false,
                }
            })
        });
        log::debug!(
            "visibility graph keeps {} of {} edges",
            graph.edge_count(),
            instance.graph().edge_count()
        );
        graph
    }
}
