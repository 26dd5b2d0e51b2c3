//! Static delivery graph: typed waypoints, weighted edges and no-fly zones.
//!
//! An [`Instance`] is assembled once through [`InstanceBuilder`] and then
//! shared read-only by every solver. Waypoints are addressed internally by
//! dense [`NodeId`] handles; the original string identifiers are kept for
//! reporting.

use std::collections::HashMap;
use std::fmt;

use geo::Coord;
use thiserror::Error;

/// Dense handle for a waypoint inside an [`Instance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Handle for the waypoint at `index`.
    ///
    /// Handles that do not belong to an instance are tolerated by every
    /// lookup, which simply reports nothing for them.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Position of the waypoint in [`Instance::points`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Role a waypoint plays in a delivery tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointKind {
    /// The unique start and end of every route.
    Hub,
    /// A destination that must be visited exactly once.
    Delivery,
    /// A station where the battery can be refilled.
    Recharge,
}

/// A waypoint with its identifier, role and planar position.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Identifier as given by the instance file.
    pub id: String,
    /// Role of this waypoint.
    pub kind: PointKind,
    /// Planar coordinates.
    pub position: Coord<f64>,
}

/// Cost of flying one edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeWeight {
    /// Travelled distance.
    pub distance: f64,
    /// Accumulated exposure to risk.
    pub risk: f64,
    /// Battery drained by the flight.
    pub consumption: f64,
}

impl EdgeWeight {
    /// Construct a weight from its three components.
    #[must_use]
    pub const fn new(distance: f64, risk: f64, consumption: f64) -> Self {
        Self {
            distance,
            risk,
            consumption,
        }
    }

    fn is_valid(&self) -> bool {
        [self.distance, self.risk, self.consumption]
            .iter()
            .all(|value| value.is_finite() && *value >= 0.0)
    }
}

/// Errors returned by [`NoFlyZone::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoFlyZoneError {
    /// A polygon needs at least three vertices.
    #[error("no-fly polygon needs at least 3 vertices, found {vertices}")]
    TooFewVertices {
        /// Number of vertices supplied.
        vertices: usize,
    },
}

/// Closed polygon no route edge may touch.
#[derive(Debug, Clone, PartialEq)]
pub struct NoFlyZone {
    vertices: Vec<Coord<f64>>,
}

impl NoFlyZone {
    /// Validate and construct a zone.
    ///
    /// # Errors
    /// Returns [`NoFlyZoneError::TooFewVertices`] for fewer than three
    /// vertices. Collinear or repeated vertices are accepted.
    pub fn new(vertices: Vec<Coord<f64>>) -> Result<Self, NoFlyZoneError> {
        if vertices.len() < 3 {
            return Err(NoFlyZoneError::TooFewVertices {
                vertices: vertices.len(),
            });
        }
        Ok(Self { vertices })
    }

    /// Polygon vertices in boundary order.
    #[must_use]
    pub fn vertices(&self) -> &[Coord<f64>] {
        &self.vertices
    }

    /// Boundary edges, wrapping from the last vertex back to the first.
    pub fn edges(&self) -> impl Iterator<Item = (Coord<f64>, Coord<f64>)> + '_ {
        let next = self.vertices.iter().copied().cycle().skip(1);
        self.vertices.iter().copied().zip(next)
    }
}

/// Undirected adjacency between waypoints.
///
/// Neighbour lists keep the order in which edges were first inserted, which
/// makes candidate ordering (and therefore tie-breaking) reproducible.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Graph {
    adjacency: Vec<Vec<(NodeId, EdgeWeight)>>,
}

impl Graph {
    fn with_nodes(count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); count],
        }
    }

    /// Neighbours of `node` together with the connecting edge weights.
    #[must_use]
    pub fn neighbours(&self, node: NodeId) -> &[(NodeId, EdgeWeight)] {
        self.adjacency.get(node.0).map_or(&[], Vec::as_slice)
    }

    /// Weight of the edge between `from` and `to`, if one exists.
    #[must_use]
    pub fn edge(&self, from: NodeId, to: NodeId) -> Option<&EdgeWeight> {
        self.neighbours(from)
            .iter()
            .find(|(neighbour, _)| *neighbour == to)
            .map(|(_, weight)| weight)
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(from, row)| row.iter().filter(move |(to, _)| to.0 > from))
            .count()
    }

    /// Copy of this graph retaining only the edges accepted by `keep`.
    ///
    /// `keep` is consulted once per directed entry, so it must be symmetric
    /// for the result to stay undirected.
    pub fn retain_edges<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(NodeId, NodeId) -> bool,
    {
        let adjacency = self
            .adjacency
            .iter()
            .enumerate()
            .map(|(from, row)| {
                row.iter()
                    .filter(|(to, _)| keep(NodeId(from), *to))
                    .copied()
                    .collect()
            })
            .collect();
        Self { adjacency }
    }

    fn insert(&mut self, a: NodeId, b: NodeId, weight: EdgeWeight) {
        self.insert_directed(a, b, weight);
        self.insert_directed(b, a, weight);
    }

    fn insert_directed(&mut self, from: NodeId, to: NodeId, weight: EdgeWeight) {
        let Some(row) = self.adjacency.get_mut(from.0) else {
            return;
        };
        if let Some(entry) = row.iter_mut().find(|(neighbour, _)| *neighbour == to) {
            entry.1 = weight;
        } else {
            row.push((to, weight));
        }
    }
}

/// Errors returned by [`InstanceBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    /// No waypoint has the hub role.
    #[error("instance has no HUB point")]
    MissingHub,
    /// More than one waypoint has the hub role.
    #[error("instance has more than one HUB point: {first} and {second}")]
    MultipleHubs {
        /// First hub identifier seen.
        first: String,
        /// Second hub identifier seen.
        second: String,
    },
    /// Two waypoints share an identifier.
    #[error("point id {id} is defined more than once")]
    DuplicatePoint {
        /// Repeated identifier.
        id: String,
    },
    /// An edge refers to an identifier that is not a waypoint.
    #[error("edge {edge} references unknown point {id}")]
    UnknownEndpoint {
        /// Position of the edge in insertion order.
        edge: usize,
        /// Unknown identifier.
        id: String,
    },
    /// An edge connects a waypoint with itself.
    #[error("edge from {id} to itself is not allowed")]
    SelfLoop {
        /// Identifier of the waypoint.
        id: String,
    },
    /// An edge weight is negative or not finite.
    #[error("edge {from} - {to} has a negative or non-finite weight")]
    InvalidWeight {
        /// First endpoint.
        from: String,
        /// Second endpoint.
        to: String,
    },
    /// A zone has fewer than three vertices.
    #[error("no-fly zone {index} has {vertices} vertices; at least 3 are required")]
    DegenerateZone {
        /// Position of the zone in insertion order.
        index: usize,
        /// Number of vertices supplied.
        vertices: usize,
    },
}

/// Immutable delivery problem shared by all solvers.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    points: Vec<Point>,
    index: HashMap<String, NodeId>,
    hub: NodeId,
    deliveries: Vec<NodeId>,
    recharges: Vec<NodeId>,
    delivery_slots: Vec<Option<usize>>,
    graph: Graph,
    zones: Vec<NoFlyZone>,
}

impl Instance {
    /// All waypoints, indexable by [`NodeId::index`].
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of waypoints including the hub.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Handle of the hub.
    #[must_use]
    pub const fn hub(&self) -> NodeId {
        self.hub
    }

    /// Delivery waypoints in declaration order.
    #[must_use]
    pub fn deliveries(&self) -> &[NodeId] {
        &self.deliveries
    }

    /// Recharge waypoints in declaration order.
    #[must_use]
    pub fn recharges(&self) -> &[NodeId] {
        &self.recharges
    }

    /// Full adjacency as loaded.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    /// No-fly polygons.
    #[must_use]
    pub fn zones(&self) -> &[NoFlyZone] {
        &self.zones
    }

    /// Look up a waypoint handle by identifier.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    /// Waypoint behind a handle.
    #[must_use]
    pub fn point(&self, node: NodeId) -> Option<&Point> {
        self.points.get(node.0)
    }

    /// Role of a waypoint, or `None` for a handle from another instance.
    #[must_use]
    pub fn kind(&self, node: NodeId) -> Option<PointKind> {
        self.point(node).map(|point| point.kind)
    }

    /// Whether the handle refers to a delivery waypoint.
    #[must_use]
    pub fn is_delivery(&self, node: NodeId) -> bool {
        self.delivery_slot(node).is_some()
    }

    /// Whether the handle refers to a recharge waypoint.
    #[must_use]
    pub fn is_recharge(&self, node: NodeId) -> bool {
        self.kind(node) == Some(PointKind::Recharge)
    }

    /// Ordinal of a delivery waypoint among all deliveries.
    #[must_use]
    pub fn delivery_slot(&self, node: NodeId) -> Option<usize> {
        self.delivery_slots.get(node.0).copied().flatten()
    }

    /// Planar position of a waypoint.
    #[must_use]
    pub fn position(&self, node: NodeId) -> Option<Coord<f64>> {
        self.point(node).map(|point| point.position)
    }

    /// Identifiers for a sequence of handles, skipping unknown handles.
    #[must_use]
    pub fn ids(&self, nodes: &[NodeId]) -> Vec<&str> {
        nodes
            .iter()
            .filter_map(|node| self.point(*node))
            .map(|point| point.id.as_str())
            .collect()
    }
}

/// Incremental constructor validating an [`Instance`].
///
/// # Examples
/// ```
/// use skyroute_core::{EdgeWeight, InstanceBuilder, PointKind};
///
/// # fn main() -> Result<(), skyroute_core::InstanceError> {
/// let instance = InstanceBuilder::new()
///     .point("HUB", PointKind::Hub, 0.0, 0.0)
///     .point("D1", PointKind::Delivery, 3.0, 4.0)
///     .edge("HUB", "D1", EdgeWeight::new(5.0, 0.1, 10.0))
///     .build()?;
/// assert_eq!(instance.deliveries().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InstanceBuilder {
    points: Vec<Point>,
    edges: Vec<(String, String, EdgeWeight)>,
    zones: Vec<Vec<Coord<f64>>>,
}

impl InstanceBuilder {
    /// Start an empty instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a waypoint.
    #[must_use]
    pub fn point(mut self, id: impl Into<String>, kind: PointKind, x: f64, y: f64) -> Self {
        self.points.push(Point {
            id: id.into(),
            kind,
            position: Coord { x, y },
        });
        self
    }

    /// Add an undirected edge. A repeated pair replaces the earlier weight.
    #[must_use]
    pub fn edge(mut self, p1: impl Into<String>, p2: impl Into<String>, weight: EdgeWeight) -> Self {
        self.edges.push((p1.into(), p2.into(), weight));
        self
    }

    /// Add a no-fly polygon.
    #[must_use]
    pub fn zone(mut self, vertices: Vec<Coord<f64>>) -> Self {
        self.zones.push(vertices);
        self
    }

    /// Validate the collected data and freeze it into an [`Instance`].
    ///
    /// # Errors
    /// Returns an [`InstanceError`] describing the first inconsistency found.
    pub fn build(self) -> Result<Instance, InstanceError> {
        let Self {
            points,
            edges,
            zones,
        } = self;

        let mut index = HashMap::with_capacity(points.len());
        let mut hub: Option<NodeId> = None;
        let mut deliveries = Vec::new();
        let mut recharges = Vec::new();
        let mut delivery_slots = Vec::with_capacity(points.len());

        for (position, point) in points.iter().enumerate() {
            let node = NodeId(position);
            if index.insert(point.id.clone(), node).is_some() {
                return Err(InstanceError::DuplicatePoint {
                    id: point.id.clone(),
                });
            }
            let mut slot = None;
            match point.kind {
                PointKind::Hub => {
                    if let Some(existing) = hub {
                        let first = points
                            .get(existing.0)
                            .map(|p| p.id.clone())
                            .unwrap_or_default();
                        return Err(InstanceError::MultipleHubs {
                            first,
                            second: point.id.clone(),
                        });
                    }
                    hub = Some(node);
                }
                PointKind::Delivery => {
                    slot = Some(deliveries.len());
                    deliveries.push(node);
                }
                PointKind::Recharge => recharges.push(node),
            }
            delivery_slots.push(slot);
        }
        let hub = hub.ok_or(InstanceError::MissingHub)?;

        let mut graph = Graph::with_nodes(points.len());
        for (position, (p1, p2, weight)) in edges.into_iter().enumerate() {
            let a = lookup(&index, &p1, position)?;
            let b = lookup(&index, &p2, position)?;
            if a == b {
                return Err(InstanceError::SelfLoop { id: p1 });
            }
            if !weight.is_valid() {
                return Err(InstanceError::InvalidWeight { from: p1, to: p2 });
            }
            graph.insert(a, b, weight);
        }

        let zones = zones
            .into_iter()
            .enumerate()
            .map(|(position, polygon)| {
                NoFlyZone::new(polygon).map_err(|NoFlyZoneError::TooFewVertices { vertices }| {
                    InstanceError::DegenerateZone {
                        index: position,
                        vertices,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Instance {
            points,
            index,
            hub,
            deliveries,
            recharges,
            delivery_slots,
            graph,
            zones,
        })
    }
}

fn lookup(index: &HashMap<String, NodeId>, id: &str, edge: usize) -> Result<NodeId, InstanceError> {
    index
        .get(id)
        .copied()
        .ok_or_else(|| InstanceError::UnknownEndpoint {
            edge,
            id: id.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn triangle() -> InstanceBuilder {
        InstanceBuilder::new()
            .point("HUB", PointKind::Hub, 0.0, 0.0)
            .point("D1", PointKind::Delivery, 1.0, 0.0)
            .point("R1", PointKind::Recharge, 0.0, 1.0)
            .edge("HUB", "D1", EdgeWeight::new(1.0, 0.0, 5.0))
            .edge("D1", "R1", EdgeWeight::new(1.4, 0.2, 7.0))
            .edge("R1", "HUB", EdgeWeight::new(1.0, 0.1, 5.0))
    }

    #[rstest]
    fn edges_are_symmetric(triangle: InstanceBuilder) {
        let instance = triangle.build().expect("valid instance");
        let d1 = instance.node("D1").expect("D1");
        let r1 = instance.node("R1").expect("R1");
        assert_eq!(
            instance.graph().edge(d1, r1),
            instance.graph().edge(r1, d1)
        );
        assert_eq!(instance.graph().edge_count(), 3);
    }

    #[rstest]
    fn repeated_edge_replaces_weight_in_place(triangle: InstanceBuilder) {
        let instance = triangle
            .edge("D1", "HUB", EdgeWeight::new(9.0, 0.0, 1.0))
            .build()
            .expect("valid instance");
        let hub = instance.hub();
        let first = instance.graph().neighbours(hub).first().copied();
        let d1 = instance.node("D1").expect("D1");
        assert_eq!(first, Some((d1, EdgeWeight::new(9.0, 0.0, 1.0))));
        assert_eq!(instance.graph().neighbours(hub).len(), 2);
    }

    #[rstest]
    fn roles_are_indexed(triangle: InstanceBuilder) {
        let instance = triangle.build().expect("valid instance");
        let d1 = instance.node("D1").expect("D1");
        assert_eq!(instance.delivery_slot(d1), Some(0));
        assert!(instance.is_recharge(instance.node("R1").expect("R1")));
        assert_eq!(instance.ids(&[instance.hub(), d1]), vec!["HUB", "D1"]);
    }

    #[rstest]
    fn missing_hub_is_rejected() {
        let err = InstanceBuilder::new()
            .point("D1", PointKind::Delivery, 0.0, 0.0)
            .build()
            .expect_err("no hub");
        assert_eq!(err, InstanceError::MissingHub);
    }

    #[rstest]
    fn second_hub_is_rejected(triangle: InstanceBuilder) {
        let err = triangle
            .point("HUB2", PointKind::Hub, 5.0, 5.0)
            .build()
            .expect_err("two hubs");
        assert!(matches!(err, InstanceError::MultipleHubs { .. }));
    }

    #[rstest]
    #[case::unknown("HUB", "X9")]
    #[case::self_loop("D1", "D1")]
    fn malformed_edges_are_rejected(
        triangle: InstanceBuilder,
        #[case] p1: &str,
        #[case] p2: &str,
    ) {
        let result = triangle.edge(p1, p2, EdgeWeight::default()).build();
        assert!(result.is_err());
    }

    #[rstest]
    fn negative_weight_is_rejected(triangle: InstanceBuilder) {
        let err = triangle
            .edge("HUB", "R1", EdgeWeight::new(-1.0, 0.0, 0.0))
            .build()
            .expect_err("negative distance");
        assert!(matches!(err, InstanceError::InvalidWeight { .. }));
    }

    #[rstest]
    fn two_vertex_zone_is_rejected(triangle: InstanceBuilder) {
        let err = triangle
            .zone(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }])
            .build()
            .expect_err("degenerate zone");
        assert_eq!(
            err,
            InstanceError::DegenerateZone {
                index: 0,
                vertices: 2
            }
        );
    }

    #[rstest]
    fn zone_edges_wrap_around() {
        let zone = NoFlyZone::new(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 0.0, y: 1.0 },
        ])
        .expect("triangle");
        let edges: Vec<_> = zone.edges().collect();
        assert_eq!(edges.len(), 3);
        assert_eq!(
            edges.last().copied(),
            Some((Coord { x: 0.0, y: 1.0 }, Coord { x: 0.0, y: 0.0 }))
        );
    }
}
