//! Complete tours, their structural rules and re-simulation.

use thiserror::Error;

use crate::{CostPolicy, Instance, NodeId, SafetyCache, SearchState};

/// Ordered tour starting and ending at the hub.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    stops: Vec<NodeId>,
}

impl Route {
    /// Wrap a stop sequence without checking it.
    ///
    /// Use [`Route::validate`] or [`RouteSimulator::simulate`] before
    /// trusting the result.
    #[must_use]
    pub const fn new(stops: Vec<NodeId>) -> Self {
        Self { stops }
    }

    /// Stops in travel order.
    #[must_use]
    pub const fn stops(&self) -> &[NodeId] {
        self.stops.as_slice()
    }

    /// Number of flown edges.
    #[must_use]
    pub const fn legs(&self) -> usize {
        self.stops.len().saturating_sub(1)
    }

    /// Identifiers of the stops, for reporting.
    #[must_use]
    pub fn ids<'a>(&self, instance: &'a Instance) -> Vec<&'a str> {
        instance.ids(&self.stops)
    }

    /// Check the structural tour rules.
    ///
    /// # Errors
    /// Returns the first [`RouteViolation`] found: the tour must start and end
    /// at the hub, never repeat a stop consecutively, and visit every
    /// delivery exactly once.
    pub fn validate(&self, instance: &Instance) -> Result<(), RouteViolation> {
        let hub = instance.hub();
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Err(RouteViolation::Empty);
        };
        if self.stops.len() < 2 {
            return Err(RouteViolation::Empty);
        }
        if *first != hub {
            return Err(RouteViolation::MustStartAtHub);
        }
        if *last != hub {
            return Err(RouteViolation::MustEndAtHub);
        }
        if let Some(position) = self.stops.windows(2).position(|pair| pair.first() == pair.last()) {
            return Err(RouteViolation::ConsecutiveRepeat { position });
        }
        if let Some(unknown) = self.stops.iter().find(|stop| instance.point(**stop).is_none()) {
            return Err(RouteViolation::UnknownStop { node: *unknown });
        }
        for delivery in instance.deliveries() {
            let visits = self.stops.iter().filter(|stop| *stop == delivery).count();
            let id = display_id(instance, *delivery);
            match visits {
                0 => return Err(RouteViolation::MissingDelivery { id }),
                1 => {}
                _ => return Err(RouteViolation::RepeatedDelivery { id, visits }),
            }
        }
        Ok(())
    }
}

impl From<Vec<NodeId>> for Route {
    fn from(stops: Vec<NodeId>) -> Self {
        Self::new(stops)
    }
}

/// Reasons a stop sequence is not a servable tour.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteViolation {
    /// Fewer than two stops.
    #[error("route must contain at least two stops")]
    Empty,
    /// The first stop is not the hub.
    #[error("route must start at the HUB")]
    MustStartAtHub,
    /// The last stop is not the hub.
    #[error("route must end at the HUB")]
    MustEndAtHub,
    /// The same stop appears twice in a row.
    #[error("stop {position} is repeated consecutively")]
    ConsecutiveRepeat {
        /// Index of the first of the two equal stops.
        position: usize,
    },
    /// A handle does not belong to the instance.
    #[error("stop {node} is not part of the instance")]
    UnknownStop {
        /// Offending handle.
        node: NodeId,
    },
    /// A delivery is never visited.
    #[error("delivery {id} is never visited")]
    MissingDelivery {
        /// Delivery identifier.
        id: String,
    },
    /// A delivery is visited more than once.
    #[error("delivery {id} is visited {visits} times")]
    RepeatedDelivery {
        /// Delivery identifier.
        id: String,
        /// Number of visits.
        visits: usize,
    },
    /// Two consecutive stops are not connected.
    #[error("no edge between {from} and {to}")]
    MissingEdge {
        /// Departure identifier.
        from: String,
        /// Arrival identifier.
        to: String,
    },
    /// A leg touches a no-fly zone.
    #[error("leg {from} -> {to} crosses a no-fly zone")]
    CrossesNoFly {
        /// Departure identifier.
        from: String,
        /// Arrival identifier.
        to: String,
    },
    /// The battery cannot cover a leg.
    #[error("battery runs out on leg {from} -> {to}")]
    BatteryDepleted {
        /// Departure identifier.
        from: String,
        /// Arrival identifier.
        to: String,
    },
}

fn display_id(instance: &Instance, node: NodeId) -> String {
    instance
        .point(node)
        .map_or_else(|| node.to_string(), |point| point.id.clone())
}

/// Totals accumulated along a tour.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RouteMetrics {
    /// Travelled distance.
    pub distance: f64,
    /// Accumulated risk.
    pub risk: f64,
    /// Battery drained, not counting refills.
    pub consumption: f64,
    /// Number of refills performed.
    pub recharges: u32,
}

impl From<&SearchState> for RouteMetrics {
    fn from(state: &SearchState) -> Self {
        Self {
            distance: state.distance,
            risk: state.risk,
            consumption: state.consumption,
            recharges: state.recharges,
        }
    }
}

/// Replays tours leg by leg under one policy.
///
/// The simulator owns a [`SafetyCache`], so checking many similar tours
/// reuses earlier segment tests.
#[derive(Debug)]
pub struct RouteSimulator<'a> {
    instance: &'a Instance,
    policy: CostPolicy,
    cache: SafetyCache,
}

impl<'a> RouteSimulator<'a> {
    /// Simulator for `instance` under `policy`.
    #[must_use]
    pub fn new(instance: &'a Instance, policy: CostPolicy) -> Self {
        Self {
            instance,
            policy,
            cache: SafetyCache::new(),
        }
    }

    /// Policy applied while replaying.
    #[must_use]
    pub const fn policy(&self) -> &CostPolicy {
        &self.policy
    }

    /// Validate `stops` and return its metrics.
    ///
    /// The drone leaves the hub fully charged. Every leg must exist, stay
    /// clear of the no-fly zones and be covered by the remaining charge;
    /// recharge points refill the battery when reached under the threshold.
    ///
    /// # Errors
    /// Returns the first [`RouteViolation`] encountered.
    pub fn simulate(&mut self, stops: &[NodeId]) -> Result<RouteMetrics, RouteViolation> {
        let route = Route::new(stops.to_vec());
        route.validate(self.instance)?;
        let mut state = SearchState::start(self.instance, &self.policy);
        for to in stops.iter().skip(1).copied() {
            let from = state.current();
            let leg = || (display_id(self.instance, from), display_id(self.instance, to));
            let Some(weight) = self.instance.graph().edge(from, to) else {
                let (from_id, to_id) = leg();
                return Err(RouteViolation::MissingEdge {
                    from: from_id,
                    to: to_id,
                });
            };
            if !self.cache.is_safe(self.instance, state.trail.iter(), to) {
                let (from_id, to_id) = leg();
                return Err(RouteViolation::CrossesNoFly {
                    from: from_id,
                    to: to_id,
                });
            }
            let Some(next) = state.advance(self.instance, to, weight, &self.policy) else {
                let (from_id, to_id) = leg();
                return Err(RouteViolation::BatteryDepleted {
                    from: from_id,
                    to: to_id,
                });
            };
            state = next;
        }
        Ok(RouteMetrics::from(&state))
    }
}

/// Collapse immediately repeated runs of two or three stops.
///
/// `x y x y` becomes `x y` and `x y z x y z` becomes `x y z`. Passes are
/// repeated until nothing changes, so applying the function to its own
/// output is a no-op. Every distinct stop of the input survives.
///
/// # Examples
/// ```
/// use skyroute_core::remove_short_cycles;
///
/// let cleaned = remove_short_cycles(&['H', 'a', 'b', 'a', 'b', 'H']);
/// assert_eq!(cleaned, vec!['H', 'a', 'b', 'H']);
/// ```
#[must_use]
pub fn remove_short_cycles<T: PartialEq + Clone>(stops: &[T]) -> Vec<T> {
    let mut current = stops.to_vec();
    loop {
        let next = collapse_pass(&current);
        if next.len() == current.len() {
            return next;
        }
        current = next;
    }
}

fn collapse_pass<T: PartialEq + Clone>(stops: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(stops.len());
    for stop in stops {
        out.push(stop.clone());
        for period in [2, 3] {
            if ends_with_repeat(&out, period) {
                out.truncate(out.len() - period);
                break;
            }
        }
    }
    out
}

fn ends_with_repeat<T: PartialEq>(stops: &[T], period: usize) -> bool {
    let Some(start) = stops.len().checked_sub(2 * period) else {
        return false;
    };
    stops
        .get(start..)
        .and_then(|window| window.split_at_checked(period))
        .is_some_and(|(left, right)| left == right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BatteryConfig, EdgeWeight, InstanceBuilder, PointKind, Strategy};
    use geo::Coord;
    use rstest::{fixture, rstest};

    #[fixture]
    fn instance() -> Instance {
        InstanceBuilder::new()
            .point("HUB", PointKind::Hub, 0.0, 0.0)
            .point("D1", PointKind::Delivery, 10.0, 0.0)
            .point("R1", PointKind::Recharge, 10.0, 10.0)
            .point("D2", PointKind::Delivery, 0.0, 10.0)
            .edge("HUB", "D1", EdgeWeight::new(10.0, 0.1, 20.0))
            .edge("D1", "R1", EdgeWeight::new(10.0, 0.1, 20.0))
            .edge("R1", "D2", EdgeWeight::new(10.0, 0.1, 20.0))
            .edge("D2", "HUB", EdgeWeight::new(10.0, 0.1, 20.0))
            .edge("HUB", "R1", EdgeWeight::new(14.0, 0.0, 28.0))
            .build()
            .expect("valid instance")
    }

    fn nodes(instance: &Instance, ids: &[&str]) -> Vec<NodeId> {
        ids.iter()
            .map(|id| instance.node(id).expect("known id"))
            .collect()
    }

    fn simulator(instance: &Instance) -> RouteSimulator<'_> {
        RouteSimulator::new(
            instance,
            CostPolicy::new(Strategy::Balanced, &BatteryConfig::default()),
        )
    }

    #[rstest]
    fn loop_through_recharge_is_valid(instance: Instance) {
        let stops = nodes(&instance, &["HUB", "D1", "R1", "D2", "HUB"]);
        let metrics = simulator(&instance).simulate(&stops).expect("valid tour");
        assert_eq!(metrics.recharges, 1);
        assert!((metrics.distance - 40.0).abs() < 1e-9);
        assert!((metrics.consumption - 80.0).abs() < 1e-9);
    }

    #[rstest]
    #[case::not_from_hub(&["D1", "R1", "D2", "HUB"], RouteViolation::MustStartAtHub)]
    #[case::not_to_hub(&["HUB", "D1", "R1", "D2"], RouteViolation::MustEndAtHub)]
    #[case::stutter(&["HUB", "D1", "D1", "R1", "D2", "HUB"], RouteViolation::ConsecutiveRepeat { position: 1 })]
    #[case::missing(&["HUB", "D1", "HUB"], RouteViolation::MissingDelivery { id: "D2".into() })]
    #[case::repeated(&["HUB", "D1", "R1", "D1", "HUB", "D2", "HUB"], RouteViolation::RepeatedDelivery { id: "D1".into(), visits: 2 })]
    fn structural_violations(
        instance: Instance,
        #[case] ids: &[&str],
        #[case] expected: RouteViolation,
    ) {
        let stops = nodes(&instance, ids);
        assert_eq!(simulator(&instance).simulate(&stops), Err(expected));
    }

    #[rstest]
    fn missing_edge_is_reported(instance: Instance) {
        let stops = nodes(&instance, &["HUB", "D1", "D2", "HUB"]);
        let err = simulator(&instance).simulate(&stops).expect_err("no D1-D2 edge");
        assert!(matches!(err, RouteViolation::MissingEdge { .. }));
    }

    #[rstest]
    fn battery_without_recharge_runs_out(instance: Instance) {
        let stops = nodes(&instance, &["HUB", "D1", "R1", "D2", "HUB"]);
        let battery = BatteryConfig {
            capacity: 50.0,
            recharge_threshold: 0.0,
        };
        let mut sim = RouteSimulator::new(&instance, CostPolicy::new(Strategy::Distance, &battery));
        let err = sim.simulate(&stops).expect_err("no refill below zero threshold");
        assert!(matches!(err, RouteViolation::BatteryDepleted { .. }));
    }

    #[rstest]
    fn zone_crossing_leg_is_rejected() {
        let walled = InstanceBuilder::new()
            .point("HUB", PointKind::Hub, 0.0, 0.0)
            .point("D1", PointKind::Delivery, 4.0, 0.0)
            .edge("HUB", "D1", EdgeWeight::new(4.0, 0.0, 4.0))
            .zone(vec![
                Coord { x: 2.0, y: -1.0 },
                Coord { x: 3.0, y: -1.0 },
                Coord { x: 3.0, y: 1.0 },
            ])
            .build()
            .expect("valid instance");
        let stops = nodes(&walled, &["HUB", "D1", "HUB"]);
        let err = simulator(&walled).simulate(&stops).expect_err("blocked");
        assert!(matches!(err, RouteViolation::CrossesNoFly { .. }));
    }

    #[rstest]
    #[case::pair(&[0, 1, 2, 1, 2, 0], &[0, 1, 2, 0])]
    #[case::triple(&[0, 1, 2, 3, 1, 2, 3, 0], &[0, 1, 2, 3, 0])]
    #[case::nested(&[2, 0, 1, 0, 1, 2, 0, 1], &[2, 0, 1])]
    #[case::untouched(&[0, 1, 2, 3, 0], &[0, 1, 2, 3, 0])]
    fn short_cycles_collapse(#[case] input: &[u8], #[case] expected: &[u8]) {
        assert_eq!(remove_short_cycles(input), expected);
    }
}
