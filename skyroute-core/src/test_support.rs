//! Canned instances and plan checks shared by unit, behaviour and property
//! tests across the workspace.

use geo::Coord;

use crate::{
    BatteryConfig, CostPolicy, EdgeWeight, Instance, InstanceBuilder, PointKind, RoutePlan,
    RouteSimulator, RouteViolation, Strategy,
};

/// Hub and one delivery joined by a single short edge.
#[must_use]
pub fn single_delivery_instance() -> Instance {
    build(
        InstanceBuilder::new()
            .point("HUB", PointKind::Hub, 0.0, 0.0)
            .point("D1", PointKind::Delivery, 5.0, 0.0)
            .edge("HUB", "D1", EdgeWeight::new(5.0, 0.1, 10.0)),
    )
}

/// Delivery whose only edge passes straight through a no-fly square.
#[must_use]
pub fn blocked_delivery_instance() -> Instance {
    build(
        InstanceBuilder::new()
            .point("HUB", PointKind::Hub, 0.0, 0.0)
            .point("D1", PointKind::Delivery, 10.0, 0.0)
            .point("R1", PointKind::Recharge, 0.0, 10.0)
            .edge("HUB", "D1", EdgeWeight::new(10.0, 0.1, 10.0))
            .edge("HUB", "R1", EdgeWeight::new(10.0, 0.1, 10.0))
            .zone(square(4.0, -2.0, 6.0, 2.0)),
    )
}

/// Out-and-back tour using exactly the default capacity of 50.
#[must_use]
pub fn exact_battery_instance() -> Instance {
    build(
        InstanceBuilder::new()
            .point("HUB", PointKind::Hub, 0.0, 0.0)
            .point("D1", PointKind::Delivery, 25.0, 0.0)
            .edge("HUB", "D1", EdgeWeight::new(25.0, 0.2, 25.0)),
    )
}

/// Two deliveries that can only both be served after a recharge stop.
///
/// The direct `D1 - D2` edge is cut by a zone, forcing the detour through
/// `R1`.
#[must_use]
pub fn recharge_detour_instance() -> Instance {
    build(
        InstanceBuilder::new()
            .point("HUB", PointKind::Hub, 0.0, 0.0)
            .point("D1", PointKind::Delivery, 20.0, 0.0)
            .point("R1", PointKind::Recharge, 20.0, 20.0)
            .point("D2", PointKind::Delivery, 0.0, 20.0)
            .edge("HUB", "D1", EdgeWeight::new(20.0, 0.1, 20.0))
            .edge("D1", "R1", EdgeWeight::new(20.0, 0.2, 20.0))
            .edge("R1", "D2", EdgeWeight::new(20.0, 0.2, 20.0))
            .edge("D2", "HUB", EdgeWeight::new(20.0, 0.1, 20.0))
            .edge("D1", "D2", EdgeWeight::new(28.0, 0.0, 28.0))
            .zone(square(9.0, 9.0, 11.0, 11.0)),
    )
}

/// Waypoints and an optional obstacle for a generated complete graph.
///
/// Every pair of points is connected; weights follow Euclidean distance,
/// risk grows with distance and consumption equals distance. Recharge
/// points are listed after deliveries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceLayout {
    /// Delivery positions.
    pub deliveries: Vec<(f64, f64)>,
    /// Recharge positions.
    pub recharges: Vec<(f64, f64)>,
    /// Axis-aligned no-fly square as `(min_x, min_y, max_x, max_y)`.
    pub zone: Option<(f64, f64, f64, f64)>,
}

impl InstanceLayout {
    /// Build the instance with the hub at the origin.
    ///
    /// Coincident points receive a minimal positive weight so the result is
    /// always a valid instance.
    #[must_use]
    pub fn build(&self) -> Instance {
        let mut points: Vec<(String, PointKind, f64, f64)> =
            vec![("HUB".to_owned(), PointKind::Hub, 0.0, 0.0)];
        points.extend(
            self.deliveries
                .iter()
                .enumerate()
                .map(|(i, (x, y))| (format!("D{}", i + 1), PointKind::Delivery, *x, *y)),
        );
        points.extend(
            self.recharges
                .iter()
                .enumerate()
                .map(|(i, (x, y))| (format!("R{}", i + 1), PointKind::Recharge, *x, *y)),
        );

        let mut builder = InstanceBuilder::new();
        for (id, kind, x, y) in &points {
            builder = builder.point(id.as_str(), *kind, *x, *y);
        }
        for (i, (a, _, ax, ay)) in points.iter().enumerate() {
            for (b, _, bx, by) in points.iter().skip(i + 1) {
                let distance = (ax - bx).hypot(ay - by).max(0.01);
                let weight = EdgeWeight::new(distance, distance / 100.0, distance);
                builder = builder.edge(a.as_str(), b.as_str(), weight);
            }
        }
        if let Some((min_x, min_y, max_x, max_y)) = self.zone {
            builder = builder.zone(square(min_x, min_y, max_x, max_y));
        }
        build(builder)
    }
}

/// Replay a plan and check it against every tour rule.
///
/// # Errors
/// Returns the [`RouteViolation`] found when the plan's route is not a valid
/// tour under `strategy` and `battery`.
pub fn check_plan(
    instance: &Instance,
    plan: &RoutePlan,
    strategy: Strategy,
    battery: &BatteryConfig,
) -> Result<(), RouteViolation> {
    let mut simulator = RouteSimulator::new(instance, CostPolicy::new(strategy, battery));
    simulator.simulate(plan.route.stops()).map(|_| ())
}

/// Identifiers of a plan's stops.
#[must_use]
pub fn plan_ids<'a>(instance: &'a Instance, plan: &RoutePlan) -> Vec<&'a str> {
    plan.route.ids(instance)
}

fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<Coord<f64>> {
    vec![
        Coord { x: min_x, y: min_y },
        Coord { x: max_x, y: min_y },
        Coord { x: max_x, y: max_y },
        Coord { x: min_x, y: max_y },
    ]
}

#[expect(
    clippy::expect_used,
    reason = "canned instances are valid by construction"
)]
fn build(builder: InstanceBuilder) -> Instance {
    builder.build().expect("canned instance is valid")
}
