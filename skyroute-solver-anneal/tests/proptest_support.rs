//! Proptest strategies producing small, generated delivery instances.

use proptest::prelude::*;
use skyroute_core::test_support::InstanceLayout;

/// Strategy for a planar position on a grid of radius `reach` around the hub.
fn position(reach: i32) -> impl Strategy<Value = (f64, f64)> {
    (-reach..=reach, -reach..=reach).prop_map(|(x, y)| (f64::from(x), f64::from(y)))
}

/// Strategy for an axis-aligned obstacle that may or may not be present.
fn zone() -> impl Strategy<Value = Option<(f64, f64, f64, f64)>> {
    proptest::option::of(
        (position(8), 1_i32..=3, 1_i32..=3).prop_map(|((x, y), w, h)| {
            (x + 0.5, y + 0.5, x + 0.5 + f64::from(w), y + 0.5 + f64::from(h))
        }),
    )
}

/// Strategy for layouts with up to `max_deliveries` deliveries and
/// `max_recharges` recharge points, possibly behind an obstacle.
pub fn layout_strategy(
    max_deliveries: usize,
    max_recharges: usize,
) -> impl Strategy<Value = InstanceLayout> {
    (
        proptest::collection::vec(position(8), 1..=max_deliveries),
        proptest::collection::vec(position(8), 0..=max_recharges),
        zone(),
    )
        .prop_map(|(deliveries, recharges, zone)| InstanceLayout {
            deliveries,
            recharges,
            zone,
        })
}

/// Strategy for obstacle-free layouts close enough to the hub that any
/// visiting order fits in one charge.
pub fn compact_layout_strategy() -> impl Strategy<Value = InstanceLayout> {
    (
        proptest::collection::vec(position(3), 1..=3),
        proptest::collection::vec(position(3), 0..=1),
    )
        .prop_map(|(deliveries, recharges)| InstanceLayout {
            deliveries,
            recharges,
            zone: None,
        })
}
