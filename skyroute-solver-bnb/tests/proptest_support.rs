//! Proptest strategies producing small, generated delivery instances.

use proptest::prelude::*;
use skyroute_core::test_support::InstanceLayout;

/// Strategy for a planar position on a coarse grid around the hub.
fn position() -> impl Strategy<Value = (f64, f64)> {
    (-8_i32..=8, -8_i32..=8).prop_map(|(x, y)| (f64::from(x), f64::from(y)))
}

/// Strategy for an axis-aligned obstacle that may or may not be present.
fn zone() -> impl Strategy<Value = Option<(f64, f64, f64, f64)>> {
    proptest::option::of(
        (position(), 1_i32..=3, 1_i32..=3).prop_map(|((x, y), w, h)| {
            (x + 0.5, y + 0.5, x + 0.5 + f64::from(w), y + 0.5 + f64::from(h))
        }),
    )
}

/// Strategy for layouts with up to `max_deliveries` deliveries and
/// `max_recharges` recharge points.
pub fn layout_strategy(
    max_deliveries: usize,
    max_recharges: usize,
) -> impl Strategy<Value = InstanceLayout> {
    (
        proptest::collection::vec(position(), 1..=max_deliveries),
        proptest::collection::vec(position(), 0..=max_recharges),
        zone(),
    )
        .prop_map(|(deliveries, recharges, zone)| InstanceLayout {
            deliveries,
            recharges,
            zone,
        })
}
