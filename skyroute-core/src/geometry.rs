//! Segment orientation and intersection primitives.
//!
//! All predicates compare floating-point values exactly. Touching a zone
//! boundary, sharing an endpoint with it, or overlapping one of its edges
//! collinearly all count as crossing, so near-degenerate inputs err on the
//! side of rejecting a segment.

use geo::Coord;

use crate::NoFlyZone;

/// Turn direction of the ordered triple `(a, b, c)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// `c` lies to the left of the directed line `a -> b`.
    CounterClockwise,
    /// `c` lies to the right of the directed line `a -> b`.
    Clockwise,
    /// The three points are collinear (or the cross product is not a number).
    Collinear,
}

impl Orientation {
    /// Classify the sign of [`orientation`].
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use skyroute_core::geometry::Orientation;
    ///
    /// let turn = Orientation::of(
    ///     Coord { x: 0.0, y: 0.0 },
    ///     Coord { x: 1.0, y: 0.0 },
    ///     Coord { x: 1.0, y: 1.0 },
    /// );
    /// assert_eq!(turn, Orientation::CounterClockwise);
    /// ```
    #[must_use]
    pub fn of(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> Self {
        let cross = orientation(a, b, c);
        if cross > 0.0 {
            Self::CounterClockwise
        } else if cross < 0.0 {
            Self::Clockwise
        } else {
            Self::Collinear
        }
    }

    const fn opposes(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Clockwise, Self::CounterClockwise) | (Self::CounterClockwise, Self::Clockwise)
        )
    }
}

/// Cross product of `(b - a)` and `(c - a)`.
///
/// Positive for a counter-clockwise turn, negative for clockwise and zero when
/// the points are collinear.
#[must_use]
pub fn orientation(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Whether `c` lies inside the bounding box of segment `a`–`b`.
///
/// Only meaningful once collinearity has been established.
#[must_use]
pub fn on_segment(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> bool {
    a.x.min(b.x) <= c.x && c.x <= a.x.max(b.x) && a.y.min(b.y) <= c.y && c.y <= a.y.max(b.y)
}

/// Whether segment `a`–`b` intersects segment `c`–`d`.
///
/// Proper crossings are detected from opposing orientations; touching and
/// collinear overlaps are detected from a zero orientation together with a
/// bounding-box containment check.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use skyroute_core::geometry::segments_intersect;
///
/// let crossing = segments_intersect(
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 2.0, y: 2.0 },
///     Coord { x: 0.0, y: 2.0 },
///     Coord { x: 2.0, y: 0.0 },
/// );
/// assert!(crossing);
/// ```
#[must_use]
pub fn segments_intersect(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>, d: Coord<f64>) -> bool {
    let o1 = Orientation::of(a, b, c);
    let o2 = Orientation::of(a, b, d);
    let o3 = Orientation::of(c, d, a);
    let o4 = Orientation::of(c, d, b);

    if o1.opposes(o2) && o3.opposes(o4) {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(a, b, c))
        || (o2 == Orientation::Collinear && on_segment(a, b, d))
        || (o3 == Orientation::Collinear && on_segment(c, d, a))
        || (o4 == Orientation::Collinear && on_segment(c, d, b))
}

/// Whether the segment `p1`–`p2` touches or crosses any edge of any zone.
#[must_use]
pub fn crosses_no_fly(p1: Coord<f64>, p2: Coord<f64>, zones: &[NoFlyZone]) -> bool {
    zones
        .iter()
        .flat_map(NoFlyZone::edges)
        .any(|(a, b)| segments_intersect(p1, p2, a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn square(min: f64, max: f64) -> NoFlyZone {
        NoFlyZone::new(vec![c(min, min), c(max, min), c(max, max), c(min, max)])
            .expect("square has four vertices")
    }

    #[rstest]
    #[case(c(1.0, 0.0), c(1.0, 1.0), Orientation::CounterClockwise)]
    #[case(c(1.0, 0.0), c(1.0, -1.0), Orientation::Clockwise)]
    #[case(c(1.0, 0.0), c(2.0, 0.0), Orientation::Collinear)]
    fn orientation_classifies_turns(
        #[case] b: Coord<f64>,
        #[case] third: Coord<f64>,
        #[case] expected: Orientation,
    ) {
        assert_eq!(Orientation::of(c(0.0, 0.0), b, third), expected);
    }

    #[rstest]
    fn nan_orientation_is_treated_as_collinear() {
        let turn = Orientation::of(c(0.0, 0.0), c(f64::NAN, 0.0), c(1.0, 1.0));
        assert_eq!(turn, Orientation::Collinear);
    }

    #[rstest]
    #[case::proper_crossing(c(0.0, 0.0), c(2.0, 2.0), c(0.0, 2.0), c(2.0, 0.0), true)]
    #[case::parallel(c(0.0, 0.0), c(2.0, 0.0), c(0.0, 1.0), c(2.0, 1.0), false)]
    #[case::shared_endpoint(c(0.0, 0.0), c(1.0, 1.0), c(1.0, 1.0), c(2.0, 0.0), true)]
    #[case::t_junction(c(0.0, 0.0), c(2.0, 0.0), c(1.0, 0.0), c(1.0, 5.0), true)]
    #[case::collinear_overlap(c(0.0, 0.0), c(3.0, 0.0), c(2.0, 0.0), c(5.0, 0.0), true)]
    #[case::collinear_disjoint(c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0), c(3.0, 0.0), false)]
    #[case::near_miss(c(0.0, 0.0), c(1.0, 1.0), c(1.0, 1.5), c(2.0, 0.0), false)]
    fn segment_intersection_cases(
        #[case] a: Coord<f64>,
        #[case] b: Coord<f64>,
        #[case] p: Coord<f64>,
        #[case] q: Coord<f64>,
        #[case] expected: bool,
    ) {
        assert_eq!(segments_intersect(a, b, p, q), expected);
    }

    #[rstest]
    fn zero_length_segment_does_not_panic() {
        let point = c(1.0, 1.0);
        assert!(segments_intersect(point, point, c(0.0, 1.0), c(2.0, 1.0)));
        assert!(!segments_intersect(point, point, c(0.0, 0.0), c(2.0, 0.0)));
    }

    #[rstest]
    #[case::through_zone(c(-1.0, 1.0), c(3.0, 1.0), true)]
    #[case::inside_then_out(c(1.0, 1.0), c(5.0, 5.0), true)]
    #[case::diagonal_through_corners(c(-1.0, 3.0), c(3.0, -1.0), true)]
    #[case::clear(c(-1.0, -1.0), c(-1.0, 5.0), false)]
    fn no_fly_crossing_cases(
        #[case] from: Coord<f64>,
        #[case] to: Coord<f64>,
        #[case] expected: bool,
    ) {
        let zones = vec![square(0.0, 2.0)];
        assert_eq!(crosses_no_fly(from, to, &zones), expected);
    }

    #[rstest]
    fn segment_fully_inside_zone_is_not_detected() {
        // Only boundary edges are tested; containment is out of scope.
        let zones = vec![square(0.0, 4.0)];
        assert!(!crosses_no_fly(c(1.0, 1.0), c(2.0, 2.0), &zones));
    }

    #[rstest]
    fn collinear_zone_vertices_do_not_panic() {
        let flat = NoFlyZone::new(vec![c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0)])
            .expect("three vertices");
        assert!(crosses_no_fly(c(1.0, -1.0), c(1.0, 1.0), &[flat]));
    }
}
