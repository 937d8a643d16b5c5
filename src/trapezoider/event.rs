//! Sweep events and their angular total order.

use std::cmp::Ordering;

use crate::arrangement::{Arrangement, VertexId};
use crate::core::math::sign;
use crate::core::Direction;

/// A rotational-sweep event: the moment the ray from `v1` passes through
/// `v2`. Every ordered vertex pair is an event; most turn out to be no-ops.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Event {
    pub v1: VertexId,
    pub v2: VertexId,
}

impl Event {
    /// Direction (with magnitude) of the ray from `v1` to `v2`.
    pub fn ray(&self, arr: &Arrangement) -> Direction {
        let p1 = arr.point(self.v1);
        let p2 = arr.point(self.v2);
        Direction::from_points(&p1, &p2)
    }
}

/// Which side of the upward axis a direction falls on: +1 for the left
/// half-plane (dx < 0), -1 for the right, 0 on the axis.
#[inline]
fn axis_side(a: &Direction) -> i8 {
    -sign(a.dx)
}

/// True if `a1` is consumed strictly before `a2` in the sweep.
///
/// The traversal starts at (0, 1) and advances counterclockwise through a
/// single full turn. Exactly collinear same-sense rays tie on angle and are
/// broken by preferring the farther-apart vertex pair first.
fn before(a1: &Direction, a2: &Direction) -> bool {
    if a1.is_same_direction(a2) {
        return a1.vector().length_squared() > a2.vector().length_squared();
    }
    let s1 = axis_side(a1);
    let s2 = axis_side(a2);
    if s1 == 0 {
        return s2 == -1 || (a1.dy >= 0.0 && (s2 == 1 || a2.dy < 0.0));
    }
    if s2 == 0 {
        return s1 == 1 && a2.dy < 0.0;
    }
    if s1 == 1 {
        return s2 == -1 || sign(a2.cross(a1)) == -1;
    }
    s2 == -1 && sign(a2.cross(a1)) == -1
}

/// Total order over event angles; see [`before`].
pub(crate) fn compare_event_angles(a1: &Direction, a2: &Direction) -> Ordering {
    if a1 == a2 {
        return Ordering::Equal;
    }
    if before(a1, a2) {
        Ordering::Less
    } else if before(a2, a1) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}
