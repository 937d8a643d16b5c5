//! Unnormalized 2D directions and half-plane classification.
//!
//! Orientations in the configuration space are represented as `Direction`
//! values rather than raw angles: most of the sweep's decisions are sign
//! predicates on cross products, which stay exact longer than trigonometry.

use serde::{Deserialize, Serialize};
use std::ops::Neg;

use super::math::{normalize_angle, safe_acos, sign, EPS};
use super::point::Point2D;

/// Which side of a directed line (or direction through the origin) a point
/// falls on. `Left` is the counterclockwise side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfPlaneSide {
    On,
    Left,
    Right,
}

/// A direction in the plane, carrying its (unnormalized) vector.
///
/// Equality is componentwise; use [`Direction::is_same_direction`] for the
/// geometric "same heading" test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    pub dx: f64,
    pub dy: f64,
}

impl Direction {
    #[inline]
    pub fn new(dx: f64, dy: f64) -> Self {
        Direction { dx, dy }
    }

    /// Direction of the ray from `a` to `b`, keeping the magnitude.
    #[inline]
    pub fn from_points(a: &Point2D, b: &Point2D) -> Self {
        Direction::new(b.x - a.x, b.y - a.y)
    }

    #[inline]
    pub fn vector(&self) -> Point2D {
        Point2D::new(self.dx, self.dy)
    }

    /// Unit vector of this direction.
    #[inline]
    pub fn normalized(&self) -> Point2D {
        self.vector().normalized()
    }

    /// Angle of the direction in radians, normalized to [0, 2π).
    #[inline]
    pub fn angle(&self) -> f64 {
        normalize_angle(self.dy.atan2(self.dx))
    }

    #[inline]
    pub fn cross(&self, other: &Direction) -> f64 {
        self.dx * other.dy - self.dy * other.dx
    }

    #[inline]
    pub fn dot(&self, other: &Direction) -> f64 {
        self.dx * other.dx + self.dy * other.dy
    }

    /// Classify which half-plane of this direction `p` falls in.
    #[inline]
    pub fn side_of_point(&self, p: &Point2D) -> HalfPlaneSide {
        match sign(self.dx * p.y - self.dy * p.x) {
            1 => HalfPlaneSide::Left,
            -1 => HalfPlaneSide::Right,
            _ => HalfPlaneSide::On,
        }
    }

    /// Classify which half-plane of this direction `other` points into.
    #[inline]
    pub fn side_of(&self, other: &Direction) -> HalfPlaneSide {
        self.side_of_point(&other.vector())
    }

    /// True if the two directions are parallel and point the same way.
    #[inline]
    pub fn is_same_direction(&self, other: &Direction) -> bool {
        self.cross(other).abs() <= EPS && self.dot(other) > 0.0
    }

    /// Counterclockwise perpendicular (left turn by 90°).
    #[inline]
    pub fn perpendicular_ccw(&self) -> Direction {
        Direction::new(-self.dy, self.dx)
    }

    /// Clockwise perpendicular (right turn by 90°).
    #[inline]
    pub fn perpendicular_cw(&self) -> Direction {
        Direction::new(self.dy, -self.dx)
    }

    /// Rotate the direction counterclockwise by `rad` radians.
    #[inline]
    pub fn rotated(&self, rad: f64) -> Direction {
        let v = self.vector().rotated(rad);
        Direction::new(v.x, v.y)
    }

    /// Unsigned angle between the two directions, in [0, π].
    #[inline]
    pub fn angle_between(&self, other: &Direction) -> f64 {
        safe_acos(self.normalized().dot(&other.normalized()))
    }

    /// Counterclockwise angular span from `self` to `other`, in [0, 2π).
    #[inline]
    pub fn ccw_span_to(&self, other: &Direction) -> f64 {
        normalize_angle(other.angle() - self.angle())
    }

    /// True if this direction lies strictly inside the counterclockwise
    /// interval from `from` to `to`.
    pub fn ccw_in_between(&self, from: &Direction, to: &Direction) -> bool {
        let span = from.ccw_span_to(to);
        let offset = from.ccw_span_to(self);
        offset > EPS && offset < span - EPS
    }
}

impl Neg for Direction {
    type Output = Direction;
    #[inline]
    fn neg(self) -> Direction {
        Direction::new(-self.dx, -self.dy)
    }
}
