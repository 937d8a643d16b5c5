//! Infinite lines and segments.

use serde::{Deserialize, Serialize};

use super::direction::{Direction, HalfPlaneSide};
use super::math::{sign, EPS};
use super::point::Point2D;

/// An infinite directed line through `origin` along `dir`.
#[derive(Debug, Clone, Copy)]
pub struct Line2D {
    pub origin: Point2D,
    pub dir: Point2D,
}

impl Line2D {
    #[inline]
    pub fn from_points(a: Point2D, b: Point2D) -> Self {
        Line2D { origin: a, dir: b - a }
    }

    #[inline]
    pub fn from_point_direction(p: Point2D, d: Direction) -> Self {
        Line2D {
            origin: p,
            dir: d.vector(),
        }
    }

    /// Which side of the directed line `p` falls on (`Left` = CCW side).
    #[inline]
    pub fn oriented_side(&self, p: &Point2D) -> HalfPlaneSide {
        match sign(self.dir.cross(&(*p - self.origin))) {
            1 => HalfPlaneSide::Left,
            -1 => HalfPlaneSide::Right,
            _ => HalfPlaneSide::On,
        }
    }

    /// Perpendicular distance from `p` to the line.
    #[inline]
    pub fn distance_to(&self, p: &Point2D) -> f64 {
        self.dir.normalized().cross(&(*p - self.origin)).abs()
    }

    /// True if `p` lies on the line within the global tolerance.
    #[inline]
    pub fn has_on(&self, p: &Point2D) -> bool {
        self.distance_to(p) <= EPS
    }

    /// Intersection point of two lines, `None` when (near-)parallel.
    pub fn intersect(&self, other: &Line2D) -> Option<Point2D> {
        let denom = self.dir.cross(&other.dir);
        if denom.abs() <= EPS * self.dir.length() * other.dir.length() {
            return None;
        }
        let t = (other.origin - self.origin).cross(&other.dir) / denom;
        Some(self.origin + self.dir * t)
    }

    /// Distance between two parallel lines; `None` if the lines are not
    /// parallel.
    pub fn parallel_distance(&self, other: &Line2D) -> Option<f64> {
        let denom = self.dir.cross(&other.dir);
        if denom.abs() > EPS * self.dir.length() * other.dir.length() {
            return None;
        }
        Some(self.distance_to(&other.origin))
    }
}

/// A closed segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment2D {
    pub a: Point2D,
    pub b: Point2D,
}

impl Segment2D {
    #[inline]
    pub fn new(a: Point2D, b: Point2D) -> Self {
        Segment2D { a, b }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.a.distance(&self.b)
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        Direction::from_points(&self.a, &self.b)
    }

    #[inline]
    pub fn line(&self) -> Line2D {
        Line2D::from_points(self.a, self.b)
    }

    #[inline]
    pub fn reversed(&self) -> Segment2D {
        Segment2D::new(self.b, self.a)
    }

    /// True if the two closed segments share at least one point.
    pub fn intersects(&self, other: &Segment2D) -> bool {
        let o1 = orient(&self.a, &self.b, &other.a);
        let o2 = orient(&self.a, &self.b, &other.b);
        let o3 = orient(&other.a, &other.b, &self.a);
        let o4 = orient(&other.a, &other.b, &self.b);
        if o1 != o2 && o3 != o4 && o1 * o2 <= 0 && o3 * o4 <= 0 {
            return true;
        }
        (o1 == 0 && on_box(&self.a, &self.b, &other.a))
            || (o2 == 0 && on_box(&self.a, &self.b, &other.b))
            || (o3 == 0 && on_box(&other.a, &other.b, &self.a))
            || (o4 == 0 && on_box(&other.a, &other.b, &self.b))
    }
}

/// Orientation sign of the point triple (a, b, c).
#[inline]
pub fn orient(a: &Point2D, b: &Point2D, c: &Point2D) -> i8 {
    sign((*b - *a).cross(&(*c - *a)))
}

#[inline]
fn on_box(a: &Point2D, b: &Point2D, p: &Point2D) -> bool {
    p.x >= a.x.min(b.x) - EPS
        && p.x <= a.x.max(b.x) + EPS
        && p.y >= a.y.min(b.y) - EPS
        && p.y <= a.y.max(b.y) + EPS
}
