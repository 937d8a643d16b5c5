//! 2D Cartesian points and vector arithmetic.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A point (or free vector) in the room's Cartesian frame, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ZERO: Point2D = Point2D { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Point2D { x, y }
    }

    /// Dot product, treating both points as vectors from the origin.
    #[inline]
    pub fn dot(&self, other: &Point2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z-component of the 3D cross product of the two vectors.
    ///
    /// Positive when `other` is a counterclockwise turn from `self`.
    #[inline]
    pub fn cross(&self, other: &Point2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn distance(&self, other: &Point2D) -> f64 {
        (*self - *other).length()
    }

    #[inline]
    pub fn distance_squared(&self, other: &Point2D) -> f64 {
        (*self - *other).length_squared()
    }

    /// Unit vector in the same direction. Zero-length input yields zero.
    #[inline]
    pub fn normalized(&self) -> Point2D {
        let len = self.length();
        if len <= f64::MIN_POSITIVE {
            Point2D::ZERO
        } else {
            Point2D::new(self.x / len, self.y / len)
        }
    }

    /// Rotate the vector counterclockwise by `rad` radians about the origin.
    #[inline]
    pub fn rotated(&self, rad: f64) -> Point2D {
        let (sin, cos) = rad.sin_cos();
        Point2D::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Midpoint between two points.
    #[inline]
    pub fn midpoint(&self, other: &Point2D) -> Point2D {
        Point2D::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl Add for Point2D {
    type Output = Point2D;
    #[inline]
    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2D {
    type Output = Point2D;
    #[inline]
    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2D {
    type Output = Point2D;
    #[inline]
    fn mul(self, s: f64) -> Point2D {
        Point2D::new(self.x * s, self.y * s)
    }
}

impl Div<f64> for Point2D {
    type Output = Point2D;
    #[inline]
    fn div(self, s: f64) -> Point2D {
        Point2D::new(self.x / s, self.y / s)
    }
}

impl Neg for Point2D {
    type Output = Point2D;
    #[inline]
    fn neg(self) -> Point2D {
        Point2D::new(-self.x, -self.y)
    }
}
