//! Geometry substrate: points, directions, lines, segments and polygons.

pub mod direction;
pub mod line;
pub mod math;
pub mod point;
pub mod polygon;

pub use direction::{Direction, HalfPlaneSide};
pub use line::{Line2D, Segment2D};
pub use point::Point2D;
pub use polygon::Polygon;
