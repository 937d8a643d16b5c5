//! A single cell of the decomposed configuration space.
//!
//! A trapezoid captures a maximal connected set of (position, orientation)
//! pairs sharing the same measured wall (*top* edge), the same wall behind
//! the sensor (*bottom* edge) and the same pair of limiting vertices. All
//! geometry is stored as concrete points, resolved when the sweep finalizes
//! the cell, so queries never need the boundary arrangement again.
//!
//! # Result curves
//!
//! For a fixed measured distance `d`, the locus of valid positions inside a
//! cell is bounded on each side by one of two curve families, depending on
//! whether the limiting vertex lies on the measured wall:
//! - on the wall: a circular *arc* of radius `d` around the vertex;
//! - off the wall: a *conchoid* traced by sliding the measuring ray over the
//!   vertex.
//!
//! Both are approximated by sampling the orientation interval; the sample
//! count scales with the cell's angular span.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::core::math::EPS;
use crate::core::{Direction, HalfPlaneSide, Line2D, Point2D, Polygon, Segment2D};
use crate::error::{Error, Result};

/// Result polygons smaller than this area are sampling artifacts.
const MIN_RESULT_AREA: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trapezoid {
    pub id: usize,
    /// The measured wall, directed so the free face lies on its left.
    pub top_edge: Segment2D,
    /// The wall behind the sensor, directed so the free face lies on its left.
    pub bottom_edge: Segment2D,
    pub left_vertex: Point2D,
    pub right_vertex: Point2D,
    /// First orientation (inclusive) of the cell's angle interval.
    pub angle_begin: Direction,
    /// Last orientation (exclusive) of the cell's angle interval.
    pub angle_end: Direction,
}

/// Direction halfway through the CCW interval from `begin` to `end`.
fn mid_direction(begin: &Direction, end: &Direction) -> Direction {
    let half = begin.angle_between(end) / 2.0;
    begin.rotated(half)
}

/// Split an edge's endpoints into (left, right) relative to a viewing
/// direction.
fn edge_left_right(edge: &Segment2D, dir: &Direction) -> (Point2D, Point2D) {
    let half_diff = (edge.a - edge.b) / 2.0;
    if dir.side_of_point(&half_diff) == HalfPlaneSide::Left {
        (edge.a, edge.b)
    } else {
        (edge.b, edge.a)
    }
}

impl Trapezoid {
    /// Footprint of the cell's positions at its middle orientation: the quad
    /// (or triangle, when the edges share a vertex) spanned by the top and
    /// bottom edges.
    pub fn bounds_2d(&self) -> Polygon {
        let v_mid = mid_direction(&self.angle_begin, &self.angle_end);
        let (top_left, top_right) = edge_left_right(&self.top_edge, &v_mid);
        let (bottom_left, bottom_right) = edge_left_right(&self.bottom_edge, &v_mid);
        let points = if top_left.distance(&bottom_left) <= EPS {
            vec![top_right, top_left, bottom_right]
        } else if top_right.distance(&bottom_right) <= EPS {
            vec![top_right, top_left, bottom_left]
        } else {
            vec![top_right, top_left, bottom_left, bottom_right]
        };
        Polygon::new(points).to_ccw()
    }

    /// Distance from `vertex` along `angle` to the bottom edge's line, for a
    /// vertex lying on the measured wall.
    fn arc_opening(&self, vertex: &Point2D, angle: &Direction) -> f64 {
        let bottom_line = self.bottom_edge.line();
        if bottom_line.has_on(vertex) {
            return 0.0;
        }
        match bottom_line.intersect(&Line2D::from_point_direction(*vertex, *angle)) {
            Some(inter) => vertex.distance(&inter),
            // Measuring direction parallel to the bottom wall: unbounded.
            None => f64::INFINITY,
        }
    }

    /// Distance between the top-line and bottom-line crossings of the line
    /// through `vertex` along `angle`.
    fn conchoid_opening(&self, vertex: &Point2D, angle: &Direction) -> f64 {
        let top_line = self.top_edge.line();
        let bottom_line = self.bottom_edge.line();
        let opening_line = Line2D::from_point_direction(*vertex, *angle);
        let inter1 = if top_line.has_on(vertex) {
            Some(*vertex)
        } else {
            top_line.intersect(&opening_line)
        };
        let inter2 = if bottom_line.has_on(vertex) {
            Some(*vertex)
        } else {
            bottom_line.intersect(&opening_line)
        };
        match (inter1, inter2) {
            (Some(p1), Some(p2)) => p1.distance(&p2),
            _ => f64::INFINITY,
        }
    }

    /// Extrema of the opening (top-to-bottom clearance along the measuring
    /// direction) over the whole cell.
    ///
    /// For any fixed orientation the opening is affine in the position across
    /// the cell, so the extrema are attained at the limiting vertices; per
    /// vertex the arc case has a closed form while the conchoid case needs a
    /// numeric search over the orientation interval.
    pub fn min_max_openings(&self, config: &SearchConfig) -> (f64, f64) {
        let top_line = self.top_edge.line();
        let span = self.angle_begin.ccw_span_to(&self.angle_end);
        let mut opening_min = f64::INFINITY;
        let mut opening_max = 0.0_f64;

        for limit_vertex in [&self.left_vertex, &self.right_vertex] {
            let (min, max);
            if top_line.has_on(limit_vertex) {
                // Arc: the minimum sits at the direction perpendicular to the
                // bottom edge, when the interval contains it.
                let m1 = self.arc_opening(limit_vertex, &-self.angle_begin);
                let m2 = self.arc_opening(limit_vertex, &-self.angle_end);
                max = m1.max(m2);
                let v_mid = mid_direction(&self.angle_begin, &self.angle_end);
                let (bottom_left, bottom_right) = edge_left_right(&self.bottom_edge, &v_mid);
                let perp = Direction::from_points(&bottom_left, &bottom_right).perpendicular_ccw();
                if perp.ccw_in_between(&self.angle_begin, &self.angle_end) {
                    min = self.arc_opening(limit_vertex, &-perp);
                } else {
                    min = m1.min(m2);
                }
            } else {
                // Conchoid: no closed form for the minimum; ternary search
                // over the orientation interval.
                let m1 = self.conchoid_opening(limit_vertex, &-self.angle_begin);
                let m2 = self.conchoid_opening(limit_vertex, &-self.angle_end);
                let mut best = m1.min(m2);
                max = m1.max(m2);
                let mut low = 0.0_f64;
                let mut high = span;
                let mut iters = 0u32;
                while high - low > config.angle_precision {
                    let third = (high - low) / 3.0;
                    let f1 = self.conchoid_opening(limit_vertex, &self.angle_begin.rotated(low + third));
                    let f2 = self.conchoid_opening(limit_vertex, &self.angle_begin.rotated(high - third));
                    if f1 <= f2 {
                        high -= third;
                    } else {
                        low += third;
                    }
                    iters += 1;
                    if iters >= config.max_search_iterations {
                        log::error!(
                            "trapezoid {}: opening-minimum search failed to converge",
                            self.id
                        );
                        break;
                    }
                }
                let mid = (low + high) / 2.0;
                best = best.min(self.conchoid_opening(limit_vertex, &self.angle_begin.rotated(mid)));
                min = best;
            }
            opening_min = opening_min.min(min);
            opening_max = opening_max.max(max);
        }
        (opening_min, opening_max)
    }

    /// All positions inside the cell from which measuring toward the top edge
    /// yields distance `d`, as one or two polygons.
    ///
    /// The orientation interval is split at the direction perpendicular to
    /// the top edge so each half yields a simple polygon: side curves are
    /// sampled, chained into a closed boundary and clipped by
    /// [`Trapezoid::bounds_2d`].
    pub fn calc_result_m1(&self, d: f64, config: &SearchConfig) -> Result<Vec<Polygon>> {
        if d <= 0.0 {
            return Err(Error::InvalidMeasurement(d));
        }
        log::debug!("trapezoid {}: single-measurement result for d={d}", self.id);

        // Orient the interval relative to the top edge (measuring runs
        // opposite the sensor orientation).
        let a_begin = -self.angle_begin;
        let a_end = -self.angle_end;
        debug_assert_eq!(a_begin.side_of(&a_end), HalfPlaneSide::Left);
        let top_edge_direction = self.top_edge.direction();
        let top_edge_line = self.top_edge.line();
        let trapezoid_bounds = self.bounds_2d();

        let mid_angle = top_edge_direction.perpendicular_ccw();
        let begin_before_mid = mid_angle.side_of(&a_begin) == HalfPlaneSide::Right;
        let end_after_mid = mid_angle.side_of(&a_end) == HalfPlaneSide::Left;
        let intervals = [
            (
                if begin_before_mid { a_begin } else { mid_angle },
                if end_after_mid { mid_angle } else { a_end },
            ),
            (
                if begin_before_mid { mid_angle } else { a_begin },
                if end_after_mid { a_end } else { mid_angle },
            ),
        ];

        let mut res = Vec::new();
        for (interval_idx, (i_begin, i_end)) in intervals.iter().enumerate() {
            let before_mid = interval_idx == 0;
            if i_begin.is_same_direction(i_end) {
                continue;
            }
            let angle_between = i_begin.angle_between(i_end);
            let appx_num = ((angle_between / (2.0 * std::f64::consts::PI))
                * config.curve_samples_per_turn as f64) as u32;

            // Sample the boundary curve contributed by each limiting vertex.
            let mut side_points: [Vec<Point2D>; 2] = [Vec::new(), Vec::new()];
            for (side, vertex) in [&self.left_vertex, &self.right_vertex].into_iter().enumerate() {
                let points = &mut side_points[side];
                let on_top = top_edge_line.has_on(vertex);
                let sample = |dir: &Direction| -> Option<Point2D> {
                    if on_top {
                        // Arc around the vertex.
                        Some(*vertex + dir.normalized() * d)
                    } else {
                        // Conchoid over the vertex.
                        let inter = top_edge_line
                            .intersect(&Line2D::from_point_direction(*vertex, *dir))?;
                        Some(inter + dir.normalized() * d)
                    }
                };
                if let Some(p) = sample(i_begin) {
                    points.push(p);
                }
                for i in 1..appx_num {
                    let dir = i_begin.rotated(i as f64 * angle_between / appx_num as f64);
                    if let Some(p) = sample(&dir) {
                        points.push(p);
                    }
                }
                if let Some(p) = sample(i_end) {
                    points.push(p);
                }
            }
            let [left_points, right_points] = side_points;
            if left_points.len() < 2 || right_points.len() < 2 {
                continue;
            }

            // Chain the two curves into one closed boundary, skipping
            // duplicated shared endpoints.
            let mut boundary: Vec<Point2D> = Vec::new();
            if before_mid {
                let skip_left = left_points[0].distance(&right_points[0]) <= EPS;
                boundary.extend(left_points.iter().skip(skip_left as usize));
                let skip_right =
                    right_points.last().unwrap().distance(left_points.last().unwrap()) <= EPS;
                boundary.extend(right_points.iter().rev().skip(skip_right as usize));
            } else {
                let skip_left =
                    left_points.last().unwrap().distance(right_points.last().unwrap()) <= EPS;
                boundary.extend(left_points.iter().rev().skip(skip_left as usize));
                let skip_right = right_points[0].distance(&left_points[0]) <= EPS;
                boundary.extend(right_points.iter().skip(skip_right as usize));
            }
            let res_unbounded = Polygon::new(boundary).to_ccw();
            let clipped = res_unbounded.clip_convex(&trapezoid_bounds);
            // Sampled curves grazing the cell bounds leave spurs and pinch
            // points on the clipped boundary; report simple loops only.
            for piece in clipped.into_simple_pieces() {
                if piece.area() > MIN_RESULT_AREA {
                    res.push(piece);
                }
            }
        }
        Ok(res)
    }

    /// All positions inside the cell from which opposite measurements toward
    /// the top and bottom edges sum to `d1 + d2`, as a polyline (segment
    /// chain, broken at invalid orientations).
    pub fn calc_result_m2(&self, d1: f64, d2: f64, config: &SearchConfig) -> Result<Vec<Segment2D>> {
        if d1 <= 0.0 {
            return Err(Error::InvalidMeasurement(d1));
        }
        if d2 <= 0.0 {
            return Err(Error::InvalidMeasurement(d2));
        }
        log::debug!(
            "trapezoid {}: double-measurement result for d1={d1} d2={d2}",
            self.id
        );
        let top_line = self.top_edge.line();
        let bottom_line = self.bottom_edge.line();

        let mut res = Vec::new();
        if let Some(inter_point) = top_line.intersect(&bottom_line) {
            // Walls are not parallel: for each orientation, the law of sines
            // gives the distance k from the wall intersection to the point
            // where the measuring ray meets the top wall.
            let angle_range = self.angle_begin.angle_between(&self.angle_end);
            let top_line_dir = -self.top_edge.direction();
            let bottom_line_dir = self.bottom_edge.direction();
            let bottom_line_angle = bottom_line_dir.angle();
            let a_begin = self.angle_begin.angle();
            let angle_between_edges = bottom_line_dir.angle_between(&top_line_dir);
            let k_dir = (self.top_edge.a.midpoint(&self.top_edge.b) - inter_point).normalized();
            let bottom_dir_line =
                Line2D::from_point_direction(self.bottom_edge.a, bottom_line_dir);

            let appx_num = (((angle_range / (2.0 * std::f64::consts::PI))
                * config.curve_samples_per_turn as f64) as u32)
                .max(1);
            let mut prev: Option<Point2D> = None;
            'samples: for i in 0..=appx_num {
                let a = i as f64 * angle_range / appx_num as f64;
                let dir = self.angle_begin.rotated(a);
                let t = a_begin + a - bottom_line_angle;
                let k = (d1 + d2) * t.sin() / angle_between_edges.sin();
                let k_squared = k * k;

                // Admissible k range from the limiting vertices.
                let mut k_limits = [0.0_f64; 2];
                for (side, vertex) in
                    [&self.left_vertex, &self.right_vertex].into_iter().enumerate()
                {
                    let measure_point = if top_line.has_on(vertex) {
                        *vertex
                    } else {
                        match top_line.intersect(&Line2D::from_point_direction(*vertex, dir)) {
                            Some(p) => p,
                            None => {
                                prev = None;
                                continue 'samples;
                            }
                        }
                    };
                    k_limits[side] = inter_point.distance_squared(&measure_point);
                }
                if k_limits[0] > k_limits[1] {
                    k_limits.swap(0, 1);
                }
                if !(k_limits[0] <= k_squared && k_squared <= k_limits[1]) {
                    prev = None;
                    continue;
                }

                let measure_point = inter_point + k_dir * k;
                let res_point = measure_point + (-dir).normalized() * d1;
                if bottom_dir_line.oriented_side(&res_point) == HalfPlaneSide::Right {
                    prev = None;
                    continue;
                }
                if let Some(p) = prev {
                    res.push(Segment2D::new(p, res_point));
                }
                prev = Some(res_point);
            }
        } else {
            // Parallel walls: the measuring direction is fixed up to
            // reflection, so the result is at most two segments.
            let lines_dis = top_line
                .parallel_distance(&bottom_line)
                .unwrap_or_default();
            let sum = d1 + d2;
            if lines_dis > sum {
                return Ok(res);
            }
            let bottom_line_dir = self.bottom_edge.direction();
            let local_angle = (lines_dis / sum).asin();
            for angle in [local_angle, std::f64::consts::PI - local_angle] {
                let dir = bottom_line_dir.rotated(angle);
                if !dir.ccw_in_between(&self.angle_begin, &self.angle_end) {
                    continue;
                }
                let mut points = [Point2D::ZERO; 2];
                let mut valid = true;
                for (side, vertex) in
                    [&self.left_vertex, &self.right_vertex].into_iter().enumerate()
                {
                    let measure_point = if top_line.has_on(vertex) {
                        *vertex
                    } else {
                        match top_line.intersect(&Line2D::from_point_direction(*vertex, dir)) {
                            Some(p) => p,
                            None => {
                                valid = false;
                                break;
                            }
                        }
                    };
                    points[side] = measure_point + (-dir).normalized() * d1;
                }
                if valid {
                    res.push(Segment2D::new(points[0], points[1]));
                }
            }
        }
        Ok(res)
    }
}

impl fmt::Display for Trapezoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "T{} deg [{:.1}, {:.1}) top ({:.2},{:.2})->({:.2},{:.2}) bottom ({:.2},{:.2})->({:.2},{:.2}) left ({:.2},{:.2}) right ({:.2},{:.2})",
            self.id,
            self.angle_begin.angle().to_degrees(),
            self.angle_end.angle().to_degrees(),
            self.top_edge.a.x,
            self.top_edge.a.y,
            self.top_edge.b.x,
            self.top_edge.b.y,
            self.bottom_edge.a.x,
            self.bottom_edge.a.y,
            self.bottom_edge.b.x,
            self.bottom_edge.b.y,
            self.left_vertex.x,
            self.left_vertex.y,
            self.right_vertex.x,
            self.right_vertex.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pt(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    /// The full-width cell of a 10x10 room, orientations from straight up to
    /// up-left diagonal: measured wall on top, wall behind at the bottom.
    fn make_room_cell() -> Trapezoid {
        Trapezoid {
            id: 0,
            top_edge: Segment2D::new(pt(10.0, 10.0), pt(0.0, 10.0)),
            bottom_edge: Segment2D::new(pt(0.0, 0.0), pt(10.0, 0.0)),
            left_vertex: pt(0.0, 10.0),
            right_vertex: pt(10.0, 10.0),
            angle_begin: Direction::new(0.0, 1.0),
            angle_end: Direction::new(-1.0, 1.0),
        }
    }

    #[test]
    fn test_bounds_2d() {
        let t = make_room_cell();
        let bounds = t.bounds_2d();
        assert_eq!(bounds.len(), 4);
        assert!(bounds.is_ccw());
        assert_relative_eq!(bounds.area(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bounds_2d_triangle() {
        // Top and bottom edges sharing a vertex degenerate to a triangle.
        let t = Trapezoid {
            id: 0,
            top_edge: Segment2D::new(pt(10.0, 10.0), pt(0.0, 10.0)),
            bottom_edge: Segment2D::new(pt(0.0, 10.0), pt(0.0, 0.0)).reversed(),
            left_vertex: pt(0.0, 0.0),
            right_vertex: pt(10.0, 10.0),
            angle_begin: Direction::new(1.0, 1.0),
            angle_end: Direction::new(0.5, 1.0),
        };
        let bounds = t.bounds_2d();
        assert_eq!(bounds.len(), 3);
    }

    #[test]
    fn test_min_max_openings_arc() {
        let t = make_room_cell();
        let (min, max) = t.min_max_openings(&SearchConfig::default());
        // Straight-up measuring gives 10; the 45 degree extreme gives the
        // diagonal clearance.
        assert_relative_eq!(min, 10.0, epsilon = 1e-6);
        assert_relative_eq!(max, 200.0_f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_min_max_openings_conchoid() {
        // Limiting vertices off the top line force the numeric search.
        let t = Trapezoid {
            id: 0,
            top_edge: Segment2D::new(pt(10.0, 10.0), pt(0.0, 10.0)),
            bottom_edge: Segment2D::new(pt(0.0, 0.0), pt(10.0, 0.0)),
            left_vertex: pt(2.0, 0.0),
            right_vertex: pt(8.0, 0.0),
            angle_begin: Direction::new(0.0, 1.0),
            angle_end: Direction::new(-1.0, 1.0),
        };
        let (min, max) = t.min_max_openings(&SearchConfig::default());
        assert_relative_eq!(min, 10.0, epsilon = 1e-3);
        assert_relative_eq!(max, 200.0_f64.sqrt(), epsilon = 1e-6);
        assert!(min <= max);
    }

    #[test]
    fn test_calc_result_m1() {
        let t = make_room_cell();
        let config = SearchConfig::default();
        let res = t.calc_result_m1(10.5, &config).unwrap();
        assert!(!res.is_empty());
        let bounds = t.bounds_2d();
        for poly in &res {
            assert!(poly.len() >= 3);
            assert!(poly.is_simple(), "non-simple result region {poly:?}");
            for p in poly.points() {
                assert!(bounds.contains(p), "result point {p:?} escapes the cell");
            }
        }
        // Out of range: larger than the maximal opening.
        let res = t.calc_result_m1(15.0, &config).unwrap();
        assert!(res.is_empty());
    }

    #[test]
    fn test_calc_result_m1_regions_stay_simple() {
        // A narrow cell whose bounds the sampled curves graze; clipping such
        // curves is where degenerate boundary loops used to appear.
        let t = Trapezoid {
            id: 0,
            top_edge: Segment2D::new(pt(10.0, 10.0), pt(0.0, 10.0)),
            bottom_edge: Segment2D::new(pt(0.0, 0.0), pt(10.0, 0.0)),
            left_vertex: pt(2.0, 0.0),
            right_vertex: pt(8.0, 0.0),
            angle_begin: Direction::new(0.0, 1.0),
            angle_end: Direction::new(-1.0, 1.0),
        };
        let config = SearchConfig::default();
        let (min, max) = t.min_max_openings(&config);
        for step in 0..8 {
            let d = min + (max - min) * step as f64 / 7.0;
            if d <= 0.0 {
                continue;
            }
            for poly in t.calc_result_m1(d, &config).unwrap() {
                assert!(
                    poly.is_simple(),
                    "d={d}: non-simple result region {poly:?}"
                );
            }
        }
    }

    #[test]
    fn test_calc_result_m1_rejects_nonpositive() {
        let t = make_room_cell();
        let config = SearchConfig::default();
        assert!(matches!(
            t.calc_result_m1(0.0, &config),
            Err(Error::InvalidMeasurement(_))
        ));
        assert!(matches!(
            t.calc_result_m1(-1.0, &config),
            Err(Error::InvalidMeasurement(_))
        ));
    }

    #[test]
    fn test_calc_result_m2_parallel() {
        let t = make_room_cell();
        let config = SearchConfig::default();
        // Sum 12 across a 10-wide corridor: tilted crossing, y level set by
        // the d1/d2 split.
        let res = t.calc_result_m2(6.0, 6.0, &config).unwrap();
        assert_eq!(res.len(), 1);
        let seg = &res[0];
        assert_relative_eq!(seg.a.y, 5.0, epsilon = 1e-9);
        assert_relative_eq!(seg.b.y, 5.0, epsilon = 1e-9);
        assert_relative_eq!(seg.length(), 10.0, epsilon = 1e-9);
        // Sum below the wall distance: impossible.
        let res = t.calc_result_m2(4.0, 4.0, &config).unwrap();
        assert!(res.is_empty());
    }

    #[test]
    fn test_calc_result_m2_non_parallel() {
        // Perpendicular walls meeting at the origin corner.
        let t = Trapezoid {
            id: 0,
            top_edge: Segment2D::new(pt(10.0, 10.0), pt(0.0, 10.0)),
            bottom_edge: Segment2D::new(pt(0.0, 10.0), pt(0.0, 0.0)),
            left_vertex: pt(5.0, 0.0),
            right_vertex: pt(10.0, 10.0),
            angle_begin: Direction::new(1.0, 1.0),
            angle_end: Direction::new(0.2, 1.0),
        };
        let config = SearchConfig::default();
        let res = t.calc_result_m2(10.0, 8.0, &config).unwrap();
        assert!(!res.is_empty());
        for seg in &res {
            // Every reported position must measure d1 toward the top wall
            // and d2 toward the left wall along opposite directions.
            for p in [seg.a, seg.b] {
                assert!(p.x > 0.0 && p.y < 10.0);
            }
        }
    }

    #[test]
    fn test_display() {
        let t = make_room_cell();
        let s = format!("{t}");
        assert!(s.starts_with("T0"));
        assert!(s.contains("deg"));
    }
}
