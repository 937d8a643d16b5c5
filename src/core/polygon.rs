//! Simple polygons: orientation, simplicity testing, point location and
//! convex clipping.

use serde::{Deserialize, Serialize};

use super::direction::HalfPlaneSide;
use super::line::{orient, Segment2D};
use super::math::EPS;
use super::point::Point2D;

/// An ordered vertex list, implicitly closed (last connects back to first).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point2D>,
}

impl Polygon {
    #[inline]
    pub fn new(points: Vec<Point2D>) -> Self {
        Polygon { points }
    }

    #[inline]
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The i-th boundary edge, from vertex i to vertex (i + 1) mod n.
    #[inline]
    pub fn edge(&self, i: usize) -> Segment2D {
        let n = self.points.len();
        Segment2D::new(self.points[i], self.points[(i + 1) % n])
    }

    /// Signed area via the shoelace formula; positive for counterclockwise
    /// vertex order.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut acc = 0.0;
        for i in 0..n {
            let a = &self.points[i];
            let b = &self.points[(i + 1) % n];
            acc += a.x * b.y - b.x * a.y;
        }
        acc / 2.0
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    #[inline]
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// The same polygon in counterclockwise vertex order.
    pub fn to_ccw(mut self) -> Polygon {
        if !self.is_ccw() {
            self.points.reverse();
        }
        self
    }

    /// True if the boundary neither self-intersects nor degenerates:
    /// no repeated vertices, no zero-length edges, no edge crossings, no
    /// collinear spurs at a vertex.
    pub fn is_simple(&self) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if self.points[i].distance(&self.points[j]) <= EPS {
                    return false;
                }
            }
        }
        for i in 0..n {
            // Adjacent edges: reject a spur (next edge folding back over the
            // previous one).
            let p = &self.points[i];
            let q = &self.points[(i + 1) % n];
            let r = &self.points[(i + 2) % n];
            if orient(p, q, r) == 0 && (*p - *q).dot(&(*r - *q)) > 0.0 {
                return false;
            }
            // Non-adjacent edge pairs must be disjoint.
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                if self.edge(i).intersects(&self.edge(j)) {
                    return false;
                }
            }
        }
        true
    }

    /// Even-odd point-in-polygon test. Boundary points count as inside.
    pub fn contains(&self, p: &Point2D) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        for i in 0..n {
            let e = self.edge(i);
            if e.line().has_on(p)
                && p.x >= e.a.x.min(e.b.x) - EPS
                && p.x <= e.a.x.max(e.b.x) + EPS
                && p.y >= e.a.y.min(e.b.y) - EPS
                && p.y <= e.a.y.max(e.b.y) + EPS
            {
                return true;
            }
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (pi, pj) = (&self.points[i], &self.points[j]);
            if (pi.y > p.y) != (pj.y > p.y) {
                let x = pi.x + (p.y - pi.y) / (pj.y - pi.y) * (pj.x - pi.x);
                if p.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Clip this polygon against a convex, counterclockwise-ordered clip
    /// region (Sutherland–Hodgman). The result may be empty.
    pub fn clip_convex(&self, clip: &Polygon) -> Polygon {
        debug_assert!(clip.is_ccw());
        let mut output = self.points.clone();
        for i in 0..clip.len() {
            if output.is_empty() {
                break;
            }
            let edge = clip.edge(i).line();
            let input = std::mem::take(&mut output);
            let m = input.len();
            for j in 0..m {
                let cur = input[j];
                let prev = input[(j + m - 1) % m];
                let cur_in = edge.oriented_side(&cur) != HalfPlaneSide::Right;
                let prev_in = edge.oriented_side(&prev) != HalfPlaneSide::Right;
                if cur_in {
                    if !prev_in {
                        if let Some(x) = edge.intersect(&Segment2D::new(prev, cur).line()) {
                            push_unique(&mut output, x);
                        }
                    }
                    push_unique(&mut output, cur);
                } else if prev_in {
                    if let Some(x) = edge.intersect(&Segment2D::new(prev, cur).line()) {
                        push_unique(&mut output, x);
                    }
                }
            }
        }
        while output.len() >= 2 && output[0].distance(output.last().unwrap()) <= EPS {
            output.pop();
        }
        Polygon::new(output)
    }

    /// Decompose a possibly weakly simple boundary into simple loops.
    ///
    /// Clipping a boundary that leaves and re-enters the clip region can
    /// trace zero-width spurs and pinch points (the same point visited
    /// twice). Spurs are stripped, pinches are surfaced as repeated
    /// vertices and the boundary is split there; loops that remain
    /// non-simple or degenerate are dropped.
    pub fn into_simple_pieces(self) -> Vec<Polygon> {
        let points = strip_spurs(self.points);
        if points.len() < 3 {
            return Vec::new();
        }
        let points = insert_edge_touches(points);
        let mut pieces = Vec::new();
        split_loops(points, &mut pieces);
        pieces
    }
}

/// Remove consecutive duplicates and fold-back spikes. Removing a spike can
/// expose another, so iterate to a fixed point.
fn strip_spurs(mut points: Vec<Point2D>) -> Vec<Point2D> {
    loop {
        if points.len() < 3 {
            points.clear();
            return points;
        }
        let mut removed = false;
        let mut i = 0;
        while points.len() >= 3 && i < points.len() {
            let n = points.len();
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            let spike =
                orient(&prev, &cur, &next) == 0 && (prev - cur).dot(&(next - cur)) > 0.0;
            if cur.distance(&prev) <= EPS || spike {
                points.remove(i);
                removed = true;
            } else {
                i += 1;
            }
        }
        if !removed {
            return points;
        }
    }
}

/// Insert every vertex that lies in the interior of a non-incident edge
/// into that edge, so pinch contacts become explicit repeated vertices.
fn insert_edge_touches(points: Vec<Point2D>) -> Vec<Point2D> {
    let n = points.len();
    let mut expanded = Vec::with_capacity(n);
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        expanded.push(a);
        let ab = b - a;
        let len_sq = ab.length_squared();
        let mut touches: Vec<(f64, Point2D)> = points
            .iter()
            .filter(|&p| {
                p.distance(&a) > EPS
                    && p.distance(&b) > EPS
                    && orient(&a, &b, p) == 0
                    && (*p - a).dot(&ab) > 0.0
                    && (*p - a).dot(&ab) < len_sq
            })
            .map(|p| ((*p - a).dot(&ab), *p))
            .collect();
        touches.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap());
        expanded.extend(touches.into_iter().map(|(_, p)| p));
    }
    expanded
}

/// Split a boundary at its first repeated vertex and recurse on both loops;
/// boundaries without repeats are kept when simple.
fn split_loops(points: Vec<Point2D>, out: &mut Vec<Polygon>) {
    let points = strip_spurs(points);
    let n = points.len();
    if n < 3 {
        return;
    }
    for i in 0..n {
        for j in (i + 1)..n {
            if points[i].distance(&points[j]) <= EPS {
                split_loops(points[i..j].to_vec(), out);
                let mut rest = points[j..].to_vec();
                rest.extend_from_slice(&points[..i]);
                split_loops(rest, out);
                return;
            }
        }
    }
    let poly = Polygon::new(points);
    if poly.is_simple() {
        out.push(poly);
    }
}

fn push_unique(points: &mut Vec<Point2D>, p: Point2D) {
    if points.last().map_or(true, |last| last.distance(&p) > EPS) {
        points.push(p);
    }
}
