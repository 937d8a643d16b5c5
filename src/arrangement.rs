//! Planar subdivision of the room boundary.
//!
//! The boundary of a validated simple polygon induces an arrangement with
//! exactly two faces: the bounded interior (the *free* face the sensor moves
//! in) and the unbounded outside. Vertices all have degree two, so the
//! half-edge structure collapses to index arithmetic over the
//! counterclockwise vertex list: undirected edge `u` connects vertex `u` to
//! `u + 1 (mod n)`, its forward half-edge has id `2u` and keeps the free face
//! on its left, and `twin(h) = h ^ 1`.

use crate::core::math::{approx_eq, approx_zero, EPS};
use crate::core::{Direction, HalfPlaneSide, Line2D, Point2D, Polygon, Segment2D};
use crate::error::{Error, Result};

pub type VertexId = usize;
pub type HalfedgeId = usize;

/// Which extreme to take when searching edges around a vertex by angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinMax {
    Min,
    Max,
}

/// What lies vertically adjacent to a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalFeature {
    /// A boundary edge crosses the vertical ray; directed half-edge id.
    Edge(HalfedgeId),
    /// Another vertex at the same x coordinate.
    Vertex(VertexId),
    /// Nothing; the ray escapes to the unbounded face.
    Open,
}

#[derive(Debug, Clone)]
pub struct Arrangement {
    points: Vec<Point2D>,
}

impl Arrangement {
    /// Validate the scene boundary and build the arrangement.
    pub fn build(scene: &Polygon) -> Result<Self> {
        if scene.len() < 3 {
            return Err(Error::InvalidScene(format!(
                "boundary needs at least 3 vertices, got {}",
                scene.len()
            )));
        }
        let n = scene.len();
        for i in 0..n {
            let a = scene.points()[i];
            let b = scene.points()[(i + 1) % n];
            if a.distance(&b) <= EPS {
                return Err(Error::InvalidScene(format!(
                    "zero-length edge at vertex {i}"
                )));
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if scene.points()[i].distance(&scene.points()[j]) <= EPS {
                    return Err(Error::InvalidScene(format!(
                        "duplicate vertex: indices {i} and {j}"
                    )));
                }
            }
        }
        if !scene.is_simple() {
            return Err(Error::InvalidScene(
                "boundary is self-intersecting".to_owned(),
            ));
        }
        let ccw = scene.clone().to_ccw();
        log::debug!(
            "arrangement built: {} vertices, {} edges, 2 faces",
            ccw.len(),
            ccw.len()
        );
        Ok(Arrangement {
            points: ccw.points().to_vec(),
        })
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn point(&self, v: VertexId) -> Point2D {
        self.points[v]
    }

    #[inline]
    pub fn twin(&self, h: HalfedgeId) -> HalfedgeId {
        h ^ 1
    }

    #[inline]
    pub fn undirected(&self, h: HalfedgeId) -> usize {
        h >> 1
    }

    /// The half-edge of undirected edge `u` running with the boundary
    /// orientation (free face on its left).
    #[inline]
    pub fn forward(&self, u: usize) -> HalfedgeId {
        u << 1
    }

    #[inline]
    pub fn source(&self, h: HalfedgeId) -> VertexId {
        let u = h >> 1;
        if h & 1 == 0 {
            u
        } else {
            (u + 1) % self.points.len()
        }
    }

    #[inline]
    pub fn target(&self, h: HalfedgeId) -> VertexId {
        self.source(h ^ 1)
    }

    /// True if the free (interior) face lies on the left of the half-edge.
    #[inline]
    pub fn is_free(&self, h: HalfedgeId) -> bool {
        h & 1 == 0
    }

    /// The orientation of the same undirected edge that has the free face on
    /// its left.
    #[inline]
    pub fn direct_free(&self, h: HalfedgeId) -> HalfedgeId {
        h & !1
    }

    #[inline]
    pub fn segment(&self, h: HalfedgeId) -> Segment2D {
        Segment2D::new(self.point(self.source(h)), self.point(self.target(h)))
    }

    #[inline]
    pub fn direction(&self, h: HalfedgeId) -> Direction {
        let s = self.point(self.source(h));
        let t = self.point(self.target(h));
        Direction::from_points(&s, &t)
    }

    #[inline]
    pub fn line(&self, h: HalfedgeId) -> Line2D {
        let s = self.segment(h);
        Line2D::from_points(s.a, s.b)
    }

    /// The two half-edges whose source is `v`.
    #[inline]
    pub fn outgoing(&self, v: VertexId) -> [HalfedgeId; 2] {
        let n = self.points.len();
        let prev = (v + n - 1) % n;
        [self.forward(v), self.twin(self.forward(prev))]
    }

    /// The half-edge from `v1` to `v2`, if the boundary connects them.
    pub fn edge_between(&self, v1: VertexId, v2: VertexId) -> Option<HalfedgeId> {
        let n = self.points.len();
        if (v1 + 1) % n == v2 {
            Some(self.forward(v1))
        } else if (v2 + 1) % n == v1 {
            Some(self.twin(self.forward(v2)))
        } else {
            None
        }
    }

    /// The feature hit first by the upward vertical ray from vertex `v`.
    ///
    /// Edges with an endpoint at the same x coordinate as `v` are never
    /// reported as edges; their endpoint shows up as a `Vertex` feature
    /// instead, so callers can walk vertically aligned chains.
    pub fn feature_above(&self, v: VertexId) -> VerticalFeature {
        self.vertical_feature(v, true)
    }

    /// The feature hit first by the downward vertical ray from vertex `v`.
    pub fn feature_below(&self, v: VertexId) -> VerticalFeature {
        self.vertical_feature(v, false)
    }

    fn vertical_feature(&self, v: VertexId, above: bool) -> VerticalFeature {
        let p = self.point(v);
        let n = self.points.len();
        let mut best_vertex: Option<(f64, VertexId)> = None;
        for u in 0..n {
            if u == v {
                continue;
            }
            let q = self.point(u);
            if !approx_eq(q.x, p.x) {
                continue;
            }
            let dy = if above { q.y - p.y } else { p.y - q.y };
            if dy > EPS && best_vertex.map_or(true, |(d, _)| dy < d) {
                best_vertex = Some((dy, u));
            }
        }
        let mut best_edge: Option<(f64, usize)> = None;
        for u in 0..n {
            let a = self.point(u);
            let b = self.point((u + 1) % n);
            if approx_eq(a.x, p.x) || approx_eq(b.x, p.x) {
                continue;
            }
            if p.x <= a.x.min(b.x) || p.x >= a.x.max(b.x) {
                continue;
            }
            let y_at = a.y + (p.x - a.x) / (b.x - a.x) * (b.y - a.y);
            let dy = if above { y_at - p.y } else { p.y - y_at };
            if dy > EPS && best_edge.map_or(true, |(d, _)| dy < d) {
                best_edge = Some((dy, u));
            }
        }
        match (best_vertex, best_edge) {
            (Some((dv, u)), Some((de, _))) if dv <= de => VerticalFeature::Vertex(u),
            (Some((_, u)), None) => VerticalFeature::Vertex(u),
            (_, Some((_, e))) => {
                let h = self.forward(e);
                let want_neg_dx = above;
                let dir = self.direction(h);
                let ok = if want_neg_dx { dir.dx <= 0.0 } else { dir.dx >= 0.0 };
                VerticalFeature::Edge(if ok { h } else { self.twin(h) })
            }
            (None, None) => VerticalFeature::Open,
        }
    }

    /// Among `v`'s outgoing half-edges that point into the given half-plane
    /// of `angle`, find the angularly extreme one.
    pub fn find_edge_relative_to_angle(
        &self,
        v: VertexId,
        angle: &Direction,
        side: HalfPlaneSide,
        pick: MinMax,
    ) -> Option<HalfedgeId> {
        let mut best: Option<HalfedgeId> = None;
        for h in self.outgoing(v) {
            let dir = self.direction(h);
            if angle.side_of(&dir) != side {
                continue;
            }
            best = match best {
                None => Some(h),
                Some(b) => {
                    let better = match pick {
                        MinMax::Max => HalfPlaneSide::Left,
                        MinMax::Min => HalfPlaneSide::Right,
                    };
                    if self.direction(b).side_of(&dir) == better {
                        Some(h)
                    } else {
                        Some(b)
                    }
                }
            };
        }
        best
    }

    /// Outgoing half-edge of `v` that is vertical (upward or downward).
    pub fn find_edge_vertical(&self, v: VertexId, upward: bool) -> Option<HalfedgeId> {
        self.outgoing(v).into_iter().find(|&h| {
            let dir = self.direction(h);
            approx_zero(dir.dx) && if upward { dir.dy > EPS } else { dir.dy < -EPS }
        })
    }
}
