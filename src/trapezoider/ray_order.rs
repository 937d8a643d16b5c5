//! Ordering of boundary edges by proximity to a sweep-ray origin.
//!
//! During the rotational sweep, each vertex keeps the set of edges its ray
//! currently crosses, ordered so the first element is the edge the ray hits
//! first. The order must be a pure total order independent of the current
//! ray angle: for two non-crossing boundary edges visible from `q`, the
//! closer one has both endpoints weakly on `q`'s side of the other's
//! supporting line; at most one of the two edges straddles the other's line,
//! in which case the straddled test decides from the other side. Fully
//! collinear edges fall back to endpoint distances.

use std::cmp::Ordering;

use crate::arrangement::Arrangement;
use crate::core::line::orient;
use crate::core::Point2D;

/// Vertex classification around the base point, used when the two edges
/// share an endpoint. Collinear-and-nearer sorts before the turning cases so
/// the shared-endpoint order stays consistent with the general one.
fn vertex_class(q: &Point2D, c: &Point2D, p: &Point2D) -> u8 {
    match orient(q, c, p) {
        0 => {
            if q.distance_squared(c) < q.distance_squared(p) {
                0
            } else {
                3
            }
        }
        -1 => 1,
        _ => 2,
    }
}

/// True if edge `(s1, t1)` is hit before edge `(s2, t2)` by rays from `q`.
fn closer_than(q: &Point2D, (s1, t1): (Point2D, Point2D), (s2, t2): (Point2D, Point2D)) -> bool {
    // Shared-endpoint cases: classify the two free endpoints around the
    // shared one.
    let shared = [(s1, t1, s2, t2), (s1, t1, t2, s2), (t1, s1, s2, t2), (t1, s1, t2, s2)]
        .into_iter()
        .find(|(c, _, c2, _)| c.distance_squared(c2) == 0.0);
    if let Some((c, p1, _, p2)) = shared {
        let vt1 = vertex_class(q, &c, &p1);
        let vt2 = vertex_class(q, &c, &p2);
        if vt1 != vt2 {
            return vt1 > vt2;
        }
        return orient(&c, &p2, &p1) == orient(&c, &p2, q);
    }

    let o1 = orient(&s1, &t1, q);
    if o1 == 0 {
        // q lies on e1's supporting line.
        let os1 = orient(&s2, &t2, &s1);
        let ot1 = orient(&s2, &t2, &t1);
        if orient(&s1, &t1, &s2) == 0 && orient(&s1, &t1, &t2) == 0 {
            // All four points collinear: nearer endpoints win.
            return q.distance_squared(&s1) < q.distance_squared(&s2)
                || q.distance_squared(&t1) < q.distance_squared(&t2);
        }
        let side = if os1 == 0 { ot1 } else { os1 };
        return side == orient(&s2, &t2, q);
    }

    let os2 = orient(&s1, &t1, &s2);
    let ot2 = orient(&s1, &t1, &t2);
    if os2 == 0 {
        // s2 on e1's line: t2 decides.
        return ot2 != o1;
    }
    if os2 == o1 {
        if ot2 == -o1 {
            // e2 straddles e1's line; resolve against e2's line.
            return orient(&s2, &t2, q) == orient(&s2, &t2, &s1);
        }
        // e2 weakly on q's side of e1: e2 occludes, e1 is farther.
        false
    } else {
        if ot2 == o1 {
            return orient(&s2, &t2, q) == orient(&s2, &t2, &s1);
        }
        // e2 weakly behind e1's line: e1 is closer.
        true
    }
}

/// Total order over undirected edges by ray-hit proximity from `q`.
pub(crate) fn closer_edge(arr: &Arrangement, q: &Point2D, u1: usize, u2: usize) -> Ordering {
    if u1 == u2 {
        return Ordering::Equal;
    }
    let seg1 = arr.segment(arr.forward(u1));
    let seg2 = arr.segment(arr.forward(u2));
    let e1 = (seg1.a, seg1.b);
    let e2 = (seg2.a, seg2.b);
    if closer_than(q, e1, e2) {
        Ordering::Less
    } else if closer_than(q, e2, e1) {
        Ordering::Greater
    } else {
        u1.cmp(&u2)
    }
}

/// The set of undirected edges currently crossed by a vertex's sweep ray,
/// kept sorted closest-first.
#[derive(Debug, Clone, Default)]
pub(crate) struct RayEdges {
    edges: Vec<usize>,
}

impl RayEdges {
    pub fn insert(&mut self, arr: &Arrangement, q: &Point2D, u: usize) {
        if self.edges.contains(&u) {
            return;
        }
        let pos = self
            .edges
            .iter()
            .position(|&e| closer_edge(arr, q, u, e) == Ordering::Less)
            .unwrap_or(self.edges.len());
        self.edges.insert(pos, u);
    }

    pub fn remove(&mut self, u: usize) {
        self.edges.retain(|&e| e != u);
    }

    #[inline]
    pub fn closest(&self) -> Option<usize> {
        self.edges.first().copied()
    }
}
