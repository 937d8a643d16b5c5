//! Decomposition of the configuration space into trapezoid cells.
//!
//! The decomposition runs in two phases:
//!
//! 1. **Regular vertical decomposition** (phase A): with the sweep ray fixed
//!    pointing up, classify every vertex (reflex / triangle / up / down) and
//!    create the cells that exist at that orientation.
//! 2. **Parallel rotational sweep** (phase B): rotate the ray of every vertex
//!    simultaneously through a full turn. Each time a vertex ray passes
//!    through another vertex (an *event*), the cells adjacent to the two
//!    vertices are finalized and their successors created.
//!
//! Cells created by phase A lack a start angle and cells still open when the
//! sweep completes lack an end angle; the two groups pair up one-to-one by
//! their limiting vertices and are merged at the end.
//!
//! # Performance
//!
//! With `n` boundary vertices the sweep processes O(n²) events, each with an
//! O(log n)-ish ray-set update, producing O(n²) cells.

mod event;
mod ray_order;

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::arrangement::{Arrangement, HalfedgeId, MinMax, VertexId, VerticalFeature};
use crate::core::math::approx_eq;
use crate::core::{Direction, HalfPlaneSide, Point2D, Polygon};
use crate::error::{Error, Result};
use crate::trapezoid::Trapezoid;
use event::{compare_event_angles, Event};
use ray_order::RayEdges;

const SWEEP_UP: Direction = Direction { dx: 0.0, dy: 1.0 };

/// Relative tolerance for detecting collinear vertex triples.
const COLLINEAR_TOL: f64 = 1e-7;
/// Jitter magnitude for degenerate scenes, relative to the bounding box.
const PERTURB_SCALE: f64 = 1e-6;
const PERTURB_ATTEMPTS: u64 = 8;

/// Computes the trapezoid decomposition of a scene. Stateless between calls;
/// every invocation rebuilds from scratch.
#[derive(Debug, Default)]
pub struct Trapezoider;

impl Trapezoider {
    /// Decompose the configuration space of `scene` into trapezoid cells
    /// with densely assigned ids.
    ///
    /// Three or more collinear vertices make distinct sweep events coincide
    /// along one supporting line, which the per-pair event handlers cannot
    /// untangle. Such scenes are swept on a jittered copy of the boundary;
    /// the resulting cells reference vertices and walls by id, so their
    /// geometry is resolved against the original scene and stays exact.
    pub fn calc_trapezoids(&self, scene: &Polygon) -> Result<Vec<Trapezoid>> {
        log::info!("decomposing scene with {} vertices", scene.len());
        let arr = Arrangement::build(scene)?;
        let perturbed = if has_collinear_triple(scene.points()) {
            log::info!("scene has collinear vertex triples; sweeping a perturbed copy");
            Some(perturbed_arrangement(scene)?)
        } else {
            None
        };
        let mut sweep = Sweep::new(perturbed.as_ref().unwrap_or(&arr));
        sweep.vertical_decomposition_phase();
        sweep.rotational_sweep_phase();
        let trapezoids = sweep.finish(&arr);
        log::info!("decomposition complete: {} trapezoids", trapezoids.len());
        Ok(trapezoids)
    }
}

fn has_collinear_triple(points: &[Point2D]) -> bool {
    let n = points.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let u = points[j] - points[i];
            for k in (j + 1)..n {
                let w = points[k] - points[i];
                if u.cross(&w).abs() <= COLLINEAR_TOL * u.length() * w.length() {
                    return true;
                }
            }
        }
    }
    false
}

/// Build the sweep arrangement for a degenerate scene from a jittered copy
/// of its vertices. Vertex and half-edge ids match the unperturbed
/// arrangement, so cells computed here resolve against the original
/// geometry. Seeded jitter keeps the decomposition deterministic.
fn perturbed_arrangement(scene: &Polygon) -> Result<Arrangement> {
    let xs = scene.points().iter().map(|p| p.x);
    let ys = scene.points().iter().map(|p| p.y);
    let width = xs.clone().fold(f64::NEG_INFINITY, f64::max) - xs.fold(f64::INFINITY, f64::min);
    let height = ys.clone().fold(f64::NEG_INFINITY, f64::max) - ys.fold(f64::INFINITY, f64::min);
    let magnitude = width.max(height) * PERTURB_SCALE;

    for seed in 0..PERTURB_ATTEMPTS {
        let mut rng = StdRng::seed_from_u64(seed);
        let jittered = Polygon::new(
            scene
                .points()
                .iter()
                .map(|p| {
                    Point2D::new(
                        p.x + rng.gen_range(-magnitude..=magnitude),
                        p.y + rng.gen_range(-magnitude..=magnitude),
                    )
                })
                .collect(),
        );
        if has_collinear_triple(jittered.points()) {
            continue;
        }
        match Arrangement::build(&jittered) {
            Ok(arr) => return Ok(arr),
            Err(err) => {
                log::debug!("perturbation seed {seed} produced an invalid boundary: {err}");
            }
        }
    }
    Err(Error::InvalidScene(
        "scene degeneracies persist under perturbation".into(),
    ))
}

/// A cell under construction. Edges are stored free-face-directed half-edge
/// ids, and the angle interval as the events that opened and closed the
/// cell; geometry is resolved only when the sweep finishes.
#[derive(Debug, Clone)]
struct SweepCell {
    top: HalfedgeId,
    bottom: HalfedgeId,
    left_v: VertexId,
    right_v: VertexId,
    begin_event: Option<Event>,
    end_event: Option<Event>,
    dead: bool,
}

/// Sweep-scoped per-vertex state: the four cell-adjacency slots and the
/// edges currently crossed by the vertex's ray.
#[derive(Debug, Default)]
struct VertexData {
    top_left: Option<usize>,
    top_right: Option<usize>,
    bottom_left: Option<usize>,
    bottom_right: Option<usize>,
    ray_edges: RayEdges,
}

/// Per-vertex vertical neighborhood from phase A.
#[derive(Debug, Clone, Copy, Default)]
struct DecompData {
    edge_above: Option<HalfedgeId>,
    edge_below: Option<HalfedgeId>,
}

struct Sweep<'a> {
    arr: &'a Arrangement,
    cells: Vec<SweepCell>,
    vdata: Vec<VertexData>,
    /// Per undirected edge: the vertex whose upward region currently ends at
    /// that edge (rightmost so far in the phase-A scan).
    most_right_vertex: Vec<Option<VertexId>>,
}

impl<'a> Sweep<'a> {
    fn new(arr: &'a Arrangement) -> Self {
        let n = arr.num_vertices();
        Sweep {
            arr,
            cells: Vec::new(),
            vdata: (0..n).map(|_| VertexData::default()).collect(),
            most_right_vertex: vec![None; arr.num_edges()],
        }
    }

    fn most_right(&self, h: HalfedgeId) -> VertexId {
        self.most_right_vertex[self.arr.undirected(h)]
            .expect("no most-right vertex recorded for edge")
    }

    fn set_most_right(&mut self, h: HalfedgeId, v: VertexId) {
        self.most_right_vertex[self.arr.undirected(h)] = Some(v);
    }

    /// Create a cell, re-directing both edges so the free face is on the
    /// expected side, and register it in its limiting vertices' slots.
    fn create_cell(
        &mut self,
        top: HalfedgeId,
        bottom: HalfedgeId,
        left_v: VertexId,
        right_v: VertexId,
    ) -> usize {
        let arr = self.arr;
        let top = arr.direct_free(top);
        let bottom = arr.direct_free(bottom);
        let id = self.cells.len();

        let left_on_top = arr.line(top).has_on(&arr.point(left_v));
        let left_on_bottom = arr.line(bottom).has_on(&arr.point(left_v));
        if !left_on_top || left_on_bottom {
            self.vdata[left_v].top_right = Some(id);
        }
        if !left_on_bottom || left_on_top {
            self.vdata[left_v].bottom_right = Some(id);
        }
        let right_on_top = arr.line(top).has_on(&arr.point(right_v));
        let right_on_bottom = arr.line(bottom).has_on(&arr.point(right_v));
        if !right_on_top || right_on_bottom {
            self.vdata[right_v].top_left = Some(id);
        }
        if !right_on_bottom || right_on_top {
            self.vdata[right_v].bottom_left = Some(id);
        }

        self.cells.push(SweepCell {
            top,
            bottom,
            left_v,
            right_v,
            begin_event: None,
            end_event: None,
            dead: false,
        });
        id
    }

    /// Close a cell at `event` and clear its vertex-slot registrations.
    fn finalize_cell(&mut self, id: usize, event: Event) {
        let arr = self.arr;
        let cell = &mut self.cells[id];
        cell.end_event = Some(event);
        let (top, bottom, left_v, right_v) = (cell.top, cell.bottom, cell.left_v, cell.right_v);

        let left_on_top = arr.line(top).has_on(&arr.point(left_v));
        let left_on_bottom = arr.line(bottom).has_on(&arr.point(left_v));
        if !left_on_top || left_on_bottom {
            self.vdata[left_v].top_right = None;
        }
        if !left_on_bottom || left_on_top {
            self.vdata[left_v].bottom_right = None;
        }
        let right_on_top = arr.line(top).has_on(&arr.point(right_v));
        let right_on_bottom = arr.line(bottom).has_on(&arr.point(right_v));
        if !right_on_top || right_on_bottom {
            self.vdata[right_v].top_left = None;
        }
        if !right_on_bottom || right_on_top {
            self.vdata[right_v].bottom_left = None;
        }
    }

    /// Phase A: vertex classification with the sweep ray pointing up.
    fn vertical_decomposition_phase(&mut self) {
        log::debug!("phase A: regular vertical decomposition");
        let arr = self.arr;
        let n = arr.num_vertices();
        let decomp = vertical_decomposition(arr);

        // Scan order: smaller x first, then larger y.
        let mut order: Vec<VertexId> = (0..n).collect();
        order.sort_by(|&a, &b| {
            let (pa, pb) = (arr.point(a), arr.point(b));
            pa.x.partial_cmp(&pb.x)
                .unwrap()
                .then(pb.y.partial_cmp(&pa.y).unwrap())
        });

        for &v in &order {
            let d = decomp[v];
            let above_free = d.edge_above.map_or(false, |e| arr.is_free(e));
            let below_free = d.edge_below.map_or(false, |e| arr.is_free(e));
            let left_min = arr.find_edge_relative_to_angle(v, &SWEEP_UP, HalfPlaneSide::Left, MinMax::Min);
            let left_max = arr.find_edge_relative_to_angle(v, &SWEEP_UP, HalfPlaneSide::Left, MinMax::Max);

            if above_free && below_free && left_min.is_none() {
                // Reflex vertex: the free region continues past it on both
                // sides.
                log::debug!("phase A: reflex cell at vertex {v}");
                let above = d.edge_above.expect("reflex vertex without edge above");
                let below = d.edge_below.expect("reflex vertex without edge below");
                let left_v = self.most_right(above);
                let id = self.create_cell(above, below, left_v, v);
                let top = self.cells[id].top;
                self.set_most_right(top, v);
            } else if !above_free && !below_free {
                let top = arr.find_edge_vertical(v, true).or(left_min);
                if let (Some(top), Some(bottom)) = (top, left_max) {
                    // Triangle cell closing at this vertex.
                    log::debug!("phase A: triangle cell at vertex {v}");
                    let left_v = self.most_right(top);
                    self.create_cell(top, bottom, left_v, v);
                }
            } else {
                if above_free {
                    // Cell between the vertex and the wall above it.
                    log::debug!("phase A: up cell at vertex {v}");
                    let above = d.edge_above.expect("up cell without edge above");
                    let bottom = arr
                        .find_edge_vertical(v, true)
                        .or(left_min)
                        .expect("no bottom edge for up cell");
                    let left_v = self.most_right(above);
                    let id = self.create_cell(above, bottom, left_v, v);
                    let top = self.cells[id].top;
                    self.set_most_right(top, v);
                }
                if below_free {
                    // Cell between the vertex and the wall below it.
                    log::debug!("phase A: down cell at vertex {v}");
                    let below = d.edge_below.expect("down cell without edge below");
                    let top = left_max.expect("no top edge for down cell");
                    let left_v = self.most_right(top);
                    self.create_cell(top, below, left_v, v);
                }
            }
            for h in arr.outgoing(v) {
                self.set_most_right(h, v);
            }
        }
        log::debug!("phase A produced {} cells", self.cells.len());
    }

    /// Phase B: process all vertex-pair events in angular order.
    fn rotational_sweep_phase(&mut self) {
        log::debug!("phase B: parallel rotational sweep");
        let arr = self.arr;
        let n = arr.num_vertices();

        let mut events = Vec::with_capacity(n * (n - 1));
        for v1 in 0..n {
            for v2 in 0..n {
                if v1 != v2 {
                    events.push(Event { v1, v2 });
                }
            }
        }
        events.sort_by(|e1, e2| compare_event_angles(&e1.ray(arr), &e2.ray(arr)));

        self.init_ray_edges();

        for event in events {
            let ray = event.ray(arr);
            let closest_orig = self.vdata[event.v1].ray_edges.closest();

            // Keep the ray set consistent: edges opening toward the ray's
            // left half-plane enter, the rest leave.
            let vp1 = arr.point(event.v1);
            for h in arr.outgoing(event.v2) {
                let u = arr.undirected(h);
                if ray.side_of(&arr.direction(h)) == HalfPlaneSide::Left {
                    self.vdata[event.v1].ray_edges.insert(arr, &vp1, u);
                } else {
                    self.vdata[event.v1].ray_edges.remove(u);
                }
            }

            if let Some(v1v2_edge) = arr.edge_between(event.v1, event.v2) {
                self.handle_type1_event(&event, v1v2_edge);
            } else {
                self.handle_type2_event(&event, ray, closest_orig);
            }
        }

        self.merge_split_cells();
    }

    /// Populate each vertex's ray set for the initial upward direction.
    fn init_ray_edges(&mut self) {
        let arr = self.arr;
        for v in 0..arr.num_vertices() {
            let vp = arr.point(v);
            for u in 0..arr.num_edges() {
                let seg = arr.segment(arr.forward(u));
                // Edges met exactly at an endpoint are handled as vertex
                // events, not ray members.
                if approx_eq(seg.a.x, vp.x) || approx_eq(seg.b.x, vp.x) {
                    continue;
                }
                if vp.x <= seg.a.x.min(seg.b.x) || vp.x >= seg.a.x.max(seg.b.x) {
                    continue;
                }
                let y_at = seg.a.y + (vp.x - seg.a.x) / (seg.b.x - seg.a.x) * (seg.b.y - seg.a.y);
                if y_at > vp.y {
                    self.vdata[v].ray_edges.insert(arr, &vp, u);
                }
            }
        }
    }

    /// Type 1: the ray of `v1` passes through its boundary neighbor `v2`.
    fn handle_type1_event(&mut self, event: &Event, v1v2_edge: HalfedgeId) {
        let arr = self.arr;
        if arr.is_free(v1v2_edge) {
            log::debug!("type 1 event ({}, {}), free left", event.v1, event.v2);
            let left_id = self.vdata[event.v2]
                .bottom_left
                .expect("type 1 event without bottom-left cell");
            let mid_id = self.vdata[event.v2]
                .bottom_right
                .expect("type 1 event without bottom-right cell");
            let left = self.cells[left_id].clone();
            let mid = self.cells[mid_id].clone();
            assert_eq!(left.right_v, event.v2);
            assert_eq!(mid.left_v, event.v2);
            assert_eq!(mid.right_v, event.v1);

            self.finalize_cell(left_id, *event);
            self.finalize_cell(mid_id, *event);

            // The neighbor continues with an updated right vertex; a fresh
            // triangle grows against the v1-v2 edge.
            let left_new = self.create_cell(left.top, left.bottom, left.left_v, event.v1);
            self.cells[left_new].begin_event = Some(*event);
            let mid_new = self.create_cell(left.top, v1v2_edge, event.v1, event.v2);
            self.cells[mid_new].begin_event = Some(*event);
        } else {
            log::debug!("type 1 event ({}, {}), blocked left", event.v1, event.v2);
            let mid_id = self.vdata[event.v1]
                .top_left
                .expect("type 1 event without top-left cell");
            let right_id = self.vdata[event.v1]
                .top_right
                .expect("type 1 event without top-right cell");
            let mid = self.cells[mid_id].clone();
            let right = self.cells[right_id].clone();
            assert_eq!(mid.left_v, event.v2);
            assert_eq!(mid.right_v, event.v1);
            assert_eq!(right.left_v, event.v1);

            self.finalize_cell(mid_id, *event);
            self.finalize_cell(right_id, *event);

            let mid_new = self.create_cell(v1v2_edge, right.bottom, event.v1, event.v2);
            self.cells[mid_new].begin_event = Some(*event);
            let right_new = self.create_cell(right.top, right.bottom, event.v2, right.right_v);
            self.cells[right_new].begin_event = Some(*event);
        }
    }

    /// Type 2: the ray of `v1` passes through the non-adjacent vertex `v2`,
    /// changing the closest crossed edge.
    fn handle_type2_event(&mut self, event: &Event, ray: Direction, closest_orig: Option<usize>) {
        let arr = self.arr;
        let Some(closest) = self.vdata[event.v1].ray_edges.closest() else {
            return; // the ray crosses no edge
        };
        if closest_orig == Some(closest) {
            return; // closest edge unchanged, nothing to do
        }

        // Direct the closest edge so its source is the right endpoint
        // relative to the ray; the event only matters inside the free face.
        let seg = arr.segment(arr.forward(closest));
        let half_diff = (seg.a - seg.b) / 2.0;
        let right_p = if ray.side_of_point(&half_diff) == HalfPlaneSide::Left {
            seg.b
        } else {
            seg.a
        };
        let mut closest_h = arr.forward(closest);
        if arr.point(arr.source(closest_h)).distance(&right_p) > 0.0 {
            closest_h = arr.twin(closest_h);
        }
        if !arr.is_free(closest_h) {
            return;
        }

        log::debug!("type 2 event ({}, {})", event.v1, event.v2);
        let left_id = self.vdata[event.v2]
            .bottom_left
            .expect("type 2 event without bottom-left cell");
        let mid_id = self.vdata[event.v1]
            .top_left
            .expect("type 2 event without top-left cell");
        let right_id = self.vdata[event.v1]
            .top_right
            .expect("type 2 event without top-right cell");
        debug_assert_eq!(self.vdata[event.v2].bottom_right, Some(mid_id));
        let left = self.cells[left_id].clone();
        let mid = self.cells[mid_id].clone();
        let right = self.cells[right_id].clone();
        assert_eq!(left.right_v, event.v2);
        assert_eq!(mid.left_v, event.v2);
        assert_eq!(mid.right_v, event.v1);
        assert_eq!(right.left_v, event.v1);

        self.finalize_cell(left_id, *event);
        self.finalize_cell(mid_id, *event);
        self.finalize_cell(right_id, *event);

        let right_new = self.create_cell(right.top, right.bottom, event.v2, right.right_v);
        self.cells[right_new].begin_event = Some(*event);

        let bottom = arr
            .find_edge_relative_to_angle(event.v1, &ray, HalfPlaneSide::Right, MinMax::Max)
            .unwrap_or(right.bottom);
        let mid_new = self.create_cell(left.top, bottom, event.v1, event.v2);
        self.cells[mid_new].begin_event = Some(*event);

        let left_new = self.create_cell(left.top, left.bottom, left.left_v, event.v1);
        self.cells[left_new].begin_event = Some(*event);
    }

    /// Pair phase-A cells (no start angle) with the cells still open at the
    /// end of the sweep (no end angle) and merge each pair.
    fn merge_split_cells(&mut self) {
        log::debug!("merging cells split at the sweep origin");
        let mut no_begin: BTreeMap<(VertexId, VertexId), usize> = BTreeMap::new();
        let mut no_end: BTreeMap<(VertexId, VertexId), usize> = BTreeMap::new();
        for (id, cell) in self.cells.iter().enumerate() {
            debug_assert!(cell.begin_event.is_some() || cell.end_event.is_some());
            let key = (cell.left_v, cell.right_v);
            if cell.begin_event.is_none() {
                let prev = no_begin.insert(key, id);
                assert!(prev.is_none(), "duplicate unstarted cell for {key:?}");
            } else if cell.end_event.is_none() {
                let prev = no_end.insert(key, id);
                assert!(prev.is_none(), "duplicate unfinished cell for {key:?}");
            }
        }
        assert_eq!(no_begin.len(), no_end.len());
        for (key, id) in no_begin {
            let other = *no_end
                .get(&key)
                .unwrap_or_else(|| panic!("unmatched cell at sweep end for {key:?}"));
            debug_assert_eq!(
                self.arr.undirected(self.cells[id].top),
                self.arr.undirected(self.cells[other].top)
            );
            debug_assert_eq!(
                self.arr.undirected(self.cells[id].bottom),
                self.arr.undirected(self.cells[other].bottom)
            );
            self.cells[id].begin_event = self.cells[other].begin_event;
            self.cells[other].dead = true;
        }
    }

    /// Drop dead and zero-width cells, resolve geometry against `out` and
    /// assign dense ids. `out` may differ from the sweep arrangement only in
    /// vertex coordinates; for a perturbed sweep this is where the cells
    /// snap back onto the original scene.
    fn finish(self, out: &Arrangement) -> Vec<Trapezoid> {
        let mut trapezoids = Vec::new();
        for cell in self.cells.into_iter().filter(|c| !c.dead) {
            let begin = cell.begin_event.expect("cell without start angle after merge");
            let end = cell.end_event.expect("cell without end angle after merge");
            let angle_begin = begin.ray(out);
            let angle_end = end.ray(out);
            if angle_begin.is_same_direction(&angle_end) {
                continue; // zero-width interval
            }
            trapezoids.push(Trapezoid {
                id: trapezoids.len(),
                top_edge: out.segment(cell.top),
                bottom_edge: out.segment(cell.bottom),
                left_vertex: out.point(cell.left_v),
                right_vertex: out.point(cell.right_v),
                angle_begin,
                angle_end,
            });
        }
        trapezoids
    }
}

/// For every vertex, the free-space wall directly above and below it. When a
/// vertex sits exactly above another, the chain is walked until an edge
/// leaving it toward the scanned side is found.
fn vertical_decomposition(arr: &Arrangement) -> Vec<DecompData> {
    let n = arr.num_vertices();
    (0..n)
        .map(|v| DecompData {
            edge_above: chain_edge(arr, v, true),
            edge_below: chain_edge(arr, v, false),
        })
        .collect()
}

fn chain_edge(arr: &Arrangement, v: VertexId, above: bool) -> Option<HalfedgeId> {
    // A vertical wall incident at the vertex is itself the vertical feature
    // when the rotated sweep half-line immediately enters the free face
    // along it: the wall side swept first must be interior and no other
    // edge may leave the vertex into that side.
    if let Some(h) = arr.find_edge_vertical(v, above) {
        let half_dir = if above {
            SWEEP_UP
        } else {
            Direction::new(0.0, -1.0)
        };
        if arr.is_free(h)
            && arr
                .find_edge_relative_to_angle(v, &half_dir, HalfPlaneSide::Left, MinMax::Min)
                .is_none()
        {
            return Some(h);
        }
    }
    let mut p = v;
    loop {
        let feature = if above {
            arr.feature_above(p)
        } else {
            arr.feature_below(p)
        };
        match feature {
            VerticalFeature::Edge(e) => return Some(e),
            VerticalFeature::Open => return None,
            VerticalFeature::Vertex(u) => {
                let candidate = if above {
                    arr.find_edge_relative_to_angle(u, &SWEEP_UP, HalfPlaneSide::Right, MinMax::Min)
                } else {
                    arr.find_edge_relative_to_angle(u, &SWEEP_UP, HalfPlaneSide::Left, MinMax::Min)
                };
                if let Some(e) = candidate {
                    return Some(direct_for_side(arr, e, above));
                }
                p = u;
            }
        }
    }
}

/// Direct an edge the way vertical-neighborhood edges are reported: above
/// edges run toward negative x, below edges toward positive x.
fn direct_for_side(arr: &Arrangement, h: HalfedgeId, above: bool) -> HalfedgeId {
    let dx = arr.direction(h).dx;
    let ok = if above { dx <= 0.0 } else { dx >= 0.0 };
    if ok {
        h
    } else {
        arr.twin(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::EPS;
    use crate::core::{Point2D, Segment2D};

    fn pt(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    fn make_square() -> Polygon {
        Polygon::new(vec![
            pt(0.0, 0.0),
            pt(10.0, 0.0),
            pt(10.0, 10.0),
            pt(0.0, 10.0),
        ])
    }

    fn make_l_room() -> Polygon {
        Polygon::new(vec![
            pt(0.0, 0.0),
            pt(10.0, 0.0),
            pt(10.0, 4.0),
            pt(5.0, 4.0),
            pt(5.0, 10.0),
            pt(0.0, 10.0),
        ])
    }

    /// Rectangular room with a notch cut into the top wall: both reflex
    /// corners sit on the line of the two remaining roof pieces.
    fn make_u_room() -> Polygon {
        Polygon::new(vec![
            pt(0.0, 0.0),
            pt(12.0, 0.0),
            pt(12.0, 8.0),
            pt(8.0, 8.0),
            pt(8.0, 3.0),
            pt(4.0, 3.0),
            pt(4.0, 8.0),
            pt(0.0, 8.0),
        ])
    }

    /// Bar with a stem: the stem mouth opens through the line shared by the
    /// bar's two top walls.
    fn make_t_room() -> Polygon {
        Polygon::new(vec![
            pt(0.0, 0.0),
            pt(12.0, 0.0),
            pt(12.0, 4.0),
            pt(9.0, 4.0),
            pt(9.0, 10.0),
            pt(3.0, 10.0),
            pt(3.0, 4.0),
            pt(0.0, 4.0),
        ])
    }

    /// Narrow niche between two roof pieces at the same height.
    fn make_corridor_room() -> Polygon {
        Polygon::new(vec![
            pt(0.0, 0.0),
            pt(10.0, 0.0),
            pt(10.0, 8.0),
            pt(6.0, 8.0),
            pt(6.0, 4.0),
            pt(4.0, 4.0),
            pt(4.0, 8.0),
            pt(0.0, 8.0),
        ])
    }

    fn interior_sample(seg: &Segment2D) -> Point2D {
        let mid = seg.a.midpoint(&seg.b);
        let inward = seg.direction().perpendicular_ccw().normalized() * 1e-3;
        mid + inward
    }

    fn check_invariants(scene: &Polygon, trapezoids: &[Trapezoid]) {
        assert!(!trapezoids.is_empty());
        let ccw = scene.clone().to_ccw();
        for (i, t) in trapezoids.iter().enumerate() {
            assert_eq!(t.id, i, "ids must be dense");
            assert!(
                !t.angle_begin.is_same_direction(&t.angle_end),
                "zero-width cell survived pruning"
            );
            // Both stored edges keep the interior on their left.
            for seg in [&t.top_edge, &t.bottom_edge] {
                assert!(seg.length() > EPS);
                assert!(
                    ccw.contains(&interior_sample(seg)),
                    "edge of cell {i} is not free-face directed"
                );
            }
            // Limiting vertices are scene vertices.
            for v in [&t.left_vertex, &t.right_vertex] {
                assert!(ccw.points().iter().any(|p| p.distance(v) <= EPS));
            }
        }
    }

    #[test]
    fn test_square_decomposition() {
        let scene = make_square();
        let trapezoids = Trapezoider.calc_trapezoids(&scene).unwrap();
        check_invariants(&scene, &trapezoids);
        // The square's symmetry: every wall serves as the measured edge of
        // the same number of cells.
        for u in 0..4 {
            let top = Segment2D::new(scene.points()[u], scene.points()[(u + 1) % 4]);
            let count = trapezoids
                .iter()
                .filter(|t| {
                    (t.top_edge.a.distance(&top.a) <= EPS && t.top_edge.b.distance(&top.b) <= EPS)
                        || (t.top_edge.a.distance(&top.b) <= EPS
                            && t.top_edge.b.distance(&top.a) <= EPS)
                })
                .count();
            assert!(count > 0, "wall {u} never measured");
        }
    }

    #[test]
    fn test_l_room_decomposition() {
        let scene = make_l_room();
        let trapezoids = Trapezoider.calc_trapezoids(&scene).unwrap();
        check_invariants(&scene, &trapezoids);
        // The reflex corner produces more cells than the convex square.
        let square_cells = Trapezoider.calc_trapezoids(&make_square()).unwrap();
        assert!(trapezoids.len() > square_cells.len());
    }

    #[test]
    fn test_u_room_decomposition() {
        // Two axis-aligned reflex corners collinear with the far roof
        // pieces: the sweep must run on a perturbed copy.
        let scene = make_u_room();
        let trapezoids = Trapezoider.calc_trapezoids(&scene).unwrap();
        check_invariants(&scene, &trapezoids);
    }

    #[test]
    fn test_t_room_decomposition() {
        let scene = make_t_room();
        let trapezoids = Trapezoider.calc_trapezoids(&scene).unwrap();
        check_invariants(&scene, &trapezoids);
    }

    #[test]
    fn test_corridor_decomposition() {
        let scene = make_corridor_room();
        let trapezoids = Trapezoider.calc_trapezoids(&scene).unwrap();
        check_invariants(&scene, &trapezoids);
    }

    /// True if `p + t * dir` for some `t > 0` crosses `seg`.
    fn ray_hits(p: &Point2D, dir: &Direction, seg: &Segment2D) -> bool {
        let r = dir.vector();
        let s = seg.b - seg.a;
        let denom = r.cross(&s);
        if denom.abs() < 1e-15 {
            return false;
        }
        let qp = seg.a - *p;
        let t = qp.cross(&s) / denom;
        let u = qp.cross(&r) / denom;
        t > 1e-12 && (-1e-9..=1.0 + 1e-9).contains(&u)
    }

    /// True if the pose (position `p`, orientation `dir`) belongs to `t`:
    /// the orientation falls in the cell's angle interval, the position lies
    /// strictly between the limiting-vertex lines, and the measuring ray and
    /// its opposite hit the top and bottom walls.
    fn covers(t: &Trapezoid, p: &Point2D, dir: &Direction) -> bool {
        if !dir.ccw_in_between(&t.angle_begin, &t.angle_end)
            && !dir.is_same_direction(&t.angle_begin)
        {
            return false;
        }
        let v = dir.vector();
        let side_left = v.cross(&(*p - t.left_vertex));
        let side_right = v.cross(&(*p - t.right_vertex));
        if side_left * side_right >= 0.0 {
            return false;
        }
        ray_hits(p, dir, &t.top_edge) && ray_hits(p, &-*dir, &t.bottom_edge)
    }

    /// Sample interior poses with a low-discrepancy sequence and require
    /// each to land in exactly one cell.
    fn assert_cells_partition_poses(scene: &Polygon, trapezoids: &[Trapezoid]) {
        let ccw = scene.clone().to_ccw();
        let xs = ccw.points().iter().map(|p| p.x);
        let ys = ccw.points().iter().map(|p| p.y);
        let x_min = xs.clone().fold(f64::INFINITY, f64::min);
        let x_max = xs.fold(f64::NEG_INFINITY, f64::max);
        let y_min = ys.clone().fold(f64::INFINITY, f64::min);
        let y_max = ys.fold(f64::NEG_INFINITY, f64::max);

        let mut tested = 0u32;
        let mut k = 0u32;
        while tested < 200 {
            k += 1;
            let fx = (k as f64 * 0.754877666246693).fract();
            let fy = (k as f64 * 0.569840290998053).fract();
            let ft = (k as f64 * 0.381966011250105).fract();
            let p = Point2D::new(x_min + fx * (x_max - x_min), y_min + fy * (y_max - y_min));
            if !ccw.contains(&p) {
                continue;
            }
            tested += 1;
            let angle = ft * std::f64::consts::TAU;
            let dir = Direction::new(angle.cos(), angle.sin());
            let count = trapezoids.iter().filter(|t| covers(t, &p, &dir)).count();
            assert_eq!(
                count, 1,
                "pose ({}, {}) at angle {angle} lies in {count} cells",
                p.x, p.y
            );
        }
    }

    #[test]
    fn test_cells_partition_sampled_poses() {
        for scene in [
            make_square(),
            make_l_room(),
            make_u_room(),
            make_t_room(),
            make_corridor_room(),
        ] {
            let trapezoids = Trapezoider.calc_trapezoids(&scene).unwrap();
            assert_cells_partition_poses(&scene, &trapezoids);
        }
    }

    #[test]
    fn test_determinism() {
        // The perturbed path (notched room) must be as repeatable as the
        // exact one.
        for scene in [make_l_room(), make_u_room()] {
            let a = Trapezoider.calc_trapezoids(&scene).unwrap();
            let b = Trapezoider.calc_trapezoids(&scene).unwrap();
            assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(b.iter()) {
                assert_eq!(x.id, y.id);
                assert_eq!(x.top_edge, y.top_edge);
                assert_eq!(x.bottom_edge, y.bottom_edge);
                assert_eq!(x.left_vertex, y.left_vertex);
                assert_eq!(x.right_vertex, y.right_vertex);
                assert_eq!(x.angle_begin, y.angle_begin);
                assert_eq!(x.angle_end, y.angle_end);
            }
        }
    }

    #[test]
    fn test_rejects_invalid_scene() {
        let bowtie = Polygon::new(vec![
            pt(0.0, 0.0),
            pt(2.0, 2.0),
            pt(2.0, 0.0),
            pt(0.0, 2.0),
        ]);
        assert!(Trapezoider.calc_trapezoids(&bowtie).is_err());
        assert!(Trapezoider
            .calc_trapezoids(&Polygon::new(vec![pt(0.0, 0.0), pt(1.0, 0.0)]))
            .is_err());
    }

    #[test]
    fn test_angle_intervals_cover_full_turn_per_wall_pair() {
        // For the square, the sum of all angular spans equals n_cells'
        // intervals tiling the circle once per vertical strip combination;
        // at minimum every direction must be covered by some cell.
        let trapezoids = Trapezoider.calc_trapezoids(&make_square()).unwrap();
        for k in 0..16 {
            let a = 2.0 * std::f64::consts::PI * (k as f64 + 0.31) / 16.0;
            let dir = Direction::new(a.cos(), a.sin());
            let covered = trapezoids.iter().any(|t| {
                dir.ccw_in_between(&t.angle_begin, &t.angle_end)
                    || dir.is_same_direction(&t.angle_begin)
            });
            assert!(covered, "direction {a} not covered by any cell");
        }
    }
}
