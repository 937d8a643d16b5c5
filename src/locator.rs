//! Indexed query engine over the trapezoid decomposition.
//!
//! After `init`, queries run in output-sensitive time: candidate cells are
//! selected through two small indices over the cells' opening ranges, and only
//! the candidates pay for exact result-curve construction.
//!
//! - single measurement: cells sorted ascending by `opening_max`; a binary
//!   search finds the first cell whose maximal opening reaches the measured
//!   distance. The filter is conservative: a selected cell may still produce
//!   an empty result, but no producing cell is ever skipped.
//! - double measurement: the sum `d1 + d2` equals the cell opening at the
//!   measured orientation, so the candidates are exactly the cells whose
//!   `[opening_min, opening_max]` interval contains the sum. The intervals
//!   live in an R-tree as degenerate rectangles on the x axis.

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::core::{Point2D, Polygon, Segment2D};
use crate::error::{Error, Result};
use crate::trapezoid::Trapezoid;
use crate::trapezoider::Trapezoider;

/// A cell's opening range on the x axis, tagged with the cell id.
type OpeningInterval = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Single-measurement result: a region of positions from which measuring
/// toward `edge` (in some admissible direction) yields the queried distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Res1 {
    /// Endpoints of the measured wall.
    pub edge: (Point2D, Point2D),
    pub region: Polygon,
}

/// Double-measurement result: positions from which two opposite measurements
/// hit `edge1` and `edge2` with the queried distances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Res2 {
    /// Endpoints of the wall measured by the first distance.
    pub edge1: (Point2D, Point2D),
    /// Endpoints of the wall measured by the second distance.
    pub edge2: (Point2D, Point2D),
    pub positions: Vec<Segment2D>,
}

struct LocatorState {
    trapezoids: Vec<Trapezoid>,
    /// Per cell id: (opening_min, opening_max), clamped to the scene diameter.
    openings: Vec<(f64, f64)>,
    /// Cell ids sorted ascending by opening_max.
    sorted_by_max: Vec<usize>,
    interval_index: RTree<OpeningInterval>,
}

/// Localizes a sensor in a known scene from one or two wall-distance
/// measurements. Call [`Locator::init`] with the scene first; queries answer
/// from the indices built there.
pub struct Locator {
    config: SearchConfig,
    trapezoider: Trapezoider,
    state: Option<LocatorState>,
}

impl Default for Locator {
    fn default() -> Self {
        Locator::new()
    }
}

impl Locator {
    pub fn new() -> Self {
        Locator::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Locator {
            config,
            trapezoider: Trapezoider,
            state: None,
        }
    }

    /// Decompose `scene` and build the query indices. On failure any
    /// previously built state is left untouched.
    pub fn init(&mut self, scene: &Polygon) -> Result<()> {
        log::info!("locator init: scene with {} vertices", scene.len());
        let trapezoids = self.trapezoider.calc_trapezoids(scene)?;

        // No opening can exceed the scene diameter; this also turns the
        // unbounded openings of parallel-wall extremes into finite intervals.
        let cap = scene_diameter_bound(scene);
        let openings: Vec<(f64, f64)> = trapezoids
            .iter()
            .map(|t| {
                let (min, max) = t.min_max_openings(&self.config);
                (min.min(cap), max.min(cap))
            })
            .collect();

        let mut sorted_by_max: Vec<usize> = (0..trapezoids.len()).collect();
        sorted_by_max.sort_by(|&a, &b| {
            openings[a]
                .1
                .partial_cmp(&openings[b].1)
                .unwrap()
                .then(a.cmp(&b))
        });

        let intervals: Vec<OpeningInterval> = openings
            .iter()
            .enumerate()
            .map(|(id, &(min, max))| {
                OpeningInterval::new(Rectangle::from_corners([min, 0.0], [max, 0.0]), id)
            })
            .collect();
        let interval_index = RTree::bulk_load(intervals);

        log::info!("locator init: indexed {} cells", trapezoids.len());
        self.state = Some(LocatorState {
            trapezoids,
            openings,
            sorted_by_max,
            interval_index,
        });
        Ok(())
    }

    /// All positions from which some direction measures wall distance `d`,
    /// grouped by measured wall.
    pub fn query_1(&self, d: f64) -> Result<Vec<Res1>> {
        let state = self.state.as_ref().ok_or(Error::NotInitialized)?;
        if d <= 0.0 {
            return Err(Error::InvalidMeasurement(d));
        }
        log::info!("query: single measurement d={d}");

        let start = state
            .sorted_by_max
            .partition_point(|&id| state.openings[id].1 < d);
        let mut res = Vec::new();
        for &id in &state.sorted_by_max[start..] {
            let trapezoid = &state.trapezoids[id];
            for region in trapezoid.calc_result_m1(d, &self.config)? {
                res.push(Res1 {
                    edge: (trapezoid.top_edge.a, trapezoid.top_edge.b),
                    region,
                });
            }
        }
        log::info!("query: {} result regions", res.len());
        Ok(res)
    }

    /// All positions from which opposite-direction measurements yield `d1`
    /// and `d2`, grouped by the pair of measured walls.
    pub fn query_2(&self, d1: f64, d2: f64) -> Result<Vec<Res2>> {
        let state = self.state.as_ref().ok_or(Error::NotInitialized)?;
        if d1 <= 0.0 {
            return Err(Error::InvalidMeasurement(d1));
        }
        if d2 <= 0.0 {
            return Err(Error::InvalidMeasurement(d2));
        }
        log::info!("query: double measurement d1={d1} d2={d2}");

        let stab = AABB::from_point([d1 + d2, 0.0]);
        let mut res = Vec::new();
        for hit in state.interval_index.locate_in_envelope_intersecting(&stab) {
            let trapezoid = &state.trapezoids[hit.data];
            let positions = trapezoid.calc_result_m2(d1, d2, &self.config)?;
            if !positions.is_empty() {
                res.push(Res2 {
                    edge1: (trapezoid.top_edge.a, trapezoid.top_edge.b),
                    edge2: (trapezoid.bottom_edge.a, trapezoid.bottom_edge.b),
                    positions,
                });
            }
        }
        log::info!("query: {} result position chains", res.len());
        Ok(res)
    }
}

/// Upper bound on any wall-to-wall distance inside the scene: the bounding
/// box diagonal.
fn scene_diameter_bound(scene: &Polygon) -> f64 {
    let mut min = Point2D::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point2D::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in scene.points() {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    min.distance(&max)
}
