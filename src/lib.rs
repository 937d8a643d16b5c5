//! # Sthana: Few-Measurement Localization in Polygonal Rooms
//!
//! Localizes a sensor inside a known, static, simple polygonal room from one
//! or two wall-distance measurements taken at an unknown orientation.
//!
//! ## Features
//!
//! - **Trapezoid Decomposition**: The (position × orientation) configuration
//!   space is decomposed once per scene by a parallel rotational sweep
//! - **Exact Result Curves**: Query answers are bounded by circular arcs and
//!   conchoid curves, sampled and clipped per cell
//! - **Output-Sensitive Queries**: Candidate cells are selected through
//!   opening-range indices, so query time scales with the answer, not the
//!   scene
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sthana::core::{Point2D, Polygon};
//! use sthana::Locator;
//!
//! // A 10x10 square room.
//! let room = Polygon::new(vec![
//!     Point2D::new(0.0, 0.0),
//!     Point2D::new(10.0, 0.0),
//!     Point2D::new(10.0, 10.0),
//!     Point2D::new(0.0, 10.0),
//! ]);
//!
//! let mut locator = Locator::new();
//! locator.init(&room).unwrap();
//!
//! // Where can the sensor be if it measured a wall 5.7 away?
//! for res in locator.query_1(5.7).unwrap() {
//!     println!("toward wall {:?}: region of {} vertices", res.edge, res.region.len());
//! }
//!
//! // And if opposite-facing measurements returned 2.4 and 5.7?
//! for res in locator.query_2(2.4, 5.7).unwrap() {
//!     println!("between {:?} and {:?}: {} segments", res.edge1, res.edge2, res.positions.len());
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into modules:
//!
//! - [`core`]: Geometry substrate (points, directions, lines, polygons)
//! - [`arrangement`]: The room boundary as a half-edge planar subdivision
//! - [`trapezoider`]: The rotational-sweep decomposition
//! - [`trapezoid`]: A single configuration-space cell and its result curves
//! - [`locator`]: The indexed query engine
//! - [`config`]: Numeric-search configuration
//! - [`error`]: Crate-level error type
//!
//! ## Data Flow
//!
//! ```text
//!   Polygon (room) ──► Arrangement ──► Trapezoider ──► Vec<Trapezoid>
//!                                                            │
//!                                          openings + indices│ Locator::init
//!                                                            ▼
//!   query_1(d)  ──► sorted-by-max filter ──► calc_result_m1 ──► Vec<Res1>
//!   query_2(d1,d2) ──► interval-index stab ──► calc_result_m2 ──► Vec<Res2>
//! ```
//!
//! No logger is installed by the library; it logs through the [`log`] facade.

pub mod arrangement;
pub mod config;
pub mod core;
pub mod error;
pub mod locator;
pub mod trapezoid;
pub mod trapezoider;

// Re-export main types at crate root
pub use config::SearchConfig;
pub use error::{Error, Result};
pub use locator::{Locator, Res1, Res2};
pub use trapezoid::Trapezoid;
pub use trapezoider::Trapezoider;
