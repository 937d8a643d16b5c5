//! End-to-end localization scenarios against concrete rooms.
//!
//! These tests drive the public `Locator` API the way an external caller
//! would: build a room, init, query, and check the answers against
//! geometric ground truth.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test locator_scenarios
//!
//! # With sweep traces
//! RUST_LOG=debug cargo test --test locator_scenarios -- --nocapture
//! ```

use sthana::core::{Point2D, Polygon};
use sthana::{Error, Locator, SearchConfig, Trapezoider};

fn pt(x: f64, y: f64) -> Point2D {
    Point2D::new(x, y)
}

fn square_room() -> Polygon {
    Polygon::new(vec![
        pt(0.0, 0.0),
        pt(10.0, 0.0),
        pt(10.0, 10.0),
        pt(0.0, 10.0),
    ])
}

fn l_room() -> Polygon {
    Polygon::new(vec![
        pt(0.0, 0.0),
        pt(10.0, 0.0),
        pt(10.0, 4.0),
        pt(5.0, 4.0),
        pt(5.0, 10.0),
        pt(0.0, 10.0),
    ])
}

fn assert_in_box(p: &Point2D, x0: f64, y0: f64, x1: f64, y1: f64) {
    let eps = 1e-6;
    assert!(
        p.x >= x0 - eps && p.x <= x1 + eps && p.y >= y0 - eps && p.y <= y1 + eps,
        "point {p:?} outside [{x0},{x1}]x[{y0},{y1}]"
    );
}

#[test]
fn square_single_measurement() {
    env_logger::try_init().ok();
    let mut locator = Locator::new();
    locator.init(&square_room()).unwrap();

    // 5.7 is measurable from a band of positions toward every wall.
    let res = locator.query_1(5.7).unwrap();
    assert!(!res.is_empty());
    for r in &res {
        assert!(r.region.len() >= 3);
        assert!(r.region.area() > 0.0);
        for p in r.region.points() {
            assert_in_box(p, 0.0, 0.0, 10.0, 10.0);
        }
    }

    // Farther than the room diagonal: nothing.
    assert!(locator.query_1(15.0).unwrap().is_empty());
}

#[test]
fn square_double_measurement() {
    env_logger::try_init().ok();
    let mut locator = Locator::new();
    locator.init(&square_room()).unwrap();

    // Sum 8.1 is shorter than the wall-to-wall distance of the parallel
    // pairs, but opposite rays near a corner cross two perpendicular walls.
    let res = locator.query_2(2.4, 5.7).unwrap();
    assert!(!res.is_empty());
    for r in &res {
        assert!(!r.positions.is_empty());
        let line1 = sthana::core::Line2D::from_points(r.edge1.0, r.edge1.1);
        let line2 = sthana::core::Line2D::from_points(r.edge2.0, r.edge2.1);
        for seg in &r.positions {
            for p in [seg.a, seg.b] {
                assert_in_box(&p, 0.0, 0.0, 10.0, 10.0);
                // A distance measured along a ray is never shorter than the
                // perpendicular distance to the wall's line.
                assert!(line1.distance_to(&p) <= 2.4 + 1e-6);
                assert!(line2.distance_to(&p) <= 5.7 + 1e-6);
            }
        }
    }

    // Sum 22 exceeds any chord of the room.
    assert!(locator.query_2(11.0, 11.0).unwrap().is_empty());
}

#[test]
fn l_room_queries() {
    env_logger::try_init().ok();
    let mut locator = Locator::new();
    locator.init(&l_room()).unwrap();

    let res = locator.query_1(3.0).unwrap();
    assert!(!res.is_empty());
    for r in &res {
        for p in r.region.points() {
            assert_in_box(p, 0.0, 0.0, 10.0, 10.0);
        }
    }

    let res = locator.query_2(1.5, 1.5).unwrap();
    assert!(!res.is_empty());
}

/// Two reflex corners, both legs sharing the collinear roof line y=8.
fn u_room() -> Polygon {
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

#[test]
fn u_room_queries() {
    env_logger::try_init().ok();
    let mut locator = Locator::new();
    locator.init(&u_room()).unwrap();

    // A sensor at (2,5) aimed up-right along (1,2) hits the left leg's roof
    // at 1.5*sqrt(5); mirrored, (10,5) along (-1,2) hits the right leg's.
    let d = 1.5 * 5.0_f64.sqrt();
    let res = locator.query_1(d).unwrap();
    assert!(!res.is_empty());
    for r in &res {
        assert!(r.region.is_simple());
        assert!(r.region.area() > 0.0);
        for p in r.region.points() {
            assert_in_box(p, 0.0, 0.0, 12.0, 8.0);
        }
    }
    assert!(res.iter().any(|r| r.region.contains(&pt(2.0, 5.0))));
    assert!(res.iter().any(|r| r.region.contains(&pt(10.0, 5.0))));

    // Opposite rays spanning a leg's width.
    let res = locator.query_2(1.5, 2.5).unwrap();
    assert!(!res.is_empty());
    for r in &res {
        for seg in &r.positions {
            assert_in_box(&seg.a, 0.0, 0.0, 12.0, 8.0);
            assert_in_box(&seg.b, 0.0, 0.0, 12.0, 8.0);
        }
    }
}

#[test]
fn single_measurement_filter_soundness() {
    env_logger::try_init().ok();
    // The opening_max pre-filter may admit cells that produce nothing, but
    // must never drop a producing cell: the indexed answer equals brute
    // force over every cell.
    let scene = l_room();
    let mut locator = Locator::new();
    locator.init(&scene).unwrap();
    let config = SearchConfig::default();
    let trapezoids = Trapezoider.calc_trapezoids(&scene).unwrap();
    for d in [1.0, 3.0, 6.5, 9.9] {
        let brute: usize = trapezoids
            .iter()
            .map(|t| t.calc_result_m1(d, &config).unwrap().len())
            .sum();
        assert_eq!(locator.query_1(d).unwrap().len(), brute, "d={d}");
    }
}

#[test]
fn query_before_init_fails() {
    env_logger::try_init().ok();
    let locator = Locator::new();
    assert!(matches!(locator.query_1(3.0), Err(Error::NotInitialized)));
    assert!(matches!(
        locator.query_2(1.0, 2.0),
        Err(Error::NotInitialized)
    ));
}

#[test]
fn nonpositive_distances_fail() {
    env_logger::try_init().ok();
    let mut locator = Locator::new();
    locator.init(&square_room()).unwrap();
    assert!(matches!(
        locator.query_1(-3.0),
        Err(Error::InvalidMeasurement(_))
    ));
    assert!(matches!(
        locator.query_2(0.0, 4.0),
        Err(Error::InvalidMeasurement(_))
    ));
}

#[test]
fn failed_init_keeps_previous_index() {
    env_logger::try_init().ok();
    let mut locator = Locator::new();
    locator.init(&square_room()).unwrap();
    let before = locator.query_1(5.7).unwrap();
    assert!(!before.is_empty());

    let bowtie = Polygon::new(vec![
        pt(0.0, 0.0),
        pt(2.0, 2.0),
        pt(2.0, 0.0),
        pt(0.0, 2.0),
    ]);
    assert!(matches!(locator.init(&bowtie), Err(Error::InvalidScene(_))));

    let after = locator.query_1(5.7).unwrap();
    assert_eq!(after.len(), before.len());
    for (a, b) in after.iter().zip(before.iter()) {
        assert_eq!(a.region.points(), b.region.points());
    }
}

#[test]
fn queries_are_deterministic() {
    env_logger::try_init().ok();
    let mut first = Locator::new();
    let mut second = Locator::new();
    first.init(&l_room()).unwrap();
    second.init(&l_room()).unwrap();

    let r1 = first.query_1(4.2).unwrap();
    let r2 = second.query_1(4.2).unwrap();
    assert_eq!(r1.len(), r2.len());
    for (a, b) in r1.iter().zip(r2.iter()) {
        assert_eq!(a.edge, b.edge);
        assert_eq!(a.region.points(), b.region.points());
    }

    let s1 = first.query_2(2.0, 3.0).unwrap();
    let s2 = second.query_2(2.0, 3.0).unwrap();
    assert_eq!(s1.len(), s2.len());
    for (a, b) in s1.iter().zip(s2.iter()) {
        assert_eq!(a.edge1, b.edge1);
        assert_eq!(a.edge2, b.edge2);
        assert_eq!(a.positions.len(), b.positions.len());
    }
}
