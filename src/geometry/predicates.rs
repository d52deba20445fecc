// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric predicates for polygon tests and mesh measurements
//! 2D orientation is exact (adaptive precision via `robust`)

use nalgebra::{Point2, Point3};
use robust::Coord;
use serde::{Deserialize, Serialize};

/// Rotational sense of three points or of a closed loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Clockwise,
    Collinear,
    CounterClockwise,
}

impl Orientation {
    /// Signed indicator: -1 clockwise, 0 collinear, 1 counter-clockwise
    pub fn sign(self) -> i32 {
        match self {
            Self::Clockwise => -1,
            Self::Collinear => 0,
            Self::CounterClockwise => 1,
        }
    }

    pub fn from_determinant(det: f64) -> Self {
        if det > 0.0 {
            Self::CounterClockwise
        } else if det < 0.0 {
            Self::Clockwise
        } else {
            Self::Collinear
        }
    }
}

fn coord(p: &Point2<f64>) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

/// Twice the signed area of triangle (a, b, c), sign-exact.
/// Positive when c lies left of the directed line a -> b.
pub fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    robust::orient2d(coord(a), coord(b), coord(c))
}

pub fn orientation(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Orientation {
    Orientation::from_determinant(orient2d(a, b, c))
}

/// c strictly left of a -> b
pub fn left(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    orient2d(a, b, c) > 0.0
}

/// c left of or on the line through a -> b
pub fn left_on(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    orient2d(a, b, c) >= 0.0
}

pub fn collinear(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    orient2d(a, b, c) == 0.0
}

/// Turning from a -> b into b -> c is a left turn or continues straight ahead.
pub fn convex_turn(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    let det = orient2d(a, b, c);
    if det != 0.0 {
        return det > 0.0;
    }
    (b - a).dot(&(c - b)) > 0.0
}

/// c is collinear with a, b and lies on the closed segment ab
pub fn between(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    if !collinear(a, b, c) {
        return false;
    }
    if a.x != b.x {
        (a.x <= c.x && c.x <= b.x) || (a.x >= c.x && c.x >= b.x)
    } else {
        (a.y <= c.y && c.y <= b.y) || (a.y >= c.y && c.y >= b.y)
    }
}

/// Segments ab and cd cross at a single interior point of both
pub fn intersect_proper(
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    d: &Point2<f64>,
) -> bool {
    let abc = orient2d(a, b, c);
    let abd = orient2d(a, b, d);
    let cda = orient2d(c, d, a);
    let cdb = orient2d(c, d, b);

    if abc == 0.0 || abd == 0.0 || cda == 0.0 || cdb == 0.0 {
        return false;
    }
    (abc > 0.0) != (abd > 0.0) && (cda > 0.0) != (cdb > 0.0)
}

/// Closed segments ab and cd share at least one point
pub fn segments_intersect(
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    d: &Point2<f64>,
) -> bool {
    intersect_proper(a, b, c, d)
        || between(a, b, c)
        || between(a, b, d)
        || between(c, d, a)
        || between(c, d, b)
}

/// Twice the signed area of a closed 2D loop (shoelace)
pub fn signed_area2(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let p = &points[i];
            let q = &points[(i + 1) % n];
            p.x * q.y - q.x * p.y
        })
        .sum()
}

/// Signed volume of the tetrahedron spanned by the origin and triangle (a, b, c)
pub fn signed_tetra_volume(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
}
