// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon predicates and optimal convex partition
//!
//! The partition is a dynamic program over chords `(i, j)` of a simple
//! counter-clockwise polygon. For each chord it picks the convex piece
//! resting on that chord whose remaining pockets need the fewest pieces.

use super::predicates::{
    between, convex_turn, left, left_on, orient2d, segments_intersect, signed_area2, Orientation,
};
use crate::error::{GeometryError, GeometryResult};
use nalgebra::Point2;
use std::f64::consts::TAU;
use tracing::trace;

/// No two edges meet except adjacent ones at their shared vertex
pub fn is_simple(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    for i in 0..n {
        let (a, b) = (&points[i], &points[(i + 1) % n]);
        if a == b {
            return false;
        }
        for j in (i + 1)..n {
            let (c, d) = (&points[j], &points[(j + 1) % n]);
            if j == i + 1 {
                // b == c: the far endpoints must stay off the other edge
                if between(a, b, d) || between(c, d, a) {
                    return false;
                }
            } else if i == 0 && j == n - 1 {
                // d == a
                if between(a, b, c) || between(c, d, b) {
                    return false;
                }
            } else if segments_intersect(a, b, c, d) {
                return false;
            }
        }
    }
    true
}

/// All turns share a sign, the loop winds once and is not a flat line
pub fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut sign = 0.0_f64;
    let mut winding = 0.0;
    for i in 0..n {
        let prev = &points[(i + n - 1) % n];
        let cur = &points[i];
        let next = &points[(i + 1) % n];
        let (u, v) = (cur - prev, next - cur);
        if u.norm_squared() == 0.0 || v.norm_squared() == 0.0 {
            return false;
        }

        let det = orient2d(prev, cur, next);
        if det == 0.0 && u.dot(&v) < 0.0 {
            // Spike folding back on itself
            return false;
        }
        if det != 0.0 {
            if sign != 0.0 && sign.signum() != det.signum() {
                return false;
            }
            sign = det;
        }
        winding += (u.x * v.y - u.y * v.x).atan2(u.dot(&v));
    }

    sign != 0.0 && (winding.abs() - TAU).abs() < 1e-6
}

/// Orientation of the loop, read at its lowest-leftmost vertex
pub fn orientation(points: &[Point2<f64>]) -> Orientation {
    let n = points.len();
    if n < 3 {
        return Orientation::Collinear;
    }

    let mut k = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let q = &points[k];
        if p.x < q.x || (p.x == q.x && p.y < q.y) {
            k = i;
        }
    }

    let turn = orient2d(&points[(k + n - 1) % n], &points[k], &points[(k + 1) % n]);
    if turn != 0.0 {
        Orientation::from_determinant(turn)
    } else {
        Orientation::from_determinant(signed_area2(points))
    }
}

/// Chord validity for every vertex pair `(a, b)` with `a < b`
struct DiagonalTable {
    n: usize,
    valid: Vec<bool>,
}

impl DiagonalTable {
    fn new(points: &[Point2<f64>]) -> Self {
        let n = points.len();
        let mut valid = vec![false; n * n];
        for a in 0..n {
            for b in (a + 1)..n {
                valid[a * n + b] = b == a + 1
                    || (a == 0 && b == n - 1)
                    || is_diagonal(points, a, b);
            }
        }
        Self { n, valid }
    }

    fn get(&self, a: usize, b: usize) -> bool {
        self.valid[a * self.n + b]
    }
}

/// Segment `a`-`b` lies inside the polygon near both endpoints and crosses no edge
fn is_diagonal(points: &[Point2<f64>], a: usize, b: usize) -> bool {
    in_cone(points, a, b) && in_cone(points, b, a) && diagonalie(points, a, b)
}

fn in_cone(points: &[Point2<f64>], a: usize, b: usize) -> bool {
    let n = points.len();
    let a0 = &points[(a + n - 1) % n];
    let a1 = &points[(a + 1) % n];
    let (pa, pb) = (&points[a], &points[b]);

    if left_on(pa, a1, a0) {
        // Convex vertex
        left(pa, pb, a0) && left(pb, pa, a1)
    } else {
        !(left_on(pa, pb, a1) && left_on(pb, pa, a0))
    }
}

fn diagonalie(points: &[Point2<f64>], a: usize, b: usize) -> bool {
    let n = points.len();
    (0..n).all(|c| {
        let c1 = (c + 1) % n;
        c == a || c == b || c1 == a || c1 == b
            || !segments_intersect(&points[a], &points[b], &points[c], &points[c1])
    })
}

/// Minimum-cardinality convex partition of a simple CCW polygon.
///
/// Pieces use polygon vertices only and come back counter-clockwise.
pub fn optimal_convex_partition(points: &[Point2<f64>]) -> GeometryResult<Vec<Vec<Point2<f64>>>> {
    let n = points.len();
    if n < 3 {
        return Err(GeometryError::PartitionFailed(format!(
            "need at least 3 vertices, got {}",
            n
        )));
    }
    if is_convex(points) {
        return Ok(vec![points.to_vec()]);
    }

    let table = DiagonalTable::new(points);
    let mut cost: Vec<Option<usize>> = vec![None; n * n];
    let mut chain: Vec<Vec<usize>> = vec![Vec::new(); n * n];

    for len in 2..n {
        for i in 0..(n - len) {
            let j = i + len;
            if !table.get(i, j) {
                continue;
            }
            if let Some((pieces, vertices)) = best_piece(points, i, j, &cost) {
                cost[i * n + j] = Some(pieces);
                chain[i * n + j] = vertices;
            }
        }
    }

    let Some(total) = cost[n - 1] else {
        return Err(GeometryError::PartitionFailed(
            "no convex decomposition found".into(),
        ));
    };
    trace!(vertices = n, pieces = total, "partition table filled");

    let mut pieces = Vec::with_capacity(total);
    let mut stack = vec![(0, n - 1)];
    while let Some((a, b)) = stack.pop() {
        let vertices = &chain[a * n + b];
        pieces.push(vertices.iter().map(|&v| points[v]).collect());
        for w in vertices.windows(2) {
            if w[1] > w[0] + 1 {
                stack.push((w[0], w[1]));
            }
        }
    }
    Ok(pieces)
}

/// Best convex piece on chord `(i, j)` of the sub-polygon `i, i+1, ..., j`.
///
/// A piece is a vertex chain `i = v0 < v1 < ... < vk = j`; every step
/// `(v, w)` is an edge or a valid chord whose pocket costs `cost[v][w]`.
/// Returns the piece count of the sub-polygon and the chosen chain.
fn best_piece(
    points: &[Point2<f64>],
    i: usize,
    j: usize,
    cost: &[Option<usize>],
) -> Option<(usize, Vec<usize>)> {
    let n = points.len();
    let m = j - i + 1;
    let gap = |a: usize, b: usize| -> Option<usize> {
        if b == a + 1 {
            Some(0)
        } else {
            cost[a * n + b]
        }
    };
    let idx = |p: usize, q: usize| (p - i) * m + (q - i);

    // dp over the last two chain vertices (p, q)
    let mut dp: Vec<Option<usize>> = vec![None; m * m];
    let mut parent = vec![usize::MAX; m * m];

    for a1 in (i + 1)..j {
        if !convex_turn(&points[j], &points[i], &points[a1]) {
            continue;
        }
        if let Some(g) = gap(i, a1) {
            dp[idx(i, a1)] = Some(g);
        }
    }

    for q in (i + 1)..j {
        for p in i..q {
            let Some(c) = dp[idx(p, q)] else {
                continue;
            };
            for r in (q + 1)..=j {
                let Some(g) = gap(q, r) else {
                    continue;
                };
                if !convex_turn(&points[p], &points[q], &points[r]) {
                    continue;
                }
                let candidate = c + g;
                if dp[idx(q, r)].map_or(true, |old| candidate < old) {
                    dp[idx(q, r)] = Some(candidate);
                    parent[idx(q, r)] = p;
                }
            }
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for p in (i + 1)..j {
        let Some(c) = dp[idx(p, j)] else {
            continue;
        };
        if convex_turn(&points[p], &points[j], &points[i]) && best.map_or(true, |(old, _)| c < old) {
            best = Some((c, p));
        }
    }
    let (c, last) = best?;

    let mut vertices = vec![j];
    let (mut p, mut q) = (last, j);
    loop {
        vertices.push(p);
        if p == i {
            break;
        }
        let pp = parent[idx(p, q)];
        q = p;
        p = pp;
    }
    vertices.reverse();
    Some((c + 1, vertices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn poly(coords: &[(f64, f64)]) -> Vec<Point2<f64>> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    fn arrow() -> Vec<Point2<f64>> {
        poly(&[
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, -1.0),
            (5.0, 1.0),
            (3.0, 3.0),
            (3.0, 2.0),
            (0.0, 2.0),
        ])
    }

    #[test]
    fn test_simple() {
        let square = poly(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert!(is_simple(&square));
        assert!(is_simple(&arrow()));

        let bowtie = poly(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]);
        assert!(!is_simple(&bowtie));

        let flat = poly(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert!(!is_simple(&flat));

        assert!(!is_simple(&square[..2]));
    }

    #[test]
    fn test_simple_rejects_touching_vertex() {
        // Vertex 4 touches edge (0, 1)
        let pinched = poly(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (2.0, 4.0), (2.0, 0.0), (0.0, 4.0)]);
        assert!(!is_simple(&pinched));
    }

    #[test]
    fn test_convex() {
        let square = poly(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert!(is_convex(&square));

        let mut cw = square.clone();
        cw.reverse();
        assert!(is_convex(&cw));

        let with_collinear = poly(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        assert!(is_convex(&with_collinear));

        assert!(!is_convex(&arrow()));
        assert!(!is_convex(&poly(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)])));

        let pentagram = poly(&[(0.0, 3.0), (2.0, -3.0), (-3.0, 1.0), (3.0, 1.0), (-2.0, -3.0)]);
        assert!(!is_convex(&pentagram));
    }

    #[test]
    fn test_orientation() {
        let square = poly(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert_eq!(orientation(&square), Orientation::CounterClockwise);

        let mut cw = square;
        cw.reverse();
        assert_eq!(orientation(&cw), Orientation::Clockwise);

        assert_eq!(orientation(&arrow()), Orientation::CounterClockwise);
        assert_eq!(orientation(&poly(&[(0.0, 0.0), (1.0, 1.0)])), Orientation::Collinear);
    }

    #[test]
    fn test_arrow_diagonals() {
        let points = arrow();
        let table = DiagonalTable::new(&points);
        assert!(table.get(1, 5));
        // Passes outside around the reflex corner at vertex 1
        assert!(!table.get(0, 2));
        // Passes through vertex 5
        assert!(!table.get(1, 4));
    }

    #[test]
    fn test_arrow_partition() {
        let points = arrow();
        let pieces = optimal_convex_partition(&points).unwrap();
        assert_eq!(pieces.len(), 2);

        let total: f64 = pieces.iter().map(|p| signed_area2(p) / 2.0).sum();
        assert_relative_eq!(total, signed_area2(&points) / 2.0, epsilon = 1e-12);
        assert_relative_eq!(total, 10.0, epsilon = 1e-12);
        for piece in &pieces {
            assert!(is_convex(piece));
            assert_eq!(orientation(piece), Orientation::CounterClockwise);
        }
    }

    #[test]
    fn test_comb_partition_is_minimal() {
        // Four reflex corners, and only (3,1)-(2,1) joins two of them
        let comb = poly(&[
            (0.0, 0.0),
            (5.0, 0.0),
            (5.0, 3.0),
            (4.0, 3.0),
            (4.0, 1.0),
            (3.0, 1.0),
            (3.0, 3.0),
            (2.0, 3.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 3.0),
            (0.0, 3.0),
        ]);
        assert_eq!(orientation(&comb), Orientation::CounterClockwise);
        let pieces = optimal_convex_partition(&comb).unwrap();
        assert_eq!(pieces.len(), 4);
        let total: f64 = pieces.iter().map(|p| signed_area2(p) / 2.0).sum();
        assert_relative_eq!(total, signed_area2(&comb) / 2.0, epsilon = 1e-12);
    }
}
