// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CSG (Constructive Solid Geometry) operations using BSP trees
//!
//! Booleans follow the csg.js clip/invert scheme. Result polygons are welded,
//! fan-triangulated and rebuilt into a half-edge [`SurfaceMesh`].

use super::SurfaceMesh;
use crate::config::KernelConfig;
use crate::error::{GeometryError, GeometryResult};
use crate::kernel::BooleanOp;
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy)]
struct Plane {
    normal: Vector3<f64>,
    w: f64,
}

impl Plane {
    /// Newell plane of a polygon loop; `None` when the loop has no area
    fn from_loop(vertices: &[Point3<f64>]) -> Option<Self> {
        let n = vertices.len();
        let mut normal = Vector3::zeros();
        for i in 0..n {
            let (a, b) = (&vertices[i], &vertices[(i + 1) % n]);
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
        }
        let normal = normal.try_normalize(f64::EPSILON)?;
        let centroid = vertices.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / n as f64;
        Some(Self {
            normal,
            w: normal.dot(&centroid),
        })
    }

    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    fn distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.w
    }
}

#[derive(Debug, Clone)]
struct Polygon {
    vertices: Vec<Point3<f64>>,
    plane: Plane,
}

impl Polygon {
    fn new(vertices: Vec<Point3<f64>>) -> Option<Self> {
        let plane = Plane::from_loop(&vertices)?;
        Some(Self { vertices, plane })
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }
}

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// Where `polygon` ended up relative to a splitting plane
#[derive(Default)]
struct Split {
    coplanar_front: Vec<Polygon>,
    coplanar_back: Vec<Polygon>,
    front: Vec<Polygon>,
    back: Vec<Polygon>,
}

impl Plane {
    fn split_polygon(&self, polygon: Polygon, epsilon: f64, out: &mut Split) {
        let types: Vec<u8> = polygon
            .vertices
            .iter()
            .map(|v| {
                let t = self.distance(v);
                if t < -epsilon {
                    BACK
                } else if t > epsilon {
                    FRONT
                } else {
                    COPLANAR
                }
            })
            .collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, t| acc | t);

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    out.coplanar_front.push(polygon);
                } else {
                    out.coplanar_back.push(polygon);
                }
            }
            FRONT => out.front.push(polygon),
            BACK => out.back.push(polygon),
            _ => {
                let n = polygon.vertices.len();
                let mut front = Vec::with_capacity(n + 1);
                let mut back = Vec::with_capacity(n + 1);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                    if ti != BACK {
                        front.push(vi);
                    }
                    if ti != FRONT {
                        back.push(vi);
                    }
                    if ti | tj == SPANNING {
                        let t = (self.w - self.normal.dot(&vi.coords))
                            / self.normal.dot(&(vj - vi));
                        let v = vi + (vj - vi) * t;
                        front.push(v);
                        back.push(v);
                    }
                }
                if front.len() >= 3 {
                    out.front.push(Polygon {
                        vertices: front,
                        plane: polygon.plane,
                    });
                }
                if back.len() >= 3 {
                    out.back.push(Polygon {
                        vertices: back,
                        plane: polygon.plane,
                    });
                }
            }
        }
    }
}

/// BSP tree node: a splitting plane, the polygons lying on it, and subtrees
#[derive(Debug, Clone, Default)]
struct BspNode {
    plane: Option<Plane>,
    front: Option<Box<BspNode>>,
    back: Option<Box<BspNode>>,
    polygons: Vec<Polygon>,
}

impl BspNode {
    fn new(polygons: Vec<Polygon>, epsilon: f64) -> Self {
        let mut node = Self::default();
        node.build(polygons, epsilon);
        node
    }

    fn build(&mut self, polygons: Vec<Polygon>, epsilon: f64) {
        let Some(first) = polygons.first() else {
            return;
        };
        let plane = *self.plane.get_or_insert(first.plane);

        let mut split = Split::default();
        for polygon in polygons {
            plane.split_polygon(polygon, epsilon, &mut split);
        }
        self.polygons.append(&mut split.coplanar_front);
        self.polygons.append(&mut split.coplanar_back);

        if !split.front.is_empty() {
            self.front
                .get_or_insert_with(Box::default)
                .build(split.front, epsilon);
        }
        if !split.back.is_empty() {
            self.back
                .get_or_insert_with(Box::default)
                .build(split.back, epsilon);
        }
    }

    /// Convert solid space to empty space and back
    fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove the parts of `polygons` that lie inside this tree's solid
    fn clip_polygons(&self, polygons: Vec<Polygon>, epsilon: f64) -> Vec<Polygon> {
        let Some(plane) = self.plane else {
            return polygons;
        };

        let mut split = Split::default();
        for polygon in polygons {
            plane.split_polygon(polygon, epsilon, &mut split);
        }
        let mut front = split.front;
        front.append(&mut split.coplanar_front);
        let mut back = split.back;
        back.append(&mut split.coplanar_back);

        let mut front = match &self.front {
            Some(node) => node.clip_polygons(front, epsilon),
            None => front,
        };
        let back = match &self.back {
            Some(node) => node.clip_polygons(back, epsilon),
            None => Vec::new(),
        };
        front.extend(back);
        front
    }

    /// Remove every polygon of this tree that lies inside `other`
    fn clip_to(&mut self, other: &BspNode, epsilon: f64) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons), epsilon);
        if let Some(front) = &mut self.front {
            front.clip_to(other, epsilon);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other, epsilon);
        }
    }

    fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = self.polygons.clone();
        if let Some(front) = &self.front {
            result.extend(front.all_polygons());
        }
        if let Some(back) = &self.back {
            result.extend(back.all_polygons());
        }
        result
    }
}

fn mesh_to_polygons(mesh: &SurfaceMesh) -> Vec<Polygon> {
    let points = mesh.points();
    mesh.faces()
        .filter_map(|face| {
            let vertices: Vec<Point3<f64>> = mesh.face_vertices(face).map(|v| points[v]).collect();
            let polygon = Polygon::new(vertices);
            if polygon.is_none() {
                trace!(face, "skipping zero-area face");
            }
            polygon
        })
        .collect()
}

/// Merges points closer than a tolerance, using a uniform grid
struct Welder {
    tolerance: f64,
    points: Vec<Point3<f64>>,
    cells: AHashMap<[i64; 3], Vec<usize>>,
}

impl Welder {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            points: Vec::new(),
            cells: AHashMap::new(),
        }
    }

    fn cell(&self, p: &Point3<f64>) -> [i64; 3] {
        if self.tolerance > 0.0 {
            [
                (p.x / self.tolerance).floor() as i64,
                (p.y / self.tolerance).floor() as i64,
                (p.z / self.tolerance).floor() as i64,
            ]
        } else {
            [p.x.to_bits() as i64, p.y.to_bits() as i64, p.z.to_bits() as i64]
        }
    }

    /// Index of a stored point within tolerance of `p`, inserting `p` if none
    fn insert(&mut self, p: Point3<f64>) -> usize {
        let cell = self.cell(&p);
        let reach = if self.tolerance > 0.0 { 1 } else { 0 };
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                for dz in -reach..=reach {
                    let key = [
                        cell[0].wrapping_add(dx),
                        cell[1].wrapping_add(dy),
                        cell[2].wrapping_add(dz),
                    ];
                    if let Some(bucket) = self.cells.get(&key) {
                        for &i in bucket {
                            if (self.points[i] - p).norm() <= self.tolerance {
                                return i;
                            }
                        }
                    }
                }
            }
        }

        let index = self.points.len();
        self.points.push(p);
        self.cells.entry(cell).or_default().push(index);
        index
    }
}

/// Split every loop edge at the welded vertices lying on it.
///
/// BSP splits leave T-junctions where a fragment edge runs past a vertex of
/// a neighbouring fragment. After this pass both sides of a shared edge
/// carry the same vertex sequence, so their half-edges pair up.
fn split_edges_at_vertices(loops: &mut [Vec<usize>], points: &[Point3<f64>], tolerance: f64) {
    let margin = Vector3::repeat(tolerance);
    for loop_indices in loops.iter_mut() {
        let n = loop_indices.len();
        let mut split = Vec::with_capacity(n);
        for k in 0..n {
            let (u, v) = (loop_indices[k], loop_indices[(k + 1) % n]);
            split.push(u);

            let (pu, pv) = (&points[u], &points[v]);
            let edge = pv - pu;
            let length2 = edge.norm_squared();
            if length2 == 0.0 {
                continue;
            }
            let (lo, hi) = (pu.inf(pv) - margin, pu.sup(pv) + margin);

            let mut on_edge: Vec<(f64, usize)> = points
                .iter()
                .enumerate()
                .filter_map(|(w, pw)| {
                    if w == u || w == v || (0..3).any(|axis| pw[axis] < lo[axis] || pw[axis] > hi[axis]) {
                        return None;
                    }
                    let t = (pw - pu).dot(&edge) / length2;
                    if t <= 0.0 || t >= 1.0 {
                        return None;
                    }
                    let offset = pw - (pu + edge * t);
                    (offset.norm() <= tolerance).then_some((t, w))
                })
                .collect();
            on_edge.sort_by(|a, b| a.0.total_cmp(&b.0));
            split.extend(on_edge.into_iter().map(|(_, w)| w));
        }
        *loop_indices = split;
    }
}

/// Twice the area of corner `i`, measured along `normal`
fn corner_area(loop_indices: &[usize], i: usize, points: &[Point3<f64>], normal: &Vector3<f64>) -> f64 {
    let n = loop_indices.len();
    let a = &points[loop_indices[(i + n - 1) % n]];
    let b = &points[loop_indices[i]];
    let c = &points[loop_indices[(i + 1) % n]];
    (b - a).cross(&(c - a)).dot(normal)
}

/// Ear-clip a convex loop that may carry extra vertices along its edges.
///
/// Every loop edge ends up in exactly one triangle. A loop with no area
/// yields nothing.
fn clip_ears(
    mut loop_indices: Vec<usize>,
    points: &[Point3<f64>],
    normal: &Vector3<f64>,
    min_area: f64,
    triangles: &mut Vec<[usize; 3]>,
) {
    let a = loop_indices[0];
    let mut area: f64 = loop_indices[1..]
        .windows(2)
        .map(|w| (points[w[0]] - points[a]).cross(&(points[w[1]] - points[a])).dot(normal))
        .sum();
    let flat = (area.abs() * 1e-9).max(2.0 * min_area);
    if area <= flat {
        return;
    }

    while loop_indices.len() >= 3 {
        let n = loop_indices.len();
        // Strongest ear whose removal leaves a loop with area
        let mut best: Option<(usize, f64)> = None;
        for i in 0..n {
            let ear = corner_area(&loop_indices, i, points, normal);
            if ear <= 0.0 || (n > 3 && area - ear <= flat) {
                continue;
            }
            if best.map_or(true, |(_, strongest)| ear > strongest) {
                best = Some((i, ear));
            }
        }
        let Some((i, ear)) = best else {
            trace!(remaining = n, "ear clipping stopped on a flat remainder");
            break;
        };

        triangles.push([
            loop_indices[(i + n - 1) % n],
            loop_indices[i],
            loop_indices[(i + 1) % n],
        ]);
        loop_indices.remove(i);
        area -= ear;
    }
}

/// Weld, stitch, triangulate and rebuild `polygons` as a half-edge mesh
fn polygons_to_mesh(
    polygons: &[Polygon],
    op: BooleanOp,
    config: &KernelConfig,
) -> GeometryResult<SurfaceMesh> {
    let mut welder = Welder::new(config.weld_tolerance);
    let mut loops = Vec::with_capacity(polygons.len());
    let mut normals = Vec::with_capacity(polygons.len());

    for polygon in polygons {
        let loop_indices: Vec<usize> = polygon
            .vertices
            .iter()
            .map(|&v| welder.insert(v))
            .collect();
        loops.push(loop_indices);
        normals.push(polygon.plane.normal);
    }

    let tolerance = config.weld_tolerance.max(config.plane_epsilon);
    split_edges_at_vertices(&mut loops, &welder.points, tolerance);

    let min_area = config.weld_tolerance * config.weld_tolerance;
    let mut triangles = Vec::new();
    for (mut loop_indices, normal) in loops.into_iter().zip(&normals) {
        loop_indices.dedup();
        while loop_indices.len() > 1 && loop_indices.first() == loop_indices.last() {
            loop_indices.pop();
        }
        if loop_indices.len() < 3 {
            continue;
        }
        clip_ears(loop_indices, &welder.points, normal, min_area, &mut triangles);
    }

    SurfaceMesh::from_triangles(welder.points, &triangles).map_err(|err| GeometryError::BooleanFailed {
        op,
        reason: format!("result is not a valid half-edge mesh: {}", err),
    })
}

/// Run `op` on `a` and `b` with BSP clipping
pub fn boolean(
    a: &SurfaceMesh,
    b: &SurfaceMesh,
    op: BooleanOp,
    config: &KernelConfig,
) -> GeometryResult<SurfaceMesh> {
    let (box_a, box_b) = (a.bounding_box(), b.bounding_box());
    if !box_a.intersects(&box_b, config.plane_epsilon) {
        debug!(%op, "bounding boxes are disjoint, skipping BSP");
        return Ok(match op {
            BooleanOp::Union => {
                let mut result = a.clone();
                result.merge(b);
                result
            }
            BooleanOp::Intersection => SurfaceMesh::new(),
            BooleanOp::Difference => a.clone(),
        });
    }

    let epsilon = config.plane_epsilon;
    let mut tree_a = BspNode::new(mesh_to_polygons(a), epsilon);
    let mut tree_b = BspNode::new(mesh_to_polygons(b), epsilon);

    let polygons = match op {
        BooleanOp::Union => {
            tree_a.clip_to(&tree_b, epsilon);
            tree_b.clip_to(&tree_a, epsilon);
            tree_b.invert();
            tree_b.clip_to(&tree_a, epsilon);
            tree_b.invert();
            let mut result = tree_a.all_polygons();
            result.extend(tree_b.all_polygons());
            result
        }
        BooleanOp::Difference => {
            tree_a.invert();
            tree_a.clip_to(&tree_b, epsilon);
            tree_b.clip_to(&tree_a, epsilon);
            tree_b.invert();
            tree_b.clip_to(&tree_a, epsilon);
            tree_b.invert();
            flipped(tree_a.all_polygons(), tree_b.all_polygons())
        }
        BooleanOp::Intersection => {
            tree_a.invert();
            tree_b.clip_to(&tree_a, epsilon);
            tree_b.invert();
            tree_a.clip_to(&tree_b, epsilon);
            tree_b.clip_to(&tree_a, epsilon);
            flipped(tree_a.all_polygons(), tree_b.all_polygons())
        }
    };
    trace!(%op, polygons = polygons.len(), "clipping finished");

    let result = polygons_to_mesh(&polygons, op, config)?;
    if a.is_closed() && b.is_closed() && !result.is_empty() && !result.is_closed() {
        return Err(GeometryError::BooleanFailed {
            op,
            reason: format!(
                "result of closed inputs has {} border edges",
                result.border_edge_count()
            ),
        });
    }
    Ok(result)
}

fn flipped(mut a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    a.extend(b);
    for polygon in &mut a {
        polygon.flip();
    }
    a
}
