// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Indexed surface mesh with half-edge connectivity

use super::halfedge::HalfEdgeConnectivity;
use super::predicates::signed_tetra_volume;
use super::BoundingBox;
use crate::error::{GeometryError, GeometryResult};
use crate::host::{NumericArray, VerticesAndPolygons};
use crate::kernel::{BooleanOp, GeometryKernel, NativeKernel};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use std::fmt;

/// Triangulated surface mesh.
///
/// Vertices are addressed by the index [`SurfaceMesh::add_vertex`] returned.
/// Every face is stored as a half-edge loop, and a directed edge may bound at
/// most one face.
#[derive(Debug, Clone, Default)]
pub struct SurfaceMesh {
    points: Vec<Point3<f64>>,
    connectivity: HalfEdgeConnectivity,
}

impl SurfaceMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from nested host lists.
    ///
    /// Every vertex row must hold 3 coordinates. Face rows hold 3 indices,
    /// or 4 for the quad convenience of [`SurfaceMesh::add_quad`].
    pub fn from_lists<V, F>(vertices: &[V], faces: &[F]) -> GeometryResult<Self>
    where
        V: AsRef<[f64]>,
        F: AsRef<[usize]>,
    {
        let mut mesh = Self::new();
        for (i, row) in vertices.iter().enumerate() {
            match *row.as_ref() {
                [x, y, z] => {
                    mesh.add_vertex(x, y, z);
                }
                ref other => {
                    return Err(GeometryError::invalid(format!(
                        "vertex {} has {} coordinates, expected 3",
                        i,
                        other.len()
                    )))
                }
            }
        }
        for face in faces {
            mesh.add_indexed_face(face.as_ref())?;
        }
        Ok(mesh)
    }

    /// Build from an `(n, 3)` coordinate array and an `(m, 3)` index array
    pub fn from_arrays(vertices: &NumericArray, faces: &NumericArray) -> GeometryResult<Self> {
        expect_columns(vertices, 3, "vertex array")?;
        expect_columns(faces, 3, "face array")?;

        let mut mesh = Self::new();
        mesh.points.reserve(vertices.rows());
        for row in vertices.data().chunks_exact(3) {
            mesh.add_vertex(row[0], row[1], row[2]);
        }
        for row in faces.data().chunks_exact(3) {
            let mut indices = [0usize; 3];
            for (slot, &value) in indices.iter_mut().zip(row) {
                *slot = to_index(value)?;
            }
            mesh.add_face(indices[0], indices[1], indices[2])?;
        }
        Ok(mesh)
    }

    /// Build from owned points and triangle index triples
    pub fn from_triangles(points: Vec<Point3<f64>>, triangles: &[[usize; 3]]) -> GeometryResult<Self> {
        let mut mesh = Self {
            points,
            connectivity: HalfEdgeConnectivity::new(),
        };
        for &[i, j, k] in triangles {
            mesh.add_face(i, j, k)?;
        }
        Ok(mesh)
    }

    /// Append a vertex and return its index
    pub fn add_vertex(&mut self, x: f64, y: f64, z: f64) -> usize {
        self.points.push(Point3::new(x, y, z));
        self.points.len() - 1
    }

    /// Append triangle `(i, j, k)` and return its face index.
    ///
    /// The mesh is left untouched when the face is rejected.
    pub fn add_face(&mut self, i: usize, j: usize, k: usize) -> GeometryResult<usize> {
        self.connectivity.add_face(&[i, j, k], self.points.len())
    }

    /// Append quad `(i, j, k, l)` as triangles `(i, j, k)` and `(i, k, l)`.
    ///
    /// The split always uses the i-k diagonal. No planarity or convexity
    /// check is made, so a non-convex or non-planar quad gets a fold.
    pub fn add_quad(&mut self, i: usize, j: usize, k: usize, l: usize) -> GeometryResult<(usize, usize)> {
        let n = self.points.len();
        self.connectivity.validate_face(&[i, j, k, l], n)?;
        self.connectivity.validate_face(&[i, j, k], n)?;
        self.connectivity.validate_face(&[i, k, l], n)?;
        let first = self.connectivity.insert_unchecked(&[i, j, k]);
        let second = self.connectivity.insert_unchecked(&[i, k, l]);
        Ok((first, second))
    }

    fn add_indexed_face(&mut self, indices: &[usize]) -> GeometryResult<()> {
        match *indices {
            [i, j, k] => self.add_face(i, j, k).map(drop),
            [i, j, k, l] => self.add_quad(i, j, k, l).map(drop),
            _ => Err(GeometryError::invalid(format!(
                "face {:?} has {} indices, expected 3 or 4",
                indices,
                indices.len()
            ))),
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        let offset = Vector3::new(dx, dy, dz);
        for p in &mut self.points {
            *p += offset;
        }
    }

    /// Apply `p' = M p` to every vertex (no translation part).
    ///
    /// `matrix` is read row-major: `Matrix3::new(m11, m12, m13, ...)` gives
    /// `x' = m11 x + m12 y + m13 z`.
    pub fn transform(&mut self, matrix: &Matrix3<f64>) {
        for p in &mut self.points {
            *p = Point3::from(matrix * p.coords);
        }
    }

    /// Apply a homogeneous 4x4 transform to every vertex
    pub fn transform_affine(&mut self, matrix: &Matrix4<f64>) {
        for p in &mut self.points {
            *p = matrix.transform_point(p);
        }
    }

    pub fn union(&self, other: &SurfaceMesh) -> GeometryResult<SurfaceMesh> {
        self.union_with(other, &NativeKernel::default())
    }

    pub fn intersect(&self, other: &SurfaceMesh) -> GeometryResult<SurfaceMesh> {
        self.intersect_with(other, &NativeKernel::default())
    }

    pub fn subtract(&self, other: &SurfaceMesh) -> GeometryResult<SurfaceMesh> {
        self.subtract_with(other, &NativeKernel::default())
    }

    pub fn union_with(&self, other: &SurfaceMesh, kernel: &impl GeometryKernel) -> GeometryResult<SurfaceMesh> {
        kernel.boolean(self, other, BooleanOp::Union)
    }

    pub fn intersect_with(&self, other: &SurfaceMesh, kernel: &impl GeometryKernel) -> GeometryResult<SurfaceMesh> {
        kernel.boolean(self, other, BooleanOp::Intersection)
    }

    pub fn subtract_with(&self, other: &SurfaceMesh, kernel: &impl GeometryKernel) -> GeometryResult<SurfaceMesh> {
        kernel.boolean(self, other, BooleanOp::Difference)
    }

    /// Append a copy of `other`, offsetting its indices.
    ///
    /// The two vertex sets stay separate, so no directed edge can collide.
    pub fn merge(&mut self, other: &SurfaceMesh) {
        let offset = self.points.len();
        self.points.extend_from_slice(&other.points);
        for face in other.faces() {
            let shifted: Vec<usize> = other.face_vertices(face).map(|v| v + offset).collect();
            self.connectivity.insert_unchecked(&shifted);
        }
    }

    /// Export coordinates and face loops for a host
    pub fn to_vertices_and_polygons(&self) -> VerticesAndPolygons {
        VerticesAndPolygons {
            vertices: self.points.iter().map(|p| [p.x, p.y, p.z]).collect(),
            polygons: self.faces().map(|f| self.face_vertices(f).collect()).collect(),
            face_count: self.number_of_faces(),
        }
    }

    pub fn number_of_vertices(&self) -> usize {
        self.points.len()
    }

    pub fn number_of_faces(&self) -> usize {
        self.connectivity.face_count()
    }

    pub fn number_of_halfedges(&self) -> usize {
        self.connectivity.half_edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.connectivity.face_count() == 0
    }

    pub fn faces(&self) -> std::ops::Range<usize> {
        0..self.number_of_faces()
    }

    pub fn vertices(&self) -> std::ops::Range<usize> {
        0..self.number_of_vertices()
    }

    pub fn point(&self, vertex: usize) -> Option<Point3<f64>> {
        self.points.get(vertex).copied()
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Half-edges bounding `face`, starting at the one leaving its first vertex
    pub fn halfedges_around_face(&self, face: usize) -> impl Iterator<Item = usize> + '_ {
        self.connectivity.face_loop(face)
    }

    /// Vertex indices of `face` in traversal order
    pub fn face_vertices(&self, face: usize) -> impl Iterator<Item = usize> + '_ {
        self.halfedges_around_face(face)
            .filter_map(move |h| self.connectivity.source(h))
    }

    pub fn source(&self, halfedge: usize) -> Option<usize> {
        self.connectivity.source(halfedge)
    }

    pub fn target(&self, halfedge: usize) -> Option<usize> {
        self.connectivity.target(halfedge)
    }

    pub fn opposite(&self, halfedge: usize) -> Option<usize> {
        self.connectivity.opposite(halfedge)
    }

    /// Every half-edge has an opposite (and there is at least one face)
    pub fn is_closed(&self) -> bool {
        !self.is_empty() && self.border_edge_count() == 0
    }

    pub fn border_edge_count(&self) -> usize {
        self.connectivity.border_count()
    }

    /// Signed enclosed volume, positive for outward-facing CCW faces
    pub fn volume(&self) -> f64 {
        self.faces()
            .map(|f| {
                let loop_vertices: Vec<usize> = self.face_vertices(f).collect();
                let a = &self.points[loop_vertices[0]];
                loop_vertices[1..]
                    .windows(2)
                    .map(|w| signed_tetra_volume(a, &self.points[w[0]], &self.points[w[1]]))
                    .sum::<f64>()
            })
            .sum()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.connectivity.clear();
    }
}

impl fmt::Display for SurfaceMesh {
    /// OFF stream of the mesh
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OFF")?;
        writeln!(f, "{} {} 0", self.number_of_vertices(), self.number_of_faces())?;
        for p in &self.points {
            writeln!(f, "{} {} {}", p.x, p.y, p.z)?;
        }
        for face in self.faces() {
            let loop_vertices: Vec<usize> = self.face_vertices(face).collect();
            write!(f, "{}", loop_vertices.len())?;
            for v in loop_vertices {
                write!(f, " {}", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn expect_columns(array: &NumericArray, columns: usize, what: &str) -> GeometryResult<()> {
    array.expect_ndim(2, what)?;
    if array.shape()[1] != columns {
        return Err(GeometryError::invalid(format!(
            "{} must have shape (n, {}), got {:?}",
            what,
            columns,
            array.shape()
        )));
    }
    Ok(())
}

fn to_index(value: f64) -> GeometryResult<usize> {
    if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
        return Err(GeometryError::invalid(format!(
            "face index {} is not a non-negative integer",
            value
        )));
    }
    Ok(value as usize)
}
