// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import/export via `stl_io`

use crate::error::{GeometryError, GeometryResult};
use crate::geometry::SurfaceMesh;
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};
use tracing::{debug, warn};

fn to_stl_vertex(p: &Point3<f64>) -> StlVertex {
    StlVertex::new([p.x as f32, p.y as f32, p.z as f32])
}

/// Flat triangle list of `mesh`, with normals computed from geometry
fn stl_triangles(mesh: &SurfaceMesh) -> Vec<StlTriangle> {
    let points = mesh.points();
    let mut triangles = Vec::with_capacity(mesh.number_of_faces());
    for face in mesh.faces() {
        let loop_vertices: Vec<usize> = mesh.face_vertices(face).collect();
        let a = &points[loop_vertices[0]];
        for w in loop_vertices[1..].windows(2) {
            let (b, c) = (&points[w[0]], &points[w[1]]);
            let normal = (b - a)
                .cross(&(c - a))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);
            triangles.push(StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [to_stl_vertex(a), to_stl_vertex(b), to_stl_vertex(c)],
            });
        }
    }
    triangles
}

/// Write `mesh` as binary STL
pub fn write_stl<W: Write>(mesh: &SurfaceMesh, writer: &mut W) -> GeometryResult<()> {
    let triangles = stl_triangles(mesh);
    stl_io::write_stl(writer, triangles.iter())?;
    Ok(())
}

/// Read ASCII or binary STL, merging vertices with identical coordinates
pub fn read_stl<R: Read + Seek>(reader: &mut R) -> GeometryResult<SurfaceMesh> {
    let stl = stl_io::read_stl(reader)?;

    let mut mesh = SurfaceMesh::new();
    let mut welded: AHashMap<[u32; 3], usize> = AHashMap::new();
    let remap: Vec<usize> = stl
        .vertices
        .iter()
        .map(|v| {
            let key = [v[0].to_bits(), v[1].to_bits(), v[2].to_bits()];
            *welded
                .entry(key)
                .or_insert_with(|| mesh.add_vertex(v[0] as f64, v[1] as f64, v[2] as f64))
        })
        .collect();

    let mut skipped = 0;
    for face in &stl.faces {
        let [i, j, k] = face.vertices.map(|v| remap[v]);
        match mesh.add_face(i, j, k) {
            Ok(_) => {}
            Err(GeometryError::DegenerateFace { .. }) => skipped += 1,
            Err(err) => return Err(err),
        }
    }
    if skipped > 0 {
        warn!(skipped, "dropped degenerate STL facets");
    }

    debug!(
        vertices = mesh.number_of_vertices(),
        faces = mesh.number_of_faces(),
        "read STL mesh"
    );
    Ok(mesh)
}

pub fn export_stl(mesh: &SurfaceMesh, path: impl AsRef<Path>) -> GeometryResult<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_stl(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn import_stl(path: impl AsRef<Path>) -> GeometryResult<SurfaceMesh> {
    let mut file = File::open(path.as_ref())?;
    read_stl(&mut file)
}
