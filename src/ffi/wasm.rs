// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! WASM bindings using wasm-bindgen
//!
//! Coordinates cross the boundary as flat `f64` buffers (`x0 y0 z0 x1 ...`)
//! and faces as flat `u32` index triples.

use crate::error::GeometryError;
use crate::geometry::{Polygon2, SurfaceMesh};
use crate::io;
use wasm_bindgen::prelude::*;

fn to_js(err: GeometryError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct WasmSurfaceMesh {
    inner: SurfaceMesh,
}

#[wasm_bindgen]
impl WasmSurfaceMesh {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: SurfaceMesh::new(),
        }
    }

    /// Build from flat vertex coordinates and flat triangle indices
    pub fn from_buffers(vertices: &[f64], faces: &[u32]) -> Result<WasmSurfaceMesh, JsValue> {
        if vertices.len() % 3 != 0 || faces.len() % 3 != 0 {
            return Err(JsValue::from_str("buffers must hold whole triples"));
        }
        let mut inner = SurfaceMesh::new();
        for v in vertices.chunks_exact(3) {
            inner.add_vertex(v[0], v[1], v[2]);
        }
        for f in faces.chunks_exact(3) {
            inner
                .add_face(f[0] as usize, f[1] as usize, f[2] as usize)
                .map_err(to_js)?;
        }
        Ok(Self { inner })
    }

    pub fn add_vertex(&mut self, x: f64, y: f64, z: f64) -> usize {
        self.inner.add_vertex(x, y, z)
    }

    pub fn add_face(&mut self, i: usize, j: usize, k: usize) -> Result<usize, JsValue> {
        self.inner.add_face(i, j, k).map_err(to_js)
    }

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.inner.translate(dx, dy, dz);
    }

    pub fn number_of_vertices(&self) -> usize {
        self.inner.number_of_vertices()
    }

    pub fn number_of_faces(&self) -> usize {
        self.inner.number_of_faces()
    }

    pub fn union(&self, other: &WasmSurfaceMesh) -> Result<WasmSurfaceMesh, JsValue> {
        let inner = self.inner.union(&other.inner).map_err(to_js)?;
        Ok(Self { inner })
    }

    pub fn intersect(&self, other: &WasmSurfaceMesh) -> Result<WasmSurfaceMesh, JsValue> {
        let inner = self.inner.intersect(&other.inner).map_err(to_js)?;
        Ok(Self { inner })
    }

    pub fn subtract(&self, other: &WasmSurfaceMesh) -> Result<WasmSurfaceMesh, JsValue> {
        let inner = self.inner.subtract(&other.inner).map_err(to_js)?;
        Ok(Self { inner })
    }

    /// Flat `x y z` coordinates
    pub fn vertex_buffer(&self) -> Vec<f64> {
        self.inner
            .points()
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect()
    }

    /// Flat triangle indices
    pub fn face_buffer(&self) -> Vec<u32> {
        self.inner
            .faces()
            .flat_map(|f| self.inner.face_vertices(f).map(|v| v as u32).collect::<Vec<_>>())
            .collect()
    }

    /// Binary STL bytes
    pub fn to_stl(&self) -> Result<Vec<u8>, JsValue> {
        let mut buffer = Vec::new();
        io::write_stl(&self.inner, &mut buffer).map_err(to_js)?;
        Ok(buffer)
    }

    pub fn to_off(&self) -> String {
        self.inner.to_string()
    }
}

impl Default for WasmSurfaceMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
pub struct WasmPolygon2 {
    inner: Polygon2,
}

#[wasm_bindgen]
impl WasmPolygon2 {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: Polygon2::new(),
        }
    }

    pub fn from_xy(xs: &[f64], ys: &[f64]) -> Result<WasmPolygon2, JsValue> {
        let inner = Polygon2::from_xy(xs, ys).map_err(to_js)?;
        Ok(Self { inner })
    }

    pub fn push_back(&mut self, x: f64, y: f64) {
        self.inner.push_back(x, y);
    }

    pub fn size(&self) -> usize {
        self.inner.size()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn reverse_orientation(&mut self) {
        self.inner.reverse_orientation();
    }

    pub fn is_simple(&self) -> bool {
        self.inner.is_simple()
    }

    pub fn is_convex(&self) -> bool {
        self.inner.is_convex()
    }

    /// -1 clockwise, 0 collinear, 1 counter-clockwise
    pub fn orientation(&self) -> i32 {
        self.inner.orientation().sign()
    }

    /// Flat `x y` coordinates
    pub fn coordinates(&self) -> Vec<f64> {
        self.inner.iter().flat_map(|p| [p.x, p.y]).collect()
    }

    /// Pieces as a JSON array of `[x, y]` arrays
    pub fn optimal_convex_partition(&mut self) -> Result<String, JsValue> {
        let pieces = self.inner.optimal_convex_partition().map_err(to_js)?;
        io::polygons_to_json(&pieces).map_err(to_js)
    }
}

impl Default for WasmPolygon2 {
    fn default() -> Self {
        Self::new()
    }
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
