// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Host-facing data shapes: numeric arrays in, nested lists out

mod array;

pub use array::NumericArray;

use serde::{Deserialize, Serialize};

/// Flattened export of a [`crate::SurfaceMesh`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticesAndPolygons {
    /// One `[x, y, z]` per vertex, in vertex index order
    pub vertices: Vec<[f64; 3]>,
    /// Vertex indices of each face in half-edge traversal order
    pub polygons: Vec<Vec<usize>>,
    pub face_count: usize,
}
