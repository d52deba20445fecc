// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - meshes, polygons and the algorithms behind them

mod bbox;
pub(crate) mod csg;
pub mod halfedge;
pub(crate) mod partition;
mod polygon2;
pub mod predicates;
mod surface_mesh;

pub use bbox::BoundingBox;
pub use polygon2::Polygon2;
pub use surface_mesh::SurfaceMesh;
