// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - mesh and polygon files

mod json;
mod off;
mod stl;

pub use json::{
    polygon_from_json, polygons_to_json, read_polygon_json, write_polygons_json,
};
pub use off::{export_off, import_off, read_off, write_off};
pub use stl::{export_stl, import_stl, read_stl, write_stl};

use crate::error::{GeometryError, GeometryResult};
use crate::geometry::SurfaceMesh;
use std::path::Path;

/// Mesh file formats recognised by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Off,
    Stl,
}

impl MeshFormat {
    pub fn from_path(path: &Path) -> GeometryResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("off") => Ok(Self::Off),
            Some("stl") => Ok(Self::Stl),
            _ => Err(GeometryError::invalid(format!(
                "unsupported mesh format: {}",
                path.display()
            ))),
        }
    }
}

/// Load an OFF or STL mesh, chosen by file extension
pub fn import_mesh(path: impl AsRef<Path>) -> GeometryResult<SurfaceMesh> {
    let path = path.as_ref();
    match MeshFormat::from_path(path)? {
        MeshFormat::Off => import_off(path),
        MeshFormat::Stl => import_stl(path),
    }
}

/// Save an OFF or STL mesh, chosen by file extension
pub fn export_mesh(mesh: &SurfaceMesh, path: impl AsRef<Path>) -> GeometryResult<()> {
    let path = path.as_ref();
    match MeshFormat::from_path(path)? {
        MeshFormat::Off => export_off(mesh, path),
        MeshFormat::Stl => export_stl(mesh, path),
    }
}
