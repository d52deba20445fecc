// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry kernel capability and the native backend

use crate::config::KernelConfig;
use crate::error::{GeometryError, GeometryResult};
use crate::geometry::{csg, partition, SurfaceMesh};
use nalgebra::{Matrix4, Point2};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub use crate::geometry::predicates::Orientation;

/// Boolean mesh operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    Union,
    Intersection,
    Difference,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Union => "union",
            Self::Intersection => "intersection",
            Self::Difference => "difference",
        };
        f.write_str(name)
    }
}

/// Operations a geometry backend provides to meshes and polygons.
///
/// [`SurfaceMesh`] and [`crate::Polygon2`] delegate all heavy lifting
/// here, so any backend implementing this trait can be swapped in.
pub trait GeometryKernel {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Combine two meshes into a new, independent mesh
    fn boolean(&self, a: &SurfaceMesh, b: &SurfaceMesh, op: BooleanOp)
        -> GeometryResult<SurfaceMesh>;

    /// Apply a homogeneous transform to every vertex
    fn transform_mesh(&self, mesh: &mut SurfaceMesh, matrix: &Matrix4<f64>) {
        mesh.transform_affine(matrix);
    }

    fn is_simple(&self, points: &[Point2<f64>]) -> bool;

    fn is_convex(&self, points: &[Point2<f64>]) -> bool;

    fn orientation(&self, points: &[Point2<f64>]) -> Orientation;

    /// Minimum-cardinality convex decomposition of a simple CCW polygon
    fn optimal_convex_partition(
        &self,
        points: &[Point2<f64>],
    ) -> GeometryResult<Vec<Vec<Point2<f64>>>>;
}

/// Built-in backend: BSP booleans and exact 2D predicates
#[derive(Debug, Clone, Default)]
pub struct NativeKernel {
    config: KernelConfig,
}

impl NativeKernel {
    pub fn new(config: KernelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }
}

impl GeometryKernel for NativeKernel {
    fn name(&self) -> &str {
        "native-bsp"
    }

    fn boolean(
        &self,
        a: &SurfaceMesh,
        b: &SurfaceMesh,
        op: BooleanOp,
    ) -> GeometryResult<SurfaceMesh> {
        if self.config.require_closed_inputs {
            for (label, mesh) in [("A", a), ("B", b)] {
                if !mesh.is_closed() {
                    return Err(GeometryError::BooleanFailed {
                        op,
                        reason: format!(
                            "input {} is not closed ({} border edges)",
                            label,
                            mesh.border_edge_count()
                        ),
                    });
                }
            }
        }

        let result = csg::boolean(a, b, op, &self.config)?;
        debug!(
            %op,
            faces_a = a.number_of_faces(),
            faces_b = b.number_of_faces(),
            faces_out = result.number_of_faces(),
            "boolean finished"
        );
        Ok(result)
    }

    fn is_simple(&self, points: &[Point2<f64>]) -> bool {
        partition::is_simple(points)
    }

    fn is_convex(&self, points: &[Point2<f64>]) -> bool {
        partition::is_convex(points)
    }

    fn orientation(&self, points: &[Point2<f64>]) -> Orientation {
        partition::orientation(points)
    }

    fn optimal_convex_partition(
        &self,
        points: &[Point2<f64>],
    ) -> GeometryResult<Vec<Vec<Point2<f64>>>> {
        if points.len() < 3 {
            return Err(GeometryError::PartitionFailed(format!(
                "need at least 3 vertices, got {}",
                points.len()
            )));
        }
        if partition::orientation(points) != Orientation::CounterClockwise {
            return Err(GeometryError::PartitionFailed(
                "polygon is not counter-clockwise".into(),
            ));
        }

        let pieces = partition::optimal_convex_partition(points)?;
        debug!(
            vertices = points.len(),
            pieces = pieces.len(),
            "convex partition finished"
        );
        Ok(pieces)
    }
}
