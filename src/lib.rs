// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! geokernel
//!
//! Computational-geometry primitives for host environments: half-edge
//! surface meshes with boolean operations, and 2D polygons with
//! orientation queries and optimal convex partition.
//!
//! The heavy lifting sits behind [`GeometryKernel`]; [`NativeKernel`] is the
//! built-in backend.

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod io;
pub mod kernel;

#[cfg(feature = "wasm")]
pub mod ffi;

pub use config::KernelConfig;
pub use error::{GeometryError, GeometryResult};
pub use geometry::{BoundingBox, Polygon2, SurfaceMesh};
pub use host::{NumericArray, VerticesAndPolygons};
pub use kernel::{BooleanOp, GeometryKernel, NativeKernel, Orientation};
