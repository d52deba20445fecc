// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types shared by meshes, polygons and kernels

use crate::kernel::BooleanOp;
use thiserror::Error;

/// Errors raised by geometry construction, queries and kernel operations.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Argument has the wrong shape (rank, row width, paired lengths).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A face referenced a vertex that does not exist.
    #[error("vertex index {index} out of range for mesh with {len} vertices")]
    IndexOutOfRange { index: usize, len: usize },

    /// A face repeats a vertex or has fewer than three vertices.
    #[error("degenerate face {vertices:?}")]
    DegenerateFace { vertices: Vec<usize> },

    /// A face would reuse a directed edge that already bounds another face.
    #[error("face {vertices:?} reuses directed edge ({from}, {to})")]
    NonManifoldFace {
        vertices: Vec<usize>,
        from: usize,
        to: usize,
    },

    /// The kernel could not produce a valid boolean result.
    #[error("{op} failed: {reason}")]
    BooleanFailed { op: BooleanOp, reason: String },

    /// The kernel could not partition the polygon.
    #[error("convex partition failed: {0}")]
    PartitionFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed text input (OFF and friends).
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeometryError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result alias used across the crate.
pub type GeometryResult<T> = Result<T, GeometryError>;
