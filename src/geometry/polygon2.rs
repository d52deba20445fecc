// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Ordered 2D point loop

use super::predicates::signed_area2;
use crate::error::{GeometryError, GeometryResult};
use crate::host::NumericArray;
use crate::kernel::{GeometryKernel, NativeKernel, Orientation};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed loop of 2D points, possibly self-intersecting.
///
/// Simplicity and convexity are queried, never enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon2 {
    points: Vec<Point2<f64>>,
}

impl Polygon2 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `[x, y]` rows; extra columns are ignored
    pub fn from_points<P: AsRef<[f64]>>(rows: &[P]) -> GeometryResult<Self> {
        let mut polygon = Self::new();
        for row in rows {
            polygon.push_back_slice(row.as_ref())?;
        }
        Ok(polygon)
    }

    /// Build from paired coordinate lists of equal length
    pub fn from_xy(xs: &[f64], ys: &[f64]) -> GeometryResult<Self> {
        if xs.len() != ys.len() {
            return Err(GeometryError::invalid(format!(
                "x and y lists differ in length ({} vs {})",
                xs.len(),
                ys.len()
            )));
        }
        Ok(xs.iter().zip(ys).map(|(&x, &y)| Point2::new(x, y)).collect())
    }

    /// Build from an `(n, k)` array with `k >= 2`, reading the first two columns
    pub fn from_array(array: &NumericArray) -> GeometryResult<Self> {
        array.expect_ndim(2, "polygon array")?;
        let width = array.shape()[1];
        if width < 2 {
            return Err(GeometryError::invalid(format!(
                "polygon array needs at least 2 columns, got shape {:?}",
                array.shape()
            )));
        }
        Ok(array
            .data()
            .chunks_exact(width)
            .map(|row| Point2::new(row[0], row[1]))
            .collect())
    }

    /// Build from two rank-1 arrays of equal length
    pub fn from_xy_arrays(xs: &NumericArray, ys: &NumericArray) -> GeometryResult<Self> {
        xs.expect_ndim(1, "x array")?;
        ys.expect_ndim(1, "y array")?;
        Self::from_xy(xs.data(), ys.data())
    }

    pub fn from_vec(points: Vec<Point2<f64>>) -> Self {
        Self { points }
    }

    pub fn push_back(&mut self, x: f64, y: f64) {
        self.points.push(Point2::new(x, y));
    }

    /// Append `(values[0], values[1])`; needs at least two values
    pub fn push_back_slice(&mut self, values: &[f64]) -> GeometryResult<()> {
        match values {
            [x, y, ..] => {
                self.push_back(*x, *y);
                Ok(())
            }
            _ => Err(GeometryError::invalid(format!(
                "point needs at least 2 coordinates, got {}",
                values.len()
            ))),
        }
    }

    /// Append a point from a rank-1 array of at least two values
    pub fn push_back_array(&mut self, array: &NumericArray) -> GeometryResult<()> {
        array.expect_ndim(1, "point array")?;
        self.push_back_slice(array.data())
    }

    pub fn size(&self) -> usize {
        self.points.len()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point2<f64>> {
        self.points.iter()
    }

    /// Reverse the loop direction, keeping the first vertex first
    pub fn reverse_orientation(&mut self) {
        if self.points.len() > 1 {
            self.points[1..].reverse();
        }
    }

    /// Signed area, positive for counter-clockwise loops
    pub fn area(&self) -> f64 {
        signed_area2(&self.points) / 2.0
    }

    pub fn is_simple(&self) -> bool {
        self.is_simple_with(&NativeKernel::default())
    }

    pub fn is_convex(&self) -> bool {
        self.is_convex_with(&NativeKernel::default())
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation_with(&NativeKernel::default())
    }

    pub fn is_simple_with(&self, kernel: &impl GeometryKernel) -> bool {
        kernel.is_simple(&self.points)
    }

    pub fn is_convex_with(&self, kernel: &impl GeometryKernel) -> bool {
        kernel.is_convex(&self.points)
    }

    pub fn orientation_with(&self, kernel: &impl GeometryKernel) -> Orientation {
        kernel.orientation(&self.points)
    }

    /// Decompose into the fewest convex pieces, all counter-clockwise.
    ///
    /// Fails with [`GeometryError::InvalidArgument`] on a non-simple
    /// polygon, leaving it untouched. A clockwise polygon is reversed in
    /// place (see [`Polygon2::reverse_orientation`]) before partitioning.
    pub fn optimal_convex_partition(&mut self) -> GeometryResult<Vec<Polygon2>> {
        self.optimal_convex_partition_with(&NativeKernel::default())
    }

    pub fn optimal_convex_partition_with(
        &mut self,
        kernel: &impl GeometryKernel,
    ) -> GeometryResult<Vec<Polygon2>> {
        if !kernel.is_simple(&self.points) {
            return Err(GeometryError::invalid(
                "convex partition needs a simple polygon",
            ));
        }
        if kernel.orientation(&self.points) != Orientation::CounterClockwise {
            self.reverse_orientation();
        }

        let pieces = kernel.optimal_convex_partition(&self.points)?;
        Ok(pieces.into_iter().map(Polygon2::from_vec).collect())
    }
}

impl FromIterator<Point2<f64>> for Polygon2 {
    fn from_iter<I: IntoIterator<Item = Point2<f64>>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Polygon2 {
    type Item = &'a Point2<f64>;
    type IntoIter = std::slice::Iter<'a, Point2<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl fmt::Display for Polygon2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Polygon2[")?;
        for p in &self.points {
            writeln!(f, "{} {}", p.x, p.y)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon2 {
        Polygon2::from_xy(&[0.0, 1.0, 1.0, 0.0], &[0.0, 0.0, 1.0, 1.0]).unwrap()
    }

    #[test]
    fn test_push_back_variants() {
        let mut polygon = Polygon2::new();
        polygon.push_back(0.0, 0.0);
        polygon.push_back_slice(&[1.0, 0.0, 99.0]).unwrap();
        polygon
            .push_back_array(&NumericArray::from_vec(vec![1.0, 1.0]))
            .unwrap();
        assert_eq!(polygon.size(), 3);

        assert!(polygon.push_back_slice(&[1.0]).is_err());
        let matrix = NumericArray::from_rows(&[[1.0, 1.0]]).unwrap();
        assert!(polygon.push_back_array(&matrix).is_err());
        assert_eq!(polygon.size(), 3);

        polygon.clear();
        assert_eq!(polygon.size(), 0);
        assert!(polygon.is_empty());
    }

    #[test]
    fn test_constructors_validate_shapes() {
        assert!(matches!(
            Polygon2::from_xy(&[0.0, 1.0], &[0.0]),
            Err(GeometryError::InvalidArgument(_))
        ));

        let one_column = NumericArray::new(vec![3, 1], vec![0.0; 3]).unwrap();
        assert!(Polygon2::from_array(&one_column).is_err());

        let flat = NumericArray::from_vec(vec![0.0; 6]);
        assert!(Polygon2::from_array(&flat).is_err());

        let xs = NumericArray::from_vec(vec![0.0, 1.0, 1.0]);
        let ys = NumericArray::from_vec(vec![0.0, 0.0, 1.0]);
        assert_eq!(Polygon2::from_xy_arrays(&xs, &ys).unwrap().size(), 3);

        let wide = NumericArray::from_rows(&[[0.0, 0.0, 7.0], [1.0, 0.0, 7.0], [0.0, 1.0, 7.0]]).unwrap();
        let polygon = Polygon2::from_array(&wide).unwrap();
        assert_eq!(polygon.points()[1], Point2::new(1.0, 0.0));
    }

    #[test]
    fn test_reverse_keeps_first_vertex() {
        let mut polygon = unit_square();
        polygon.reverse_orientation();
        let expected = Polygon2::from_xy(&[0.0, 0.0, 1.0, 1.0], &[0.0, 1.0, 1.0, 0.0]).unwrap();
        assert_eq!(polygon, expected);
        assert_eq!(polygon.orientation(), Orientation::Clockwise);
    }

    #[test]
    fn test_square_queries() {
        let polygon = unit_square();
        assert!(polygon.is_simple());
        assert!(polygon.is_convex());
        assert_eq!(polygon.orientation(), Orientation::CounterClockwise);
        assert_eq!(polygon.orientation().sign(), 1);
        assert_eq!(polygon.area(), 1.0);
    }

    #[test]
    fn test_non_simple_partition_is_rejected_untouched() {
        let mut bowtie = Polygon2::from_xy(&[0.0, 1.0, 1.0, 0.0], &[0.0, 1.0, 0.0, 1.0]).unwrap();
        let before = bowtie.clone();
        assert!(matches!(
            bowtie.optimal_convex_partition(),
            Err(GeometryError::InvalidArgument(_))
        ));
        assert_eq!(bowtie, before);
    }

    #[test]
    fn test_display() {
        let polygon = Polygon2::from_xy(&[0.0, 1.5], &[2.0, -1.0]).unwrap();
        assert_eq!(polygon.to_string(), "Polygon2[\n0 2\n1.5 -1\n]");
    }
}
