// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Dense numeric arrays handed over by a host environment

use crate::error::{GeometryError, GeometryResult};
use serde::{Deserialize, Serialize};

/// Row-major numeric buffer with an explicit shape.
///
/// This is the shape a host numeric array arrives in once it has been
/// copied out of the host: a flat `f64` buffer plus its dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NumericArray {
    /// Wrap `data` with the given `shape`.
    ///
    /// Fails when the shape's element count does not match `data.len()`.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> GeometryResult<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(GeometryError::invalid(format!(
                "array shape {:?} needs {} elements, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// One-dimensional array
    pub fn from_vec(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Two-dimensional array from equally sized rows
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> GeometryResult<Self> {
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * width);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(GeometryError::invalid(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            shape: vec![rows.len(), width],
            data,
        })
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of rows of a 2D array (or elements of a 1D one)
    pub fn rows(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Row `i` of a 2D array
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if self.ndim() != 2 || i >= self.shape[0] {
            return None;
        }
        let width = self.shape[1];
        Some(&self.data[i * width..(i + 1) * width])
    }

    /// Require exactly `ndim` dimensions, naming `what` in the error.
    pub(crate) fn expect_ndim(&self, ndim: usize, what: &str) -> GeometryResult<()> {
        if self.ndim() != ndim {
            return Err(GeometryError::invalid(format!(
                "{} must be a {}-dimensional array, got shape {:?}",
                what, ndim, self.shape
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_must_match_data() {
        assert!(NumericArray::new(vec![2, 3], vec![0.0; 6]).is_ok());
        assert!(matches!(
            NumericArray::new(vec![2, 3], vec![0.0; 5]),
            Err(GeometryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rows() {
        let array = NumericArray::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap();
        assert_eq!(array.shape(), &[3, 2]);
        assert_eq!(array.rows(), 3);
        assert_eq!(array.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(array.row(3), None);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(NumericArray::from_rows(&rows).is_err());
    }

    #[test]
    fn test_one_dimensional_has_no_rows() {
        let array = NumericArray::from_vec(vec![1.0, 2.0]);
        assert_eq!(array.ndim(), 1);
        assert_eq!(array.row(0), None);
        assert!(array.expect_ndim(2, "points").is_err());
    }
}
