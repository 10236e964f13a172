use smallvec::smallvec;

use crate::container::{Cube, Matrix, Vector};
use crate::errors::ReshapeError;
use crate::storage::StorageKind;

impl Vector {
    /// Create a dense vector of `size` zeros.
    pub fn zeros(size: usize) -> Vector {
        Vector::dense([size])
    }

    /// Create a sparse vector of `size` zeros.
    pub fn sparse(size: usize) -> Vector {
        Vector::new_sparse([size])
    }

    /// Create a dense vector holding a copy of `values`.
    pub fn from_slice(values: &[f64]) -> Vector {
        Vector::from_values(StorageKind::Dense, [values.len()], values.to_vec())
    }

    /// Create a dense vector with every element set to `value`.
    pub fn constant(size: usize, value: f64) -> Vector {
        Vector::from_values(StorageKind::Dense, [size], vec![value; size])
    }

    pub fn ones(size: usize) -> Vector {
        Vector::constant(size, 1.)
    }

    /// Create a vector `0, 1, .. size - 1`.
    pub fn ascending(size: usize) -> Vector {
        Vector::from_values(
            StorageKind::Dense,
            [size],
            (0..size).map(|x| x as f64).collect(),
        )
    }

    /// Create a vector `size - 1, .. 1, 0`.
    pub fn descending(size: usize) -> Vector {
        Vector::from_values(
            StorageKind::Dense,
            [size],
            (0..size).rev().map(|x| x as f64).collect(),
        )
    }

    /// Create a dense vector of `size` values drawn uniformly from `[0, 1)`.
    #[cfg(feature = "random")]
    pub fn random(size: usize) -> Vector {
        Vector::from_values(
            StorageKind::Dense,
            [size],
            (0..size).map(|_| fastrand::f64()).collect(),
        )
    }

    /// Create a dense vector which is the concatenation of `parts`.
    pub fn concat(parts: &[&Vector]) -> Vector {
        let values: Vec<f64> = parts.iter().flat_map(|part| part.iter()).collect();
        Vector::from_values(StorageKind::Dense, [values.len()], values)
    }

    /// Create a dense vector holding `times` copies of `self` end to end.
    pub fn repeat(&self, times: usize) -> Vector {
        let values = self.to_vec();
        Vector::from_values(StorageKind::Dense, [values.len() * times], values.repeat(times))
    }

    /// Copy the elements into a `rows x columns` matrix in column-major
    /// order, so that element `c * rows + r` lands at `[r, c]`.
    ///
    /// The matrix has the same kind of storage as `self`.
    pub fn reshape_matrix(&self, rows: usize, columns: usize) -> Result<Matrix, ReshapeError> {
        if rows.checked_mul(columns) != Some(self.len()) {
            return Err(ReshapeError::LengthMismatch {
                len: self.len(),
                shape: smallvec![rows, columns],
            });
        }
        let matrix: Matrix = self.like_shape([rows, columns]);
        let mut values = self.iter();
        for c in 0..columns {
            for r in 0..rows {
                if let Some(x) = values.next() {
                    matrix.write([r, c], x);
                }
            }
        }
        Ok(matrix)
    }

    /// Copy the elements into a `slices x rows x columns` cube. Slices are
    /// filled in turn, each in column-major order.
    ///
    /// The cube has the same kind of storage as `self`.
    pub fn reshape_cube(
        &self,
        slices: usize,
        rows: usize,
        columns: usize,
    ) -> Result<Cube, ReshapeError> {
        let len = slices
            .checked_mul(rows)
            .and_then(|n| n.checked_mul(columns));
        if len != Some(self.len()) {
            return Err(ReshapeError::LengthMismatch {
                len: self.len(),
                shape: smallvec![slices, rows, columns],
            });
        }
        let cube: Cube = self.like_shape([slices, rows, columns]);
        let mut values = self.iter();
        for s in 0..slices {
            for c in 0..columns {
                for r in 0..rows {
                    if let Some(x) = values.next() {
                        cube.write([s, r, c], x);
                    }
                }
            }
        }
        Ok(cube)
    }

    /// Return the inner product of `self` and `other`.
    ///
    /// If the lengths differ, only the common prefix is used.
    pub fn z_dot_product(&self, other: &Vector) -> f64 {
        self.z_dot_product_range(other, 0, self.len())
    }

    /// Return the inner product of `self[from..from + len]` and
    /// `other[from..from + len]`.
    ///
    /// The range is clipped to the length of both vectors. An empty range
    /// gives zero.
    pub fn z_dot_product_range(&self, other: &Vector, from: usize, len: usize) -> f64 {
        let tail = from
            .saturating_add(len)
            .min(self.len())
            .min(other.len());
        (from..tail)
            .map(|i| self.get_quick([i]) * other.get_quick([i]))
            .sum()
    }
}
