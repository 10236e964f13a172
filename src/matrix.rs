use crate::container::{Matrix, Vector};
use crate::errors::ShapeError;
use crate::storage::StorageKind;

impl Matrix {
    /// Create a dense `rows x columns` matrix of zeros.
    pub fn zeros(rows: usize, columns: usize) -> Matrix {
        Matrix::dense([rows, columns])
    }

    /// Create a sparse `rows x columns` matrix of zeros.
    pub fn sparse(rows: usize, columns: usize) -> Matrix {
        Matrix::new_sparse([rows, columns])
    }

    /// Create a dense matrix with every element set to `value`.
    pub fn constant(rows: usize, columns: usize, value: f64) -> Matrix {
        Matrix::from_values(StorageKind::Dense, [rows, columns], vec![value; rows * columns])
    }

    /// Create a dense matrix from a list of rows.
    ///
    /// Fails if the rows have different lengths.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Matrix, ShapeError> {
        let columns = rows.first().map(|row| row.len()).unwrap_or(0);
        if let Some(row) = rows.iter().find(|row| row.len() != columns) {
            return Err(ShapeError::new(&[columns], &[row.len()]));
        }
        Ok(Matrix::from_values(
            StorageKind::Dense,
            [rows.len(), columns],
            rows.concat(),
        ))
    }

    pub fn rows(&self) -> usize {
        self.size(0)
    }

    pub fn columns(&self) -> usize {
        self.size(1)
    }

    /// Copy the elements into a list of rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows())
            .map(|r| (0..self.columns()).map(|c| self.get_quick([r, c])).collect())
            .collect()
    }

    /// Copy `rows` into the matrix.
    ///
    /// Fails without writing anything if the number of rows or the length of
    /// any row does not match the shape of the matrix.
    pub fn assign_rows(&mut self, rows: &[Vec<f64>]) -> Result<&mut Self, ShapeError> {
        if rows.len() != self.rows() {
            return Err(ShapeError::new(&self.shape(), &[rows.len()]));
        }
        if let Some(row) = rows.iter().find(|row| row.len() != self.columns()) {
            return Err(ShapeError::new(&self.shape(), &[rows.len(), row.len()]));
        }
        self.assign_slice(&rows.concat())
    }

    /// Copy the elements into a vector in column-major order.
    ///
    /// This is the inverse of [`Vector::reshape_matrix`].
    pub fn vectorize(&self) -> Vector {
        let vector: Vector = self.like_shape([self.len()]);
        let mut i = 0;
        for c in 0..self.columns() {
            for r in 0..self.rows() {
                vector.write([i], self.get_quick([r, c]));
                i += 1;
            }
        }
        vector
    }
}

#[cfg(test)]
mod tests {
    use crate::{Matrix, StorageKind};

    #[test]
    fn test_from_rows() {
        let m = Matrix::from_rows(&[vec![1., 2., 3.], vec![4., 5., 6.]]).unwrap();
        assert_eq!((m.rows(), m.columns()), (2, 3));
        assert_eq!(m.to_rows(), [vec![1., 2., 3.], vec![4., 5., 6.]]);

        let err = Matrix::from_rows(&[vec![1., 2.], vec![3.]]).unwrap_err();
        assert_eq!(err.to_string(), "incompatible shapes [2] and [1]");

        let empty = Matrix::from_rows(&[]).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_assign_rows() {
        let mut m = Matrix::sparse(2, 2);
        m.assign_rows(&[vec![0., 1.], vec![2., 0.]]).unwrap();
        assert_eq!(m.to_vec(), [0., 1., 2., 0.]);
        assert_eq!(m.cardinality(), 2);

        assert!(m.assign_rows(&[vec![1., 1.]]).is_err());
        assert!(m.assign_rows(&[vec![1., 1.], vec![1.]]).is_err());
        assert_eq!(m.to_vec(), [0., 1., 2., 0.]);
    }

    #[test]
    fn test_vectorize() {
        let m = Matrix::from_rows(&[vec![1., 2.], vec![3., 4.]]).unwrap();
        assert_eq!(m.vectorize().to_vec(), [1., 3., 2., 4.]);
        assert_eq!(m.view_dice().vectorize().to_vec(), [1., 2., 3., 4.]);

        let sparse = m.copy_with_kind(StorageKind::Sparse);
        assert_eq!(sparse.vectorize().kind(), StorageKind::Sparse);
    }
}
