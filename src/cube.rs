use crate::container::{Cube, Matrix, Vector};
use crate::errors::ShapeError;
use crate::storage::StorageKind;

impl Cube {
    /// Create a dense `slices x rows x columns` cube of zeros.
    pub fn zeros(slices: usize, rows: usize, columns: usize) -> Cube {
        Cube::dense([slices, rows, columns])
    }

    /// Create a sparse `slices x rows x columns` cube of zeros.
    pub fn sparse(slices: usize, rows: usize, columns: usize) -> Cube {
        Cube::new_sparse([slices, rows, columns])
    }

    /// Create a dense cube whose slices are copies of `slices`.
    ///
    /// Fails if the slices have different shapes.
    pub fn from_slices(slices: &[Matrix]) -> Result<Cube, ShapeError> {
        let [rows, columns] = slices.first().map(|m| m.shape()).unwrap_or([0, 0]);
        let mut values = Vec::with_capacity(slices.len() * rows * columns);
        for slice in slices {
            if slice.shape() != [rows, columns] {
                return Err(ShapeError::new(&[rows, columns], &slice.shape()));
            }
            values.extend(slice.iter());
        }
        Ok(Cube::from_values(
            StorageKind::Dense,
            [slices.len(), rows, columns],
            values,
        ))
    }

    pub fn slices(&self) -> usize {
        self.size(0)
    }

    pub fn rows(&self) -> usize {
        self.size(1)
    }

    pub fn columns(&self) -> usize {
        self.size(2)
    }

    /// Copy the elements into nested lists indexed by slice, row and column.
    pub fn to_slices(&self) -> Vec<Vec<Vec<f64>>> {
        (0..self.slices())
            .map(|s| {
                (0..self.rows())
                    .map(|r| {
                        (0..self.columns())
                            .map(|c| self.get_quick([s, r, c]))
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }

    /// Copy the elements into a vector, slice by slice, each slice in
    /// column-major order.
    ///
    /// This is the inverse of [`Vector::reshape_cube`].
    pub fn vectorize(&self) -> Vector {
        let vector: Vector = self.like_shape([self.len()]);
        let mut i = 0;
        for s in 0..self.slices() {
            for c in 0..self.columns() {
                for r in 0..self.rows() {
                    vector.write([i], self.get_quick([s, r, c]));
                    i += 1;
                }
            }
        }
        vector
    }
}
