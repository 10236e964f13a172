//! Elementwise assignment.
//!
//! Every method here writes each cell of the container independently, so the
//! logical positions are split into disjoint chunks that are written in
//! parallel when the container is large enough.

use std::ops::Range;

use crate::container::NdContainer;
use crate::errors::{OperandError, ShapeError};
use crate::index_iterator::NdIndices;
use crate::parallel::{for_each_chunk, threshold_for_rank};

impl<const N: usize> NdContainer<N> {
    /// Call `f` with each logical position and its index, in parallel
    /// chunks.
    pub(crate) fn for_each_index<F>(&self, f: F)
    where
        F: Fn(usize, [usize; N]) + Sync + Send,
    {
        let shape = self.shape();
        for_each_chunk(self.len(), threshold_for_rank(N), |range: Range<usize>| {
            for (pos, index) in range.clone().zip(NdIndices::from_range(shape, range)) {
                f(pos, index)
            }
        })
    }

    /// Set every element to `value`.
    pub fn assign(&mut self, value: f64) -> &mut Self {
        let this = &*self;
        this.for_each_index(|_, idx| this.write(idx, value));
        self
    }

    /// Replace every element `x` with `f(x)`.
    pub fn assign_func<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        let this = &*self;
        this.for_each_index(|_, idx| this.write(idx, f(this.get_quick(idx))));
        self
    }

    /// Copy `values` into the container in row-major order.
    ///
    /// Fails if the length of `values` differs from the number of elements.
    pub fn assign_slice(&mut self, values: &[f64]) -> Result<&mut Self, ShapeError> {
        if values.len() != self.len() {
            return Err(ShapeError::new(&self.shape(), &[values.len()]));
        }
        let this = &*self;
        this.for_each_index(|pos, idx| this.write(idx, values[pos]));
        Ok(self)
    }

    /// Copy the elements of `other`, which must have the same shape.
    ///
    /// `other` may share storage with `self`, in which case it is copied
    /// before any element is written.
    pub fn assign_from(&mut self, other: &NdContainer<N>) -> Result<&mut Self, ShapeError> {
        self.check_same_shape(other)?;
        let copied;
        let other = if self.shares_storage(other) {
            copied = other.copy();
            &copied
        } else {
            other
        };

        let this = &*self;
        this.for_each_index(|_, idx| this.write(idx, other.get_quick(idx)));
        Ok(self)
    }

    /// Replace every element `x` with `f(x, y)`, where `y` is the element of
    /// `other` at the same index.
    pub fn assign_with<F>(
        &mut self,
        other: &NdContainer<N>,
        f: F,
    ) -> Result<&mut Self, ShapeError>
    where
        F: Fn(f64, f64) -> f64 + Sync + Send,
    {
        self.check_same_shape(other)?;
        let copied;
        let other = if self.shares_storage(other) {
            copied = other.copy();
            &copied
        } else {
            other
        };

        let this = &*self;
        this.for_each_index(|_, idx| {
            this.write(idx, f(this.get_quick(idx), other.get_quick(idx)))
        });
        Ok(self)
    }

    /// Replace the element `x` at each index in `indices` with `f(x, y)`,
    /// where `y` is the element of `other` at the same index.
    ///
    /// Indices are applied in list order, so a repeated index is updated once
    /// per occurrence. Fails without writing anything if the shapes differ or
    /// any index is out of range.
    pub fn assign_with_at<F>(
        &mut self,
        other: &NdContainer<N>,
        f: F,
        indices: &[[usize; N]],
    ) -> Result<&mut Self, OperandError>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same_shape(other)?;
        for &index in indices {
            self.layout.check_index(index)?;
        }
        let copied;
        let other = if self.shares_storage(other) {
            copied = other.copy();
            &copied
        } else {
            other
        };

        for &idx in indices {
            self.write(idx, f(self.get_quick(idx), other.get_quick(idx)));
        }
        Ok(self)
    }

    /// Set every element which satisfies `cond` to `value`.
    pub fn assign_where<C>(&mut self, cond: C, value: f64) -> &mut Self
    where
        C: Fn(f64) -> bool + Sync + Send,
    {
        let this = &*self;
        this.for_each_index(|_, idx| {
            if cond(this.get_quick(idx)) {
                this.write(idx, value)
            }
        });
        self
    }

    /// Replace every element `x` which satisfies `cond` with `f(x)`.
    pub fn assign_where_func<C, F>(&mut self, cond: C, f: F) -> &mut Self
    where
        C: Fn(f64) -> bool + Sync + Send,
        F: Fn(f64) -> f64 + Sync + Send,
    {
        let this = &*self;
        this.for_each_index(|_, idx| {
            let x = this.get_quick(idx);
            if cond(x) {
                this.write(idx, f(x))
            }
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;
    use strata_testing::TestCases;

    use crate::errors::{IndexError, OperandError};
    use crate::{Cube, Matrix, StorageKind, ThreadPool, Vector};

    #[test]
    fn test_assign() {
        [StorageKind::Dense, StorageKind::Sparse].test_each(|&kind| {
            let mut m = Matrix::with_kind([3, 4], kind);
            m.assign(2.);
            assert!(m.iter().all(|x| x == 2.));

            m.assign_func(|x| x * x - 4.);
            assert_eq!(m.cardinality(), 0);

            let mut part = m.view_part(1, 1, 2, 2).unwrap();
            part.assign(1.);
            assert_eq!(m.cardinality(), 4);
            assert_eq!(m.get([2, 2]), Ok(1.));
            assert_eq!(m.get([0, 0]), Ok(0.));
        })
    }

    #[test]
    fn test_assign_slice() {
        let mut m = Matrix::zeros(2, 3);
        m.assign_slice(&[1., 2., 3., 4., 5., 6.]).unwrap();
        assert_eq!(m.get([1, 0]), Ok(4.));

        // Row-major order of the view, not of the storage.
        let mut t = m.view_dice();
        t.assign_slice(&[1., 2., 3., 4., 5., 6.]).unwrap();
        assert_eq!(m.to_vec(), [1., 3., 5., 2., 4., 6.]);

        let err = m.assign_slice(&[1.]).err();
        assert!(err.is_some());
    }

    #[test]
    fn test_assign_from() {
        let src = Vector::ascending(5);
        let mut dst = Vector::sparse(5);
        dst.assign_from(&src).unwrap();
        assert_eq!(dst.to_vec(), [0., 1., 2., 3., 4.]);
        assert_eq!(dst.cardinality(), 4);

        let err = dst.assign_from(&Vector::zeros(4)).err().unwrap();
        assert_eq!(err.left.as_slice(), &[5]);
        assert_eq!(err.right.as_slice(), &[4]);
        // The failed call wrote nothing.
        assert_eq!(dst.to_vec(), [0., 1., 2., 3., 4.]);
    }

    #[test]
    fn test_assign_from_overlapping_view() {
        let mut v = Vector::ascending(6);
        let flipped = v.view_flip();
        v.assign_from(&flipped).unwrap();
        assert_eq!(v.to_vec(), [5., 4., 3., 2., 1., 0.]);
    }

    #[test]
    fn test_assign_with() {
        let mut a = Matrix::from_rows(&[vec![1., 2.], vec![3., 4.]]).unwrap();
        let b = Matrix::from_rows(&[vec![10., 20.], vec![30., 40.]]).unwrap();
        a.assign_with(&b, |x, y| x + y).unwrap();
        assert_eq!(a.to_vec(), [11., 22., 33., 44.]);

        let t = a.view_dice();
        a.assign_with(&t, |x, y| x - y).unwrap();
        assert_eq!(a.to_vec(), [0., -11., 11., 0.]);

        assert!(a.assign_with(&Matrix::zeros(2, 3), |x, _| x).is_err());
    }

    #[test]
    fn test_assign_with_at() {
        [StorageKind::Dense, StorageKind::Sparse].test_each(|&kind| {
            let mut a = Matrix::from_rows(&[vec![1., 2., 3.], vec![4., 5., 6.]])
                .unwrap()
                .copy_with_kind(kind);
            let b = Matrix::constant(2, 3, 10.).copy_with_kind(kind);

            a.assign_with_at(&b, |x, y| x * y, &[[0, 1], [1, 2], [0, 1]])
                .unwrap();
            assert_eq!(a.to_rows(), [vec![1., 200., 3.], vec![4., 5., 60.]]);

            // Zero results are removed from sparse storage.
            a.assign_with_at(&b, |_, _| 0., &[[1, 0]]).unwrap();
            assert_eq!(a.cardinality(), 5);

            // Nothing is written unless every index is valid.
            let err = a
                .assign_with_at(&b, |_, y| y, &[[0, 0], [2, 0]])
                .unwrap_err();
            assert_eq!(
                err,
                OperandError::Index(IndexError {
                    axis: 0,
                    index: 2,
                    shape: smallvec![2, 3],
                })
            );
            assert_eq!(a.get([0, 0]), Ok(1.));

            let err = a
                .assign_with_at(&Matrix::zeros(3, 2), |_, y| y, &[[0, 0]])
                .unwrap_err();
            assert!(matches!(err, OperandError::Shape(_)));
            assert_eq!(a.get([0, 0]), Ok(1.));
        })
    }

    #[test]
    fn test_assign_with_at_overlapping_view() {
        let mut v = Vector::ascending(4);
        let flipped = v.view_flip();
        v.assign_with_at(&flipped, |x, y| x + y, &[[0], [3]]).unwrap();
        assert_eq!(v.to_vec(), [3., 1., 2., 3.]);
    }

    #[test]
    fn test_assign_where() {
        let mut v = Vector::from_slice(&[-2., 1., -3., 4.]);
        v.assign_where(|x| x < 0., 0.);
        assert_eq!(v.to_vec(), [0., 1., 0., 4.]);

        v.assign_where_func(|x| x > 0., |x| x * 10.);
        assert_eq!(v.to_vec(), [0., 10., 0., 40.]);
    }

    #[test]
    fn test_parallel_assign() {
        // Larger than the cube threshold, so the work is split.
        let c = Cube::zeros(4, 160, 160);
        let mut view = c.view_row_flip();
        ThreadPool::with_num_threads(4).run(|| {
            view.assign_func(|_| 1.);
        });
        assert_eq!(c.cardinality(), c.len());

        let values: Vec<f64> = (0..c.len()).map(|x| x as f64).collect();
        let sparse = Cube::sparse(4, 160, 160);
        let mut diced = sparse.view_dice([1, 2, 0]).unwrap();
        ThreadPool::with_num_threads(4).run(|| {
            diced.assign_slice(&values).unwrap();
        });
        assert_eq!(diced.to_vec(), values);
        assert_eq!(sparse.cardinality(), sparse.len() - 1);
        assert_eq!(sparse.get([1, 0, 0]), Ok(1.));

        ThreadPool::with_num_threads(4).run(|| {
            diced.assign_where(|x| x >= 100., 0.);
        });
        assert_eq!(sparse.cardinality(), 99);

        let mut dst = c.like();
        ThreadPool::with_num_threads(3).run(|| {
            dst.assign_slice(&values).unwrap();
        });
        assert_eq!(dst.to_vec(), values);
    }
}
