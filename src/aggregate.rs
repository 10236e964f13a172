//! Reductions over the elements of a container.
//!
//! Each chunk of logical positions is folded locally, seeded with the
//! transformed value of its first element. The per-chunk results are then
//! folded again with the same `combine` function, in chunk order, so results
//! are reproducible for a given thread count.

use crate::container::NdContainer;
use crate::errors::{IndexError, ShapeError};
use crate::index_iterator::NdIndices;
use crate::parallel::{map_chunks, threshold_for_rank};

/// Fold per-chunk results in chunk order.
fn fold_partials(partials: Vec<Option<f64>>, combine: impl Fn(f64, f64) -> f64) -> Option<f64> {
    partials.into_iter().flatten().reduce(combine)
}

impl<const N: usize> NdContainer<N> {
    /// Fold `f(index)` over every index in row-major order, in parallel
    /// chunks. Returns `None` if the container is empty.
    fn fold_indices<F, C>(&self, f: F, combine: C) -> Option<f64>
    where
        F: Fn([usize; N]) -> f64 + Sync + Send,
        C: Fn(f64, f64) -> f64 + Sync + Send,
    {
        let shape = self.shape();
        let partials = map_chunks(self.len(), threshold_for_rank(N), |range| {
            let mut indices = NdIndices::from_range(shape, range);
            let first = f(indices.next()?);
            Some(indices.fold(first, |acc, idx| combine(acc, f(idx))))
        });
        fold_partials(partials, &combine)
    }

    /// Apply `transform` to each element and fold the results with
    /// `combine`.
    ///
    /// Returns `a(len)` where `a(1) = transform(x_0)` and
    /// `a(i) = combine(a(i - 1), transform(x_{i-1}))`, visiting elements in
    /// row-major order. Returns NaN for an empty container.
    ///
    /// Large containers are split into chunks that are folded in parallel.
    /// The result then equals the sequential one if `combine` is associative,
    /// up to floating point rounding.
    ///
    /// ```
    /// use strata::Vector;
    ///
    /// let v = Vector::ascending(4);
    /// let sum_of_squares = v.aggregate(|a, b| a + b, |x| x * x);
    /// assert_eq!(sum_of_squares, 14.);
    /// ```
    pub fn aggregate<C, T>(&self, combine: C, transform: T) -> f64
    where
        C: Fn(f64, f64) -> f64 + Sync + Send,
        T: Fn(f64) -> f64 + Sync + Send,
    {
        self.fold_indices(|idx| transform(self.get_quick(idx)), combine)
            .unwrap_or(f64::NAN)
    }

    /// Apply `f` to each pair of corresponding elements of `self` and
    /// `other` and fold the results with `combine`.
    ///
    /// Fails before doing any work if the shapes differ. Returns NaN if both
    /// containers are empty.
    pub fn aggregate_with<C, F>(
        &self,
        other: &NdContainer<N>,
        combine: C,
        f: F,
    ) -> Result<f64, ShapeError>
    where
        C: Fn(f64, f64) -> f64 + Sync + Send,
        F: Fn(f64, f64) -> f64 + Sync + Send,
    {
        self.check_same_shape(other)?;
        Ok(self
            .fold_indices(|idx| f(self.get_quick(idx), other.get_quick(idx)), combine)
            .unwrap_or(f64::NAN))
    }

    /// Fold `transform(x)` over the elements `x` which satisfy `cond`.
    ///
    /// The fold is seeded with zero, so the result is zero if no element
    /// matches. Returns NaN for an empty container.
    pub fn aggregate_where<C, T, P>(&self, combine: C, transform: T, cond: P) -> f64
    where
        C: Fn(f64, f64) -> f64 + Sync + Send,
        T: Fn(f64) -> f64 + Sync + Send,
        P: Fn(f64) -> bool + Sync + Send,
    {
        if self.is_empty() {
            return f64::NAN;
        }
        let shape = self.shape();
        let partials = map_chunks(self.len(), threshold_for_rank(N), |range| {
            NdIndices::from_range(shape, range)
                .map(|idx| self.get_quick(idx))
                .filter(|&x| cond(x))
                .map(&transform)
                .reduce(&combine)
        });
        match fold_partials(partials, &combine) {
            Some(folded) => combine(0., folded),
            None => 0.,
        }
    }

    /// Fold `transform(x)` over the elements at `indices`, in list order.
    ///
    /// Every index is validated before any element is read. Returns NaN if
    /// `indices` is empty.
    pub fn aggregate_at<C, T>(
        &self,
        combine: C,
        transform: T,
        indices: &[[usize; N]],
    ) -> Result<f64, IndexError>
    where
        C: Fn(f64, f64) -> f64 + Sync + Send,
        T: Fn(f64) -> f64 + Sync + Send,
    {
        for &index in indices {
            self.layout.check_index(index)?;
        }
        let partials = map_chunks(indices.len(), threshold_for_rank(N), |range| {
            indices[range]
                .iter()
                .map(|&idx| transform(self.get_quick(idx)))
                .reduce(&combine)
        });
        Ok(fold_partials(partials, &combine).unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use strata_testing::{ApproxEq, TestCases, XorShiftRng};

    use crate::{Cube, Matrix, StorageKind, ThreadPool, Vector};

    #[test]
    fn test_aggregate_sum_of_squares() {
        [StorageKind::Dense, StorageKind::Sparse].test_each(|&kind| {
            let mut rng = XorShiftRng::new(1234);
            let mut m = Matrix::with_kind([13, 17], kind);
            m.assign_slice(&rng.values(13 * 17)).unwrap();

            let mut expected = 0.;
            for r in 0..13 {
                for c in 0..17 {
                    let x = m.get([r, c]).unwrap();
                    expected += x * x;
                }
            }

            let actual = m.aggregate(|a, b| a + b, |x| x * x);
            assert!(actual.approx_eq_with_tolerance(&expected, 1e-10));
        })
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(Vector::zeros(0).aggregate(|a, b| a + b, |x| x).is_nan());
        assert!(Matrix::zeros(0, 3).aggregate(|a, b| a + b, |x| x).is_nan());
        let empty = Vector::zeros(0);
        assert!(empty
            .aggregate_with(&empty, |a, b| a + b, |x, y| x * y)
            .unwrap()
            .is_nan());
    }

    #[test]
    fn test_aggregate_parallel_matches_sequential() {
        let mut rng = XorShiftRng::new(4321);
        let v = Vector::from_slice(&rng.values(100_000));

        let sum = |a: f64, b: f64| a + b;
        let square = |x: f64| x * x;
        let sequential = ThreadPool::with_num_threads(1).run(|| v.aggregate(sum, square));
        let parallel = ThreadPool::with_num_threads(4).run(|| v.aggregate(sum, square));
        assert!(parallel.approx_eq_with_tolerance(&sequential, 1e-8));

        // Partial results are combined in chunk order, so repeated runs with
        // the same thread count agree exactly.
        let again = ThreadPool::with_num_threads(4).run(|| v.aggregate(sum, square));
        assert_eq!(parallel.to_bits(), again.to_bits());

        // Non-commutative combiner: the first element wins.
        let first = ThreadPool::with_num_threads(4).run(|| v.aggregate(|a, _| a, |x| x));
        assert_eq!(first, v.get([0]).unwrap());
        let last = ThreadPool::with_num_threads(4).run(|| v.aggregate(|_, b| b, |x| x));
        assert_eq!(last, v.get([99_999]).unwrap());
    }

    #[test]
    fn test_aggregate_parallel_transformed_cube() {
        [StorageKind::Dense, StorageKind::Sparse].test_each(|&kind| {
            // Above the cube threshold, with half of the cells zero.
            let mut rng = XorShiftRng::new(2468);
            let values: Vec<f64> = rng
                .values(4 * 160 * 160)
                .into_iter()
                .map(|x| if x < 0.5 { 0. } else { x })
                .collect();
            let c = Cube::from_data([4, 160, 160], values)
                .unwrap()
                .copy_with_kind(kind);
            let view = c.view_dice([2, 0, 1]).unwrap().view_row_flip();
            assert_eq!(view.shape(), [160, 4, 160]);

            let sum = |a: f64, b: f64| a + b;
            let square = |x: f64| x * x;
            let sequential = ThreadPool::with_num_threads(1).run(|| view.aggregate(sum, square));
            let parallel = ThreadPool::with_num_threads(4).run(|| view.aggregate(sum, square));
            assert!(parallel.approx_eq_with_tolerance(&sequential, 1e-8));

            let mut expected = 0.;
            for idx in view.indices() {
                expected += square(view.get_quick(idx));
            }
            assert!(sequential.approx_eq_with_tolerance(&expected, 1e-8));

            // Chunks are combined in the row-major order of the view.
            let first = ThreadPool::with_num_threads(4).run(|| view.aggregate(|a, _| a, |x| x));
            assert_eq!(first, c.get_quick([3, 0, 0]));
            let last = ThreadPool::with_num_threads(4).run(|| view.aggregate(|_, b| b, |x| x));
            assert_eq!(last, c.get_quick([0, 159, 159]));
        })
    }

    #[test]
    fn test_aggregate_views() {
        let c = Cube::from_data([2, 3, 4], (0..24).map(|x| x as f64).collect()).unwrap();
        let total = c.aggregate(|a, b| a + b, |x| x);
        assert_eq!(total, 276.);

        // Flipping does not change a sum.
        let flipped = c.view_slice_flip().view_column_flip();
        assert_eq!(flipped.aggregate(|a, b| a + b, |x| x), 276.);

        // Row-major order of the view is respected by non-commutative folds.
        assert_eq!(flipped.aggregate(|a, _| a, |x| x), 15.);

        let part = c.view_part(1, 0, 0, 1, 2, 2).unwrap();
        assert_eq!(part.aggregate(|a, b| a + b, |x| x), 12. + 13. + 16. + 17.);
    }

    #[test]
    fn test_aggregate_with() {
        let x = Vector::ascending(4);
        let y = Vector::ascending(4);
        assert_eq!(x.aggregate_with(&y, |a, b| a + b, |a, b| a * b), Ok(14.));
        assert_eq!(
            x.aggregate_with(&y, |a, b| a + b, |a, b| (a + b) * (a + b)),
            Ok(56.)
        );

        let err = x
            .aggregate_with(&Vector::zeros(3), |a, b| a + b, |a, b| a * b)
            .unwrap_err();
        assert_eq!(err.left.as_slice(), &[4]);
        assert_eq!(err.right.as_slice(), &[3]);

        let a = Matrix::from_rows(&[vec![1., 2.], vec![3., 4.]]).unwrap();
        assert_eq!(
            a.aggregate_with(&a.view_dice(), |p, q| p + q, |p, q| p * q),
            Ok(1. + 6. + 6. + 16.)
        );
    }

    #[test]
    fn test_aggregate_where() {
        let v = Vector::from_slice(&[1., -2., 3., -4., 5.]);
        let positive_sum = v.aggregate_where(|a, b| a + b, |x| x, |x| x > 0.);
        assert_eq!(positive_sum, 9.);

        let none = v.aggregate_where(|a, b| a + b, |x| x, |x| x > 100.);
        assert_eq!(none, 0.);

        // The fold is seeded with zero.
        let max = v.aggregate_where(f64::max, |x| x, |x| x < 0.);
        assert_eq!(max, 0.);

        assert!(Vector::zeros(0)
            .aggregate_where(|a, b| a + b, |x| x, |_| true)
            .is_nan());
    }

    #[test]
    fn test_aggregate_at() {
        let m = Matrix::from_rows(&[vec![1., 2., 3.], vec![4., 5., 6.]]).unwrap();
        let sum = m.aggregate_at(|a, b| a + b, |x| x, &[[0, 0], [1, 2], [1, 2]]);
        assert_eq!(sum, Ok(13.));

        let err = m
            .aggregate_at(|a, b| a + b, |x| x, &[[0, 0], [2, 0]])
            .unwrap_err();
        assert_eq!((err.axis, err.index), (0, 2));

        assert!(m.aggregate_at(|a, b| a + b, |x| x, &[]).unwrap().is_nan());
    }
}
