use crate::container::NdContainer;
use crate::errors::ShapeError;
use crate::storage::Storage;

impl<const N: usize> NdContainer<N> {
    /// Return the number of non-zero elements.
    pub fn cardinality(&self) -> usize {
        match &self.storage {
            // A container which covers its whole sparse storage with the
            // default layout can read the count from the map.
            Storage::Sparse(sparse) if !self.is_view && sparse.len() == self.len() => {
                sparse.stored_len()
            }
            _ => self.iter().filter(|&x| x != 0.).count(),
        }
    }

    /// Return the first largest element and its index, or `None` if the
    /// container is empty.
    pub fn max_location(&self) -> Option<(f64, [usize; N])> {
        self.find_extreme(|x, best| x > best)
    }

    /// Return the first smallest element and its index, or `None` if the
    /// container is empty.
    pub fn min_location(&self) -> Option<(f64, [usize; N])> {
        self.find_extreme(|x, best| x < best)
    }

    fn find_extreme(&self, better: impl Fn(f64, f64) -> bool) -> Option<(f64, [usize; N])> {
        let mut best: Option<(f64, [usize; N])> = None;
        for idx in self.indices() {
            let x = self.get_quick(idx);
            match best {
                Some((value, _)) if !better(x, value) => {}
                _ => best = Some((x, idx)),
            }
        }
        best
    }

    /// Return the indices and values of elements that satisfy `cond`, in
    /// row-major order.
    fn values_where(&self, cond: impl Fn(f64) -> bool) -> Vec<([usize; N], f64)> {
        self.indices()
            .map(|idx| (idx, self.get_quick(idx)))
            .filter(|&(_, x)| cond(x))
            .collect()
    }

    /// Return the indices and values of non-zero elements.
    pub fn non_zeros(&self) -> Vec<([usize; N], f64)> {
        self.values_where(|x| x != 0.)
    }

    /// Return the indices and values of elements greater than zero.
    pub fn positive_values(&self) -> Vec<([usize; N], f64)> {
        self.values_where(|x| x > 0.)
    }

    /// Return the indices and values of elements less than zero.
    pub fn negative_values(&self) -> Vec<([usize; N], f64)> {
        self.values_where(|x| x < 0.)
    }

    /// Return the sum of all elements, or zero if the container is empty.
    pub fn z_sum(&self) -> f64 {
        if self.is_empty() {
            return 0.;
        }
        self.aggregate(|a, b| a + b, |x| x)
    }

    /// Exchange the contents of `self` and `other`, which must have the
    /// same shape.
    pub fn swap(&mut self, other: &mut NdContainer<N>) -> Result<(), ShapeError> {
        self.check_same_shape(other)?;
        let prev = self.copy();
        self.assign_from(other)?;
        other.assign_from(&prev)?;
        Ok(())
    }
}
