use std::iter::FusedIterator;
use std::ops::Range;

/// Convert a logical position in row-major order into an index for a
/// container of the given shape.
///
/// The result is unspecified if `position` is not less than the product of
/// `shape`.
pub fn unravel_index<const N: usize>(shape: [usize; N], position: usize) -> [usize; N] {
    let mut index = [0; N];
    let mut rem = position;
    for dim in (0..N).rev() {
        let size = shape[dim];
        if size > 0 {
            index[dim] = rem % size;
            rem /= size;
        }
    }
    index
}

/// Iterator over N-dimensional indices of a container in row-major order
/// (last axis fastest).
///
/// The iterator can cover a sub-range of logical positions. This is how the
/// bulk-operation engine hands each worker its chunk of a container.
#[derive(Clone, Debug)]
pub struct NdIndices<const N: usize> {
    shape: [usize; N],
    current: [usize; N],
    remaining: usize,
}

impl<const N: usize> NdIndices<N> {
    /// Return an iterator over all valid indices for `shape`.
    pub fn from_shape(shape: [usize; N]) -> NdIndices<N> {
        let len = shape.iter().product();
        Self::from_range(shape, 0..len)
    }

    /// Return an iterator over the indices at logical positions `range`
    /// within `shape`.
    pub fn from_range(shape: [usize; N], range: Range<usize>) -> NdIndices<N> {
        NdIndices {
            shape,
            current: unravel_index(shape, range.start),
            remaining: range.len(),
        }
    }
}

impl<const N: usize> Iterator for NdIndices<N> {
    type Item = [usize; N];

    #[inline]
    fn next(&mut self) -> Option<[usize; N]> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.current;
        self.remaining -= 1;

        if self.remaining > 0 {
            for dim in (0..N).rev() {
                self.current[dim] += 1;
                if self.current[dim] < self.shape[dim] {
                    break;
                }
                self.current[dim] = 0;
            }
        }

        Some(current)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<const N: usize> ExactSizeIterator for NdIndices<N> {}

impl<const N: usize> FusedIterator for NdIndices<N> {}
