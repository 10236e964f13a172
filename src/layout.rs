use smallvec::SmallVec;

use crate::errors::{IndexError, TransformError};
use crate::index_iterator::NdIndices;

/// Return true if `permutation` is a valid permutation of the axes of a
/// container with rank `ndim`.
pub fn is_valid_permutation(ndim: usize, permutation: &[usize]) -> bool {
    permutation.len() == ndim
        && (0..ndim).all(|dim| permutation.iter().filter(|d| **d == dim).count() == 1)
}

/// Describes the shape of a container and the mapping between indices and
/// positions in its storage.
///
/// Each axis `d` has a size, a stride and a zero offset. The position of an
/// index `[r_0, .. r_{N-1}]` is `Σ (zero_d + r_d * stride_d)`. Strides can be
/// negative after a flip. All transforms on a layout are affine updates of
/// `(zero, stride)`, so they compose by repeated application.
///
/// A layout holds no reference to storage, and is cheap to copy. Views are
/// created by copying a layout and transforming the copy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NdLayout<const N: usize> {
    shape: [usize; N],
    strides: [isize; N],
    zero: [isize; N],
}

impl<const N: usize> NdLayout<N> {
    /// Return the strides that a freshly allocated row-major container with a
    /// given shape has.
    pub fn contiguous_strides(shape: [usize; N]) -> [isize; N] {
        let mut strides = [0; N];
        for i in 0..N {
            strides[i] = shape[i + 1..].iter().product::<usize>() as isize;
        }
        strides
    }

    /// Create a row-major layout for a given shape.
    pub fn from_shape(shape: [usize; N]) -> Self {
        NdLayout {
            shape,
            strides: Self::contiguous_strides(shape),
            zero: [0; N],
        }
    }

    /// Create a layout from its parts.
    ///
    /// No validation is performed. The caller is responsible for ensuring that
    /// every valid index maps to a position inside the storage it is used with.
    pub fn from_parts(shape: [usize; N], strides: [isize; N], zero: [isize; N]) -> Self {
        NdLayout {
            shape,
            strides,
            zero,
        }
    }

    /// Create a layout for indexing into per-axis offset tables.
    ///
    /// Every axis has a unit stride, so the position along axis `d` is an
    /// index into the offset table for that axis.
    pub(crate) fn for_selection(shape: [usize; N]) -> Self {
        NdLayout {
            shape,
            strides: [1; N],
            zero: [0; N],
        }
    }

    #[inline]
    pub fn shape(&self) -> [usize; N] {
        self.shape
    }

    #[inline]
    pub fn strides(&self) -> [isize; N] {
        self.strides
    }

    #[inline]
    pub fn zero(&self) -> [isize; N] {
        self.zero
    }

    /// Return the size of axis `dim`.
    #[inline]
    pub fn size(&self, dim: usize) -> usize {
        self.shape[dim]
    }

    /// Return the stride of axis `dim`.
    #[inline]
    pub fn stride(&self, dim: usize) -> isize {
        self.strides[dim]
    }

    pub fn ndim(&self) -> usize {
        N
    }

    /// Return the number of elements described by this layout.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return true if all components of `index` are in-bounds.
    pub fn index_valid(&self, index: [usize; N]) -> bool {
        let mut valid = true;
        for i in 0..N {
            valid = valid && index[i] < self.shape[i]
        }
        valid
    }

    /// Check that `index` is valid, reporting the first axis where it is not.
    pub fn check_index(&self, index: [usize; N]) -> Result<(), IndexError> {
        match (0..N).find(|&axis| index[axis] >= self.shape[axis]) {
            Some(axis) => Err(IndexError {
                axis,
                index: index[axis],
                shape: SmallVec::from_slice(&self.shape),
            }),
            None => Ok(()),
        }
    }

    /// Return the term contributed by coordinate `index` along `axis`.
    #[inline]
    pub fn axis_position(&self, axis: usize, index: usize) -> isize {
        self.zero[axis] + index as isize * self.strides[axis]
    }

    /// Map an index to a signed position without checking it against the
    /// shape.
    #[inline]
    pub fn position(&self, index: [usize; N]) -> isize {
        let mut pos = 0;
        for i in 0..N {
            pos += self.axis_position(i, index[i]);
        }
        pos
    }

    /// Map an index to a storage offset, without checking if it is valid for
    /// the shape.
    ///
    /// The result is meaningless for indices that are out of bounds.
    #[inline]
    pub fn offset_unchecked(&self, index: [usize; N]) -> usize {
        self.position(index) as usize
    }

    /// Map an index to a storage offset, or report the first out-of-bounds
    /// coordinate.
    pub fn try_offset(&self, index: [usize; N]) -> Result<usize, IndexError> {
        self.check_index(index)?;
        Ok(self.offset_unchecked(index))
    }

    /// Return an iterator over all valid indices in row-major order.
    pub fn indices(&self) -> NdIndices<N> {
        NdIndices::from_shape(self.shape)
    }

    /// Reverse the order of indices along `axis`.
    ///
    /// Flipping an empty axis has no effect. Flipping twice restores the
    /// previous layout exactly.
    pub fn flip(&mut self, axis: usize) {
        let size = self.shape[axis];
        if size > 0 {
            self.zero[axis] += (size as isize - 1) * self.strides[axis];
            self.strides[axis] = -self.strides[axis];
        }
    }

    /// Restrict `axis` to the range `index..index + width`.
    pub fn part(&mut self, axis: usize, index: usize, width: usize) -> Result<(), TransformError> {
        let size = self.shape[axis];
        match index.checked_add(width) {
            Some(end) if end <= size => {}
            _ => {
                return Err(TransformError::InvalidRange {
                    axis,
                    index,
                    width,
                    size,
                })
            }
        }
        self.zero[axis] += self.strides[axis] * index as isize;
        self.shape[axis] = width;
        Ok(())
    }

    /// Keep only every `step`th index along `axis`, starting at 0.
    ///
    /// A step at or beyond the size of the axis keeps only index 0.
    pub fn stride_by(&mut self, axis: usize, step: usize) -> Result<(), TransformError> {
        if step == 0 {
            return Err(TransformError::InvalidStride { axis });
        }
        let size = self.shape[axis];
        let step = step.min(size.max(1));
        self.strides[axis] *= step as isize;
        self.shape[axis] = if size == 0 { 0 } else { (size - 1) / step + 1 };
        Ok(())
    }

    /// Swap the order of two axes.
    pub fn swap_axes(&mut self, a: usize, b: usize) {
        self.shape.swap(a, b);
        self.strides.swap(a, b);
        self.zero.swap(a, b);
    }

    /// Reorder the axes so that axis `i` of the result is axis `order[i]` of
    /// the current layout.
    ///
    /// Fails without modifying the layout if `order` is not a permutation of
    /// `0..N`.
    pub fn permute(&mut self, order: [usize; N]) -> Result<(), TransformError> {
        if !is_valid_permutation(N, &order) {
            return Err(TransformError::InvalidPermutation {
                order: SmallVec::from_slice(&order),
            });
        }
        let prev = *self;
        for (i, &axis) in order.iter().enumerate() {
            self.shape[i] = prev.shape[axis];
            self.strides[i] = prev.strides[axis];
            self.zero[i] = prev.zero[axis];
        }
        Ok(())
    }

    /// Return a copy of this layout with the given order of axes.
    pub fn permuted(&self, order: [usize; N]) -> Result<Self, TransformError> {
        let mut permuted = *self;
        permuted.permute(order)?;
        Ok(permuted)
    }

    /// Remove `axis` from the layout.
    ///
    /// Returns the layout of the remaining axes along with the term that
    /// `axis` contributed to positions when fixed at `index`. `M` must equal
    /// `N - 1`.
    pub fn without_axis<const M: usize>(&self, axis: usize, index: usize) -> (NdLayout<M>, isize) {
        assert!(M + 1 == N, "layout rank {} cannot drop to {}", N, M);
        let mut removed = NdLayout {
            shape: [0; M],
            strides: [0; M],
            zero: [0; M],
        };
        for (out, dim) in (0..N).filter(|&d| d != axis).enumerate() {
            removed.shape[out] = self.shape[dim];
            removed.strides[out] = self.strides[dim];
            removed.zero[out] = self.zero[dim];
        }
        (removed, self.axis_position(axis, index))
    }

    /// Add `delta` to the zero offset of `axis`.
    pub(crate) fn shift_zero(&mut self, axis: usize, delta: isize) {
        self.zero[axis] += delta;
    }
}
