use crate::errors::{IndexError, ShapeError};
use crate::index_iterator::NdIndices;
use crate::layout::NdLayout;
use crate::selection::SelectionOffsets;
use crate::storage::{Elements, Storage, StorageKind};

/// Multi-dimensional container of `f64` values with a static rank.
///
/// A container combines a [`NdLayout`], which maps indices to positions, with
/// a shared handle to [`Storage`], which holds the values. Views are containers
/// that share storage with another container, so writes through one are seen
/// by all others whose layout maps to the same cell.
///
/// Cloning a container produces another handle to the same storage with the
/// same layout and [`is_view`](NdContainer::is_view) flag, so a clone of an
/// owner still reports that it is not a view. Use
/// [`view`](NdContainer::view) for an alias marked as a view and
/// [`copy`](NdContainer::copy) for a deep copy.
///
/// Indices are arrays with one coordinate per axis, eg. `[row, col]` for a
/// [`Matrix`].
#[derive(Clone)]
pub struct NdContainer<const N: usize> {
    pub(crate) layout: NdLayout<N>,

    /// Per-axis offset tables, present if this container is a selection
    /// view. When present, positions computed by `layout` are indices into
    /// the tables rather than storage offsets.
    pub(crate) selection: Option<SelectionOffsets<N>>,

    pub(crate) storage: Storage,
    pub(crate) is_view: bool,
}

/// One-dimensional container.
pub type Vector = NdContainer<1>;

/// Two-dimensional container, indexed by `[row, column]`.
pub type Matrix = NdContainer<2>;

/// Three-dimensional container, indexed by `[slice, row, column]`.
pub type Cube = NdContainer<3>;

impl<const N: usize> NdContainer<N> {
    /// Create a zero-filled container with a given shape and kind of storage.
    pub fn with_kind(shape: [usize; N], kind: StorageKind) -> Self {
        let layout = NdLayout::from_shape(shape);
        NdContainer {
            storage: Storage::new(kind, layout.len()),
            layout,
            selection: None,
            is_view: false,
        }
    }

    /// Create a zero-filled container with dense storage.
    pub fn dense(shape: [usize; N]) -> Self {
        Self::with_kind(shape, StorageKind::Dense)
    }

    /// Create a zero-filled container with sparse storage.
    pub fn new_sparse(shape: [usize; N]) -> Self {
        Self::with_kind(shape, StorageKind::Sparse)
    }

    /// Create a dense container from values in row-major order.
    ///
    /// Fails if the length of `data` does not match the product of `shape`.
    pub fn from_data(shape: [usize; N], data: Vec<f64>) -> Result<Self, ShapeError> {
        let len: usize = shape.iter().product();
        if data.len() != len {
            return Err(ShapeError::new(&shape, &[data.len()]));
        }
        Ok(Self::from_values(StorageKind::Dense, shape, data))
    }

    /// Create a container of a given kind from row-major values whose length
    /// matches `shape`.
    pub(crate) fn from_values(kind: StorageKind, shape: [usize; N], data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), shape.iter().product::<usize>());
        NdContainer {
            layout: NdLayout::from_shape(shape),
            selection: None,
            storage: Storage::from_vec(kind, data),
            is_view: false,
        }
    }

    /// Return the size of each axis.
    pub fn shape(&self) -> [usize; N] {
        self.layout.shape()
    }

    /// Return the size of axis `dim`.
    pub fn size(&self, dim: usize) -> usize {
        self.layout.size(dim)
    }

    pub fn ndim(&self) -> usize {
        N
    }

    /// Return the number of elements.
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    pub fn layout(&self) -> &NdLayout<N> {
        &self.layout
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn kind(&self) -> StorageKind {
        self.storage.kind()
    }

    pub fn is_dense(&self) -> bool {
        self.storage.is_dense()
    }

    /// Return true if this container was created as a view of another.
    ///
    /// This is informational only. Views and their sources are equally
    /// writable.
    pub fn is_view(&self) -> bool {
        self.is_view
    }

    /// Return true if this container addresses its storage through offset
    /// tables.
    pub fn is_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// Return true if `self` and `other` share storage.
    pub fn shares_storage(&self, other: &NdContainer<N>) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    /// Expose the raw backing structure of the storage.
    ///
    /// The result is indexed by storage offset and covers the whole buffer,
    /// including cells that are not visible through this container's layout.
    pub fn elements(&self) -> Elements<'_> {
        self.storage.elements()
    }

    /// Return the term that coordinate `index` along `axis` contributes to
    /// a storage offset.
    #[inline]
    pub(crate) fn axis_term(&self, axis: usize, index: usize) -> isize {
        let pos = self.layout.axis_position(axis, index);
        match &self.selection {
            None => pos,
            Some(sel) => sel.axes[axis][pos as usize],
        }
    }

    /// Map an index to a storage offset without checking it.
    #[inline]
    pub(crate) fn offset_unchecked(&self, index: [usize; N]) -> usize {
        match &self.selection {
            None => self.layout.offset_unchecked(index),
            Some(sel) => {
                let mut offset = sel.origin;
                for d in 0..N {
                    offset += self.axis_term(d, index[d]);
                }
                offset as usize
            }
        }
    }

    /// Return the element at `index`, or an error if any coordinate is out of
    /// range.
    pub fn get(&self, index: [usize; N]) -> Result<f64, IndexError> {
        self.layout.check_index(index)?;
        Ok(self.get_quick(index))
    }

    /// Replace the element at `index`, or return an error if any coordinate
    /// is out of range.
    pub fn set(&mut self, index: [usize; N], value: f64) -> Result<(), IndexError> {
        self.layout.check_index(index)?;
        self.write(index, value);
        Ok(())
    }

    /// Return the element at `index` without checking coordinates against
    /// the shape.
    ///
    /// An out of range index reads an unspecified element of the storage or
    /// panics. It never reads outside the storage.
    #[inline]
    pub fn get_quick(&self, index: [usize; N]) -> f64 {
        self.storage.get_at(self.offset_unchecked(index))
    }

    /// Replace the element at `index` without checking coordinates against
    /// the shape.
    ///
    /// See [`get_quick`](NdContainer::get_quick) for out-of-range indices.
    #[inline]
    pub fn set_quick(&mut self, index: [usize; N], value: f64) {
        self.write(index, value)
    }

    /// Write through a shared reference. Used by bulk operations whose
    /// workers write disjoint cells.
    #[inline]
    pub(crate) fn write(&self, index: [usize; N], value: f64) {
        self.storage.set_at(self.offset_unchecked(index), value)
    }

    /// Return a new zero-filled container of the same shape and storage kind.
    pub fn like(&self) -> Self {
        self.like_shape(self.shape())
    }

    /// Return a new zero-filled container with the storage kind of `self` and
    /// a given shape, which may have a different rank.
    pub fn like_shape<const M: usize>(&self, shape: [usize; M]) -> NdContainer<M> {
        NdContainer::with_kind(shape, self.kind())
    }

    /// Return a deep copy with the same storage kind. The copy is never a
    /// view.
    pub fn copy(&self) -> Self {
        self.copy_with_kind(self.kind())
    }

    /// Return a deep copy backed by storage of a given kind.
    pub fn copy_with_kind(&self, kind: StorageKind) -> Self {
        NdContainer::from_values(kind, self.shape(), self.to_vec())
    }

    /// Return a view of the whole container.
    pub fn view(&self) -> Self {
        let mut view = self.clone();
        view.is_view = true;
        view
    }

    /// Return an iterator over all valid indices in row-major order.
    pub fn indices(&self) -> NdIndices<N> {
        self.layout.indices()
    }

    /// Iterate over elements in row-major order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.indices().map(|idx| self.get_quick(idx))
    }

    /// Copy the elements into a `Vec` in row-major order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    /// Copy the elements into `out` in row-major order.
    ///
    /// Fails if the length of `out` differs from the number of elements.
    pub fn fill_slice(&self, out: &mut [f64]) -> Result<(), ShapeError> {
        if out.len() != self.len() {
            return Err(ShapeError::new(&self.shape(), &[out.len()]));
        }
        for (dst, src) in out.iter_mut().zip(self.iter()) {
            *dst = src;
        }
        Ok(())
    }

    /// Check that `other` has the same shape as `self`.
    pub(crate) fn check_same_shape<const M: usize>(
        &self,
        other: &NdContainer<M>,
    ) -> Result<(), ShapeError> {
        if self.shape().as_slice() != other.shape().as_slice() {
            return Err(ShapeError::new(&self.shape(), &other.shape()));
        }
        Ok(())
    }
}
