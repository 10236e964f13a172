use std::sync::Arc;

use smallvec::SmallVec;

use crate::container::{Cube, Matrix, NdContainer, Vector};
use crate::errors::IndexError;
use crate::layout::NdLayout;

/// Offset tables of a selection view.
///
/// The storage offset of an index is `origin + Σ axes[d][p_d]`, where `p_d` is
/// the position along axis `d` computed by the view's layout.
#[derive(Clone, Debug)]
pub(crate) struct SelectionOffsets<const N: usize> {
    pub(crate) axes: [Arc<[isize]>; N],
    pub(crate) origin: isize,
}

impl<const N: usize> SelectionOffsets<N> {
    /// Fix `axis` at table entry `position` and keep the tables of the other
    /// axes.
    pub(crate) fn without_axis<const M: usize>(
        &self,
        axis: usize,
        position: isize,
    ) -> SelectionOffsets<M> {
        SelectionOffsets {
            axes: std::array::from_fn(|i| {
                let dim = if i < axis { i } else { i + 1 };
                self.axes[dim].clone()
            }),
            origin: self.origin + self.axes[axis][position as usize],
        }
    }

    pub(crate) fn swap_axes(&mut self, a: usize, b: usize) {
        self.axes.swap(a, b);
    }

    pub(crate) fn permute(&mut self, order: [usize; N]) {
        let prev = self.axes.clone();
        self.axes = std::array::from_fn(|i| prev[order[i]].clone());
    }
}

/// Which indices of one axis a selection keeps.
#[derive(Copy, Clone, Debug)]
pub(crate) enum AxisSelection<'a> {
    All,
    Indices(&'a [usize]),
}

impl<'a> AxisSelection<'a> {
    /// Interpret an empty index list as "every index".
    fn from_list(indices: &'a [usize]) -> Self {
        if indices.is_empty() {
            AxisSelection::All
        } else {
            AxisSelection::Indices(indices)
        }
    }
}

impl<const N: usize> NdContainer<N> {
    /// Create a selection view which keeps the given indices along each axis.
    ///
    /// Offsets are computed through the current addressing of `self`, so a
    /// selection of a selection or of a transformed view sees the same cells
    /// as its source.
    pub(crate) fn select(&self, axes: [AxisSelection<'_>; N]) -> Result<Self, IndexError> {
        for (axis, sel) in axes.iter().enumerate() {
            if let AxisSelection::Indices(indices) = sel {
                let size = self.size(axis);
                if let Some(&index) = indices.iter().find(|&&i| i >= size) {
                    return Err(IndexError {
                        axis,
                        index,
                        shape: SmallVec::from_slice(&self.shape()),
                    });
                }
            }
        }

        Ok(self.select_unchecked(axes))
    }

    /// Variant of [`select`](NdContainer::select) for indices that are known
    /// to be in range.
    fn select_unchecked(&self, axes: [AxisSelection<'_>; N]) -> Self {
        let tables: [Arc<[isize]>; N] = std::array::from_fn(|axis| match axes[axis] {
            AxisSelection::All => (0..self.size(axis))
                .map(|i| self.axis_term(axis, i))
                .collect(),
            AxisSelection::Indices(indices) => {
                indices.iter().map(|&i| self.axis_term(axis, i)).collect()
            }
        });
        let shape = std::array::from_fn(|axis| tables[axis].len());
        let origin = self.selection.as_ref().map(|sel| sel.origin).unwrap_or(0);

        NdContainer {
            layout: NdLayout::for_selection(shape),
            selection: Some(SelectionOffsets {
                axes: tables,
                origin,
            }),
            storage: self.storage.clone(),
            is_view: true,
        }
    }

    /// Create a selection view with one index list per axis.
    ///
    /// An empty list selects every index of its axis, in order.
    pub fn view_selection_axes(&self, indices: [&[usize]; N]) -> Result<Self, IndexError> {
        self.select(indices.map(AxisSelection::from_list))
    }

    /// Return the indices along axis 0 for which `cond` holds for the
    /// corresponding lower-rank view.
    fn outer_indices_where<const M: usize>(
        &self,
        cond: impl Fn(&NdContainer<M>) -> bool,
    ) -> Vec<usize> {
        (0..self.size(0))
            .filter(|&i| {
                self.view_without_axis::<M>(0, i)
                    .map(|part| cond(&part))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Return the indices along axis 0 ordered by `key`, which reads one cell
    /// of each lower-rank view.
    fn outer_indices_sorted_by<const M: usize>(
        &self,
        key: [usize; M],
    ) -> Result<Vec<usize>, IndexError> {
        let mut keyed = Vec::with_capacity(self.size(0));
        for i in 0..self.size(0) {
            let part = self.view_without_axis::<M>(0, i)?;
            keyed.push((part.get(key)?, i));
        }
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(keyed.into_iter().map(|(_, i)| i).collect())
    }
}

impl Vector {
    /// Create a view of the elements at `indices`, which may repeat.
    ///
    /// An empty list selects every element. The view shares storage with
    /// `self`.
    pub fn view_selection(&self, indices: &[usize]) -> Result<Vector, IndexError> {
        self.view_selection_axes([indices])
    }

    /// Create a view of the elements whose value satisfies `cond`.
    ///
    /// The view is empty if no element matches.
    pub fn view_selection_by(&self, cond: impl Fn(f64) -> bool) -> Vector {
        let indices: Vec<usize> = (0..self.len())
            .filter(|&i| cond(self.get_quick([i])))
            .collect();
        self.select_outer(&indices)
    }

    /// Create a view that visits the elements in ascending order.
    ///
    /// NaN values sort after all other values.
    pub fn view_sorted(&self) -> Vector {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.sort_by(|&a, &b| self.get_quick([a]).total_cmp(&self.get_quick([b])));
        self.select_outer(&indices)
    }
}

impl Matrix {
    /// Create a view of the rows and columns at `rows` and `columns`.
    ///
    /// An empty list selects every row or column.
    pub fn view_selection(
        &self,
        rows: &[usize],
        columns: &[usize],
    ) -> Result<Matrix, IndexError> {
        self.view_selection_axes([rows, columns])
    }

    /// Create a view of the rows for which `cond` holds.
    pub fn view_selection_by(&self, cond: impl Fn(&Vector) -> bool) -> Matrix {
        let rows = self.outer_indices_where(cond);
        self.select_outer(&rows)
    }

    /// Create a view with rows ordered by their value in `column`.
    pub fn view_sorted(&self, column: usize) -> Result<Matrix, IndexError> {
        let rows = self.outer_indices_sorted_by([column])?;
        Ok(self.select_outer(&rows))
    }
}

impl Cube {
    /// Create a view of the slices, rows and columns at the given indices.
    ///
    /// An empty list selects every index of its axis.
    pub fn view_selection(
        &self,
        slices: &[usize],
        rows: &[usize],
        columns: &[usize],
    ) -> Result<Cube, IndexError> {
        self.view_selection_axes([slices, rows, columns])
    }

    /// Create a view of the slices for which `cond` holds.
    pub fn view_selection_by(&self, cond: impl Fn(&Matrix) -> bool) -> Cube {
        let slices = self.outer_indices_where(cond);
        self.select_outer(&slices)
    }

    /// Create a view with slices ordered by their value at `[row, column]`.
    pub fn view_sorted(&self, row: usize, column: usize) -> Result<Cube, IndexError> {
        let slices = self.outer_indices_sorted_by([row, column])?;
        Ok(self.select_outer(&slices))
    }
}

impl<const N: usize> NdContainer<N> {
    /// Select `indices` along axis 0 and every index along other axes.
    ///
    /// `indices` must be in range. An empty list gives an empty view.
    fn select_outer(&self, indices: &[usize]) -> Self {
        let axes = std::array::from_fn(|axis| {
            if axis == 0 {
                AxisSelection::Indices(indices)
            } else {
                AxisSelection::All
            }
        });
        self.select_unchecked(axes)
    }
}
