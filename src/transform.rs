//! View transforms.
//!
//! Transforms come in two tiers. The in-place methods (`flip_axis`,
//! `part_axis`, `swap_axes` ...) rewrite the layout of the container they are
//! called on. The `view_*` methods copy the container's layout, apply an
//! in-place transform to the copy and return it as a new container sharing
//! the same storage.

use smallvec::SmallVec;

use crate::container::{Cube, Matrix, NdContainer, Vector};
use crate::errors::{IndexError, TransformError};

impl<const N: usize> NdContainer<N> {
    /// Reverse the order of indices along `axis`.
    pub fn flip_axis(&mut self, axis: usize) -> &mut Self {
        self.layout.flip(axis);
        self.is_view = true;
        self
    }

    /// Restrict `axis` to `index..index + width`.
    pub fn part_axis(
        &mut self,
        axis: usize,
        index: usize,
        width: usize,
    ) -> Result<&mut Self, TransformError> {
        self.layout.part(axis, index, width)?;
        self.is_view = true;
        Ok(self)
    }

    /// Keep every `step`th index along `axis`.
    pub fn stride_axis(&mut self, axis: usize, step: usize) -> Result<&mut Self, TransformError> {
        self.layout.stride_by(axis, step)?;
        self.is_view = true;
        Ok(self)
    }

    /// Restrict every axis to the box with corner `origin` and size `shape`.
    ///
    /// If any axis is invalid the container is left unmodified.
    pub fn part_region(
        &mut self,
        origin: [usize; N],
        shape: [usize; N],
    ) -> Result<&mut Self, TransformError> {
        let mut layout = self.layout;
        for d in 0..N {
            layout.part(d, origin[d], shape[d])?;
        }
        self.layout = layout;
        self.is_view = true;
        Ok(self)
    }

    /// Keep every `steps[d]`th index along each axis `d`.
    ///
    /// If any step is zero the container is left unmodified.
    pub fn stride_by(&mut self, steps: [usize; N]) -> Result<&mut Self, TransformError> {
        let mut layout = self.layout;
        for d in 0..N {
            layout.stride_by(d, steps[d])?;
        }
        self.layout = layout;
        self.is_view = true;
        Ok(self)
    }

    /// Swap two axes.
    pub fn swap_axes(&mut self, a: usize, b: usize) -> &mut Self {
        self.layout.swap_axes(a, b);
        if let Some(sel) = self.selection.as_mut() {
            sel.swap_axes(a, b);
        }
        self.is_view = true;
        self
    }

    /// Reorder axes so that axis `i` becomes axis `order[i]` of the current
    /// container.
    ///
    /// Fails without modifying the container if `order` is not a permutation
    /// of `0..N`.
    pub fn permute_axes(&mut self, order: [usize; N]) -> Result<&mut Self, TransformError> {
        self.layout.permute(order)?;
        if let Some(sel) = self.selection.as_mut() {
            sel.permute(order);
        }
        self.is_view = true;
        Ok(self)
    }

    fn view_with(&self, op: impl FnOnce(&mut Self) -> &mut Self) -> Self {
        let mut view = self.view();
        op(&mut view);
        view
    }

    fn try_view_with<E>(
        &self,
        op: impl FnOnce(&mut Self) -> Result<&mut Self, E>,
    ) -> Result<Self, E> {
        let mut view = self.view();
        op(&mut view)?;
        Ok(view)
    }

    /// Return a view with the order of indices along `axis` reversed.
    pub fn view_flip_axis(&self, axis: usize) -> Self {
        self.view_with(|v| v.flip_axis(axis))
    }

    /// Return a view of the box with corner `origin` and size `shape`.
    pub fn view_part_region(
        &self,
        origin: [usize; N],
        shape: [usize; N],
    ) -> Result<Self, TransformError> {
        self.try_view_with(|v| v.part_region(origin, shape))
    }

    /// Return a view of every `steps[d]`th index along each axis `d`.
    pub fn view_strides_by(&self, steps: [usize; N]) -> Result<Self, TransformError> {
        self.try_view_with(|v| v.stride_by(steps))
    }

    /// Return a view with axes reordered.
    pub fn view_permuted(&self, order: [usize; N]) -> Result<Self, TransformError> {
        self.try_view_with(|v| v.permute_axes(order))
    }

    /// Return a view of rank `M = N - 1` with `axis` fixed at `index`.
    pub(crate) fn view_without_axis<const M: usize>(
        &self,
        axis: usize,
        index: usize,
    ) -> Result<NdContainer<M>, IndexError> {
        if index >= self.size(axis) {
            return Err(IndexError {
                axis,
                index,
                shape: SmallVec::from_slice(&self.shape()),
            });
        }

        let (mut layout, position) = self.layout.without_axis::<M>(axis, index);
        let selection = match &self.selection {
            Some(sel) => Some(sel.without_axis::<M>(axis, position)),
            None => {
                layout.shift_zero(0, position);
                None
            }
        };

        Ok(NdContainer {
            layout,
            selection,
            storage: self.storage.clone(),
            is_view: true,
        })
    }
}

impl Vector {
    /// Return a view with the elements in reverse order.
    pub fn view_flip(&self) -> Vector {
        self.view_flip_axis(0)
    }

    /// Return a view of `width` elements starting at `index`.
    pub fn view_part(&self, index: usize, width: usize) -> Result<Vector, TransformError> {
        self.try_view_with(|v| v.part_axis(0, index, width))
    }

    /// Return a view of every `step`th element.
    pub fn view_strides(&self, step: usize) -> Result<Vector, TransformError> {
        self.view_strides_by([step])
    }
}

impl Matrix {
    /// Return a view with the order of rows reversed.
    pub fn view_row_flip(&self) -> Matrix {
        self.view_flip_axis(0)
    }

    /// Return a view with the order of columns reversed.
    pub fn view_column_flip(&self) -> Matrix {
        self.view_flip_axis(1)
    }

    /// Return a transposed view.
    pub fn view_dice(&self) -> Matrix {
        self.view_with(|m| m.swap_axes(0, 1))
    }

    /// Return a view of the `height x width` block whose top-left corner is
    /// `[row, column]`.
    pub fn view_part(
        &self,
        row: usize,
        column: usize,
        height: usize,
        width: usize,
    ) -> Result<Matrix, TransformError> {
        self.view_part_region([row, column], [height, width])
    }

    /// Return a view of every `row_step`th row and `column_step`th column.
    pub fn view_strides(
        &self,
        row_step: usize,
        column_step: usize,
    ) -> Result<Matrix, TransformError> {
        self.view_strides_by([row_step, column_step])
    }

    /// Return a view of one row.
    pub fn view_row(&self, row: usize) -> Result<Vector, IndexError> {
        self.view_without_axis(0, row)
    }

    /// Return a view of one column.
    pub fn view_column(&self, column: usize) -> Result<Vector, IndexError> {
        self.view_without_axis(1, column)
    }
}

impl Cube {
    /// Return a view with the order of slices reversed.
    pub fn view_slice_flip(&self) -> Cube {
        self.view_flip_axis(0)
    }

    /// Return a view with the order of rows reversed.
    pub fn view_row_flip(&self) -> Cube {
        self.view_flip_axis(1)
    }

    /// Return a view with the order of columns reversed.
    pub fn view_column_flip(&self) -> Cube {
        self.view_flip_axis(2)
    }

    /// Return a view with axes reordered, so that axis `i` of the result is
    /// axis `order[i]` of `self`.
    ///
    /// Fails if `order` is not a permutation of `[0, 1, 2]`.
    pub fn view_dice(&self, order: [usize; 3]) -> Result<Cube, TransformError> {
        self.view_permuted(order)
    }

    /// Return a view of the `depth x height x width` box whose corner is
    /// `[slice, row, column]`.
    pub fn view_part(
        &self,
        slice: usize,
        row: usize,
        column: usize,
        depth: usize,
        height: usize,
        width: usize,
    ) -> Result<Cube, TransformError> {
        self.view_part_region([slice, row, column], [depth, height, width])
    }

    /// Return a view of every `slice_step`th slice, `row_step`th row and
    /// `column_step`th column.
    pub fn view_strides(
        &self,
        slice_step: usize,
        row_step: usize,
        column_step: usize,
    ) -> Result<Cube, TransformError> {
        self.view_strides_by([slice_step, row_step, column_step])
    }

    /// Return a `rows x columns` view of one slice.
    pub fn view_slice(&self, slice: usize) -> Result<Matrix, IndexError> {
        self.view_without_axis(0, slice)
    }

    /// Return a `slices x columns` view of one row of every slice.
    pub fn view_slice_row(&self, row: usize) -> Result<Matrix, IndexError> {
        self.view_without_axis(1, row)
    }

    /// Return a `slices x rows` view of one column of every slice.
    pub fn view_slice_column(&self, column: usize) -> Result<Matrix, IndexError> {
        self.view_without_axis(2, column)
    }
}
