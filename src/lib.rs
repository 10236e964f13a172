//! strata provides dense and sparse containers of `f64` values with one
//! ([Vector]), two ([Matrix]) or three ([Cube]) dimensions.
//!
//! # Storage and layout
//!
//! A container is a combination of element storage and a layout. The storage
//! is either dense (every cell held in memory) or sparse (only non-zero cells
//! held in a hash map, see [StorageKind]). The layout maps coordinates to
//! storage offsets using a per-axis size, stride and zero offset.
//!
//! Views share storage with the container they are derived from, so writes
//! through a view are visible in the source and vice versa. Transformations
//! such as flipping, taking a sub-range, striding and transposing only change
//! the layout and never copy elements:
//!
//! ```
//! use strata::Vector;
//!
//! let m = Vector::ascending(6).reshape_matrix(2, 3).unwrap();
//! let mut column = m.view_dice().view_row(1).unwrap();
//! column.assign(10.);
//! assert_eq!(m.to_rows(), [vec![0., 10., 4.], vec![1., 10., 5.]]);
//! ```
//!
//! Selection views pick an arbitrary list of indices along each axis and may
//! repeat them. See [`NdContainer::view_selection_axes`].
//!
//! # Parallelism
//!
//! Bulk operations (assignment and aggregation) are split into contiguous
//! chunks of the row-major traversal and run on a Rayon thread pool when the
//! container has more elements than [VECTOR_THRESHOLD], [MATRIX_THRESHOLD]
//! or [CUBE_THRESHOLD] for its rank. Partial results are combined in chunk
//! order, so repeated runs with the same number of threads give identical
//! results. Chunk boundaries depend on the thread count, so floating point
//! results may differ in rounding between thread counts. Set
//! `STRATA_PARALLEL=0` to disable parallel execution and `STRATA_NUM_THREADS`
//! to size the default pool. To use a different pool, call the operation
//! inside [`ThreadPool::run`].
//!
//! Element reads and writes are individually atomic, but bulk operations
//! are not. Callers must not run a bulk operation on a container while
//! another thread writes to overlapping cells.

mod aggregate;
mod assign;
mod container;
mod cube;
mod env;
pub mod errors;
mod impl_debug;
mod index_iterator;
mod layout;
mod matrix;
mod parallel;
mod property;
mod selection;
mod storage;
mod threading;
mod transform;
mod values;
mod vector;

// Re-exports for convenience.
pub use container::{Cube, Matrix, NdContainer, Vector};
pub use index_iterator::{unravel_index, NdIndices};
pub use layout::{is_valid_permutation, NdLayout};
pub use parallel::{
    parallel_enabled, partition, threshold_for_rank, CUBE_THRESHOLD, MATRIX_THRESHOLD,
    VECTOR_THRESHOLD,
};
pub use property::Property;
pub use storage::{DenseStorage, Elements, SparseStorage, Storage, StorageKind};
pub use threading::{thread_pool, ThreadPool};
