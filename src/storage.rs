use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::FxHashMap;

/// Flat buffer of `f64` values.
///
/// Cells are stored as the bit patterns of the values in atomics, so that
/// containers which share a buffer can write to disjoint cells through shared
/// references, including from parallel workers. All accesses use relaxed
/// ordering. The bulk operations synchronize workers when they join.
pub struct DenseStorage {
    data: Box<[AtomicU64]>,
}

impl DenseStorage {
    /// Allocate a buffer of `len` zeros.
    pub fn zeros(len: usize) -> DenseStorage {
        let zero = 0.0f64.to_bits();
        DenseStorage {
            data: (0..len).map(|_| AtomicU64::new(zero)).collect(),
        }
    }

    pub fn from_vec(values: Vec<f64>) -> DenseStorage {
        DenseStorage {
            data: values
                .into_iter()
                .map(|x| AtomicU64::new(x.to_bits()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return the value at `offset`.
    ///
    /// Panics if `offset` is out of bounds.
    #[inline]
    pub fn get(&self, offset: usize) -> f64 {
        f64::from_bits(self.data[offset].load(Ordering::Relaxed))
    }

    /// Replace the value at `offset`.
    ///
    /// Panics if `offset` is out of bounds.
    #[inline]
    pub fn set(&self, offset: usize, value: f64) {
        self.data[offset].store(value.to_bits(), Ordering::Relaxed)
    }

    /// Iterate over the values in buffer order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.data
            .iter()
            .map(|x| f64::from_bits(x.load(Ordering::Relaxed)))
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}

/// Map from buffer offset to value that never stores zero.
///
/// Setting a cell to zero removes its entry and reading an absent entry
/// returns zero. `len` is the size of the logical buffer the map stands in
/// for.
#[derive(Default)]
pub struct SparseStorage {
    len: usize,
    entries: RwLock<FxHashMap<usize, f64>>,
}

impl SparseStorage {
    pub fn new(len: usize) -> SparseStorage {
        SparseStorage {
            len,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return the number of stored (non-zero) entries.
    pub fn stored_len(&self) -> usize {
        self.read().len()
    }

    #[inline]
    pub fn get(&self, offset: usize) -> f64 {
        self.read().get(&offset).copied().unwrap_or(0.)
    }

    #[inline]
    pub fn set(&self, offset: usize, value: f64) {
        let mut entries = self.write();
        if value == 0. {
            entries.remove(&offset);
        } else {
            entries.insert(offset, value);
        }
    }

    /// Lock the map for reading and return the guard.
    pub fn entries(&self) -> RwLockReadGuard<'_, FxHashMap<usize, f64>> {
        self.read()
    }

    // Poisoning is ignored. Every write leaves the map consistent.
    fn read(&self) -> RwLockReadGuard<'_, FxHashMap<usize, f64>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FxHashMap<usize, f64>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Kind of storage backing a container.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StorageKind {
    #[default]
    Dense,
    Sparse,
}

/// Shared handle to the storage of one or more containers.
///
/// Cloning a `Storage` creates another handle to the same cells. Views are
/// containers holding such a clone.
#[derive(Clone)]
pub enum Storage {
    Dense(Arc<DenseStorage>),
    Sparse(Arc<SparseStorage>),
}

impl Storage {
    /// Allocate zero-filled storage of a given kind and length.
    pub fn new(kind: StorageKind, len: usize) -> Storage {
        match kind {
            StorageKind::Dense => Storage::Dense(Arc::new(DenseStorage::zeros(len))),
            StorageKind::Sparse => Storage::Sparse(Arc::new(SparseStorage::new(len))),
        }
    }

    pub fn from_vec(kind: StorageKind, values: Vec<f64>) -> Storage {
        match kind {
            StorageKind::Dense => Storage::Dense(Arc::new(DenseStorage::from_vec(values))),
            StorageKind::Sparse => {
                let sparse = SparseStorage::new(values.len());
                {
                    let mut entries = sparse.write();
                    entries.extend(
                        values
                            .into_iter()
                            .enumerate()
                            .filter(|(_, x)| *x != 0.),
                    );
                }
                Storage::Sparse(Arc::new(sparse))
            }
        }
    }

    /// Allocate new zero-filled storage of the same kind as `self`.
    pub fn like(&self, len: usize) -> Storage {
        Storage::new(self.kind(), len)
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            Storage::Dense(_) => StorageKind::Dense,
            Storage::Sparse(_) => StorageKind::Sparse,
        }
    }

    pub fn is_dense(&self) -> bool {
        matches!(self, Storage::Dense(_))
    }

    /// Length of the underlying buffer.
    pub fn len(&self) -> usize {
        match self {
            Storage::Dense(dense) => dense.len(),
            Storage::Sparse(sparse) => sparse.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return true if `self` and `other` are handles to the same cells.
    pub fn ptr_eq(&self, other: &Storage) -> bool {
        match (self, other) {
            (Storage::Dense(a), Storage::Dense(b)) => Arc::ptr_eq(a, b),
            (Storage::Sparse(a), Storage::Sparse(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    #[inline]
    pub fn get_at(&self, offset: usize) -> f64 {
        match self {
            Storage::Dense(dense) => dense.get(offset),
            Storage::Sparse(sparse) => sparse.get(offset),
        }
    }

    #[inline]
    pub fn set_at(&self, offset: usize, value: f64) {
        match self {
            Storage::Dense(dense) => dense.set(offset, value),
            Storage::Sparse(sparse) => sparse.set(offset, value),
        }
    }

    /// Expose the raw backing structure.
    pub fn elements(&self) -> Elements<'_> {
        match self {
            Storage::Dense(dense) => Elements::Dense(dense),
            Storage::Sparse(sparse) => Elements::Sparse(sparse.entries()),
        }
    }
}

/// Raw backing structure of a container, indexed by buffer offset rather
/// than by logical index.
///
/// For a sparse container this holds a read lock on the map. Writing to any
/// container sharing the storage while it is alive will block.
pub enum Elements<'a> {
    Dense(&'a DenseStorage),
    Sparse(RwLockReadGuard<'a, FxHashMap<usize, f64>>),
}

#[cfg(test)]
mod tests {
    use super::{DenseStorage, Elements, SparseStorage, Storage, StorageKind};

    #[test]
    fn test_dense_get_set() {
        let dense = DenseStorage::zeros(4);
        dense.set(2, 1.5);
        dense.set(3, -0.25);
        assert_eq!(dense.to_vec(), [0., 0., 1.5, -0.25]);
        assert_eq!(dense.get(2), 1.5);
    }

    #[test]
    fn test_sparse_suppresses_zero() {
        let sparse = SparseStorage::new(10);
        sparse.set(3, 2.);
        sparse.set(7, -1.);
        assert_eq!(sparse.stored_len(), 2);
        assert_eq!(sparse.get(3), 2.);
        assert_eq!(sparse.get(4), 0.);

        sparse.set(3, 0.);
        assert_eq!(sparse.stored_len(), 1);
        assert!(!sparse.entries().contains_key(&3));

        // Setting an absent entry to zero stores nothing.
        sparse.set(5, 0.);
        assert_eq!(sparse.stored_len(), 1);
    }

    #[test]
    fn test_storage_like() {
        let sparse = Storage::new(StorageKind::Sparse, 5);
        let like = sparse.like(3);
        assert_eq!(like.kind(), StorageKind::Sparse);
        assert_eq!(like.len(), 3);
        assert!(!like.ptr_eq(&sparse));

        let dense = Storage::from_vec(StorageKind::Dense, vec![1., 2.]);
        let like = dense.like(2);
        assert!(like.is_dense());
        assert_eq!(like.get_at(1), 0.);
    }

    #[test]
    fn test_storage_aliasing() {
        let storage = Storage::new(StorageKind::Dense, 3);
        let alias = storage.clone();
        alias.set_at(1, 4.);
        assert_eq!(storage.get_at(1), 4.);
        assert!(storage.ptr_eq(&alias));
    }

    #[test]
    fn test_elements() {
        let storage = Storage::from_vec(StorageKind::Sparse, vec![0., 3., 0., 5.]);
        match storage.elements() {
            Elements::Sparse(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries.get(&3), Some(&5.));
            }
            Elements::Dense(_) => panic!("expected sparse elements"),
        }

        let storage = Storage::from_vec(StorageKind::Dense, vec![0., 3.]);
        match storage.elements() {
            Elements::Dense(dense) => assert_eq!(dense.to_vec(), [0., 3.]),
            Elements::Sparse(_) => panic!("expected dense elements"),
        };
    }
}
