//! Storage backends for container elements.
//!
//! ```text
//! StorageBackend<T> (trait)
//! ├── MemoryStore<T> - ChainedList of BoundedList segments
//! ├── FileStore<T>   - fixed-width records in a file
//! └── Storage<T>     - runtime choice between the two
//! ```
//!
//! Storage is always a flat sequence addressed by a 64-bit offset; shape and
//! multipliers come from the container wrapper.
//!
//! # Concurrency
//!
//! Backends provide no internal synchronization. `&mut` is required for
//! every write, and bulk routines check [`StorageBackend::access_with_one_thread`]
//! before reading from several threads.

mod bounded;
pub mod chained;
mod file;
mod memory;

pub use bounded::{BoundedList, MAX_INDEX};
pub use chained::ChainedList;
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::config::{StorageConfig, StorageKind};
use crate::element::{Element, Persist};
use crate::error::Result;

/// Trait for element storage backends.
pub trait StorageBackend<T: Element>: Sized {
    /// Which backend this is.
    fn kind(&self) -> StorageKind;

    /// Number of element slots.
    fn size(&self) -> u64;

    /// Zero prototype used for zero-fill.
    fn zero(&self) -> &T;

    /// Read the element at `index` into `out`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` if `index >= size()`.
    fn get_into(&self, index: u64, out: &mut T) -> Result<()>;

    /// Read the element at `index`.
    fn get(&self, index: u64) -> Result<T> {
        let mut out = self.zero().allocate();
        self.get_into(index, &mut out)?;
        Ok(out)
    }

    /// Write `value` at `index`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` if `index >= size()`.
    fn set(&mut self, index: u64, value: &T) -> Result<()>;

    /// Overwrite every slot with `value`.
    fn fill(&mut self, value: &T) -> Result<()>;

    /// Overwrite every slot with the zero prototype.
    fn zero_fill(&mut self) -> Result<()> {
        let zero = self.zero().clone();
        self.fill(&zero)
    }

    /// Independent copy with identical contents and backend kind.
    fn duplicate(&self) -> Result<Self>;

    /// New zero-filled store of `count` slots with this store's kind and settings.
    fn allocate_like(&self, count: u64) -> Result<Self>;

    /// True if the backend must not be accessed from several threads at once.
    fn access_with_one_thread(&self) -> bool;
}

/// Storage selected at runtime.
#[derive(Debug)]
pub enum Storage<T> {
    /// In-memory chained arrays.
    Memory(MemoryStore<T>),
    /// File-backed records.
    File(FileStore<T>),
}

impl<T: Element> Storage<T> {
    /// Allocate `count` slots in memory.
    pub fn memory(count: u64, zero: T, segment_capacity: usize) -> Result<Self> {
        Ok(Storage::Memory(MemoryStore::allocate(
            count,
            zero,
            segment_capacity,
        )?))
    }

    /// Allocate `count` slots on the backend named by `config.kind`.
    ///
    /// # Errors
    ///
    /// - `StoreError::AllocationError` if `count` exceeds the backend limit
    /// - `StoreError::Io` if the backing file cannot be created
    pub fn allocate(config: &StorageConfig, count: u64, zero: T) -> Result<Self>
    where
        T: Persist,
    {
        match config.kind {
            StorageKind::Memory => Self::memory(count, zero, config.segment_capacity),
            StorageKind::File => Ok(Storage::File(FileStore::allocate(
                count,
                zero,
                &config.file_dir,
            )?)),
        }
    }
}

impl<T: Element> StorageBackend<T> for Storage<T> {
    fn kind(&self) -> StorageKind {
        match self {
            Storage::Memory(s) => s.kind(),
            Storage::File(s) => s.kind(),
        }
    }

    fn size(&self) -> u64 {
        match self {
            Storage::Memory(s) => s.size(),
            Storage::File(s) => s.size(),
        }
    }

    fn zero(&self) -> &T {
        match self {
            Storage::Memory(s) => s.zero(),
            Storage::File(s) => s.zero(),
        }
    }

    #[inline]
    fn get_into(&self, index: u64, out: &mut T) -> Result<()> {
        match self {
            Storage::Memory(s) => s.get_into(index, out),
            Storage::File(s) => s.get_into(index, out),
        }
    }

    #[inline]
    fn set(&mut self, index: u64, value: &T) -> Result<()> {
        match self {
            Storage::Memory(s) => s.set(index, value),
            Storage::File(s) => s.set(index, value),
        }
    }

    fn fill(&mut self, value: &T) -> Result<()> {
        match self {
            Storage::Memory(s) => s.fill(value),
            Storage::File(s) => s.fill(value),
        }
    }

    fn duplicate(&self) -> Result<Self> {
        Ok(match self {
            Storage::Memory(s) => Storage::Memory(s.duplicate()?),
            Storage::File(s) => Storage::File(s.duplicate()?),
        })
    }

    fn allocate_like(&self, count: u64) -> Result<Self> {
        Ok(match self {
            Storage::Memory(s) => Storage::Memory(s.allocate_like(count)?),
            Storage::File(s) => Storage::File(s.allocate_like(count)?),
        })
    }

    fn access_with_one_thread(&self) -> bool {
        match self {
            Storage::Memory(s) => s.access_with_one_thread(),
            Storage::File(s) => s.access_with_one_thread(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    fn exercise<S: StorageBackend<f64>>(mut store: S) {
        assert_eq!(store.size(), 5);
        for i in 0..5 {
            assert_eq!(store.get(i).unwrap(), 0.0);
        }
        store.set(3, &2.5).unwrap();
        assert_eq!(store.get(3).unwrap(), 2.5);
        assert!(matches!(
            store.get(5),
            Err(StoreError::IndexOutOfRange { index: 5, size: 5 })
        ));
        assert!(matches!(
            store.set(5, &1.0),
            Err(StoreError::IndexOutOfRange { .. })
        ));

        let mut copy = store.duplicate().unwrap();
        assert_eq!(copy.kind(), store.kind());
        copy.set(3, &-1.0).unwrap();
        assert_eq!(store.get(3).unwrap(), 2.5);
        store.set(0, &9.0).unwrap();
        assert_eq!(copy.get(0).unwrap(), 0.0);

        store.zero_fill().unwrap();
        assert!((0..5).all(|i| store.get(i).unwrap() == 0.0));

        let bigger = store.allocate_like(7).unwrap();
        assert_eq!(bigger.size(), 7);
        assert_eq!(bigger.kind(), store.kind());
    }

    #[test]
    fn test_memory_storage() {
        let store = Storage::allocate(&StorageConfig::memory(), 5, 0.0).unwrap();
        assert!(!store.access_with_one_thread());
        exercise(store);
    }

    #[test]
    fn test_file_storage() {
        let store = Storage::allocate(&StorageConfig::file(), 5, 0.0).unwrap();
        assert!(store.access_with_one_thread());
        exercise(store);
    }

    #[test]
    fn test_memory_storage_small_segments() {
        let config = StorageConfig::memory().with_segment_capacity(2);
        let store = Storage::allocate(&config, 5, 0.0).unwrap();
        exercise(store);
    }
}
