//! In-memory storage over a chained list.

use crate::config::StorageKind;
use crate::element::Element;
use crate::error::{Result, StoreError};

use super::StorageBackend;
use super::chained::ChainedList;

/// Memory-backed storage.
///
/// A single segment when the count fits in one bounded array, more
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStore<T> {
    list: ChainedList<T>,
    zero: T,
}

impl<T: Element> MemoryStore<T> {
    /// Allocate `count` slots initialized to `zero`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AllocationError` if `count` exceeds
    /// `segment_capacity²`.
    pub fn allocate(count: u64, zero: T, segment_capacity: usize) -> Result<Self> {
        let list = ChainedList::filled(count, &zero, segment_capacity)?;
        log::debug!(
            "allocated {count} in-memory slots in {} segment(s)",
            list.segment_count()
        );
        Ok(Self { list, zero })
    }

    /// Storage with no slots.
    pub fn empty(zero: T, segment_capacity: usize) -> Self {
        Self {
            list: ChainedList::with_segment_capacity(segment_capacity),
            zero,
        }
    }

    /// Storage with one slot holding `value`.
    pub fn single(value: T, zero: T, segment_capacity: usize) -> Self {
        Self {
            list: ChainedList::single(value, segment_capacity),
            zero,
        }
    }

    /// Wrap existing values.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AllocationError` if the values do not fit.
    pub fn from_vec(values: Vec<T>, zero: T, segment_capacity: usize) -> Result<Self> {
        let mut list = ChainedList::with_segment_capacity(segment_capacity);
        if values.len() as u64 > list.max_items() {
            return Err(StoreError::AllocationError {
                requested: values.len() as u64,
                limit: list.max_items(),
            });
        }
        for value in values {
            list.add(value)?;
        }
        Ok(Self { list, zero })
    }

    /// The underlying chained list.
    #[inline]
    pub fn list(&self) -> &ChainedList<T> {
        &self.list
    }
}

impl<T: Element> StorageBackend<T> for MemoryStore<T> {
    fn kind(&self) -> StorageKind {
        StorageKind::Memory
    }

    #[inline]
    fn size(&self) -> u64 {
        self.list.size()
    }

    fn zero(&self) -> &T {
        &self.zero
    }

    #[inline]
    fn get_into(&self, index: u64, out: &mut T) -> Result<()> {
        out.clone_from(self.list.get(index)?);
        Ok(())
    }

    #[inline]
    fn set(&mut self, index: u64, value: &T) -> Result<()> {
        self.list.get_mut(index)?.clone_from(value);
        Ok(())
    }

    fn fill(&mut self, value: &T) -> Result<()> {
        self.list.fill(value);
        Ok(())
    }

    fn duplicate(&self) -> Result<Self> {
        Ok(self.clone())
    }

    fn allocate_like(&self, count: u64) -> Result<Self> {
        Self::allocate(count, self.zero.clone(), self.list.segment_capacity())
    }

    fn access_with_one_thread(&self) -> bool {
        false
    }
}
