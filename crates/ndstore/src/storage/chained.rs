//! Chained list: a 64-bit indexed sequence built from bounded segments.
//!
//! Logical index `i` lives in segment `i / cap` at offset `i % cap`. Every
//! segment but the last is full, so the length is derived from the segment
//! count and the last segment alone.
//!
//! # Example
//!
//! ```
//! use ndstore::storage::ChainedList;
//!
//! let mut list = ChainedList::with_segment_capacity(4);
//! for i in 0..6 {
//!     list.add(i as f64).unwrap();
//! }
//! assert_eq!(list.size(), 6);
//! assert_eq!(list.segment_count(), 2);
//! assert_eq!(list.get(5).unwrap(), &5.0);
//! ```

use crate::element::Element;
use crate::error::{Result, StoreError};

pub use super::bounded::MAX_INDEX;
use super::bounded::BoundedList;

/// Sequence of [`BoundedList`] segments behind one 64-bit index.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainedList<T> {
    segments: Vec<BoundedList<T>>,
    segment_capacity: usize,
}

impl<T: Element> Default for ChainedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> ChainedList<T> {
    /// Create an empty list with `MAX_INDEX`-sized segments.
    pub fn new() -> Self {
        Self::with_segment_capacity(MAX_INDEX)
    }

    /// Create an empty list with the given segment capacity.
    pub fn with_segment_capacity(segment_capacity: usize) -> Self {
        Self {
            segments: Vec::new(),
            segment_capacity: segment_capacity.clamp(1, MAX_INDEX),
        }
    }

    /// Create a one-element list.
    pub fn single(value: T, segment_capacity: usize) -> Self {
        let segment = BoundedList::single(value, segment_capacity);
        Self {
            segment_capacity: segment.capacity(),
            segments: vec![segment],
        }
    }

    /// Create a list of `len` slots, each a fresh `example.allocate()`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AllocationError` if `len` exceeds [`Self::max_items`].
    pub fn with_len(len: u64, example: &T, segment_capacity: usize) -> Result<Self> {
        let mut list = Self::with_segment_capacity(segment_capacity);
        list.check_capacity(len)?;
        for _ in 0..len {
            list.add(example.allocate())?;
        }
        Ok(list)
    }

    /// Create a list of `len` clones of `value`, one segment at a time.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AllocationError` if `len` exceeds [`Self::max_items`].
    pub fn filled(len: u64, value: &T, segment_capacity: usize) -> Result<Self> {
        let mut list = Self::with_segment_capacity(segment_capacity);
        list.check_capacity(len)?;
        let cap = list.segment_capacity as u64;
        let mut remaining = len;
        while remaining > 0 {
            let n = remaining.min(cap);
            list.segments
                .push(BoundedList::filled(n as usize, value, list.segment_capacity)?);
            remaining -= n;
        }
        Ok(list)
    }

    /// Capacity of each segment.
    #[inline]
    pub fn segment_capacity(&self) -> usize {
        self.segment_capacity
    }

    /// Largest length this list can reach: `segment_capacity²`.
    #[inline]
    pub fn max_items(&self) -> u64 {
        let cap = self.segment_capacity as u64;
        cap.saturating_mul(cap)
    }

    /// Number of elements.
    pub fn size(&self) -> u64 {
        match self.segments.last() {
            None => 0,
            Some(last) => {
                (self.segments.len() as u64 - 1) * self.segment_capacity as u64
                    + last.len() as u64
            }
        }
    }

    /// Check if the list holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Number of segments.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The segments in order.
    #[inline]
    pub fn segments(&self) -> &[BoundedList<T>] {
        &self.segments
    }

    /// Segment number and offset of logical index `i`.
    #[inline]
    pub fn locate(&self, i: u64) -> (usize, usize) {
        let cap = self.segment_capacity as u64;
        ((i / cap) as usize, (i % cap) as usize)
    }

    /// Get element at `i`.
    pub fn get(&self, i: u64) -> Result<&T> {
        self.check_index(i)?;
        let (segment, offset) = self.locate(i);
        self.segments[segment]
            .get(offset)
            .ok_or(StoreError::IndexOutOfRange {
                index: i,
                size: self.size(),
            })
    }

    /// Get mutable element at `i`.
    pub fn get_mut(&mut self, i: u64) -> Result<&mut T> {
        self.check_index(i)?;
        let size = self.size();
        let (segment, offset) = self.locate(i);
        self.segments[segment]
            .get_mut(offset)
            .ok_or(StoreError::IndexOutOfRange { index: i, size })
    }

    /// Replace element at `i`.
    pub fn set(&mut self, i: u64, value: T) -> Result<()> {
        *self.get_mut(i)? = value;
        Ok(())
    }

    /// Replace element at `i`, rejecting an absent value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidValue` for `None`.
    pub fn set_opt(&mut self, i: u64, value: Option<T>) -> Result<()> {
        match value {
            Some(value) => self.set(i, value),
            None => Err(StoreError::InvalidValue {
                message: format!("cannot store an absent value at index {i}"),
            }),
        }
    }

    /// Append an element, opening a new segment when the last one is full.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` once [`Self::max_items`] is reached.
    pub fn add(&mut self, value: T) -> Result<()> {
        let size = self.size();
        if size >= self.max_items() {
            return Err(StoreError::IndexOutOfRange {
                index: size,
                size: self.max_items(),
            });
        }
        let needs_segment = self.segments.last().is_none_or(|last| last.is_full());
        if needs_segment {
            self.segments
                .push(BoundedList::with_capacity(self.segment_capacity));
        }
        let last = self.segments.len() - 1;
        self.segments[last].push(value)
    }

    /// Append an element, rejecting an absent value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidValue` for `None`.
    pub fn add_opt(&mut self, value: Option<T>) -> Result<()> {
        match value {
            Some(value) => self.add(value),
            None => Err(StoreError::InvalidValue {
                message: "cannot append an absent value".to_string(),
            }),
        }
    }

    /// Overwrite every element with a clone of `value`.
    pub fn fill(&mut self, value: &T) {
        for segment in &mut self.segments {
            segment.fill(value);
        }
    }

    /// Shorten to `len` elements, dropping emptied segments.
    pub fn truncate(&mut self, len: u64) {
        if len >= self.size() {
            return;
        }
        if len == 0 {
            self.segments.clear();
            return;
        }
        let (segment, offset) = self.locate(len - 1);
        self.segments.truncate(segment + 1);
        self.segments[segment].truncate(offset + 1);
    }

    /// Iterate elements in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.segments.iter().flat_map(|s| s.as_slice().iter())
    }

    fn check_index(&self, i: u64) -> Result<()> {
        if i >= self.max_items() {
            return Err(StoreError::IndexOutOfRange {
                index: i,
                size: self.max_items(),
            });
        }
        let size = self.size();
        if i >= size {
            return Err(StoreError::IndexOutOfRange { index: i, size });
        }
        Ok(())
    }

    fn check_capacity(&self, len: u64) -> Result<()> {
        if len > self.max_items() {
            return Err(StoreError::AllocationError {
                requested: len,
                limit: self.max_items(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::c64;

    const CAP: usize = 4;

    #[test]
    fn test_capacity_boundary() {
        let list = ChainedList::with_len(CAP as u64 + 1, &1.5f64, CAP).unwrap();
        assert_eq!(list.size(), CAP as u64 + 1);
        assert_eq!(list.segment_count(), 2);
        assert_eq!(list.segments()[0].len(), CAP);
        assert_eq!(list.segments()[1].len(), 1);
        assert_eq!(list.locate(CAP as u64), (1, 0));
    }

    #[test]
    fn test_get_set_across_segments() {
        let mut list = ChainedList::with_len(CAP as u64 + 1, &0i32, CAP).unwrap();
        list.set(CAP as u64, 42).unwrap();
        assert_eq!(list.get(CAP as u64).unwrap(), &42);
        assert_eq!(list.segments()[1].get(0), Some(&42));
        assert_eq!(list.segments()[0].as_slice(), &[0; CAP]);
    }

    #[test]
    fn test_with_len_allocates_fresh_zeros() {
        // the example's value is not copied into the slots
        let list = ChainedList::with_len(3, &c64::new(2.0, 3.0), CAP).unwrap();
        assert!(list.iter().all(|z| *z == c64::new(0.0, 0.0)));
    }

    #[test]
    fn test_filled_segments() {
        let list = ChainedList::filled(9, &7u16, CAP).unwrap();
        assert_eq!(list.segment_count(), 3);
        assert_eq!(list.segments()[2].len(), 1);
        assert!(list.iter().all(|&x| x == 7));
    }

    #[test]
    fn test_add_opens_segments() {
        let mut list = ChainedList::with_segment_capacity(2);
        assert_eq!(list.segment_count(), 0);
        list.add(1u8).unwrap();
        list.add(2u8).unwrap();
        assert_eq!(list.segment_count(), 1);
        list.add(3u8).unwrap();
        assert_eq!(list.segment_count(), 2);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_max_items() {
        let mut list = ChainedList::with_segment_capacity(2);
        assert_eq!(list.max_items(), 4);
        for i in 0..4 {
            list.add(i as i64).unwrap();
        }
        assert!(matches!(
            list.add(4),
            Err(StoreError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            list.get(4),
            Err(StoreError::IndexOutOfRange { index: 4, size: 4 })
        ));
        assert!(ChainedList::with_len(5, &0i64, 2).is_err());
    }

    #[test]
    fn test_out_of_range() {
        let list = ChainedList::with_len(3, &0f32, CAP).unwrap();
        assert!(matches!(
            list.get(3),
            Err(StoreError::IndexOutOfRange { index: 3, size: 3 })
        ));
    }

    #[test]
    fn test_absent_values_rejected() {
        let mut list = ChainedList::with_len(2, &0f64, CAP).unwrap();
        assert!(matches!(
            list.set_opt(0, None),
            Err(StoreError::InvalidValue { .. })
        ));
        assert!(matches!(
            list.add_opt(None),
            Err(StoreError::InvalidValue { .. })
        ));
        list.set_opt(1, Some(3.0)).unwrap();
        list.add_opt(Some(4.0)).unwrap();
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![0.0, 3.0, 4.0]);
    }

    #[test]
    fn test_truncate() {
        let mut list = ChainedList::filled(9, &1i8, CAP).unwrap();
        list.truncate(5);
        assert_eq!(list.size(), 5);
        assert_eq!(list.segment_count(), 2);
        list.truncate(4);
        assert_eq!(list.segment_count(), 1);
        list.truncate(0);
        assert!(list.is_empty());
        assert_eq!(list.segment_count(), 0);
    }

    #[test]
    fn test_fill() {
        let mut list = ChainedList::with_len(6, &0u32, CAP).unwrap();
        list.fill(&9);
        assert!(list.iter().all(|&x| x == 9));
    }
}
