//! Bounded list: one contiguous array of at most `MAX_INDEX` elements.

use crate::element::Element;
use crate::error::{Result, StoreError};

/// Largest number of elements one contiguous array may hold.
///
/// Matches the positive range of a 32-bit signed index.
pub const MAX_INDEX: usize = i32::MAX as usize;

/// Contiguous store of homogeneous elements with a fixed capacity.
///
/// The capacity is a logical limit; memory is only reserved for elements
/// actually pushed.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedList<T> {
    data: Vec<T>,
    capacity: usize,
}

impl<T: Element> BoundedList<T> {
    /// Create an empty list with the given capacity (clamped to `1..=MAX_INDEX`).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::new(),
            capacity: capacity.clamp(1, MAX_INDEX),
        }
    }

    /// Create a list holding exactly `value`.
    pub fn single(value: T, capacity: usize) -> Self {
        Self {
            data: vec![value],
            capacity: capacity.clamp(1, MAX_INDEX),
        }
    }

    /// Create a list holding `len` clones of `value`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AllocationError` if `len` exceeds the capacity.
    pub fn filled(len: usize, value: &T, capacity: usize) -> Result<Self> {
        let mut list = Self::with_capacity(capacity);
        if len > list.capacity {
            return Err(StoreError::AllocationError {
                requested: len as u64,
                limit: list.capacity as u64,
            });
        }
        list.data = vec![value.clone(); len];
        Ok(list)
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the list holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Maximum number of elements.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if no further element fits.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.data.len() >= self.capacity
    }

    /// Get element at `i`.
    #[inline]
    pub fn get(&self, i: usize) -> Option<&T> {
        self.data.get(i)
    }

    /// Get mutable element at `i`.
    #[inline]
    pub fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        self.data.get_mut(i)
    }

    /// Replace element at `i`.
    pub fn set(&mut self, i: usize, value: T) -> Result<()> {
        let size = self.data.len() as u64;
        match self.data.get_mut(i) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(StoreError::IndexOutOfRange {
                index: i as u64,
                size,
            }),
        }
    }

    /// Append an element.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AllocationError` if the list is full.
    pub fn push(&mut self, value: T) -> Result<()> {
        if self.is_full() {
            return Err(StoreError::AllocationError {
                requested: self.data.len() as u64 + 1,
                limit: self.capacity as u64,
            });
        }
        self.data.push(value);
        Ok(())
    }

    /// Overwrite every element with a clone of `value`.
    pub fn fill(&mut self, value: &T) {
        for x in &mut self.data {
            *x = value.clone();
        }
    }

    /// Shorten to `len` elements; no-op if already shorter.
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    /// Get immutable slice of data.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get mutable slice of data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled() {
        let list = BoundedList::filled(5, &0.0f64, 8).unwrap();
        assert_eq!(list.len(), 5);
        assert_eq!(list.capacity(), 8);
        assert!(!list.is_full());
        assert_eq!(list.as_slice(), &[0.0; 5]);
    }

    #[test]
    fn test_filled_over_capacity() {
        let err = BoundedList::filled(9, &0i32, 8).unwrap_err();
        assert!(matches!(
            err,
            StoreError::AllocationError {
                requested: 9,
                limit: 8
            }
        ));
    }

    #[test]
    fn test_push_until_full() {
        let mut list = BoundedList::with_capacity(2);
        list.push(1u8).unwrap();
        list.push(2u8).unwrap();
        assert!(list.is_full());
        assert!(list.push(3u8).is_err());
        assert_eq!(list.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_set_out_of_range() {
        let mut list = BoundedList::filled(2, &0i64, 4).unwrap();
        list.set(1, 7).unwrap();
        assert_eq!(list.get(1), Some(&7));
        assert!(matches!(
            list.set(2, 1),
            Err(StoreError::IndexOutOfRange { index: 2, size: 2 })
        ));
    }

    #[test]
    fn test_capacity_clamped() {
        let list: BoundedList<f32> = BoundedList::with_capacity(0);
        assert_eq!(list.capacity(), 1);
        let list: BoundedList<f32> = BoundedList::with_capacity(usize::MAX);
        assert_eq!(list.capacity(), MAX_INDEX);
    }
}
