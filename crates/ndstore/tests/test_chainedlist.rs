//! Tests for the segmented element list behind in-memory storage.
//!
//! Covers:
//! - Growth across segment boundaries
//! - Capacity limits and their errors
//! - Absent-value rejection
//! - Linear addressing of segmented slots

use ndstore::{StoreError, c64};
use ndstore::storage::{BoundedList, ChainedList, MAX_INDEX};

const CAP: usize = 3;

/// Appending past one segment opens the next.
#[test]
fn test_add_spills_into_new_segment() {
    let mut list: ChainedList<i64> = ChainedList::with_segment_capacity(CAP);
    for v in 0..7 {
        list.add(v).unwrap();
    }
    assert_eq!(list.size(), 7);
    assert_eq!(list.segment_count(), 3);
    assert_eq!(list.locate(6), (2, 0));
    let collected: Vec<i64> = list.iter().copied().collect();
    assert_eq!(collected, (0..7).collect::<Vec<_>>());
}

/// A list holds at most segment capacity squared items.
#[test]
fn test_capacity_limit() {
    let mut list: ChainedList<u8> = ChainedList::filled((CAP * CAP) as u64, &1, CAP).unwrap();
    assert_eq!(list.size(), list.max_items());
    assert!(matches!(list.add(2), Err(StoreError::IndexOutOfRange { .. })));
    assert!(matches!(
        ChainedList::<u8>::with_len((CAP * CAP) as u64 + 1, &0, CAP),
        Err(StoreError::AllocationError { .. })
    ));
}

/// Default segment capacity is the largest signed 32-bit value.
#[test]
fn test_default_segment_capacity() {
    let list: ChainedList<f32> = ChainedList::new();
    assert_eq!(list.segment_capacity(), MAX_INDEX);
    assert_eq!(MAX_INDEX, 2_147_483_647);
    assert!(list.is_empty());
}

/// Items created by length are independent zero values.
#[test]
fn test_with_len_items_independent() {
    let mut list: ChainedList<c64> = ChainedList::with_len(4, &c64::new(0.0, 0.0), CAP).unwrap();
    list.get_mut(0).unwrap().re = 1.0;
    assert_eq!(*list.get(0).unwrap(), c64::new(1.0, 0.0));
    assert_eq!(*list.get(3).unwrap(), c64::new(0.0, 0.0));
}

/// Absent values are rejected rather than stored.
#[test]
fn test_absent_values_rejected() {
    let mut list: ChainedList<f64> = ChainedList::with_len(2, &0.0, CAP).unwrap();
    assert!(matches!(list.set_opt(0, None), Err(StoreError::InvalidValue { .. })));
    assert!(matches!(list.add_opt(None), Err(StoreError::InvalidValue { .. })));
    list.set_opt(1, Some(4.0)).unwrap();
    list.add_opt(Some(5.0)).unwrap();
    assert_eq!(list.size(), 3);
    assert_eq!(*list.get(1).unwrap(), 4.0);
}

/// Out-of-range access reports the index and size.
#[test]
fn test_out_of_range() {
    let mut list: ChainedList<i32> = ChainedList::with_len(5, &0, CAP).unwrap();
    assert!(matches!(
        list.get(5),
        Err(StoreError::IndexOutOfRange { index: 5, size: 5 })
    ));
    assert!(list.set(9, 1).is_err());
}

/// Truncating drops whole trailing segments.
#[test]
fn test_truncate() {
    let mut list: ChainedList<i32> = ChainedList::filled(8, &7, CAP).unwrap();
    list.truncate(4);
    assert_eq!(list.size(), 4);
    assert_eq!(list.segment_count(), 2);
    list.truncate(0);
    assert!(list.is_empty());
}

/// A bounded list refuses writes past its capacity.
#[test]
fn test_bounded_list_limits() {
    let mut list: BoundedList<i32> = BoundedList::with_capacity(2);
    list.push(1).unwrap();
    list.push(2).unwrap();
    assert!(list.is_full());
    assert!(matches!(list.push(3), Err(StoreError::AllocationError { .. })));
    assert!(BoundedList::filled(3, &0, 2).is_err());
}
