//! Fork-join helpers for bulk element routines.
//!
//! An element count is split into contiguous ranges, one per worker. Each
//! worker allocates its own scratch elements from the storage's zero
//! prototype. When a backend reports [`StorageBackend::access_with_one_thread`]
//! the routine runs on the calling thread instead.

use std::ops::Range;

use rayon::prelude::*;

use crate::config::ThreadPolicy;
use crate::element::Element;
use crate::error::{Result, StoreError};
use crate::storage::StorageBackend;

/// Largest number of elements [`for_each_chunk`] materializes at once.
pub const MAX_CHUNK: u64 = 4096;

/// Split `count` into at most `parts` contiguous ranges of near-equal length.
///
/// # Examples
///
/// ```
/// use ndstore::parallel::partition;
///
/// assert_eq!(partition(10, 3), vec![0..4, 4..8, 8..10]);
/// assert_eq!(partition(2, 4), vec![0..1, 1..2]);
/// assert!(partition(0, 4).is_empty());
/// ```
pub fn partition(count: u64, parts: usize) -> Vec<Range<u64>> {
    if count == 0 {
        return Vec::new();
    }
    let parts = (parts.max(1) as u64).min(count);
    let chunk_size = count.div_ceil(parts);
    (0..count)
        .step_by(chunk_size as usize)
        .map(|start| start..(start + chunk_size).min(count))
        .collect()
}

/// Number of workers for a routine touching backends with the given
/// single-thread requirement.
pub fn worker_count(policy: ThreadPolicy, one_thread: bool) -> usize {
    if one_thread { 1 } else { policy.thread_count() }
}

/// Apply `f` to every element of `src`, writing results into `dst`.
///
/// `f` receives the source element and a scratch output element owned by
/// the current worker.
///
/// # Errors
///
/// - `StoreError::ShapeMismatch` if the stores differ in size
/// - any error from the backends
pub fn map_into<T, U, S, D, F>(src: &S, dst: &mut D, policy: ThreadPolicy, f: F) -> Result<()>
where
    T: Element,
    U: Element,
    S: StorageBackend<T> + Sync,
    D: StorageBackend<U>,
    F: Fn(&T, &mut U) + Sync,
{
    let count = src.size();
    if dst.size() != count {
        return Err(StoreError::ShapeMismatch {
            expected: count,
            actual: dst.size(),
        });
    }

    let one_thread = src.access_with_one_thread() || dst.access_with_one_thread();
    let ranges = partition(count, worker_count(policy, one_thread));
    log::trace!("map_into: {count} elements in {} partition(s)", ranges.len());

    if ranges.len() <= 1 {
        let mut input = src.zero().allocate();
        let mut output = dst.zero().allocate();
        for i in 0..count {
            src.get_into(i, &mut input)?;
            f(&input, &mut output);
            dst.set(i, &output)?;
        }
        return Ok(());
    }

    let out_zero = dst.zero().clone();
    let chunks = ranges
        .into_par_iter()
        .map(|range| -> Result<(u64, Vec<U>)> {
            let start = range.start;
            let mut input = src.zero().allocate();
            let mut values = Vec::with_capacity((range.end - range.start) as usize);
            for i in range {
                src.get_into(i, &mut input)?;
                let mut output = out_zero.allocate();
                f(&input, &mut output);
                values.push(output);
            }
            Ok((start, values))
        })
        .collect::<Result<Vec<_>>>()?;

    for (start, values) in chunks {
        for (offset, value) in values.iter().enumerate() {
            dst.set(start + offset as u64, value)?;
        }
    }
    Ok(())
}

/// Read `src` in contiguous chunks and hand each to `f` with its starting offset.
///
/// Each worker walks its partition in chunks of at most [`MAX_CHUNK`]
/// elements, so a file-backed store is never read into memory whole. Chunks
/// of different workers are visited concurrently and in no particular order.
///
/// # Errors
///
/// Returns the first error from the backend or from `f`.
pub fn for_each_chunk<T, S, F>(src: &S, policy: ThreadPolicy, f: F) -> Result<()>
where
    T: Element,
    S: StorageBackend<T> + Sync,
    F: Fn(u64, &[T]) -> Result<()> + Sync,
{
    let count = src.size();
    let ranges = partition(count, worker_count(policy, src.access_with_one_thread()));
    log::trace!("for_each_chunk: {count} elements in {} partition(s)", ranges.len());

    let visit = |range: Range<u64>| -> Result<()> {
        let mut chunk = Vec::with_capacity((range.end - range.start).min(MAX_CHUNK) as usize);
        let mut start = range.start;
        while start < range.end {
            let end = (start + MAX_CHUNK).min(range.end);
            chunk.clear();
            for i in start..end {
                chunk.push(src.get(i)?);
            }
            f(start, &chunk)?;
            start = end;
        }
        Ok(())
    };

    if ranges.len() <= 1 {
        return ranges.into_iter().try_for_each(visit);
    }
    ranges.into_par_iter().try_for_each(visit)
}

/// Fold every element of `src` into per-worker accumulators, then combine
/// them with `reduce`.
///
/// # Errors
///
/// Returns any error from the backend.
pub fn fold<T, S, A, I, F, R>(
    src: &S,
    policy: ThreadPolicy,
    identity: I,
    fold: F,
    reduce: R,
) -> Result<A>
where
    T: Element,
    S: StorageBackend<T> + Sync,
    A: Send,
    I: Fn() -> A + Sync,
    F: Fn(A, &T) -> A + Sync,
    R: Fn(A, A) -> A + Sync,
{
    let count = src.size();
    let ranges = partition(count, worker_count(policy, src.access_with_one_thread()));
    log::trace!("fold: {count} elements in {} partition(s)", ranges.len());

    let fold_range = |range: Range<u64>| -> Result<A> {
        let mut scratch = src.zero().allocate();
        let mut acc = identity();
        for i in range {
            src.get_into(i, &mut scratch)?;
            acc = fold(acc, &scratch);
        }
        Ok(acc)
    };

    if ranges.len() <= 1 {
        return ranges
            .into_iter()
            .try_fold(identity(), |acc, range| -> Result<A> {
                Ok(reduce(acc, fold_range(range)?))
            });
    }

    ranges
        .into_par_iter()
        .map(fold_range)
        .try_reduce(&identity, |a, b| Ok(reduce(a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::storage::{MemoryStore, Storage};

    #[test]
    fn test_partition_covers_all() {
        for count in [1u64, 7, 64, 1000] {
            for parts in [1usize, 2, 3, 8, 2000] {
                let ranges = partition(count, parts);
                assert!(ranges.len() <= parts);
                assert_eq!(ranges.first().unwrap().start, 0);
                assert_eq!(ranges.last().unwrap().end, count);
                for pair in ranges.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                }
            }
        }
    }

    #[test]
    fn test_worker_count() {
        assert_eq!(worker_count(ThreadPolicy::Fixed(8), true), 1);
        assert_eq!(worker_count(ThreadPolicy::Fixed(8), false), 8);
        assert_eq!(worker_count(ThreadPolicy::Single, false), 1);
    }

    #[test]
    fn test_map_into_parallel() {
        let values: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let src = MemoryStore::from_vec(values, 0.0, 64).unwrap();
        let mut dst = MemoryStore::allocate(1000, 0.0, 64).unwrap();
        map_into(&src, &mut dst, ThreadPolicy::Fixed(4), |x, y| *y = x * 2.0).unwrap();
        for i in 0..1000 {
            assert_eq!(dst.get(i).unwrap(), 2.0 * i as f64);
        }
    }

    #[test]
    fn test_map_into_file_backed_runs_serially() {
        let config = StorageConfig::file();
        let mut src = Storage::allocate(&config, 50, 0i64).unwrap();
        for i in 0..50 {
            src.set(i, &(i as i64)).unwrap();
        }
        let mut dst = Storage::allocate(&config, 50, 0i64).unwrap();
        map_into(&src, &mut dst, ThreadPolicy::Fixed(4), |x, y| *y = -x).unwrap();
        assert_eq!(dst.get(49).unwrap(), -49);
    }

    #[test]
    fn test_map_into_size_mismatch() {
        let src = MemoryStore::allocate(3, 0u8, 8).unwrap();
        let mut dst = MemoryStore::allocate(4, 0u8, 8).unwrap();
        assert!(matches!(
            map_into(&src, &mut dst, ThreadPolicy::Single, |x, y| *y = *x),
            Err(StoreError::ShapeMismatch {
                expected: 3,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_for_each_chunk_covers_all() {
        use std::sync::Mutex;

        let values: Vec<i32> = (0..97).collect();
        let src = MemoryStore::from_vec(values, 0, 10).unwrap();
        let seen = Mutex::new(Vec::new());
        for_each_chunk(&src, ThreadPolicy::Fixed(5), |start, chunk| {
            seen.lock().unwrap().push((start, chunk.to_vec()));
            Ok(())
        })
        .unwrap();

        let mut seen = seen.into_inner().unwrap();
        seen.sort_by_key(|(start, _)| *start);
        assert_eq!(seen.len(), 5);
        let flat: Vec<i32> = seen.into_iter().flat_map(|(_, chunk)| chunk).collect();
        assert_eq!(flat, (0..97).collect::<Vec<_>>());
    }

    #[test]
    fn test_for_each_chunk_bounded_on_file_storage() {
        use std::sync::Mutex;

        let count = 3 * MAX_CHUNK + 17;
        let mut src = Storage::allocate(&StorageConfig::file(), count, 0u32).unwrap();
        for i in 0..count {
            src.set(i, &(i as u32)).unwrap();
        }
        let seen = Mutex::new(Vec::new());
        for_each_chunk(&src, ThreadPolicy::Available, |start, chunk| {
            assert!(chunk.iter().enumerate().all(|(k, &v)| v as u64 == start + k as u64));
            seen.lock().unwrap().push((start, chunk.len() as u64));
            Ok(())
        })
        .unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|&(_, len)| len <= MAX_CHUNK));
        assert_eq!(seen.iter().map(|&(_, len)| len).sum::<u64>(), count);
        // serial path visits in order
        assert!(seen.windows(2).all(|w| w[0].0 + w[0].1 == w[1].0));
    }

    #[test]
    fn test_for_each_chunk_propagates_error() {
        let src = MemoryStore::allocate(20, 0u8, 8).unwrap();
        let result = for_each_chunk(&src, ThreadPolicy::Fixed(2), |start, _| {
            if start > 0 {
                Err(StoreError::InvalidValue {
                    message: "stop".to_string(),
                })
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Err(StoreError::InvalidValue { .. })));
    }

    #[test]
    fn test_fold_sum() {
        let values: Vec<u64> = (1..=100).collect();
        let src = MemoryStore::from_vec(values, 0, 16).unwrap();
        for policy in [ThreadPolicy::Single, ThreadPolicy::Fixed(7)] {
            let sum = fold(&src, policy, || 0u64, |acc, x| acc + x, |a, b| a + b).unwrap();
            assert_eq!(sum, 5050);
        }
    }

    #[test]
    fn test_fold_empty() {
        let src = MemoryStore::allocate(0, 0i32, 16).unwrap();
        let n = fold(&src, ThreadPolicy::Available, || 0usize, |acc, _| acc + 1, |a, b| a + b)
            .unwrap();
        assert_eq!(n, 0);
    }
}
