//! Index mapping between logical N-tuples and linear offsets.
//!
//! Uses first-index-fastest order: for dims `[d0, d1, d2, ...]` the
//! multipliers are `[1, d0, d0*d1, ...]`. A matrix with `r` rows and `c`
//! columns is stored with dims `[c, r]` so that a row is contiguous.

use smallvec::SmallVec;

use crate::error::{Result, StoreError};

/// Inline vector used for dims, multipliers and indices.
pub type Dims = SmallVec<[u64; 8]>;

/// Compute multipliers from dims.
///
/// For dims `[d0, d1, d2, ...]`, returns `[1, d0, d0*d1, ...]`. Products
/// saturate at `u64::MAX`; [`Shape::new`] rejects such shapes.
///
/// # Examples
///
/// ```
/// use ndstore::index::compute_multipliers;
///
/// assert_eq!(compute_multipliers(&[3, 4, 5]).as_slice(), &[1, 3, 12]);
/// assert_eq!(compute_multipliers(&[4, 3]).as_slice(), &[1, 4]);
/// assert!(compute_multipliers(&[]).is_empty());
/// ```
pub fn compute_multipliers(dims: &[u64]) -> Dims {
    let mut multipliers = Dims::with_capacity(dims.len());
    let mut mult: u64 = 1;

    for &dim in dims {
        multipliers.push(mult);
        mult = mult.saturating_mul(dim);
    }

    multipliers
}

/// Product of all extents; 1 for rank 0.
///
/// # Errors
///
/// Returns `StoreError::AllocationError` if any running product overflows.
pub fn element_count(dims: &[u64]) -> Result<u64> {
    dims.iter()
        .try_fold(1u64, |acc, &dim| acc.checked_mul(dim))
        .ok_or(StoreError::AllocationError {
            requested: u64::MAX,
            limit: u64::MAX,
        })
}

/// Convert an index to a linear offset: `Σ mult[k] * index[k]`.
///
/// Does not check extents; see [`bounds_check`].
///
/// # Errors
///
/// - `StoreError::DimensionMismatch` if `index.len() != dims.len()`
/// - `StoreError::IndexOutOfRange` if the offset does not fit in `u64`
#[inline]
pub fn to_offset(dims: &[u64], multipliers: &[u64], index: &[u64]) -> Result<u64> {
    if index.len() != dims.len() {
        return Err(StoreError::DimensionMismatch {
            expected: dims.len(),
            actual: index.len(),
        });
    }
    let mut offset = 0u64;
    for ((&i, &m), &dim) in index.iter().zip(multipliers.iter()).zip(dims.iter()) {
        offset = i
            .checked_mul(m)
            .and_then(|term| offset.checked_add(term))
            .ok_or(StoreError::IndexOutOfRange { index: i, size: dim })?;
    }
    Ok(offset)
}

/// Convert a linear offset back to an index, highest dimension first.
///
/// A zero multiplier (only possible behind a zero extent) yields index 0
/// for that dimension.
pub fn to_index(multipliers: &[u64], mut offset: u64) -> Dims {
    let mut index: Dims = SmallVec::from_elem(0, multipliers.len());

    for k in (0..multipliers.len()).rev() {
        let mult = multipliers[k];
        if mult == 0 {
            continue;
        }
        index[k] = offset / mult;
        offset %= mult;
    }

    index
}

/// Check arity and per-dimension extents of a hard index.
///
/// # Errors
///
/// - `StoreError::DimensionMismatch` if the arity differs from the rank
/// - `StoreError::IndexOutOfRange` for the first entry at or past its extent
pub fn bounds_check(dims: &[u64], index: &[u64]) -> Result<()> {
    if index.len() != dims.len() {
        return Err(StoreError::DimensionMismatch {
            expected: dims.len(),
            actual: index.len(),
        });
    }
    for (&i, &dim) in index.iter().zip(dims.iter()) {
        if i >= dim {
            return Err(StoreError::IndexOutOfRange {
                index: i,
                size: dim,
            });
        }
    }
    Ok(())
}

/// Classify a signed index (plus component slot) for the safe accessors.
///
/// Out of bounds when:
/// - `component` is negative or `>= component_count`
/// - any entry is negative
/// - any entry within the rank is `>= dims[k]`
/// - any entry beyond the rank is nonzero (those dimensions have extent 1)
///
/// Entries missing from a short index are taken as 0.
pub fn is_out_of_bounds(
    dims: &[u64],
    index: &[i64],
    component: i64,
    component_count: usize,
) -> bool {
    if component < 0 || component as u64 >= component_count as u64 {
        return true;
    }
    for (k, &dim) in dims.iter().enumerate() {
        let i = index.get(k).copied().unwrap_or(0);
        if i < 0 || i as u64 >= dim {
            return true;
        }
    }
    index.iter().skip(dims.len()).any(|&i| i != 0)
}

/// Dims plus derived multipliers and element count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    dims: Dims,
    multipliers: Dims,
    count: u64,
}

impl Shape {
    /// Create a shape, validating that its products fit in `u64`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndstore::index::Shape;
    ///
    /// let s = Shape::new(&[4, 3]).unwrap();
    /// assert_eq!(s.rank(), 2);
    /// assert_eq!(s.multipliers(), &[1, 4]);
    /// assert_eq!(s.element_count(), 12);
    /// ```
    pub fn new(dims: &[u64]) -> Result<Self> {
        let count = element_count(dims)?;
        Ok(Self {
            dims: SmallVec::from_slice(dims),
            multipliers: compute_multipliers(dims),
            count,
        })
    }

    /// The rank-0 shape (one slot).
    pub fn scalar() -> Self {
        Self {
            dims: Dims::new(),
            multipliers: Dims::new(),
            count: 1,
        }
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Extents.
    #[inline]
    pub fn dims(&self) -> &[u64] {
        &self.dims
    }

    /// Multipliers.
    #[inline]
    pub fn multipliers(&self) -> &[u64] {
        &self.multipliers
    }

    /// Product of extents (1 for rank 0).
    #[inline]
    pub fn element_count(&self) -> u64 {
        self.count
    }

    /// True for rank 0 or when any extent is zero.
    pub fn is_degenerate(&self) -> bool {
        self.dims.is_empty() || self.dims.contains(&0)
    }

    /// Bounds-checked offset of `index`.
    pub fn offset(&self, index: &[u64]) -> Result<u64> {
        bounds_check(&self.dims, index)?;
        to_offset(&self.dims, &self.multipliers, index)
    }

    /// Index at `offset`.
    pub fn index(&self, offset: u64) -> Dims {
        to_index(&self.multipliers, offset)
    }

    /// Safe-accessor classification for this shape.
    pub fn is_out_of_bounds(&self, index: &[i64], component: i64, component_count: usize) -> bool {
        is_out_of_bounds(&self.dims, index, component, component_count)
    }

    /// Iterate every valid index in linear order.
    pub fn iter(&self) -> IndexIter {
        IndexIter::new(&self.dims)
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::scalar()
    }
}

/// Iterator over all indices of a shape in linear (offset) order.
///
/// Yields nothing when any extent is zero, and one empty index for rank 0.
#[derive(Debug, Clone)]
pub struct IndexIter {
    dims: Dims,
    next: Option<Dims>,
}

impl IndexIter {
    /// Create an iterator over `dims`.
    pub fn new(dims: &[u64]) -> Self {
        let next = if dims.contains(&0) {
            None
        } else {
            Some(SmallVec::from_elem(0, dims.len()))
        };
        Self {
            dims: SmallVec::from_slice(dims),
            next,
        }
    }
}

impl Iterator for IndexIter {
    type Item = Dims;

    fn next(&mut self) -> Option<Dims> {
        let current = self.next.take()?;

        let mut following = current.clone();
        for k in 0..self.dims.len() {
            following[k] += 1;
            if following[k] < self.dims[k] {
                self.next = Some(following);
                return Some(current);
            }
            following[k] = 0;
        }

        Some(current)
    }
}
