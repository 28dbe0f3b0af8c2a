//! Container kinds: the per-rank policy behind one container implementation.

use std::fmt::Debug;

use crate::error::{Result, StoreError};
use crate::index::{Dims, Shape};

/// Policy distinguishing vectors, matrices and tensors.
pub trait ContainerKind: Debug + Clone + Copy + Default + Send + Sync + 'static {
    /// Human-readable name.
    const NAME: &'static str;

    /// Required rank, or `None` for any rank.
    const RANK: Option<usize>;

    /// Whether a rank-0 or zero-extent shape still gets one storage slot.
    const SLOT_FOR_DEGENERATE: bool;

    /// Dims of a freshly created, unallocated container.
    fn empty_dims() -> Dims {
        Dims::from_elem(0, Self::RANK.unwrap_or(0))
    }

    /// Number of storage slots for `shape`.
    fn slot_count(shape: &Shape) -> u64 {
        let count = shape.element_count();
        if count == 0 && Self::SLOT_FOR_DEGENERATE {
            1
        } else {
            count
        }
    }

    /// Reject shapes of the wrong rank.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DimensionMismatch` for a rank other than [`Self::RANK`].
    fn check_rank(rank: usize) -> Result<()> {
        match Self::RANK {
            Some(expected) if expected != rank => Err(StoreError::DimensionMismatch {
                expected,
                actual: rank,
            }),
            _ => Ok(()),
        }
    }
}

/// Rank-1 containers; may hold zero elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VectorKind;

impl ContainerKind for VectorKind {
    const NAME: &'static str = "vector";
    const RANK: Option<usize> = Some(1);
    const SLOT_FOR_DEGENERATE: bool = false;
}

/// Rank-2 containers stored as `[cols, rows]`; may hold zero elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatrixKind;

impl ContainerKind for MatrixKind {
    const NAME: &'static str = "matrix";
    const RANK: Option<usize> = Some(2);
    const SLOT_FOR_DEGENERATE: bool = false;
}

/// Containers of any rank; always hold at least one slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TensorKind;

impl ContainerKind for TensorKind {
    const NAME: &'static str = "tensor";
    const RANK: Option<usize> = None;
    const SLOT_FOR_DEGENERATE: bool = true;
}
