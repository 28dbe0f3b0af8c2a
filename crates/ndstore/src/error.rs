//! Error types for ndstore.

use thiserror::Error;

/// Errors that can occur in container and storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Index arity does not match the container rank.
    #[error("dimension mismatch: expected {expected} indices, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Linear or per-dimension index beyond the current size or extent.
    #[error("index out of range: index {index} is out of range for size {size}")]
    IndexOutOfRange { index: u64, size: u64 },

    /// Nonzero write outside the declared extent through a safe accessor.
    #[error("cannot write a nonzero value outside the declared extent at {index:?}")]
    OutOfExtentWrite { index: Vec<i64> },

    /// Requested element count exceeds what the backend can address.
    #[error("cannot allocate {requested} elements: limit is {limit}")]
    AllocationError { requested: u64, limit: u64 },

    /// An absent value was supplied where a value is required.
    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    /// Raw value count disagrees with the declared shape.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: u64, actual: u64 },

    /// File-backed storage I/O failure.
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
