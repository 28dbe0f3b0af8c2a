//! ndstore - N-dimensional numeric containers over pluggable storage
//!
//! This crate provides vectors, matrices and tensors of arbitrary element
//! types, addressed by logical index and backed by in-memory or file storage.
//!
//! # Architecture
//!
//! ```text
//! Level 1: Containers (container module)
//!     → VectorMember, MatrixMember, TensorMember
//!     → hard accessors (get/set) and safe accessors (get_safe/set_safe)
//!
//! Level 2: Index mapping (index module)
//!     → Shape: dims + multipliers, first index fastest
//!
//! Level 3: Storage backends (storage module)
//!     → MemoryStore: ChainedList of BoundedList segments
//!     → FileStore: fixed-width records in a file
//! ```
//!
//! # Example
//!
//! ```
//! use ndstore::{MatrixMember, TensorMember, c64};
//!
//! // 3 rows, 4 columns; rows are contiguous
//! let mut m: MatrixMember<f64> = MatrixMember::zeros(3, 4).unwrap();
//! m.set_rc(2, 1, &5.0).unwrap();
//! assert_eq!(m.get_linear(9).unwrap(), 5.0);
//!
//! // Outside the extent reads as zero
//! assert_eq!(m.get_rc_safe(-1, 7).unwrap(), 0.0);
//! assert!(m.set_rc_safe(-1, 7, &1.0).is_err());
//!
//! // Any rank, any element type
//! let t: TensorMember<c64> = TensorMember::zeros(&[2, 2, 2]).unwrap();
//! assert!(t.is_zero().unwrap());
//! ```

pub mod config;
pub mod container;
pub mod element;
pub mod error;
pub mod index;
pub mod parallel;
pub mod random;
pub mod storage;

pub use config::{StorageConfig, StorageKind, ThreadPolicy};
pub use container::{
    ContainerKind, Indexed, MatrixKind, MatrixMember, NdContainer, Shaped, TensorKind,
    TensorMember, VectorKind, VectorMember,
};
pub use element::{Components, Element, Persist, c64};
pub use error::{Result, StoreError};
pub use index::{Dims, IndexIter, Shape};
pub use random::{RandomNormal, RandomUniform};
pub use storage::{ChainedList, FileStore, MemoryStore, Storage, StorageBackend};
