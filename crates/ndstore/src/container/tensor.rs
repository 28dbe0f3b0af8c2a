//! Tensor-specific operations.

use crate::config::StorageConfig;
use crate::element::Element;
use crate::error::Result;
use crate::index::Shape;
use crate::storage::{MemoryStore, Storage};

use super::{NdContainer, TensorKind};

impl<T: Element> NdContainer<T, TensorKind> {
    /// Zero-filled in-memory tensor.
    pub fn zeros(dims: &[u64]) -> Result<Self> {
        Self::with_dims(dims)
    }

    /// Rank-0 tensor holding `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndstore::TensorMember;
    ///
    /// let t = TensorMember::scalar(2.5f64);
    /// assert_eq!(t.rank(), 0);
    /// assert_eq!(t.get(&[]).unwrap(), 2.5);
    /// ```
    pub fn scalar(value: T) -> Self {
        let config = StorageConfig::default();
        let store = MemoryStore::single(value, T::zero(), config.segment_capacity);
        Self::from_parts(Shape::scalar(), Storage::Memory(store), config)
    }

    /// True for rank 0 or any zero extent; such tensors hold one slot.
    pub fn is_degenerate(&self) -> bool {
        self.shape().is_degenerate()
    }
}
