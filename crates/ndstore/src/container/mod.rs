//! N-dimensional containers over polymorphic storage.
//!
//! One implementation, specialized per kind:
//!
//! ```text
//! NdContainer<T, K: ContainerKind>
//! ├── VectorMember<T> = NdContainer<T, VectorKind>   rank 1
//! ├── MatrixMember<T> = NdContainer<T, MatrixKind>   rank 2, dims [cols, rows]
//! └── TensorMember<T> = NdContainer<T, TensorKind>   any rank, >= 1 slot
//! ```
//!
//! Access goes logical index → [`Shape`] → linear offset → [`Storage`].
//!
//! # Accessor contract
//!
//! Hard accessors (`get`, `set`) reject wrong arity with `DimensionMismatch`
//! and out-of-extent indices with `IndexOutOfRange`. Safe accessors
//! (`get_safe`, `set_safe`) treat everything outside the extent as a
//! permanent zero: reads return zero, zero writes are ignored, nonzero writes
//! fail with `OutOfExtentWrite`.

mod kind;
mod matrix;
mod tensor;
mod vector;

pub use kind::{ContainerKind, MatrixKind, TensorKind, VectorKind};

use std::marker::PhantomData;

use crate::config::{StorageConfig, StorageKind};
use crate::element::{Components, Element, Persist};
use crate::error::{Result, StoreError};
use crate::index::{Dims, IndexIter, Shape};
use crate::parallel;
use crate::storage::{MemoryStore, Storage, StorageBackend};

/// Vector container.
pub type VectorMember<T> = NdContainer<T, VectorKind>;

/// Matrix container.
pub type MatrixMember<T> = NdContainer<T, MatrixKind>;

/// Tensor container.
pub type TensorMember<T> = NdContainer<T, TensorKind>;

/// Read access to a container's shape.
pub trait Shaped {
    /// Number of dimensions.
    fn rank(&self) -> usize;

    /// Extents.
    fn dims(&self) -> &[u64];

    /// Product of extents (1 for rank 0).
    fn element_count(&self) -> u64;

    /// Extent of dimension `k`; dimensions past the rank have extent 1.
    fn dimension(&self, k: usize) -> u64 {
        self.dims().get(k).copied().unwrap_or(1)
    }
}

/// Element access by logical index.
pub trait Indexed<T>: Shaped {
    /// Read the element at `index` into `out`.
    fn get_into(&self, index: &[u64], out: &mut T) -> Result<()>;

    /// Write the element at `index`.
    fn set(&mut self, index: &[u64], value: &T) -> Result<()>;

    /// Read with implicit zero outside the extent.
    fn get_safe(&self, index: &[i64]) -> Result<T>;

    /// Write with implicit zero outside the extent.
    fn set_safe(&mut self, index: &[i64], value: &T) -> Result<()>;
}

/// An N-dimensional container owning its shape and storage.
#[derive(Debug)]
pub struct NdContainer<T, K> {
    shape: Shape,
    storage: Storage<T>,
    config: StorageConfig,
    _kind: PhantomData<K>,
}

impl<T: Element, K: ContainerKind> Default for NdContainer<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element, K: ContainerKind> NdContainer<T, K> {
    /// Create an unallocated in-memory container.
    ///
    /// Vectors and matrices start with zero elements; tensors start as rank 0
    /// with one zero slot.
    pub fn new() -> Self {
        let config = StorageConfig::default();
        let dims = K::empty_dims();
        let shape = match Shape::new(&dims) {
            Ok(shape) => shape,
            Err(_) => Shape::scalar(),
        };
        let storage = if K::slot_count(&shape) == 0 {
            MemoryStore::empty(T::zero(), config.segment_capacity)
        } else {
            MemoryStore::single(T::zero(), T::zero(), config.segment_capacity)
        };
        Self {
            shape,
            storage: Storage::Memory(storage),
            config,
            _kind: PhantomData,
        }
    }

    /// Create a zero-filled in-memory container with the given dims.
    ///
    /// # Errors
    ///
    /// - `StoreError::DimensionMismatch` if the rank does not suit the kind
    /// - `StoreError::AllocationError` if the shape is too large
    pub fn with_dims(dims: &[u64]) -> Result<Self> {
        let config = StorageConfig::default();
        let shape = Self::checked_shape(dims)?;
        let storage = Storage::memory(K::slot_count(&shape), T::zero(), config.segment_capacity)?;
        Ok(Self::from_parts(shape, storage, config))
    }

    /// Create a zero-filled container on the backend named by `config`.
    ///
    /// # Errors
    ///
    /// - `StoreError::DimensionMismatch` if the rank does not suit the kind
    /// - `StoreError::AllocationError` if the shape is too large for the backend
    /// - `StoreError::Io` if a backing file cannot be created
    pub fn with_config(dims: &[u64], config: StorageConfig) -> Result<Self>
    where
        T: Persist,
    {
        let shape = Self::checked_shape(dims)?;
        let storage = Storage::allocate(&config, K::slot_count(&shape), T::zero())?;
        Ok(Self::from_parts(shape, storage, config))
    }

    /// Wrap existing storage.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ShapeMismatch` if the storage size differs from the
    /// slot count of `dims`.
    pub fn with_storage(dims: &[u64], storage: Storage<T>, config: StorageConfig) -> Result<Self> {
        let shape = Self::checked_shape(dims)?;
        let expected = K::slot_count(&shape);
        if storage.size() != expected {
            return Err(StoreError::ShapeMismatch {
                expected,
                actual: storage.size(),
            });
        }
        Ok(Self::from_parts(shape, storage, config))
    }

    /// Create an in-memory container from values in linear order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ShapeMismatch` if `values.len()` differs from the
    /// slot count of `dims`.
    pub fn from_linear(dims: &[u64], values: Vec<T>) -> Result<Self> {
        let config = StorageConfig::default();
        let shape = Self::checked_shape(dims)?;
        let expected = K::slot_count(&shape);
        if values.len() as u64 != expected {
            return Err(StoreError::ShapeMismatch {
                expected,
                actual: values.len() as u64,
            });
        }
        let storage = MemoryStore::from_vec(values, T::zero(), config.segment_capacity)?;
        Ok(Self::from_parts(shape, Storage::Memory(storage), config))
    }

    /// Create a container on the backend named by `config` from values in
    /// linear order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ShapeMismatch` on a length mismatch, or any
    /// allocation error.
    pub fn from_linear_with_config(
        dims: &[u64],
        values: &[T],
        config: StorageConfig,
    ) -> Result<Self>
    where
        T: Persist,
    {
        let mut container = Self::with_config(dims, config)?;
        container.fill_from_linear(values)?;
        Ok(container)
    }

    /// Create an in-memory container from primitive values in linear order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndstore::TensorMember;
    ///
    /// let t: TensorMember<f64> =
    ///     TensorMember::from_primitives(&[2, 2], &[1i32, 2, 3, 4]).unwrap();
    /// assert_eq!(t.get(&[1, 1]).unwrap(), 4.0);
    /// assert!(TensorMember::<f64>::from_primitives(&[2, 2], &[1i32, 2, 3]).is_err());
    /// ```
    pub fn from_primitives<P: Copy>(dims: &[u64], values: &[P]) -> Result<Self>
    where
        T: From<P>,
    {
        Self::from_linear(dims, values.iter().map(|&p| T::from(p)).collect())
    }

    fn checked_shape(dims: &[u64]) -> Result<Shape> {
        K::check_rank(dims.len())?;
        Shape::new(dims)
    }

    fn from_parts(shape: Shape, storage: Storage<T>, config: StorageConfig) -> Self {
        Self {
            shape,
            storage,
            config,
            _kind: PhantomData,
        }
    }

    /// The shape.
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Extents.
    #[inline]
    pub fn dims(&self) -> &[u64] {
        self.shape.dims()
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Product of extents (1 for rank 0).
    #[inline]
    pub fn element_count(&self) -> u64 {
        self.shape.element_count()
    }

    /// Number of storage slots.
    #[inline]
    pub fn storage_size(&self) -> u64 {
        self.storage.size()
    }

    /// The storage.
    #[inline]
    pub fn storage(&self) -> &Storage<T> {
        &self.storage
    }

    /// Backend kind of the storage.
    #[inline]
    pub fn storage_kind(&self) -> StorageKind {
        self.storage.kind()
    }

    /// Configuration used for allocation and bulk routines.
    #[inline]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Establish `dims`, reallocating only if the slot count changes.
    ///
    /// Returns `true` if new storage was allocated. Reused storage keeps its
    /// values; see [`Self::init`].
    ///
    /// # Errors
    ///
    /// - `StoreError::DimensionMismatch` if the rank does not suit the kind
    /// - `StoreError::AllocationError` if the shape is too large
    pub fn alloc(&mut self, dims: &[u64]) -> Result<bool> {
        let shape = Self::checked_shape(dims)?;
        let slots = K::slot_count(&shape);
        let reallocate = slots != self.storage.size();
        if reallocate {
            log::debug!(
                "{}: reallocating {} -> {} slots for dims {:?}",
                K::NAME,
                self.storage.size(),
                slots,
                dims
            );
            self.storage = self.storage.allocate_like(slots)?;
        }
        self.shape = shape;
        Ok(reallocate)
    }

    /// Establish `dims` with every position reading zero.
    pub fn init(&mut self, dims: &[u64]) -> Result<()> {
        if !self.alloc(dims)? {
            self.storage.zero_fill()?;
        }
        Ok(())
    }

    /// Set every slot to zero.
    pub fn zero_fill(&mut self) -> Result<()> {
        self.storage.zero_fill()
    }

    /// Bounds-checked linear offset of `index`.
    #[inline]
    pub fn offset(&self, index: &[u64]) -> Result<u64> {
        self.shape.offset(index)
    }

    /// Read the element at `index` into `out`.
    ///
    /// # Errors
    ///
    /// - `StoreError::DimensionMismatch` if `index.len() != rank`
    /// - `StoreError::IndexOutOfRange` if any entry is past its extent
    pub fn get_into(&self, index: &[u64], out: &mut T) -> Result<()> {
        let offset = self.shape.offset(index)?;
        self.storage.get_into(offset, out)
    }

    /// Read the element at `index`.
    pub fn get(&self, index: &[u64]) -> Result<T> {
        let offset = self.shape.offset(index)?;
        self.storage.get(offset)
    }

    /// Write the element at `index`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_into`].
    pub fn set(&mut self, index: &[u64], value: &T) -> Result<()> {
        let offset = self.shape.offset(index)?;
        self.storage.set(offset, value)
    }

    /// Read a storage slot by linear offset.
    pub fn get_linear(&self, offset: u64) -> Result<T> {
        self.storage.get(offset)
    }

    /// Write a storage slot by linear offset.
    pub fn set_linear(&mut self, offset: u64, value: &T) -> Result<()> {
        self.storage.set(offset, value)
    }

    /// Read with implicit zero outside the extent.
    ///
    /// Indices longer than the rank address dimensions of extent 1.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DimensionMismatch` if `index` is shorter than the rank.
    pub fn get_safe(&self, index: &[i64]) -> Result<T> {
        match self.safe_index(index, 0, 1)? {
            Some(offset) => self.storage.get(offset),
            None => Ok(self.storage.zero().allocate()),
        }
    }

    /// Write with implicit zero outside the extent.
    ///
    /// # Errors
    ///
    /// - `StoreError::DimensionMismatch` if `index` is shorter than the rank
    /// - `StoreError::OutOfExtentWrite` for a nonzero value outside the extent
    pub fn set_safe(&mut self, index: &[i64], value: &T) -> Result<()> {
        match self.safe_index(index, 0, 1)? {
            Some(offset) => self.storage.set(offset, value),
            None if value.is_zero() => Ok(()),
            None => Err(StoreError::OutOfExtentWrite {
                index: index.to_vec(),
            }),
        }
    }

    /// Read one component with implicit zero outside the extent.
    ///
    /// A component slot outside `0..T::COUNT` is outside the extent too.
    pub fn get_component_safe(&self, index: &[i64], component: i64) -> Result<T::Component>
    where
        T: Components,
    {
        match self.safe_index(index, component, T::COUNT)? {
            Some(offset) => Ok(self.storage.get(offset)?.component(component as usize)),
            None => Ok(T::Component::zero()),
        }
    }

    /// Write one component with implicit zero outside the extent.
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_safe`].
    pub fn set_component_safe(
        &mut self,
        index: &[i64],
        component: i64,
        value: &T::Component,
    ) -> Result<()>
    where
        T: Components,
    {
        match self.safe_index(index, component, T::COUNT)? {
            Some(offset) => {
                let mut element = self.storage.get(offset)?;
                element.set_component(component as usize, value.clone());
                self.storage.set(offset, &element)
            }
            None if value.is_zero() => Ok(()),
            None => Err(StoreError::OutOfExtentWrite {
                index: index.to_vec(),
            }),
        }
    }

    /// Offset of an in-bounds safe index, `None` if out of bounds.
    fn safe_index(
        &self,
        index: &[i64],
        component: i64,
        component_count: usize,
    ) -> Result<Option<u64>> {
        if index.len() < self.rank() {
            return Err(StoreError::DimensionMismatch {
                expected: self.rank(),
                actual: index.len(),
            });
        }
        if self.shape.is_out_of_bounds(index, component, component_count) {
            return Ok(None);
        }
        let offset = index
            .iter()
            .zip(self.shape.multipliers())
            .map(|(&i, &m)| i as u64 * m)
            .sum();
        Ok(Some(offset))
    }

    /// Change the shape in place.
    ///
    /// Values at indices present in both shapes are kept, new positions read
    /// zero, and the rest are dropped. Dimensions beyond the shorter rank are
    /// treated as extent 1 at index 0. Equal dims are a no-op.
    ///
    /// # Errors
    ///
    /// - `StoreError::DimensionMismatch` if the rank does not suit the kind
    /// - `StoreError::AllocationError` if the shape is too large
    pub fn reshape(&mut self, dims: &[u64]) -> Result<()> {
        if dims == self.dims() {
            return Ok(());
        }
        let shape = Self::checked_shape(dims)?;
        let storage = self.remapped_storage(&shape)?;
        self.shape = shape;
        self.storage = storage;
        Ok(())
    }

    /// Reshaped copy; `self` is unchanged.
    pub fn reshaped(&self, dims: &[u64]) -> Result<Self> {
        let shape = Self::checked_shape(dims)?;
        let storage = if dims == self.dims() {
            self.storage.duplicate()?
        } else {
            self.remapped_storage(&shape)?
        };
        Ok(Self::from_parts(shape, storage, self.config.clone()))
    }

    fn remapped_storage(&self, shape: &Shape) -> Result<Storage<T>> {
        let mut storage = self.storage.allocate_like(K::slot_count(shape))?;
        let mut scratch = self.storage.zero().allocate();
        let old = &self.shape;

        for (new_offset, new_index) in shape.iter().enumerate() {
            if let Some(old_offset) = overlap_offset(old, &new_index) {
                self.storage.get_into(old_offset, &mut scratch)?;
                storage.set(new_offset as u64, &scratch)?;
            }
        }
        Ok(storage)
    }

    /// Independent copy with the same shape, values and backend.
    pub fn duplicate(&self) -> Result<Self> {
        Ok(Self::from_parts(
            self.shape.clone(),
            self.storage.duplicate()?,
            self.config.clone(),
        ))
    }

    /// Replace shape and contents with a copy of `other`.
    pub fn assign_from(&mut self, other: &Self) -> Result<()> {
        self.storage = other.storage.duplicate()?;
        self.shape = other.shape.clone();
        self.config = other.config.clone();
        Ok(())
    }

    /// Overwrite all slots from values in linear order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ShapeMismatch` if `values.len()` differs from the
    /// slot count.
    pub fn fill_from_linear(&mut self, values: &[T]) -> Result<()> {
        if values.len() as u64 != self.storage.size() {
            return Err(StoreError::ShapeMismatch {
                expected: self.storage.size(),
                actual: values.len() as u64,
            });
        }
        for (i, value) in values.iter().enumerate() {
            self.storage.set(i as u64, value)?;
        }
        Ok(())
    }

    /// All slots in linear order.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        (0..self.storage.size()).map(|i| self.storage.get(i)).collect()
    }

    /// Iterate every valid index in linear order.
    pub fn iter_indices(&self) -> IndexIter {
        self.shape.iter()
    }

    /// Apply `f` to every element, writing into `dst` of the same dims.
    ///
    /// Runs on the worker count allowed by this container's thread policy, or
    /// on the calling thread when either store is file-backed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ShapeMismatch` if the slot counts differ.
    pub fn map_into<U, K2, F>(&self, dst: &mut NdContainer<U, K2>, f: F) -> Result<()>
    where
        U: Element,
        K2: ContainerKind,
        F: Fn(&T, &mut U) + Sync,
    {
        parallel::map_into(&self.storage, &mut dst.storage, self.config.threads, f)
    }

    /// Visit the slots in contiguous chunks, each with its starting offset.
    ///
    /// Chunks may be visited concurrently and in any order.
    ///
    /// # Errors
    ///
    /// Returns the first error from the storage or from `f`.
    pub fn for_each_chunk<F>(&self, f: F) -> Result<()>
    where
        F: Fn(u64, &[T]) -> Result<()> + Sync,
    {
        parallel::for_each_chunk(&self.storage, self.config.threads, f)
    }

    /// True if every slot is zero.
    pub fn is_zero(&self) -> Result<bool> {
        parallel::fold(
            &self.storage,
            self.config.threads,
            || true,
            |acc, x| acc && x.is_zero(),
            |a, b| a && b,
        )
    }
}

/// Offset in `old` of the position `new_index` overlaps, if any.
fn overlap_offset(old: &Shape, new_index: &[u64]) -> Option<u64> {
    if new_index.iter().skip(old.rank()).any(|&i| i != 0) {
        return None;
    }
    let mut old_index = Dims::with_capacity(old.rank());
    for (k, &dim) in old.dims().iter().enumerate() {
        let i = new_index.get(k).copied().unwrap_or(0);
        if i >= dim {
            return None;
        }
        old_index.push(i);
    }
    Some(
        old_index
            .iter()
            .zip(old.multipliers())
            .map(|(&i, &m)| i * m)
            .sum(),
    )
}

impl<T: Element, K: ContainerKind> Shaped for NdContainer<T, K> {
    fn rank(&self) -> usize {
        self.shape.rank()
    }

    fn dims(&self) -> &[u64] {
        self.shape.dims()
    }

    fn element_count(&self) -> u64 {
        self.shape.element_count()
    }
}

impl<T: Element, K: ContainerKind> Indexed<T> for NdContainer<T, K> {
    fn get_into(&self, index: &[u64], out: &mut T) -> Result<()> {
        NdContainer::get_into(self, index, out)
    }

    fn set(&mut self, index: &[u64], value: &T) -> Result<()> {
        NdContainer::set(self, index, value)
    }

    fn get_safe(&self, index: &[i64]) -> Result<T> {
        NdContainer::get_safe(self, index)
    }

    fn set_safe(&mut self, index: &[i64], value: &T) -> Result<()> {
        NdContainer::set_safe(self, index, value)
    }
}
