//! Vector-specific operations.

use crate::element::Element;
use crate::error::Result;

use super::{NdContainer, VectorKind};

impl<T: Element> NdContainer<T, VectorKind> {
    /// Zero-filled in-memory vector.
    pub fn zeros(length: u64) -> Result<Self> {
        Self::with_dims(&[length])
    }

    /// In-memory vector from primitive values.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndstore::VectorMember;
    ///
    /// let mut v: VectorMember<f64> = VectorMember::from_values(&[1.0f64, 2.0, 3.0]).unwrap();
    /// assert_eq!(v.length(), 3);
    /// assert_eq!(v.get_at(1).unwrap(), 2.0);
    ///
    /// v.resize(5).unwrap();
    /// assert_eq!(v.to_vec().unwrap(), vec![1.0, 2.0, 3.0, 0.0, 0.0]);
    /// ```
    pub fn from_values<P: Copy>(values: &[P]) -> Result<Self>
    where
        T: From<P>,
    {
        Self::from_primitives(&[values.len() as u64], values)
    }

    /// Number of elements.
    #[inline]
    pub fn length(&self) -> u64 {
        self.dims()[0]
    }

    /// Element at `i`.
    pub fn get_at(&self, i: u64) -> Result<T> {
        self.get(&[i])
    }

    /// Write element `i`.
    pub fn set_at(&mut self, i: u64, value: &T) -> Result<()> {
        self.set(&[i], value)
    }

    /// Element at `i`, zero outside `0..length`.
    pub fn get_at_safe(&self, i: i64) -> Result<T> {
        self.get_safe(&[i])
    }

    /// Write element `i`; zero writes outside `0..length` are ignored.
    pub fn set_at_safe(&mut self, i: i64, value: &T) -> Result<()> {
        self.set_safe(&[i], value)
    }

    /// Change the length, keeping the leading elements.
    pub fn resize(&mut self, length: u64) -> Result<()> {
        self.reshape(&[length])
    }
}
