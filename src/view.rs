//! Unmanaged views over caller memory

use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use smallvec::SmallVec;
use std::fmt;

/// Shape storage; reductions rarely target more than four dimensions
pub type Shape = SmallVec<[usize; 4]>;

/// Non-owning, typed, multi-dimensional handle over caller memory
///
/// The view never allocates or frees: it borrows the caller's buffer for
/// `'a` and writes results straight into it. Elements are laid out
/// contiguously in row-major order.
pub struct UnmanagedView<'a, T: Element> {
    data: &'a mut [T],
    shape: Shape,
}

impl<'a, T: Element> UnmanagedView<'a, T> {
    /// Rank-0 view over a single value
    pub fn scalar(value: &'a mut T) -> Self {
        Self {
            data: std::slice::from_mut(value),
            shape: Shape::new(),
        }
    }

    /// Rank-1 view over a slice
    pub fn from_slice(data: &'a mut [T]) -> Self {
        let shape = smallvec::smallvec![data.len()];
        Self { data, shape }
    }

    /// View `data` with an explicit shape
    ///
    /// The shape's element count must match the slice length; an empty shape
    /// describes a single element.
    pub fn with_shape(data: &'a mut [T], shape: &[usize]) -> Result<Self> {
        let numel: usize = shape.iter().product();
        if numel != data.len() {
            return Err(Error::shape_mismatch(shape, &[data.len()]));
        }
        Ok(Self {
            data,
            shape: Shape::from_slice(shape),
        })
    }

    /// Number of dimensions
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Extent of each dimension
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the view covers no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element type
    #[inline]
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Borrow the elements
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &*self.data
    }

    /// Mutably borrow the elements
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut *self.data
    }

    /// Elements reinterpreted as raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&*self.data)
    }

    /// Shorter-lived view over the same memory
    pub fn reborrow(&mut self) -> UnmanagedView<'_, T> {
        UnmanagedView {
            data: &mut *self.data,
            shape: self.shape.clone(),
        }
    }

    /// Overwrite every element with `values`
    pub fn copy_from(&mut self, values: &[T]) -> Result<()> {
        if values.len() != self.data.len() {
            return Err(Error::value_count_mismatch(self.data.len(), values.len()));
        }
        self.as_mut_slice().copy_from_slice(values);
        Ok(())
    }
}

impl<T: Element> fmt::Debug for UnmanagedView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnmanagedView")
            .field("dtype", &T::DTYPE)
            .field("shape", &self.shape.as_slice())
            .field("data", &self.data)
            .finish()
    }
}
