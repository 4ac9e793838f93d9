//! The flat buffers that back an [`Array`].
//!
//! A buffer is either owned ([`Vec<T>`], [`Box<[T]>`], or `[T; N]` when the
//! number of elements is a compile-time constant), or borrowed as a window
//! over someone else's elements (`&[T]` for read-only access, `&mut [T]` for
//! read-write access). All of them offer the same contract, so an `Array`,
//! and every view of it, works the same way whichever kind it sits on.
//!
//! [`Array`]: super::Array

use super::{IndexError};

/// Implemented by contiguous buffers of `T`s.
pub trait Storage<T> {
    /// All the elements, in offset order.
    fn as_slice(&self) -> &[T];

    /// The number of elements.
    fn size(&self) -> usize { self.as_slice().len() }

    /// Borrow the element at `offset`.
    fn get(&self, offset: usize) -> Result<&T, IndexError> {
        let items = self.as_slice();
        items.get(offset).ok_or(IndexError::SelectionOutOfBounds {index: offset, len: items.len()})
    }
}

/// Implemented by [`Storage`]s whose elements can be overwritten.
pub trait StorageMut<T>: Storage<T> {
    /// All the elements, in offset order.
    fn as_mut_slice(&mut self) -> &mut [T];

    /// Mutably borrow the element at `offset`.
    fn get_mut(&mut self, offset: usize) -> Result<&mut T, IndexError> {
        let items = self.as_mut_slice();
        let len = items.len();
        items.get_mut(offset).ok_or(IndexError::SelectionOutOfBounds {index: offset, len})
    }

    /// Overwrite the element at `offset`.
    fn set(&mut self, offset: usize, value: T) -> Result<(), IndexError> {
        *self.get_mut(offset)? = value;
        Ok(())
    }
}

// ----------------------------------------------------------------------------

impl<T> Storage<T> for Vec<T> {
    #[inline(always)]
    fn as_slice(&self) -> &[T] { self }
}

impl<T> StorageMut<T> for Vec<T> {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [T] { self }
}

impl<T> Storage<T> for Box<[T]> {
    #[inline(always)]
    fn as_slice(&self) -> &[T] { self }
}

impl<T> StorageMut<T> for Box<[T]> {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [T] { self }
}

impl<T, const N: usize> Storage<T> for [T; N] {
    #[inline(always)]
    fn as_slice(&self) -> &[T] { self }
    #[inline(always)]
    fn size(&self) -> usize { N }
}

impl<T, const N: usize> StorageMut<T> for [T; N] {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [T] { self }
}

// ----------------------------------------------------------------------------

impl<'a, T> Storage<T> for &'a [T] {
    #[inline(always)]
    fn as_slice(&self) -> &[T] { self }
}

impl<'a, T> Storage<T> for &'a mut [T] {
    #[inline(always)]
    fn as_slice(&self) -> &[T] { self }
}

impl<'a, T> StorageMut<T> for &'a mut [T] {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [T] { self }
}

// ----------------------------------------------------------------------------
