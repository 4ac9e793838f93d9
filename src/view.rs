use std::fmt;

use super::{Shape, IndexError, Selection, Storage, StorageMut, Array, Element, Resolved};

/// Implemented by types that behave like an n-dimensional array of
/// `Self::T`s, read in row-major order.
///
/// Both [`Array`] and the views obtained by indexing one implement `View`,
/// so code that reads elements need not care whether they have been copied.
///
/// ```
/// use ndview::{Array, View};
/// let a = Array::new([2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
/// let column = a.index(", 1").unwrap();
/// assert_eq!(column.shape().dims(), [2]);
/// assert_eq!(column.to_vec(), [2, 5]);
/// assert_eq!(*column.get(1).unwrap(), 5);
/// assert!(column.get(2).is_err());
/// ```
pub trait View: Sized {
    /// The element type.
    type T;

    /// The shape of the array.
    fn shape(&self) -> &Shape;

    /// The number of elements.
    fn len(&self) -> usize;

    /// Returns `true` if there are no elements.
    fn is_empty(&self) -> bool { self.len() == 0 }

    /// Borrow the `i`th element in row-major order.
    fn get(&self, i: usize) -> Result<&Self::T, IndexError>;

    /// The elements, in row-major order.
    fn iter(&self) -> Iter<'_, Self> { Iter {view: self, next: 0} }

    /// Copies the elements into a `Vec`.
    fn to_vec(&self) -> Vec<Self::T> where Self::T: Clone {
        self.iter().cloned().collect()
    }

    /// Copies `self` into a new [`Array`] that owns its elements.
    fn to_array(&self) -> Array<Self::T> where Self::T: Clone {
        Array::from_parts(self.shape().clone(), self.to_vec())
    }

    /// Returns `true` if `self` and `other` have the same shape and the same
    /// elements.
    fn array_eq<V: View<T=Self::T>>(&self, other: &V) -> bool where Self::T: PartialEq {
        self.shape() == other.shape() && self.len() == other.len() && self.iter().eq(other.iter())
    }
}

/// Implemented by [`View`]s whose elements can be overwritten.
///
/// Writing through a view writes the parent array; nothing is copied.
///
/// ```
/// use ndview::{Array, View, ViewMut};
/// let mut a = Array::new([2, 2], vec![1, 2, 3, 4]).unwrap();
/// a.index_mut("1").unwrap().fill(0).unwrap();
/// assert_eq!(a.as_slice(), [1, 2, 0, 0]);
/// ```
pub trait ViewMut: View {
    /// Mutably borrow the `i`th element in row-major order.
    fn get_mut(&mut self, i: usize) -> Result<&mut Self::T, IndexError>;

    /// Overwrite the `i`th element.
    fn set(&mut self, i: usize, value: Self::T) -> Result<(), IndexError> {
        *self.get_mut(i)? = value;
        Ok(())
    }

    /// Overwrite every element with `value`.
    fn fill(&mut self, value: Self::T) -> Result<(), IndexError> where Self::T: Clone {
        for i in 0..self.len() { self.set(i, value.clone())?; }
        Ok(())
    }
}

// ----------------------------------------------------------------------------

/// An iterator over the elements of a [`View`].
#[derive(Debug)]
pub struct Iter<'a, V: View> {
    view: &'a V,
    next: usize,
}

impl<'a, V: View> Iterator for Iter<'a, V> {
    type Item = &'a V::T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.view.get(self.next).ok()?;
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.view.len().saturating_sub(self.next);
        (rest, Some(rest))
    }
}

impl<'a, V: View> ExactSizeIterator for Iter<'a, V> {}

// ----------------------------------------------------------------------------

fn selection_out_of_bounds(selection: &Selection, index: usize) -> IndexError {
    IndexError::SelectionOutOfBounds {index, len: selection.len()}
}

/// A read-only window onto some elements of an [`Array`].
///
/// The elements are not copied: each access is mapped through the
/// [`Selection`] to an offset of the parent's storage.
#[derive(Debug)]
pub struct ArrayView<'a, T, S = Vec<T>> {
    parent: &'a Array<T, S>,
    selection: Selection,
    shape: Shape,
}

impl<'a, T, S> ArrayView<'a, T, S> {
    pub(crate) fn new(parent: &'a Array<T, S>, resolved: Resolved) -> Self {
        Self {parent, selection: resolved.selection, shape: resolved.shape}
    }

    /// The offsets of the parent that this view reads.
    pub fn selection(&self) -> &Selection { &self.selection }

    /// The array that this view reads.
    pub fn parent(&self) -> &'a Array<T, S> { self.parent }
}

impl<'a, T: Element, S: Storage<T>> ArrayView<'a, T, S> {
    /// Indexes the parent array with `expr`.
    ///
    /// The constraint that produced `self` is not applied again: `expr` is
    /// resolved against the whole parent.
    ///
    /// ```
    /// use ndview::{Array, View};
    /// let a = Array::new([2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
    /// let row = a.index("0").unwrap();
    /// assert_eq!(row.index("1").unwrap().to_vec(), [4, 5, 6]);
    /// ```
    pub fn index(&self, expr: &str) -> Result<ArrayView<'a, T, S>, IndexError> {
        self.parent.index(expr)
    }
}

impl<'a, T, S> Clone for ArrayView<'a, T, S> {
    fn clone(&self) -> Self {
        Self {parent: self.parent, selection: self.selection.clone(), shape: self.shape.clone()}
    }
}

impl<'a, T, S: Storage<T>> View for ArrayView<'a, T, S> {
    type T = T;
    #[inline(always)]
    fn shape(&self) -> &Shape { &self.shape }
    #[inline(always)]
    fn len(&self) -> usize { self.selection.len() }
    fn get(&self, i: usize) -> Result<&T, IndexError> {
        let offset = self.selection.nth(i).ok_or_else(|| selection_out_of_bounds(&self.selection, i))?;
        self.parent.storage().get(offset)
    }
}

// ----------------------------------------------------------------------------

/// A read-write window onto some elements of an [`Array`].
#[derive(Debug)]
pub struct ArrayViewMut<'a, T, S = Vec<T>> {
    parent: &'a mut Array<T, S>,
    selection: Selection,
    shape: Shape,
}

impl<'a, T, S> ArrayViewMut<'a, T, S> {
    pub(crate) fn new(parent: &'a mut Array<T, S>, resolved: Resolved) -> Self {
        Self {parent, selection: resolved.selection, shape: resolved.shape}
    }

    /// The offsets of the parent that this view reads and writes.
    pub fn selection(&self) -> &Selection { &self.selection }
}

impl<'a, T: Element, S: StorageMut<T>> ArrayViewMut<'a, T, S> {
    /// Indexes the parent array with `expr`, for reading.
    ///
    /// As for [`ArrayView::index()`], `expr` is resolved against the whole
    /// parent.
    pub fn index(&self, expr: &str) -> Result<ArrayView<'_, T, S>, IndexError> {
        self.parent.index(expr)
    }

    /// Indexes the parent array with `expr`, for writing.
    pub fn index_mut(&mut self, expr: &str) -> Result<ArrayViewMut<'_, T, S>, IndexError> {
        self.parent.index_mut(expr)
    }
}

impl<'a, T, S: Storage<T>> View for ArrayViewMut<'a, T, S> {
    type T = T;
    #[inline(always)]
    fn shape(&self) -> &Shape { &self.shape }
    #[inline(always)]
    fn len(&self) -> usize { self.selection.len() }
    fn get(&self, i: usize) -> Result<&T, IndexError> {
        let offset = self.selection.nth(i).ok_or_else(|| selection_out_of_bounds(&self.selection, i))?;
        self.parent.storage().get(offset)
    }
}

impl<'a, T, S: StorageMut<T>> ViewMut for ArrayViewMut<'a, T, S> {
    fn get_mut(&mut self, i: usize) -> Result<&mut T, IndexError> {
        let offset = self.selection.nth(i).ok_or_else(|| selection_out_of_bounds(&self.selection, i))?;
        self.parent.storage_mut().get_mut(offset)
    }
}

// ----------------------------------------------------------------------------

/// Writes `view` as nested bracketed rows: `[[1 2]\n [3 4]]`.
pub(crate) fn write_view<V: View>(view: &V, f: &mut fmt::Formatter<'_>) -> fmt::Result where
    V::T: fmt::Display,
{
    let dims = if view.is_empty() { &[][..] } else { view.shape().dims() };
    write_nested(f, dims, &mut view.iter())
}

fn write_nested<'t, T: 't + fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    dims: &[usize],
    items: &mut impl Iterator<Item=&'t T>,
) -> fmt::Result {
    f.write_str("[")?;
    match dims {
        [] => {},
        [extent] => {
            for i in 0..*extent {
                if i > 0 { f.write_str(" ")?; }
                if let Some(item) = items.next() { write!(f, "{}", item)?; }
            }
        },
        [extent, rest @ ..] => {
            for i in 0..*extent {
                if i > 0 { f.write_str("\n ")?; }
                write_nested(f, rest, items)?;
            }
        },
    }
    f.write_str("]")
}

impl<'a, T: fmt::Display, S: Storage<T>> fmt::Display for ArrayView<'a, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write_view(self, f) }
}

impl<'a, T: fmt::Display, S: Storage<T>> fmt::Display for ArrayViewMut<'a, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write_view(self, f) }
}

// ----------------------------------------------------------------------------
