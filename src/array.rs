use std::fmt;
use std::marker::{PhantomData};

use super::{Shape, IndexError, Storage, StorageMut, View, ViewMut, ArrayView, ArrayViewMut};
use super::{Element, Resolver, ResolveOptions};
use super::view::{write_view};

/// A dense array of `T`s of any rank, stored in row-major order in an `S`.
///
/// `S` is usually a `Vec<T>`, but can be any [`Storage`]: a fixed-size
/// `[T; N]`, or a slice borrowed from elsewhere.
///
/// ```
/// use ndview::{Array, View};
/// let a = Array::new([2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
/// assert_eq!(a.at(0).unwrap().to_vec(), [1, 2, 3]);
/// assert_eq!(a.index("0:1,").unwrap().to_string(), "[[1 2 3]]");
/// assert_eq!(a.index("array <= 2").unwrap().to_vec(), [1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Array<T, S = Vec<T>> {
    shape: Shape,
    items: S,
    marker: PhantomData<T>,
}

impl<T, S: Storage<T>> Array<T, S> {
    /// Constructs an `Array` of shape `shape` given its elements.
    ///
    /// The number of elements must be the product of the extents, or zero if
    /// `shape` has no axes.
    ///
    /// ```
    /// use ndview::{Array, IndexError};
    /// let fixed = Array::new([2, 2], [1.0, 0.0, 0.0, 1.0]).unwrap();
    /// assert_eq!(fixed.as_slice()[3], 1.0);
    /// assert!(matches!(Array::new([2, 2], vec![1, 2, 3]), Err(IndexError::ShapeMismatch {len: 3, ..})));
    /// ```
    pub fn new(shape: impl Into<Shape>, items: S) -> Result<Self, IndexError> {
        let shape = shape.into();
        let expected = if shape.is_empty() { 0 } else { shape.size() };
        if items.size() != expected {
            return Err(IndexError::ShapeMismatch {shape, len: items.size()});
        }
        Ok(Self {shape, items, marker: PhantomData})
    }

    /// All the elements, in row-major order.
    pub fn as_slice(&self) -> &[T] { self.items.as_slice() }

    pub(crate) fn storage(&self) -> &S { &self.items }

    /// Returns the storage, discarding the shape.
    pub fn into_raw(self) -> S { self.items }

    /// Returns an `Array` with the same elements and a new shape.
    ///
    /// ```
    /// use ndview::{Array, View};
    /// let a = Array::from_vec((0..6).collect()).reshape([3, 2]).unwrap();
    /// assert_eq!(a.index("1").unwrap().to_vec(), [2, 3]);
    /// ```
    pub fn reshape(self, shape: impl Into<Shape>) -> Result<Self, IndexError> {
        Self::new(shape, self.items)
    }

    /// A view of the `index`th position along the first axis.
    ///
    /// Negative values count from the end.
    pub fn at(&self, index: isize) -> Result<ArrayView<'_, T, S>, IndexError> {
        let resolved = Resolver::new(&self.shape, &ResolveOptions::default()).resolve_at(index)?;
        Ok(ArrayView::new(self, resolved))
    }

    /// A view of the elements picked out by the index expression `expr`.
    ///
    /// See [`expr`](super::expr) for the syntax.
    pub fn index(&self, expr: &str) -> Result<ArrayView<'_, T, S>, IndexError> where T: Element {
        self.index_with(expr, &ResolveOptions::default())
    }

    /// Like [`Array::index()`], with explicit options.
    pub fn index_with(
        &self,
        expr: &str,
        options: &ResolveOptions,
    ) -> Result<ArrayView<'_, T, S>, IndexError> where T: Element {
        let resolved = Resolver::new(&self.shape, options).resolve(expr, self.as_slice())?;
        Ok(ArrayView::new(self, resolved))
    }
}

impl<T, S: StorageMut<T>> Array<T, S> {
    /// All the elements, in row-major order.
    pub fn as_mut_slice(&mut self) -> &mut [T] { self.items.as_mut_slice() }

    pub(crate) fn storage_mut(&mut self) -> &mut S { &mut self.items }

    /// Like [`Array::at()`], but writable.
    pub fn at_mut(&mut self, index: isize) -> Result<ArrayViewMut<'_, T, S>, IndexError> {
        let resolved = Resolver::new(&self.shape, &ResolveOptions::default()).resolve_at(index)?;
        Ok(ArrayViewMut::new(self, resolved))
    }

    /// Like [`Array::index()`], but writable.
    pub fn index_mut(&mut self, expr: &str) -> Result<ArrayViewMut<'_, T, S>, IndexError> where T: Element {
        self.index_mut_with(expr, &ResolveOptions::default())
    }

    /// Like [`Array::index_mut()`], with explicit options.
    pub fn index_mut_with(
        &mut self,
        expr: &str,
        options: &ResolveOptions,
    ) -> Result<ArrayViewMut<'_, T, S>, IndexError> where T: Element {
        let resolved = Resolver::new(&self.shape, options).resolve(expr, self.as_slice())?;
        Ok(ArrayViewMut::new(self, resolved))
    }
}

impl<T> Array<T> {
    pub(crate) fn from_parts(shape: Shape, items: Vec<T>) -> Self {
        debug_assert_eq!(if shape.is_empty() { 0 } else { shape.size() }, items.len());
        Self {shape, items, marker: PhantomData}
    }

    /// Constructs a one-dimensional `Array`.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_parts(Shape::new([items.len()]), items)
    }

    /// Constructs an `Array` of shape `shape` from a function of the
    /// coordinates of each element.
    ///
    /// ```
    /// use ndview::{Array};
    /// let a = Array::from_fn([2, 3], |c| c[0] * 10 + c[1]);
    /// assert_eq!(a.as_slice(), [0, 1, 2, 10, 11, 12]);
    /// ```
    pub fn from_fn(shape: impl Into<Shape>, mut f: impl FnMut(&[usize]) -> T) -> Self {
        let shape = shape.into();
        let len = if shape.is_empty() { 0 } else { shape.size() };
        let items = (0..len).map(|offset| f(&shape.multi_index(offset))).collect();
        Self::from_parts(shape, items)
    }
}

impl<'a, T> Array<T, &'a [T]> {
    /// An `Array` that reads elements owned by someone else.
    ///
    /// ```
    /// use ndview::{Array, View};
    /// let items = [1, 2, 3, 4];
    /// let a = Array::borrowed([2, 2], &items[..]).unwrap();
    /// assert_eq!(a.index(", 0").unwrap().to_vec(), [1, 3]);
    /// ```
    pub fn borrowed(shape: impl Into<Shape>, items: &'a [T]) -> Result<Self, IndexError> {
        Self::new(shape, items)
    }
}

impl<'a, T> Array<T, &'a mut [T]> {
    /// An `Array` that reads and writes elements owned by someone else.
    pub fn borrowed_mut(shape: impl Into<Shape>, items: &'a mut [T]) -> Result<Self, IndexError> {
        Self::new(shape, items)
    }
}

impl<T, S: Default> Default for Array<T, S> {
    /// The array with no axes and no elements.
    fn default() -> Self {
        Self {shape: Shape::default(), items: S::default(), marker: PhantomData}
    }
}

impl<T> From<Vec<T>> for Array<T> {
    fn from(items: Vec<T>) -> Self { Self::from_vec(items) }
}

impl<T, S: Storage<T>> View for Array<T, S> {
    type T = T;
    #[inline(always)]
    fn shape(&self) -> &Shape { &self.shape }
    #[inline(always)]
    fn len(&self) -> usize { self.items.size() }
    #[inline(always)]
    fn get(&self, i: usize) -> Result<&T, IndexError> { self.items.get(i) }
}

impl<T, S: StorageMut<T>> ViewMut for Array<T, S> {
    #[inline(always)]
    fn get_mut(&mut self, i: usize) -> Result<&mut T, IndexError> { self.items.get_mut(i) }
}

impl<T: fmt::Display, S: Storage<T>> fmt::Display for Array<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write_view(self, f) }
}

// ----------------------------------------------------------------------------
