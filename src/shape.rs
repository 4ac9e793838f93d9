use std::fmt;
use std::str::{FromStr};

use serde::{Deserialize, Serialize};

use super::{IndexError};

/// The extents of the axes of an array, outermost first.
///
/// Elements are laid out in row-major order, so the last axis varies
/// fastest. The empty `Shape` describes an array that holds nothing yet.
///
/// ```
/// use ndview::Shape;
/// let s = Shape::new([2, 3, 4]);
/// assert_eq!(s.size(), 24);
/// assert_eq!(s.strides(), [12, 4, 1]);
/// assert_eq!(s.multi_index(17), [1, 1, 1]);
/// assert_eq!(s.to_string(), "2, 3, 4");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        Self {dims: dims.into()}
    }

    /// The extent of every axis.
    pub fn dims(&self) -> &[usize] { &self.dims }

    /// The number of axes.
    pub fn ndim(&self) -> usize { self.dims.len() }

    /// Returns `true` if there are no axes at all.
    pub fn is_empty(&self) -> bool { self.dims.is_empty() }

    /// The product of the extents. This is `1` for the empty `Shape`.
    pub fn size(&self) -> usize { self.dims.iter().product() }

    /// The distance in the flat buffer between neighbours along each axis.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![0; self.dims.len()];
        let mut weight = 1;
        for (stride, extent) in strides.iter_mut().zip(&self.dims).rev() {
            *stride = weight;
            weight *= extent;
        }
        strides
    }

    /// Returns the coordinates of the element stored at `offset`.
    ///
    /// Coordinates wrap around in the first axis if `offset` is past the end.
    pub fn multi_index(&self, offset: usize) -> Vec<usize> {
        let mut rest = offset;
        self.strides().into_iter().map(|stride| {
            let coordinate = rest / stride;
            rest -= coordinate * stride;
            coordinate
        }).collect()
    }

    /// Returns the flat offset of the element at `coordinates`.
    pub fn ravel(&self, coordinates: &[usize]) -> Result<usize, IndexError> {
        if coordinates.len() > self.ndim() {
            return Err(IndexError::TooManyAxesIndexed {rank: self.ndim(), given: coordinates.len()});
        }
        let mut offset = 0;
        for (axis, (&extent, &stride)) in self.dims.iter().zip(&self.strides()).enumerate() {
            let coordinate = coordinates.get(axis).copied().unwrap_or(0);
            if coordinate >= extent {
                return Err(IndexError::IndexOutOfBounds {index: coordinate as isize, axis, extent});
            }
            offset += coordinate * stride;
        }
        Ok(offset)
    }

    /// Reverses the axes: `(2, 3, 4)` becomes `(4, 3, 2)`.
    pub fn transpose(&self) -> Self {
        Self::new(self.dims.iter().rev().copied().collect::<Vec<_>>())
    }

    /// Merges all axes into one: `(2, 3, 4)` becomes `(24,)`.
    pub fn flatten(&self) -> Self {
        if self.is_empty() { return Self::default(); }
        Self::new([self.size()])
    }

    /// Inserts an axis of the given `extent` before axis `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `axis > self.ndim()`.
    pub fn insert_dim(&self, axis: usize, extent: usize) -> Self {
        assert!(axis <= self.ndim(), "Axis {} is out of bounds for rank {}", axis, self.ndim());
        let mut dims = self.dims.clone();
        dims.insert(axis, extent);
        Self::new(dims)
    }

    /// Removes axis `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= self.ndim()`.
    pub fn remove_dim(&self, axis: usize) -> Self {
        assert!(axis < self.ndim(), "Axis {} is out of bounds for rank {}", axis, self.ndim());
        let mut dims = self.dims.clone();
        dims.remove(axis);
        Self::new(dims)
    }

    /// The shape of the result of an elementwise operation between arrays of
    /// shape `self` and `other`.
    ///
    /// Shapes are aligned on their last axis. Each pair of extents must be
    /// equal, or one of them must be `1`, in which case it is stretched.
    ///
    /// ```
    /// use ndview::Shape;
    /// let a = Shape::new([4, 1, 3]);
    /// assert_eq!(a.broadcast(&Shape::new([2, 1])).unwrap(), Shape::new([4, 2, 3]));
    /// assert!(a.broadcast(&Shape::new([2, 2])).is_err());
    /// ```
    pub fn broadcast(&self, other: &Self) -> Result<Self, IndexError> {
        let ndim = self.ndim().max(other.ndim());
        let extent = |shape: &Self, i: usize| {
            (i + shape.ndim()).checked_sub(ndim).map_or(1, |axis| shape.dims[axis])
        };
        let mut dims = Vec::with_capacity(ndim);
        for i in 0..ndim {
            let (a, b) = (extent(self, i), extent(other, i));
            dims.push(match (a, b) {
                _ if a == b => a,
                (1, _) => b,
                (_, 1) => a,
                _ => return Err(IndexError::IncompatibleShapes {lhs: self.clone(), rhs: other.clone()}),
            });
        }
        Ok(Self::new(dims))
    }
}

impl std::ops::Index<usize> for Shape {
    type Output = usize;
    fn index(&self, axis: usize) -> &usize { &self.dims[axis] }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self { Self::new(dims) }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self { Self::new(dims) }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self { Self::new(dims) }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dims.as_slice() {
            [] => write!(f, "0,"),
            [extent] => write!(f, "{},", extent),
            dims => {
                for (axis, extent) in dims.iter().enumerate() {
                    if axis > 0 { write!(f, ", ")?; }
                    write!(f, "{}", extent)?;
                }
                Ok(())
            },
        }
    }
}

impl FromStr for Shape {
    type Err = IndexError;

    /// Parses the text form written by `Display`, with or without
    /// surrounding parentheses.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || IndexError::InvalidShape {text: text.to_string()};
        let inner = text.trim().trim_start_matches('(').trim_end_matches(')').trim();
        if inner == "0," { return Ok(Self::default()); }
        let dims = inner.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<usize>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        if dims.is_empty() { return Err(invalid()); }
        Ok(Self::new(dims))
    }
}

// ----------------------------------------------------------------------------
