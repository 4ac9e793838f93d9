//! Numpy-style n-dimensional arrays with zero-copy views.
//!
//! [`Array<T, S>`] stores elements of type `T` in row-major order in a flat
//! [`Storage`] `S`, together with a [`Shape`]. Elements are picked out of an
//! `Array` with a small index language, one clause per axis:
//!
//! ```
//! use ndview::{Array, View};
//! let b = Array::new([2, 2, 3], (1..=12).collect::<Vec<i32>>()).unwrap();
//! let v = b.index("0:1, 1:2,").unwrap();
//! assert_eq!(v.shape().dims(), [1, 1, 3]);
//! assert_eq!(v.to_vec(), [4, 5, 6]);
//! assert_eq!(b.index("array <= 2").unwrap().to_vec(), [1, 2]);
//! ```
//!
//! Indexing does not copy anything. The result is an [`ArrayView`] that maps
//! its own row-major positions to offsets of the parent through a
//! [`Selection`]. Writable views ([`ArrayViewMut`]) write straight into the
//! parent.
//!
//! A rectangular selection is represented by a [`Ror`], a progression of
//! [`Range`]s, however large the array is. Each axis clause is turned into
//! such a progression and the progressions are intersected; see
//! [`Range::intersect()`] for the arithmetic. A boolean predicate such as
//! `array <= 2` instead lists the offsets it keeps.
//!
//! Views and arrays share one read interface, [`View`], and one write
//! interface, [`ViewMut`]. Use [`View::to_array()`] to copy a view into a new
//! `Array`.

mod error;
pub use error::{IndexError};

mod shape;
pub use shape::{Shape};

mod storage;
pub use storage::{Storage, StorageMut};

mod range;
pub use range::{Range};

mod ror;
pub use ror::{Ror};

mod selection;
pub use selection::{Selection};

pub mod expr;
pub use expr::{IndexSpec, Operator, Predicate, parse_expression};

mod options;
pub use options::{ResolveOptions, PARALLEL_THRESHOLD_VAR};

mod resolve;
pub use resolve::{Element, Resolved, Resolver};

pub mod view;
pub use view::{View, ViewMut, ArrayView, ArrayViewMut};

mod array;
pub use array::{Array};
