//! Turning index expressions into [`Selection`]s.
//!
//! Each axis clause constrains the flat offsets of the array, holding every
//! other axis free. The constraints are intersected left to right, so the
//! result is the set of offsets satisfying all of them. Rectangular
//! constraints stay compact throughout; only a boolean predicate, or an
//! unevenly spaced set of ranges, forces the offsets to be listed.

use std::collections::{BTreeSet};
use std::str::{FromStr};

use rayon::prelude::*;

use super::{Shape, IndexError, Range, Ror, Selection, IndexSpec, Predicate, ResolveOptions, parse_expression};
use super::expr::{normalise, slice_len};

/// Implemented by types that can be stored in an indexable array.
///
/// Elements can be compared with the literal of a boolean predicate, which
/// is parsed from text, and may be compared from several threads.
pub trait Element: Clone + PartialOrd + FromStr + Send + Sync {}

impl<T: Clone + PartialOrd + FromStr + Send + Sync> Element for T {}

/// The result of resolving an index expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The selected offsets of the parent.
    pub selection: Selection,
    /// The shape of the result.
    pub shape: Shape,
}

/// Resolves index expressions against an array of a given [`Shape`].
///
/// ```
/// use ndview::{Shape, Resolver, ResolveOptions};
/// let shape = Shape::new([2, 2, 3]);
/// let items: Vec<i32> = (1..=12).collect();
/// let options = ResolveOptions::default();
/// let resolved = Resolver::new(&shape, &options).resolve("0:1, 1:2,", &items).unwrap();
/// assert_eq!(resolved.shape, Shape::new([1, 1, 3]));
/// assert_eq!(resolved.selection.iter().collect::<Vec<_>>(), [3, 4, 5]);
/// ```
#[derive(Debug, Copy, Clone)]
pub struct Resolver<'a> {
    shape: &'a Shape,
    options: &'a ResolveOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(shape: &'a Shape, options: &'a ResolveOptions) -> Self {
        Self {shape, options}
    }

    fn check_not_empty(&self) -> Result<(), IndexError> {
        if self.shape.is_empty() || self.shape.size() == 0 {
            return Err(IndexError::EmptyArrayIndexed);
        }
        Ok(())
    }

    /// Resolves `expr` against `items`, the elements of the array in offset
    /// order.
    ///
    /// `items` is only read if `expr` contains a boolean predicate.
    pub fn resolve<T: Element>(&self, expr: &str, items: &[T]) -> Result<Resolved, IndexError> {
        self.check_not_empty()?;
        let specs = parse_expression::<T>(expr, self.shape)?;
        let resolved = self.resolve_specs(&specs, items)?;
        tracing::debug!(
            expr,
            regular = resolved.selection.is_regular(),
            len = resolved.selection.len(),
            shape = %resolved.shape,
            "resolved index expression",
        );
        Ok(resolved)
    }

    /// Resolves the single integer `index` on the first axis.
    ///
    /// Negative values count from the end.
    pub fn resolve_at(&self, index: isize) -> Result<Resolved, IndexError> {
        self.check_not_empty()?;
        let position = normalise(index, 0, self.shape[0], false)?;
        let selection = self.build_axis_selection(0, position, position + 1, 1);
        let mut shape = self.shape.remove_dim(0);
        if shape.is_empty() { shape = Shape::new([1]); }
        tracing::debug!(index, len = selection.len(), shape = %shape, "resolved integer index");
        Ok(Resolved {selection, shape})
    }

    /// Resolves already parsed clauses, one per axis.
    ///
    /// The clauses are checked against the shape first, with the same errors
    /// [`parse_expression()`] would give for the same text.
    ///
    /// ```
    /// use ndview::{IndexError, IndexSpec, Shape, Resolver, ResolveOptions};
    /// let shape = Shape::new([2, 3]);
    /// let items: Vec<i32> = (0..6).collect();
    /// let options = ResolveOptions::default();
    /// let resolver = Resolver::new(&shape, &options);
    /// let resolved = resolver.resolve_specs(&[IndexSpec::All, IndexSpec::Subsetting(2)], &items).unwrap();
    /// assert_eq!(resolved.selection.iter().collect::<Vec<_>>(), [2, 5]);
    /// assert!(matches!(
    ///     resolver.resolve_specs(&[IndexSpec::Subsetting(5)], &items),
    ///     Err(IndexError::IndexOutOfBounds {index: 5, axis: 0, extent: 2}),
    /// ));
    /// ```
    pub fn resolve_specs<T: Element>(&self, specs: &[IndexSpec<T>], items: &[T]) -> Result<Resolved, IndexError> {
        self.check_not_empty()?;
        if items.len() != self.shape.size() {
            return Err(IndexError::ShapeMismatch {shape: self.shape.clone(), len: items.len()});
        }
        self.check_specs(specs)?;
        // `None` means no constraint yet.
        let mut current: Option<Selection> = None;
        let mut filtered = false;
        for (axis, spec) in specs.iter().enumerate() {
            let constraint = match *spec {
                IndexSpec::All => continue,
                IndexSpec::Subsetting(position) => self.build_axis_selection(axis, position, position + 1, 1),
                IndexSpec::Slicing {start, stop, step} => {
                    if start >= stop {
                        Selection::empty()
                    } else if start == 0 && stop == self.shape[axis] && step == 1 {
                        continue;
                    } else {
                        self.build_axis_selection(axis, start, stop, step)
                    }
                },
                IndexSpec::Predicate(ref predicate) => {
                    let scanned = self.scan(current.take(), items, predicate);
                    tracing::trace!(kept = scanned.len(), "applied boolean predicate");
                    current = Some(scanned);
                    filtered = true;
                    continue;
                },
            };
            let folded = match current.take() {
                None => constraint,
                Some(selection) => selection.intersect(&constraint),
            };
            tracing::trace!(axis, len = folded.len(), regular = folded.is_regular(), "folded axis constraint");
            current = Some(folded);
        }
        let selection = current.unwrap_or_else(|| Selection::all(self.shape.size()));
        let shape = if filtered {
            Shape::new([selection.len()])
        } else {
            self.derive_shape(specs, &selection)
        };
        Ok(Resolved {selection, shape})
    }

    /// Checks that `specs` could have come from [`parse_expression()`] for
    /// this shape.
    fn check_specs<T>(&self, specs: &[IndexSpec<T>]) -> Result<(), IndexError> {
        let rank = self.shape.ndim();
        if let Some((_, init)) = specs.split_last() {
            if let Some(IndexSpec::Predicate(predicate)) = init.iter().find(|spec| spec.is_predicate()) {
                return Err(IndexError::MisplacedBooleanPredicate {clause: format!("array {} ...", predicate.operator)});
            }
        }
        let given = specs.iter().filter(|spec| !spec.is_predicate()).count();
        if given > rank {
            return Err(IndexError::TooManyAxesIndexed {rank, given});
        }
        for (axis, spec) in specs.iter().enumerate() {
            let extent = self.shape[axis.min(rank - 1)];
            let out_of_bounds = |index: usize| IndexError::IndexOutOfBounds {index: index as isize, axis, extent};
            match *spec {
                IndexSpec::Subsetting(position) if position >= extent => return Err(out_of_bounds(position)),
                IndexSpec::Slicing {step: 0, ..} => return Err(IndexError::ZeroStep {axis}),
                IndexSpec::Slicing {start, ..} if start > extent => return Err(out_of_bounds(start)),
                IndexSpec::Slicing {stop, ..} if stop > extent => return Err(out_of_bounds(stop)),
                _ => {},
            }
        }
        Ok(())
    }

    /// Returns the offsets at positions `start, start + step, ...` below
    /// `stop` along axis `axis`, with every other axis free.
    ///
    /// The first axis selects whole blocks of contiguous offsets. The last
    /// axis selects the same positions within every row. Any other axis
    /// needs one `Range` per combination of positions on the outer axes.
    ///
    /// `axis` must be in bounds, `start < stop <= extent` and `step > 0`.
    pub(crate) fn build_axis_selection(&self, axis: usize, start: usize, stop: usize, step: usize) -> Selection {
        assert!(start < stop, "Empty axis constraint {}..{}", start, stop);
        let dims = self.shape.dims();
        let extent = dims[axis];
        let block: usize = dims[axis + 1..].iter().product();
        let outer: usize = dims[..axis].iter().product();
        let count = slice_len(start, stop, step);
        let last = start + (count - 1) * step;
        if axis == 0 {
            if block == 1 {
                Range::new(start, last, step).into()
            } else if step == 1 {
                Range::new(start * block, (last + 1) * block - 1, 1).into()
            } else {
                let first = Range::new(start * block, (start + 1) * block - 1, 1);
                Ror::new(first, count, step * block).into()
            }
        } else if axis == dims.len() - 1 {
            Ror::new(Range::new(start, last, step), outer, extent).into()
        } else {
            let mut ranges = BTreeSet::new();
            for k in 0..outer {
                let base = k * extent * block;
                if step == 1 {
                    ranges.insert(Range::new(base + start * block, base + (last + 1) * block - 1, 1));
                } else if block == 1 {
                    ranges.insert(Range::new(base + start, base + last, step));
                } else {
                    for i in (start..stop).step_by(step) {
                        ranges.insert(Range::new(base + i * block, base + (i + 1) * block - 1, 1));
                    }
                }
            }
            Selection::from_ranges(&ranges)
        }
    }

    /// Keeps the offsets of `candidates` (or of the whole array) whose
    /// elements satisfy `predicate`.
    fn scan<T: Element>(&self, candidates: Option<Selection>, items: &[T], predicate: &Predicate<T>) -> Selection {
        let candidates: Vec<usize> = match candidates {
            Some(selection) => selection.iter().collect(),
            None => (0..items.len()).collect(),
        };
        let kept = if candidates.len() >= self.options.parallel_threshold {
            let flags: Vec<bool> = candidates.par_iter().map(|&offset| predicate.test(&items[offset])).collect();
            candidates.into_iter().zip(flags).filter_map(|(offset, keep)| keep.then_some(offset)).collect()
        } else {
            candidates.into_iter().filter(|&offset| predicate.test(&items[offset])).collect()
        };
        Selection::Explicit(kept)
    }

    /// The shape of the result of a selection made without a predicate.
    ///
    /// Sliced and free axes keep the distance between the coordinates of
    /// the first and last selected offsets. Subset axes are dropped.
    fn derive_shape<T>(&self, specs: &[IndexSpec<T>], selection: &Selection) -> Shape {
        let dims = self.shape.dims();
        let extents: Vec<usize> = match (selection.first(), selection.last()) {
            (Some(first), Some(last)) => {
                let (low, high) = (self.shape.multi_index(first), self.shape.multi_index(last));
                (0..dims.len()).filter_map(|axis| match specs.get(axis) {
                    None | Some(IndexSpec::All) => Some(high[axis] - low[axis] + 1),
                    Some(IndexSpec::Slicing {step, ..}) => Some((high[axis] - low[axis]) / step + 1),
                    Some(IndexSpec::Subsetting(_)) | Some(IndexSpec::Predicate(_)) => None,
                }).collect()
            },
            _ => (0..dims.len()).filter_map(|axis| {
                specs.get(axis).map_or(Some(dims[axis]), |spec| spec.count(dims[axis]))
            }).collect(),
        };
        if extents.is_empty() { Shape::new([1]) } else { Shape::new(extents) }
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Operator;

    fn resolve(dims: &[usize], expr: &str) -> Result<Resolved, IndexError> {
        let shape = Shape::from(dims);
        let items: Vec<i64> = (0..shape.size() as i64).collect();
        Resolver::new(&shape, &ResolveOptions::default()).resolve(expr, &items)
    }

    /// The offsets numpy would select, computed one element at a time.
    fn brute_force(dims: &[usize], keep: impl Fn(&[usize]) -> bool) -> Vec<usize> {
        let shape = Shape::from(dims);
        (0..shape.size()).filter(|&offset| keep(&shape.multi_index(offset))).collect()
    }

    fn offsets(resolved: &Resolved) -> Vec<usize> { resolved.selection.iter().collect() }

    #[test]
    fn test_first_axis() {
        let r = resolve(&[6, 2], "1:6:2").unwrap();
        assert_eq!(offsets(&r), [2, 3, 6, 7, 10, 11]);
        assert_eq!(r.shape, Shape::new([3, 2]));
        assert!(r.selection.is_regular());
        let r = resolve(&[10], "2:9:3").unwrap();
        assert_eq!(offsets(&r), [2, 5, 8]);
        assert_eq!(r.shape, Shape::new([3]));
    }

    #[test]
    fn test_last_axis() {
        let r = resolve(&[3, 4], ", 1:4:2").unwrap();
        assert_eq!(offsets(&r), [1, 3, 5, 7, 9, 11]);
        assert_eq!(r.shape, Shape::new([3, 2]));
        let r = resolve(&[3, 4], ", -1").unwrap();
        assert_eq!(offsets(&r), [3, 7, 11]);
        assert_eq!(r.shape, Shape::new([3]));
    }

    #[test]
    fn test_interior_axis() {
        let r = resolve(&[2, 3, 2], ", 1:3").unwrap();
        assert_eq!(offsets(&r), [2, 3, 4, 5, 8, 9, 10, 11]);
        assert_eq!(r.shape, Shape::new([2, 2, 2]));
        assert!(r.selection.is_regular());
        let r = resolve(&[2, 3, 2], ", 1").unwrap();
        assert_eq!(offsets(&r), [2, 3, 8, 9]);
        assert_eq!(r.shape, Shape::new([2, 2]));
    }

    #[test]
    fn test_mixed_clauses_match_brute_force() {
        let dims = [4, 3, 5];
        let cases: [(&str, fn(&[usize]) -> bool); 5] = [
            ("1:3, 0:2, 1:5:2", |c| (1..3).contains(&c[0]) && c[1] < 2 && c[2] % 2 == 1),
            ("::2, 2", |c| c[0] % 2 == 0 && c[1] == 2),
            ("-1, :, 3", |c| c[0] == 3 && c[2] == 3),
            (", ::2, 1:4", |c| c[1] % 2 == 0 && (1..4).contains(&c[2])),
            ("0:4:3, 1:3, ::4", |c| c[0] % 3 == 0 && c[1] >= 1 && c[2] % 4 == 0),
        ];
        for (expr, keep) in cases {
            let r = resolve(&dims, expr).unwrap();
            assert_eq!(offsets(&r), brute_force(&dims, keep), "{}", expr);
            assert_eq!(r.shape.size(), r.selection.len(), "{}", expr);
        }
    }

    #[test]
    fn test_irregular_falls_back_to_explicit() {
        let r = resolve(&[4, 3, 3], "0:4:2, 0:2, 0:3:2").unwrap();
        assert!(!r.selection.is_regular());
        assert_eq!(offsets(&r), [0, 2, 3, 5, 18, 20, 21, 23]);
        assert_eq!(r.shape, Shape::new([2, 2, 2]));
    }

    #[test]
    fn test_scalar_result() {
        let r = resolve(&[2, 3], "1, 2").unwrap();
        assert_eq!(offsets(&r), [5]);
        assert_eq!(r.shape, Shape::new([1]));
    }

    #[test]
    fn test_empty_results() {
        let r = resolve(&[3, 4], "2:1").unwrap();
        assert!(r.selection.is_empty());
        assert_eq!(r.shape, Shape::new([0, 4]));
        let r = resolve(&[3, 4], ", 3:3:2").unwrap();
        assert_eq!(r.shape, Shape::new([3, 0]));
        let r = resolve(&[3, 4], "a > 100").unwrap();
        assert_eq!(r.shape, Shape::new([0]));
    }

    #[test]
    fn test_predicate_after_slices() {
        let r = resolve(&[3, 4], "1:3, 1:3, a >= 6").unwrap();
        assert_eq!(offsets(&r), [6, 9, 10]);
        assert_eq!(r.shape, Shape::new([3]));
    }

    #[test]
    fn test_parallel_scan_agrees() {
        let shape = Shape::new([50, 40]);
        let items: Vec<f64> = (0..2000).map(|i| ((i * 37) % 101) as f64).collect();
        let sequential = ResolveOptions::default();
        let parallel = ResolveOptions::default().with_parallel_threshold(1);
        for expr in ["x < 50", ":, 0:20, x >= 13", "10:40:3, x != 7"] {
            let a = Resolver::new(&shape, &sequential).resolve(expr, &items).unwrap();
            let b = Resolver::new(&shape, &parallel).resolve(expr, &items).unwrap();
            assert_eq!(a, b, "{}", expr);
        }
    }

    #[test]
    fn test_resolve_at() {
        let shape = Shape::new([2, 3]);
        let options = ResolveOptions::default();
        let resolver = Resolver::new(&shape, &options);
        let r = resolver.resolve_at(-1).unwrap();
        assert_eq!(offsets(&r), [3, 4, 5]);
        assert_eq!(r.shape, Shape::new([3]));
        assert_eq!(resolver.resolve_at(2).unwrap_err(), IndexError::IndexOutOfBounds {index: 2, axis: 0, extent: 2});
        let shape = Shape::new([4]);
        assert_eq!(Resolver::new(&shape, &options).resolve_at(3).unwrap().shape, Shape::new([1]));
    }

    #[test]
    fn test_errors() {
        assert_eq!(resolve(&[2, 0], "0").unwrap_err(), IndexError::EmptyArrayIndexed);
        let shape = Shape::default();
        let items: Vec<i64> = Vec::new();
        assert_eq!(
            Resolver::new(&shape, &ResolveOptions::default()).resolve(":", &items).unwrap_err(),
            IndexError::EmptyArrayIndexed,
        );
        assert_eq!(resolve(&[2, 3], "0, 0:3:0").unwrap_err(), IndexError::ZeroStep {axis: 1});
        assert!(matches!(resolve(&[2, 3], "x < 1, 0"), Err(IndexError::MisplacedBooleanPredicate {..})));
    }

    #[test]
    fn test_resolve_specs_checks_the_shape() {
        type Spec = IndexSpec<i64>;
        let check = |dims: &[usize], specs: &[Spec]| {
            let shape = Shape::from(dims);
            let items: Vec<i64> = (0..shape.size() as i64).collect();
            Resolver::new(&shape, &ResolveOptions::default()).resolve_specs(specs, &items)
        };
        assert_eq!(
            check(&[4, 3], &[Spec::Slicing {start: 0, stop: 2, step: 0}]).unwrap_err(),
            IndexError::ZeroStep {axis: 0},
        );
        assert_eq!(
            check(&[4], &[Spec::All, Spec::Subsetting(0)]).unwrap_err(),
            IndexError::TooManyAxesIndexed {rank: 1, given: 2},
        );
        assert_eq!(
            check(&[2, 3], &[Spec::Subsetting(5)]).unwrap_err(),
            IndexError::IndexOutOfBounds {index: 5, axis: 0, extent: 2},
        );
        assert_eq!(
            check(&[2, 3], &[Spec::All, Spec::Slicing {start: 0, stop: 4, step: 1}]).unwrap_err(),
            IndexError::IndexOutOfBounds {index: 4, axis: 1, extent: 3},
        );
        assert_eq!(
            check(&[2, 3], &[Spec::Slicing {start: 3, stop: 3, step: 1}]).unwrap_err(),
            IndexError::IndexOutOfBounds {index: 3, axis: 0, extent: 2},
        );
        let predicate = Spec::Predicate(Predicate::new(Operator::Less, 3));
        assert!(matches!(
            check(&[2, 3], &[predicate.clone(), Spec::Subsetting(0)]),
            Err(IndexError::MisplacedBooleanPredicate {..}),
        ));
        // A trailing predicate does not count as an axis.
        let r = check(&[2, 3], &[Spec::All, Spec::Subsetting(1), predicate]).unwrap();
        assert_eq!(offsets(&r), [1]);
        // Clauses that pass the checks resolve as their text would.
        let specs = [Spec::Slicing {start: 0, stop: 2, step: 1}, Spec::Slicing {start: 2, stop: 2, step: 1}];
        assert_eq!(check(&[2, 3], &specs).unwrap(), resolve(&[2, 3], ", 2:2").unwrap());
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_logs_resolution() {
        resolve(&[4, 3, 3], "0:4:2, 0:2, 0:3:2").unwrap();
        assert!(logs_contain("resolved index expression"));
        assert!(logs_contain("folded axis constraint"));
        assert!(logs_contain("listing offsets"));
    }
}
