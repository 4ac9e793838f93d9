use std::collections::{BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Range, Ror};

/// The flat offsets picked out of an array by resolving an index expression,
/// in increasing order.
///
/// Rectangular selections stay [`Selection::Regular`], so that selecting a
/// slab of a large array costs nothing per element. Once a boolean predicate
/// has filtered the offsets, or a set of ranges turns out not to be evenly
/// spaced, the offsets are listed one by one in [`Selection::Explicit`].
///
/// ```
/// use ndview::{Range, Ror, Selection};
/// let rows = Selection::Regular(Ror::single(Range::new(3, 8, 1)));
/// let column = Selection::Regular(Ror::new(Range::point(1), 4, 3));
/// let both = rows.intersect(&column);
/// assert_eq!(both.iter().collect::<Vec<_>>(), [4, 7]);
/// assert!(both.is_regular());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    Regular(Ror),
    Explicit(Vec<usize>),
}

impl Selection {
    /// The `Selection` containing no offsets.
    pub fn empty() -> Self { Self::Explicit(Vec::new()) }

    /// The offsets `0..size`, or the empty `Selection` if `size` is zero.
    pub fn all(size: usize) -> Self {
        if size == 0 { return Self::empty(); }
        Self::Regular(Ror::single(Range::new(0, size - 1, 1)))
    }

    /// The union of a set of `Range`s whose spans do not overlap.
    ///
    /// The result is `Regular` if [`Ror::compact()`] succeeds.
    pub fn from_ranges(ranges: &BTreeSet<Range>) -> Self {
        if ranges.is_empty() { return Self::empty(); }
        if let Some(ror) = Ror::compact(ranges) { return Self::Regular(ror); }
        tracing::trace!(ranges = ranges.len(), "ranges are not evenly spaced; listing offsets");
        let offsets: BTreeSet<usize> = ranges.iter().flat_map(Range::iter).collect();
        Self::Explicit(offsets.into_iter().collect())
    }

    /// Returns `true` if the offsets are represented without listing them.
    pub fn is_regular(&self) -> bool { matches!(self, Self::Regular(_)) }

    /// The number of offsets.
    pub fn len(&self) -> usize {
        match self {
            Self::Regular(ror) => ror.len(),
            Self::Explicit(offsets) => offsets.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Returns the `i`th offset, if there is one.
    pub fn nth(&self, i: usize) -> Option<usize> {
        match self {
            Self::Regular(ror) => ror.nth(i),
            Self::Explicit(offsets) => offsets.get(i).copied(),
        }
    }

    /// The smallest offset.
    pub fn first(&self) -> Option<usize> {
        match self {
            Self::Regular(ror) => Some(ror.first()),
            Self::Explicit(offsets) => offsets.first().copied(),
        }
    }

    /// The largest offset.
    pub fn last(&self) -> Option<usize> {
        match self {
            Self::Regular(ror) => Some(ror.last()),
            Self::Explicit(offsets) => offsets.last().copied(),
        }
    }

    /// Returns `true` if `offset` is selected.
    pub fn contains(&self, offset: usize) -> bool {
        match self {
            Self::Regular(ror) => ror.contains(offset),
            Self::Explicit(offsets) => offsets.binary_search(&offset).is_ok(),
        }
    }

    /// The offsets, in increasing order.
    pub fn iter(&self) -> impl Iterator<Item=usize> + '_ {
        (0..self.len()).filter_map(move |i| self.nth(i))
    }

    /// Returns the offsets selected by both `self` and `other`.
    pub fn intersect(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Regular(a), Self::Regular(b)) => Self::from_ranges(&a.intersect(b)),
            (Self::Regular(ror), Self::Explicit(offsets)) |
            (Self::Explicit(offsets), Self::Regular(ror)) => {
                Self::Explicit(offsets.iter().copied().filter(|&offset| ror.contains(offset)).collect())
            },
            (Self::Explicit(a), Self::Explicit(b)) => Self::Explicit(merge_common(a, b)),
        }
    }
}

impl From<Ror> for Selection {
    fn from(ror: Ror) -> Self { Self::Regular(ror) }
}

impl From<Range> for Selection {
    fn from(range: Range) -> Self { Self::Regular(Ror::single(range)) }
}

/// The elements common to two ascending lists.
fn merge_common(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => { i += 1; },
            std::cmp::Ordering::Greater => { j += 1; },
            std::cmp::Ordering::Equal => { result.push(a[i]); i += 1; j += 1; },
        }
    }
    result
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(s: &Selection) -> Vec<usize> { s.iter().collect() }

    #[test]
    fn test_all_and_empty() {
        assert_eq!(offsets(&Selection::all(4)), [0, 1, 2, 3]);
        assert!(Selection::all(0).is_empty());
        assert_eq!(Selection::empty().first(), None);
        assert_eq!(Selection::empty().nth(0), None);
    }

    #[test]
    fn test_from_ranges() {
        let even: BTreeSet<_> = [0, 9, 18].into_iter().map(|s| Range::new(s, s + 5, 1)).collect();
        let s = Selection::from_ranges(&even);
        assert!(s.is_regular());
        assert_eq!(s.len(), 18);

        let uneven: BTreeSet<_> = [0, 3, 18, 21].into_iter().map(|s| Range::new(s, s + 2, 2)).collect();
        let s = Selection::from_ranges(&uneven);
        assert!(!s.is_regular());
        assert_eq!(offsets(&s), [0, 2, 3, 5, 18, 20, 21, 23]);
        assert_eq!(s.first(), Some(0));
        assert_eq!(s.last(), Some(23));
        assert!(s.contains(21));
        assert!(!s.contains(22));

        assert_eq!(Selection::from_ranges(&BTreeSet::new()), Selection::empty());
    }

    #[test]
    fn test_intersect_mixed() {
        let regular = Selection::from(Range::new(0, 20, 2));
        let explicit = Selection::Explicit(vec![1, 2, 3, 4, 9, 10, 30]);
        assert_eq!(regular.intersect(&explicit), Selection::Explicit(vec![2, 4, 10]));
        assert_eq!(explicit.intersect(&regular), Selection::Explicit(vec![2, 4, 10]));
        let other = Selection::Explicit(vec![0, 3, 9, 30, 31]);
        assert_eq!(explicit.intersect(&other), Selection::Explicit(vec![3, 9, 30]));
        assert!(explicit.intersect(&Selection::empty()).is_empty());
    }

    #[test]
    fn test_disjoint_regular_is_empty() {
        let a = Selection::from(Range::new(0, 10, 2));
        let b = Selection::from(Range::new(1, 11, 2));
        assert!(a.intersect(&b).is_empty());
    }

    #[test]
    fn test_serde() {
        let s = Selection::from(Ror::new(Range::new(1, 2, 1), 3, 4));
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(serde_json::from_str::<Selection>(&json).unwrap(), s);
    }
}
