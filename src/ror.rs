//! Progressions of progressions.

use std::collections::{BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Range};

/// A "range of ranges": the [`Range`]s `start`, `start + step`, ..., `stop`,
/// where adding `step` to a `Range` shifts all of its offsets.
///
/// This is exactly the set of offsets selected by a rectangular slice of a
/// row-major array, without listing them. The inner `Range`s all have the
/// same size and step, and each ends before the next begins, so reading the
/// offsets range by range visits them in increasing order.
///
/// ```
/// use ndview::{Range, Ror};
/// // Columns 1 and 2 of every row of a 3 x 4 array.
/// let ror = Ror::new(Range::new(1, 2, 1), 3, 4);
/// assert_eq!(ror.size(), 3);
/// assert_eq!(ror.len(), 6);
/// assert_eq!(ror.iter().collect::<Vec<_>>(), [1, 2, 5, 6, 9, 10]);
/// assert_eq!(ror.nth(3), Some(6));
/// assert_eq!(ror.range(2), Some(Range::new(9, 10, 1)));
/// ```
///
/// Deserialization rejects a `Ror` that `Ror::new()` could not have made.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRor")]
pub struct Ror {
    pub(crate) start: Range,
    pub(crate) stop: Range,
    pub(crate) step: usize,
}

/// The fields of a [`Ror`], before checking.
#[derive(Deserialize)]
struct RawRor {
    start: Range,
    stop: Range,
    step: usize,
}

impl TryFrom<RawRor> for Ror {
    type Error = String;

    fn try_from(raw: RawRor) -> Result<Self, String> {
        let RawRor {start, stop, step} = raw;
        let valid = if step == 0 {
            start == stop
        } else {
            stop.start > start.start
                && (stop.start - start.start) % step == 0
                && stop == start.shift(stop.start - start.start)
                && start.stop - start.start < step
        };
        if !valid {
            return Err(format!("{:?} to {:?} in steps of {} is not a Ror", start, stop, step));
        }
        Ok(Self {start, stop, step})
    }
}

impl Ror {
    /// `count` copies of `first`, each shifted `step` further than the last.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero, or if the copies would overlap.
    pub fn new(first: Range, count: usize, step: usize) -> Self {
        assert!(count > 0, "A Ror needs at least one Range");
        if count == 1 || step == 0 { return Self::single(first); }
        assert!(first.stop - first.start < step, "{:?} overlaps its successor at distance {}", first, step);
        Self {start: first, stop: first.shift((count - 1) * step), step}
    }

    /// The `Ror` containing only `range`.
    pub fn single(range: Range) -> Self {
        Self {start: range, stop: range, step: 0}
    }

    /// The first `Range`.
    #[inline(always)]
    pub fn front(&self) -> Range { self.start }

    /// The last `Range`.
    #[inline(always)]
    pub fn back(&self) -> Range { self.stop }

    /// The distance between successive `Range`s, or `0` if there is only one.
    #[inline(always)]
    pub fn step(&self) -> usize { self.step }

    /// The number of `Range`s.
    pub fn size(&self) -> usize {
        if self.step == 0 { 1 } else { (self.stop.start - self.start.start) / self.step + 1 }
    }

    /// The number of offsets.
    pub fn len(&self) -> usize { self.size() * self.start.size() }

    /// The smallest offset.
    pub fn first(&self) -> usize { self.start.start }

    /// The largest offset.
    pub fn last(&self) -> usize { self.stop.stop }

    /// Returns the `k`th `Range`, if there is one.
    pub fn range(&self, k: usize) -> Option<Range> {
        if k < self.size() { Some(self.start.shift(k * self.step)) } else { None }
    }

    /// The `Range`s, in increasing order.
    pub fn ranges(&self) -> impl Iterator<Item=Range> + '_ {
        (0..self.size()).map(move |k| self.start.shift(k * self.step))
    }

    /// The offsets, in increasing order.
    pub fn iter(&self) -> impl Iterator<Item=usize> + '_ {
        self.ranges().flat_map(|range| (0..range.size()).map(move |i| range.start + i * range.step))
    }

    /// Returns the `i`th offset, if there is one.
    pub fn nth(&self, i: usize) -> Option<usize> {
        let inner = self.start.size();
        self.range(i / inner)?.nth(i % inner)
    }

    /// Returns `true` if `offset` is one of the offsets.
    pub fn contains(&self, offset: usize) -> bool {
        if offset < self.first() || offset > self.last() { return false; }
        if self.step == 0 { return self.start.contains(offset); }
        let k = (offset - self.first()) / self.step;
        self.range(k).map_or(false, |range| range.contains(offset))
    }

    /// Packs a set of `Range`s back into a `Ror`.
    ///
    /// The ranges are taken in order: the first is the front, the last is the
    /// back, and the distance between the first two is the step. Returns
    /// `None` if `ranges` is empty, or if the ranges are not all copies of the
    /// front evenly spaced by that step.
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use ndview::{Range, Ror};
    /// let even: BTreeSet<_> = [0, 6, 12].into_iter().map(|s| Range::new(s, s + 2, 1)).collect();
    /// assert_eq!(Ror::compact(&even), Some(Ror::new(Range::new(0, 2, 1), 3, 6)));
    /// let uneven: BTreeSet<_> = [0, 6, 18].into_iter().map(|s| Range::new(s, s + 2, 1)).collect();
    /// assert_eq!(Ror::compact(&uneven), None);
    /// ```
    pub fn compact(ranges: &BTreeSet<Range>) -> Option<Self> {
        let mut iter = ranges.iter();
        let front = *iter.next()?;
        let second = match iter.next() {
            None => return Some(Self::single(front)),
            Some(second) => *second,
        };
        let step = second.start - front.start;
        if front.stop - front.start >= step { return None; }
        let uniform = ranges.iter().enumerate().all(|(k, range)| *range == front.shift(k * step));
        if !uniform { return None; }
        Some(Self::new(front, ranges.len(), step).simplify())
    }

    /// Returns an equivalent `Ror` made of a single `Range`, when there is
    /// one.
    fn simplify(self) -> Self {
        let front = self.start;
        if self.step == 0 { return self; }
        if front.step == 0 {
            return Self::single(Range::new(front.start, self.stop.start, self.step));
        }
        if front.stop + front.step == front.start + self.step {
            return Self::single(Range::new(front.start, self.stop.stop, front.step));
        }
        self
    }

    /// Returns the set of `Range`s whose union is the offsets common to
    /// `self` and `other`.
    ///
    /// The result is empty if there are no common offsets. It is generally
    /// not uniformly spaced; see [`Ror::compact()`].
    pub fn intersect(&self, other: &Self) -> BTreeSet<Range> {
        let mut result = BTreeSet::new();
        if self.first() > other.last() || other.first() > self.last() {
            return result;
        }
        if self.step == 0 || other.step == 0 {
            let (single, many) = if self.step == 0 { (self, other) } else { (other, self) };
            result.extend(many.ranges().filter_map(|range| single.start.intersect(&range)));
            return result;
        }
        // The spans of the ranges on each side are sorted and disjoint, so a
        // merge-style sweep meets every pair of overlapping ranges.
        let (mut i, mut j) = (0, 0);
        while let (Some(a), Some(b)) = (self.range(i), other.range(j)) {
            if let Some(range) = a.intersect(&b) { result.insert(range); }
            if a.stop <= b.stop { i += 1; } else { j += 1; }
        }
        result
    }
}

impl From<Range> for Ror {
    fn from(range: Range) -> Self { Self::single(range) }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(a: &Ror, b: &Ror) -> Vec<usize> {
        let b: BTreeSet<usize> = b.iter().collect();
        a.iter().filter(|offset| b.contains(offset)).collect()
    }

    fn flatten(ranges: &BTreeSet<Range>) -> Vec<usize> {
        ranges.iter().flat_map(|range| range.iter().collect::<Vec<_>>()).collect()
    }

    #[test]
    fn test_single() {
        let ror = Ror::single(Range::new(3, 9, 2));
        assert_eq!(ror.size(), 1);
        assert_eq!(ror.len(), 4);
        assert_eq!(ror.first(), 3);
        assert_eq!(ror.last(), 9);
        assert_eq!(ror.iter().collect::<Vec<_>>(), [3, 5, 7, 9]);
        assert_eq!(Ror::new(Range::point(4), 1, 100), ror_of_point(4));
    }

    fn ror_of_point(offset: usize) -> Ror { Ror::from(Range::point(offset)) }

    #[test]
    fn test_nth_and_contains_agree_with_iter() {
        let ror = Ror::new(Range::new(2, 6, 2), 4, 10);
        let offsets: Vec<usize> = ror.iter().collect();
        assert_eq!(offsets.len(), ror.len());
        for (i, &offset) in offsets.iter().enumerate() {
            assert_eq!(ror.nth(i), Some(offset));
        }
        assert_eq!(ror.nth(ror.len()), None);
        for offset in 0..50 {
            assert_eq!(ror.contains(offset), offsets.contains(&offset), "{}", offset);
        }
    }

    #[test]
    fn test_compact() {
        assert_eq!(Ror::compact(&BTreeSet::new()), None);

        let one: BTreeSet<_> = [Range::new(4, 8, 2)].into_iter().collect();
        assert_eq!(Ror::compact(&one), Some(Ror::single(Range::new(4, 8, 2))));

        let two: BTreeSet<_> = [Range::new(0, 1, 1), Range::new(5, 6, 1)].into_iter().collect();
        assert_eq!(Ror::compact(&two), Some(Ror::new(Range::new(0, 1, 1), 2, 5)));

        // Different sizes.
        let ragged: BTreeSet<_> = [Range::new(0, 1, 1), Range::new(5, 7, 1)].into_iter().collect();
        assert_eq!(Ror::compact(&ragged), None);

        // Overlapping spans.
        let interleaved: BTreeSet<_> = [Range::new(0, 4, 2), Range::new(1, 5, 2)].into_iter().collect();
        assert_eq!(Ror::compact(&interleaved), None);
    }

    #[test]
    fn test_compact_simplifies() {
        let points: BTreeSet<_> = [3, 7, 11].into_iter().map(Range::point).collect();
        assert_eq!(Ror::compact(&points), Some(Ror::single(Range::new(3, 11, 4))));

        let touching: BTreeSet<_> = [0, 3, 6].into_iter().map(|s| Range::new(s, s + 2, 1)).collect();
        assert_eq!(Ror::compact(&touching), Some(Ror::single(Range::new(0, 8, 1))));
    }

    #[test]
    fn test_intersect_single_with_many() {
        // Rows 1..=2 of a 4 x 3 array, against column 1.
        let rows = Ror::single(Range::new(3, 8, 1));
        let column = Ror::new(Range::point(1), 4, 3);
        let result = rows.intersect(&column);
        assert_eq!(flatten(&result), [4, 7]);
        assert_eq!(result, column.intersect(&rows));
    }

    #[test]
    fn test_intersect_many_with_many() {
        let cases = [
            (Ror::new(Range::new(0, 4, 2), 5, 10), Ror::new(Range::new(0, 9, 1), 3, 20)),
            (Ror::new(Range::new(1, 2, 1), 6, 4), Ror::new(Range::new(0, 6, 3), 3, 8)),
            (Ror::new(Range::point(5), 10, 7), Ror::new(Range::new(0, 3, 1), 9, 9)),
            (Ror::new(Range::new(0, 2, 1), 3, 6), Ror::new(Range::new(40, 42, 1), 3, 6)),
        ];
        for (a, b) in cases {
            assert_eq!(flatten(&a.intersect(&b)), brute_force(&a, &b), "{:?} & {:?}", a, b);
            assert_eq!(a.intersect(&b), b.intersect(&a));
        }
    }

    #[test]
    fn test_deserialize_checks_invariants() {
        let ror = Ror::new(Range::new(1, 2, 1), 3, 4);
        let json = serde_json::to_string(&ror).unwrap();
        assert_eq!(serde_json::from_str::<Ror>(&json).unwrap(), ror);
        assert_eq!(ror.front(), Range::new(1, 2, 1));
        assert_eq!(ror.back(), Range::new(9, 10, 1));
        assert_eq!(ror.step(), 4);

        let range = |start, stop, step| format!(r#"{{"start": {}, "stop": {}, "step": {}}}"#, start, stop, step);
        let ror_json = |start: String, stop: String, step| format!(r#"{{"start": {}, "stop": {}, "step": {}}}"#, start, stop, step);
        for bad in [
            // Overlapping spans.
            ror_json(range(0, 5, 1), range(3, 8, 1), 3),
            // Back is not a copy of the front.
            ror_json(range(0, 2, 1), range(8, 9, 1), 4),
            // Back is not a whole number of steps away.
            ror_json(range(0, 1, 1), range(9, 10, 1), 4),
            // Back before front.
            ror_json(range(8, 9, 1), range(0, 1, 1), 4),
            // A single range with a different back.
            ror_json(range(0, 1, 1), range(4, 5, 1), 0),
            // An inner range that breaks its own rules.
            ror_json(range(0, 3, 2), range(8, 11, 2), 8),
        ] {
            assert!(serde_json::from_str::<Ror>(&bad).is_err(), "{}", bad);
        }
        let single = ror_json(range(3, 9, 2), range(3, 9, 2), 0);
        assert_eq!(serde_json::from_str::<Ror>(&single).unwrap(), Ror::single(Range::new(3, 9, 2)));
    }
}
