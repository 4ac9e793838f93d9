//! Arithmetic progressions of flat offsets.

use serde::{Deserialize, Serialize};

/// The offsets `start, start + step, ..., stop`.
///
/// `stop` is inclusive and is always an element of the progression. A
/// `step` of `0` denotes the single offset `start`, in which case
/// `start == stop`. Constructing through [`Range::new()`] keeps both rules.
///
/// ```
/// use ndview::Range;
/// let r = Range::new(2, 11, 3);
/// assert_eq!(r.stop(), 11);
/// assert_eq!(r.size(), 4);
/// assert_eq!(r.iter().collect::<Vec<_>>(), [2, 5, 8, 11]);
/// assert_eq!(Range::new(2, 10, 3).stop(), 8);
/// ```
///
/// Deserialization checks both rules, so a `Range` read from elsewhere is
/// as good as one made by `Range::new()`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct Range {
    pub(crate) start: usize,
    pub(crate) stop: usize,
    pub(crate) step: usize,
}

/// The fields of a [`Range`], before checking.
#[derive(Deserialize)]
struct RawRange {
    start: usize,
    stop: usize,
    step: usize,
}

impl TryFrom<RawRange> for Range {
    type Error = String;

    fn try_from(raw: RawRange) -> Result<Self, String> {
        let RawRange {start, stop, step} = raw;
        let valid = if step == 0 {
            start == stop
        } else {
            start < stop && (stop - start) % step == 0
        };
        if !valid {
            return Err(format!("{}..={} is not a progression in steps of {}", start, stop, step));
        }
        Ok(Self {start, stop, step})
    }
}

impl Range {
    /// The progression from `start` up to at most `stop` in steps of `step`.
    ///
    /// `stop` is rounded down to the last element of the progression.
    ///
    /// # Panics
    ///
    /// Panics if `stop < start`.
    pub fn new(start: usize, stop: usize, step: usize) -> Self {
        assert!(start <= stop, "Range {}..={} runs backwards", start, stop);
        if step == 0 || stop - start < step { return Self::point(start); }
        Self {start, stop: start + (stop - start) / step * step, step}
    }

    /// The progression containing only `offset`.
    pub fn point(offset: usize) -> Self {
        Self {start: offset, stop: offset, step: 0}
    }

    /// The smallest offset.
    #[inline(always)]
    pub fn start(&self) -> usize { self.start }

    /// The largest offset.
    #[inline(always)]
    pub fn stop(&self) -> usize { self.stop }

    /// The distance between successive offsets, or `0` for a single offset.
    #[inline(always)]
    pub fn step(&self) -> usize { self.step }

    /// The number of offsets.
    pub fn size(&self) -> usize {
        if self.step == 0 { 1 } else { (self.stop - self.start) / self.step + 1 }
    }

    /// Returns the `i`th offset, if there is one.
    pub fn nth(&self, i: usize) -> Option<usize> {
        if i < self.size() { Some(self.start + i * self.step) } else { None }
    }

    /// Returns `true` if `offset` is one of the offsets.
    pub fn contains(&self, offset: usize) -> bool {
        if offset < self.start || offset > self.stop { return false; }
        self.step == 0 || (offset - self.start) % self.step == 0
    }

    /// Moves every offset up by `delta`.
    pub fn shift(&self, delta: usize) -> Self {
        Self {start: self.start + delta, stop: self.stop + delta, step: self.step}
    }

    /// The offsets, in increasing order.
    pub fn iter(&self) -> impl Iterator<Item=usize> + '_ {
        (0..self.size()).map(move |i| self.start + i * self.step)
    }

    /// Returns the progression of the offsets common to `self` and `other`,
    /// or `None` if there are none.
    ///
    /// The operation is commutative.
    ///
    /// ```
    /// use ndview::Range;
    /// let a = Range::new(0, 20, 4);
    /// let b = Range::new(2, 20, 6);
    /// assert_eq!(a.intersect(&b), Some(Range::new(8, 20, 12)));
    /// assert_eq!(Range::new(0, 10, 2).intersect(&Range::new(1, 11, 2)), None);
    /// ```
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let low = self.start.max(other.start);
        let high = self.stop.min(other.stop);
        if low > high { return None; }
        match (self.step, other.step) {
            (0, _) => if other.contains(self.start) { Some(*self) } else { None },
            (_, 0) => if self.contains(other.start) { Some(*other) } else { None },
            (step1, step2) => {
                // Solve `start1 + step1 * k == start2 (mod step2)` for `k`.
                let (step1, step2) = (step1 as i128, step2 as i128);
                let (start1, start2) = (self.start as i128, other.start as i128);
                let (g, bezout1, _) = extended_gcd(step1, step2);
                let delta = start2 - start1;
                if delta % g != 0 { return None; }
                let period = step2 / g;
                let k = ((delta / g) % period * bezout1).rem_euclid(period);
                let lcm = step1 * period;
                let solution = start1 + step1 * k;
                // Smallest solution not below `low`, and largest not above `high`.
                let (low, high) = (low as i128, high as i128);
                let first = solution + ceil_div(low - solution, lcm) * lcm;
                if first > high { return None; }
                let last = first + (high - first) / lcm * lcm;
                Some(Self::new(first as usize, last as usize, lcm as usize))
            },
        }
    }
}

impl From<std::ops::RangeInclusive<usize>> for Range {
    fn from(r: std::ops::RangeInclusive<usize>) -> Self {
        Self::new(*r.start(), *r.end(), 1)
    }
}

// ----------------------------------------------------------------------------

/// Returns `(g, x, y)` such that `g` is the greatest common divisor of `a`
/// and `b`, and `a * x + b * y == g`.
pub(crate) fn extended_gcd(a: i128, b: i128) -> (i128, i128, i128) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_x, mut x) = (1, 0);
    let (mut old_y, mut y) = (0, 1);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_x, x) = (x, old_x - q * x);
        (old_y, y) = (y, old_y - q * y);
    }
    if old_r < 0 { (-old_r, -old_x, -old_y) } else { (old_r, old_x, old_y) }
}

/// Division rounding towards positive infinity. `b` must be positive.
fn ceil_div(a: i128, b: i128) -> i128 {
    -((-a).div_euclid(b))
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn offsets(r: &Range) -> BTreeSet<usize> { r.iter().collect() }

    /// Every progression with a start, step and length in a small window.
    fn small_ranges() -> Vec<Range> {
        let mut ranges = Vec::new();
        for start in 0..7 {
            ranges.push(Range::point(start));
            for step in 1..6 {
                for len in 2..5 {
                    ranges.push(Range::new(start, start + (len - 1) * step, step));
                }
            }
        }
        ranges
    }

    #[test]
    fn test_new_normalises() {
        assert_eq!(Range::new(3, 3, 5), Range::point(3));
        assert_eq!(Range::new(3, 7, 5), Range::point(3));
        assert_eq!(Range::new(3, 9, 5), Range {start: 3, stop: 8, step: 5});
        assert_eq!(Range::new(0, 9, 0), Range::point(0));
        assert_eq!(Range::point(4).size(), 1);
        assert_eq!(Range::from(2..=5).size(), 4);
    }

    #[test]
    fn test_contains_and_nth() {
        let r = Range::new(1, 13, 4);
        assert!(r.contains(9));
        assert!(!r.contains(11));
        assert!(!r.contains(17));
        assert_eq!(r.nth(3), Some(13));
        assert_eq!(r.nth(4), None);
        assert_eq!(r.shift(10), Range::new(11, 23, 4));
    }

    #[test]
    fn test_extended_gcd() {
        for (a, b) in [(240, 46), (6, 4), (7, 13), (5, 5), (1, 9)] {
            let (g, x, y) = extended_gcd(a, b);
            assert_eq!(a * x + b * y, g);
            assert_eq!(a % g, 0);
            assert_eq!(b % g, 0);
        }
        assert_eq!(extended_gcd(240, 46).0, 2);
    }

    #[test]
    fn test_intersect_degenerate() {
        let r = Range::new(2, 14, 3);
        assert_eq!(r.intersect(&Range::point(8)), Some(Range::point(8)));
        assert_eq!(Range::point(8).intersect(&r), Some(Range::point(8)));
        assert_eq!(r.intersect(&Range::point(9)), None);
        assert_eq!(Range::point(4).intersect(&Range::point(4)), Some(Range::point(4)));
        assert_eq!(Range::point(4).intersect(&Range::point(5)), None);
    }

    #[test]
    fn test_intersect_matches_brute_force() {
        let ranges = small_ranges();
        for a in &ranges {
            for b in &ranges {
                let expected: Vec<usize> = offsets(a).intersection(&offsets(b)).copied().collect();
                let actual: Vec<usize> = a.intersect(b).map_or(Vec::new(), |r| r.iter().collect());
                assert_eq!(actual, expected, "{:?} & {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_intersect_is_commutative() {
        let ranges = small_ranges();
        for a in &ranges {
            for b in &ranges {
                assert_eq!(a.intersect(b), b.intersect(a), "{:?} & {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_intersect_large_steps() {
        let a = Range::new(1_000_003, 1_000_003 + 997 * 3000, 997);
        let b = Range::new(3, 3 + 1009 * 4000, 1009);
        let r = a.intersect(&b).unwrap();
        assert_eq!(r.step, 997 * 1009);
        assert!(a.contains(r.start) && b.contains(r.start));
        assert!(a.contains(r.stop) && b.contains(r.stop));
    }

    #[test]
    fn test_deserialize_checks_invariants() {
        let r: Range = serde_json::from_str(r#"{"start": 2, "stop": 11, "step": 3}"#).unwrap();
        assert_eq!(r, Range::new(2, 11, 3));
        assert_eq!(serde_json::from_str::<Range>(&serde_json::to_string(&r).unwrap()).unwrap(), r);
        let point: Range = serde_json::from_str(r#"{"start": 4, "stop": 4, "step": 0}"#).unwrap();
        assert_eq!(point, Range::point(4));
        for bad in [
            r#"{"start": 9, "stop": 2, "step": 1}"#,
            r#"{"start": 2, "stop": 10, "step": 3}"#,
            r#"{"start": 2, "stop": 5, "step": 0}"#,
            r#"{"start": 2, "stop": 2, "step": 3}"#,
        ] {
            assert!(serde_json::from_str::<Range>(bad).is_err(), "{}", bad);
        }
    }
}
