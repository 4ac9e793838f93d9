//! The index expression language.
//!
//! An index expression holds one clause per axis, separated by commas:
//!
//! - an empty clause (or `:`) leaves its axis unconstrained;
//! - an integer such as `1` or `-1` picks one position, counting from the
//!   end of the axis when negative;
//! - `start:stop` or `start:stop:step` picks every `step`th position from
//!   `start` up to but excluding `stop`. Any part may be omitted;
//! - `name op literal`, where `op` is one of `<`, `<=`, `==`, `!=`, `>=`, `>`,
//!   keeps the elements of the whole array that compare true with `literal`.
//!   It must be the last clause.

use std::fmt;
use std::str::{FromStr};

use serde::{Deserialize, Serialize};

use super::{Shape, IndexError};

/// A comparison between an element and a literal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Less,
    LessEqual,
    Equal,
    NotEqual,
    GreaterEqual,
    Greater,
}

impl Operator {
    /// Every `Operator` spelling, longest first so that a prefix never
    /// shadows a longer operator.
    const SPELLINGS: [(&'static str, Operator); 8] = [
        (">=", Self::GreaterEqual),
        ("<=", Self::LessEqual),
        ("==", Self::Equal),
        ("!=", Self::NotEqual),
        ("<>", Self::NotEqual),
        (">", Self::Greater),
        ("=", Self::Equal),
        ("<", Self::Less),
    ];

    /// The canonical spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterEqual => ">=",
            Self::Greater => ">",
        }
    }

    /// The `Operator` that is true exactly when `self` is false, for totally
    /// ordered operands.
    pub fn complement(self) -> Self {
        match self {
            Self::Less => Self::GreaterEqual,
            Self::LessEqual => Self::Greater,
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
            Self::GreaterEqual => Self::Less,
            Self::Greater => Self::LessEqual,
        }
    }

    /// Applies `self` to `lhs` and `rhs`.
    pub fn eval<T: PartialOrd>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            Self::Less => lhs < rhs,
            Self::LessEqual => lhs <= rhs,
            Self::Equal => lhs == rhs,
            Self::NotEqual => lhs != rhs,
            Self::GreaterEqual => lhs >= rhs,
            Self::Greater => lhs > rhs,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.symbol()) }
}

impl FromStr for Operator {
    type Err = IndexError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::SPELLINGS.iter()
            .find(|(spelling, _)| *spelling == text)
            .map(|&(_, op)| op)
            .ok_or_else(|| IndexError::InvalidOperator {clause: text.to_string()})
    }
}

// ----------------------------------------------------------------------------

/// Keeps the elements `x` for which `x operator literal` holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate<T> {
    pub operator: Operator,
    pub literal: T,
}

impl<T: PartialOrd> Predicate<T> {
    pub fn new(operator: Operator, literal: T) -> Self { Self {operator, literal} }

    /// Returns `true` if `item` is kept.
    #[inline(always)]
    pub fn test(&self, item: &T) -> bool { self.operator.eval(item, &self.literal) }
}

// ----------------------------------------------------------------------------

/// One clause of an index expression, validated against its axis.
///
/// ```
/// use ndview::{IndexSpec, Operator, Predicate};
/// assert_eq!(IndexSpec::<i32>::parse("-1", 0, 5).unwrap(), IndexSpec::Subsetting(4));
/// assert_eq!(IndexSpec::<i32>::parse("1::2", 0, 5).unwrap(), IndexSpec::Slicing {start: 1, stop: 5, step: 2});
/// assert_eq!(
///     IndexSpec::<i32>::parse("array <= 2", 0, 5).unwrap(),
///     IndexSpec::Predicate(Predicate::new(Operator::LessEqual, 2)),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndexSpec<T> {
    /// No constraint.
    All,
    /// A single position, already normalised into `0..extent`.
    Subsetting(usize),
    /// Positions `start, start + step, ...` below `stop`. Bounds are
    /// normalised into `0..=extent`.
    Slicing { start: usize, stop: usize, step: usize },
    /// A filter on the elements of the whole array.
    Predicate(Predicate<T>),
}

impl<T: FromStr> IndexSpec<T> {
    /// Parses `clause` as a constraint on axis `axis`, which has `extent`
    /// positions.
    pub fn parse(clause: &str, axis: usize, extent: usize) -> Result<Self, IndexError> {
        let clause = clause.trim();
        if clause.is_empty() { return Ok(Self::All); }
        if is_integer(clause) {
            return Ok(Self::Subsetting(normalise(parse_isize(clause)?, axis, extent, false)?));
        }
        if clause.bytes().all(|b| b == b':' || b == b'-' || b == b' ' || b.is_ascii_digit()) {
            return parse_slice(clause, axis, extent);
        }
        parse_predicate(clause).map(Self::Predicate)
    }
}

impl<T> IndexSpec<T> {
    /// The number of positions this clause keeps along an axis of `extent`
    /// positions, or `None` if the axis is dropped from the result.
    pub fn count(&self, extent: usize) -> Option<usize> {
        match *self {
            Self::All => Some(extent),
            Self::Subsetting(_) => None,
            Self::Slicing {start, stop, step} => Some(slice_len(start, stop, step)),
            Self::Predicate(_) => None,
        }
    }

    pub fn is_predicate(&self) -> bool { matches!(self, Self::Predicate(_)) }
}

/// Parses a whole index expression against an array of shape `shape`.
///
/// Trailing empty clauses are ignored, so `"0:1,"` constrains one axis.
///
/// ```
/// use ndview::{Shape, IndexSpec, parse_expression};
/// let specs = parse_expression::<i32>("0:1, 1", &Shape::new([2, 3])).unwrap();
/// assert_eq!(specs, [IndexSpec::Slicing {start: 0, stop: 1, step: 1}, IndexSpec::Subsetting(1)]);
/// assert!(parse_expression::<i32>("0, 0, 0", &Shape::new([2, 3])).is_err());
/// ```
pub fn parse_expression<T: FromStr>(expr: &str, shape: &Shape) -> Result<Vec<IndexSpec<T>>, IndexError> {
    let mut clauses: Vec<&str> = expr.split(',').map(str::trim).collect();
    while clauses.last().map_or(false, |clause| clause.is_empty()) { clauses.pop(); }
    let given = clauses.iter().filter(|clause| !looks_like_predicate(clause)).count();
    let mut specs: Vec<IndexSpec<T>> = Vec::with_capacity(clauses.len());
    for (axis, clause) in clauses.iter().enumerate() {
        if let Some(IndexSpec::Predicate(_)) = specs.last() {
            return Err(IndexError::MisplacedBooleanPredicate {clause: clauses[axis - 1].to_string()});
        }
        if looks_like_predicate(clause) {
            specs.push(IndexSpec::Predicate(parse_predicate(clause)?));
            continue;
        }
        if axis >= shape.ndim() {
            return Err(IndexError::TooManyAxesIndexed {rank: shape.ndim(), given});
        }
        specs.push(IndexSpec::parse(clause, axis, shape[axis])?);
    }
    Ok(specs)
}

// ----------------------------------------------------------------------------

/// The number of positions in `start..stop` stepping by `step`, or `0` if
/// `step` is zero.
pub(crate) fn slice_len(start: usize, stop: usize, step: usize) -> usize {
    if start >= stop || step == 0 { 0 } else { (stop - start + step - 1) / step }
}

fn is_integer(clause: &str) -> bool {
    let digits = clause.strip_prefix('-').unwrap_or(clause);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn looks_like_predicate(clause: &str) -> bool {
    clause.bytes().any(|b| matches!(b, b'<' | b'>' | b'=' | b'!'))
}

fn parse_isize(text: &str) -> Result<isize, IndexError> {
    text.parse().map_err(|_| IndexError::InvalidIndexSyntax {clause: text.to_string()})
}

/// Resolves a possibly negative position against an axis.
///
/// Positions equal to `extent` are accepted only if `inclusive`.
pub(crate) fn normalise(index: isize, axis: usize, extent: usize, inclusive: bool) -> Result<usize, IndexError> {
    let out_of_bounds = || IndexError::IndexOutOfBounds {index, axis, extent};
    let position = if index < 0 {
        extent.checked_sub(index.unsigned_abs()).ok_or_else(out_of_bounds)?
    } else {
        index as usize
    };
    if position > extent || (position == extent && !inclusive) { return Err(out_of_bounds()); }
    Ok(position)
}

fn parse_slice<T>(clause: &str, axis: usize, extent: usize) -> Result<IndexSpec<T>, IndexError> {
    let syntax_error = || IndexError::InvalidIndexSyntax {clause: clause.to_string()};
    let parts: Vec<&str> = clause.split(':').map(str::trim).collect();
    if parts.len() > 3 { return Err(syntax_error()); }
    let part = |i: usize| -> Result<Option<isize>, IndexError> {
        match parts.get(i) {
            None | Some(&"") => Ok(None),
            Some(text) if is_integer(text) => parse_isize(text).map(Some),
            Some(_) => Err(syntax_error()),
        }
    };
    let step = match part(2)? {
        None => 1,
        Some(0) => return Err(IndexError::ZeroStep {axis}),
        Some(step) if step < 0 => return Err(syntax_error()),
        Some(step) => step as usize,
    };
    let start = part(0)?.map_or(Ok(0), |start| normalise(start, axis, extent, true))?;
    let stop = part(1)?.map_or(Ok(extent), |stop| normalise(stop, axis, extent, true))?;
    Ok(IndexSpec::Slicing {start, stop, step})
}

fn parse_predicate<T: FromStr>(clause: &str) -> Result<Predicate<T>, IndexError> {
    let syntax_error = || IndexError::InvalidIndexSyntax {clause: clause.to_string()};
    let is_op = |c: char| matches!(c, '<' | '>' | '=' | '!');
    let begin = clause.find(is_op).ok_or_else(syntax_error)?;
    let end = clause[begin..].find(|c: char| !is_op(c)).map_or(clause.len(), |n| begin + n);
    let name = clause[..begin].trim();
    let literal = clause[end..].trim();
    let valid_name = name.chars().next().map_or(false, |c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !valid_name || literal.is_empty() { return Err(syntax_error()); }
    let operator = clause[begin..end].parse::<Operator>()
        .map_err(|_| IndexError::InvalidOperator {clause: clause.to_string()})?;
    let literal = literal.parse::<T>()
        .map_err(|_| IndexError::InvalidLiteral {literal: literal.to_string()})?;
    Ok(Predicate {operator, literal})
}

// ----------------------------------------------------------------------------
