use super::{Shape};

/// The type of error for indexing, viewing and shape operations.
///
/// Every error is raised synchronously at the point of resolution. None of
/// them is transient: they all describe a malformed request, so a failed
/// call never yields a partial [`View`].
///
/// [`View`]: super::View
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum IndexError {
    #[error("index of an empty array requested")]
    EmptyArrayIndexed,

    #[error("index {index} out of bounds for axis {axis} with size {extent}")]
    IndexOutOfBounds { index: isize, axis: usize, extent: usize },

    #[error("too many indices for array: array is {rank}-dimensional, but {given} were indexed")]
    TooManyAxesIndexed { rank: usize, given: usize },

    #[error("invalid index expression `{clause}`")]
    InvalidIndexSyntax { clause: String },

    #[error("slice step cannot be zero (axis {axis})")]
    ZeroStep { axis: usize },

    #[error("boolean index `{clause}` must be the last one")]
    MisplacedBooleanPredicate { clause: String },

    #[error("invalid comparison operator in `{clause}`")]
    InvalidOperator { clause: String },

    #[error("cannot compare elements with `{literal}`")]
    InvalidLiteral { literal: String },

    #[error("index {index} out of range {len}")]
    SelectionOutOfBounds { index: usize, len: usize },

    #[error("shape {shape} needs {} elements, got {len}", shape.size())]
    ShapeMismatch { shape: Shape, len: usize },

    #[error("invalid shape `{text}`")]
    InvalidShape { text: String },

    #[error("operands could not be broadcast together with shapes ({lhs}) ({rhs})")]
    IncompatibleShapes { lhs: Shape, rhs: Shape },
}
