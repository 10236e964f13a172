//! Error types that are reported by container operations.
//!
//! All of these errors are recoverable. An operation that returns one of them
//! has not modified the container it was called on.

use std::error::Error;
use std::fmt::{Display, Formatter};

use smallvec::SmallVec;

/// Shape of a container as recorded in an error.
pub type ShapeVec = SmallVec<[usize; 4]>;

/// Error when a coordinate is outside the shape of a container.
///
/// This is reported by checked accessors such as
/// [`get`](crate::NdContainer::get) and when building selection views.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexError {
    /// Axis of the offending coordinate.
    pub axis: usize,

    /// The offending coordinate.
    pub index: usize,

    /// Shape of the container that was accessed.
    pub shape: ShapeVec,
}

impl Display for IndexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "index {} out of range for axis {} of shape {:?}",
            self.index,
            self.axis,
            self.shape.as_slice()
        )
    }
}

impl Error for IndexError {}

/// Error when the operands of a binary operation have different shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeError {
    pub left: ShapeVec,
    pub right: ShapeVec,
}

impl ShapeError {
    pub(crate) fn new(left: &[usize], right: &[usize]) -> ShapeError {
        ShapeError {
            left: left.into(),
            right: right.into(),
        }
    }
}

impl Display for ShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "incompatible shapes {:?} and {:?}",
            self.left.as_slice(),
            self.right.as_slice()
        )
    }
}

impl Error for ShapeError {}

/// Errors that can occur when applying a view transform.
#[derive(Clone, Debug, PartialEq)]
pub enum TransformError {
    /// The range `index..index + width` does not fit in an axis of length
    /// `size`.
    InvalidRange {
        axis: usize,
        index: usize,
        width: usize,
        size: usize,
    },

    /// A stride factor was zero.
    InvalidStride { axis: usize },

    /// An axis order was not a permutation of the container's axes.
    InvalidPermutation { order: ShapeVec },
}

impl Display for TransformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::InvalidRange {
                axis,
                index,
                width,
                size,
            } => write!(
                f,
                "range {}..{} is invalid for axis {} of size {}",
                index,
                index.saturating_add(*width),
                axis,
                size
            ),
            TransformError::InvalidStride { axis } => {
                write!(f, "stride for axis {} must be positive", axis)
            }
            TransformError::InvalidPermutation { order } => {
                write!(f, "axis order {:?} is not a permutation", order.as_slice())
            }
        }
    }
}

impl Error for TransformError {}

/// Errors that can occur when reshaping a container.
#[derive(Clone, Debug, PartialEq)]
pub enum ReshapeError {
    /// The product of the requested dimensions differs from the source length.
    LengthMismatch { len: usize, shape: ShapeVec },
}

impl Display for ReshapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReshapeError::LengthMismatch { len, shape } => write!(
                f,
                "cannot reshape {} elements into shape {:?}",
                len,
                shape.as_slice()
            ),
        }
    }
}

impl Error for ReshapeError {}

/// Errors from operations that take a second operand and a list of indices.
#[derive(Clone, Debug, PartialEq)]
pub enum OperandError {
    /// The operands have different shapes.
    Shape(ShapeError),

    /// An index in the list is out of range.
    Index(IndexError),
}

impl From<ShapeError> for OperandError {
    fn from(err: ShapeError) -> OperandError {
        OperandError::Shape(err)
    }
}

impl From<IndexError> for OperandError {
    fn from(err: IndexError) -> OperandError {
        OperandError::Index(err)
    }
}

impl Display for OperandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OperandError::Shape(err) => write!(f, "{}", err),
            OperandError::Index(err) => write!(f, "{}", err),
        }
    }
}

impl Error for OperandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            OperandError::Shape(err) => Some(err),
            OperandError::Index(err) => Some(err),
        }
    }
}
