use thiserror::Error;

use crate::dtype::ScalarType;

/// A value being cast has sub-arrays of differing lengths at some depth.
///
/// Always fatal to the cast: no buffer is allocated for a ragged value.
#[derive(Debug, Error)]
#[error("ragged nested arrays are not supported")]
pub struct RaggedArrayError;

/// Errors from forcing a buffer's payload into a target scalar type.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The buffer's byte length is inconsistent with its shape and dtype.
    #[error("wrong byte length for {dtype:?} buffer: expected {expected}, got {actual}")]
    WrongByteLen {
        dtype: ScalarType,
        expected: usize,
        actual: usize,
    },
}

/// Errors returned by [`crate::marshal::load`]. All are recoverable: the
/// caller may retry with a different target type or buffer.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The buffer's dimensionality differs from the target's nesting depth.
    #[error("dimensionality mismatch: buffer has {actual} axes, target type has {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A statically sized axis of the target cannot take the buffer's length.
    #[error("static axis {axis} is fixed at {expected}, buffer reports {actual}")]
    StaticAxisMismatch {
        axis: usize,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Errors from validated interchange buffer construction.
#[derive(Debug, Error)]
pub enum BufferError {
    /// `product(shape)` overflowed `usize`.
    #[error("shape element count overflow")]
    ShapeOverflow,

    /// The byte buffer length doesn't match `product(shape) * dtype.size()`.
    #[error("wrong byte length: expected {expected}, got {actual}")]
    WrongByteLen { expected: usize, actual: usize },

    /// Constructing from an `ndarray` requires standard layout (contiguous, row-major).
    #[error("ndarray is not standard layout")]
    NonContiguous,

    /// `bool` buffers must be encoded as 0/1 bytes.
    #[error("invalid bool byte (expected 0 or 1)")]
    InvalidBoolByte,
}
