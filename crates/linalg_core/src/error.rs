//! Error types for dense container construction and arithmetic.
//!
//! Every fallible operation in this crate returns [`LinalgError`]. Shape
//! errors are surfaced synchronously at the call that caused them and are
//! never recovered internally.

use thiserror::Error;

/// Shape of an operand as `(rows, cols)`.
///
/// Vectors report themselves as `(len, 1)`.
pub type Shape = (usize, usize);

/// Errors from vector and matrix operations.
///
/// # Variants
/// - `DimensionMismatch`: Operand shapes are incompatible for the operation
/// - `EmptyDimension`: A container with zero rows, columns or elements was requested
/// - `RaggedRows`: Nested row input where a row has the wrong length
/// - `BufferLength`: Flat buffer does not hold exactly `rows * cols` elements
/// - `SizeOverflow`: `rows * cols` does not fit in `usize`
/// - `IndexOutOfBounds`: Element access outside the container
/// - `NotOneDimensional`: Matrix cannot be reinterpreted as a vector
/// - `NotScalar`: Matrix cannot be narrowed to a scalar
///
/// # Examples
/// ```
/// use linalg_core::LinalgError;
///
/// let err = LinalgError::DimensionMismatch {
///     operation: "add",
///     left: (2, 3),
///     right: (3, 2),
/// };
/// assert_eq!(
///     format!("{}", err),
///     "Invalid dimensions for add: 2x3 and 3x2"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinalgError {
    /// Operand shapes are incompatible.
    #[error("Invalid dimensions for {operation}: {}x{} and {}x{}", .left.0, .left.1, .right.0, .right.1)]
    DimensionMismatch {
        /// Name of the operation that rejected the operands
        operation: &'static str,
        /// Shape of the left operand
        left: Shape,
        /// Shape of the right operand
        right: Shape,
    },

    /// Zero-sized container requested.
    #[error("Container dimensions must be at least 1x1, got {}x{}", .shape.0, .shape.1)]
    EmptyDimension {
        /// Requested shape
        shape: Shape,
    },

    /// Row has a different length from the first row.
    #[error("Row {row} has {found} elements, expected {expected}")]
    RaggedRows {
        /// Index of the offending row
        row: usize,
        /// Length of the first row
        expected: usize,
        /// Length of the offending row
        found: usize,
    },

    /// Flat buffer length does not match the requested shape.
    #[error("Buffer of {len} elements cannot back a {}x{} matrix", .shape.0, .shape.1)]
    BufferLength {
        /// Requested shape
        shape: Shape,
        /// Length of the supplied buffer
        len: usize,
    },

    /// Element count overflows `usize`.
    #[error("Element count of a {}x{} container overflows usize", .shape.0, .shape.1)]
    SizeOverflow {
        /// Requested shape
        shape: Shape,
    },

    /// Index outside the container.
    #[error("Index ({}, {}) out of bounds for {}x{}", .index.0, .index.1, .shape.0, .shape.1)]
    IndexOutOfBounds {
        /// Requested `(row, col)`; vectors use `(i, 0)`
        index: Shape,
        /// Shape of the container
        shape: Shape,
    },

    /// Matrix is neither a single row nor a single column.
    #[error("Matrix not 1 dimensional: {}x{}", .shape.0, .shape.1)]
    NotOneDimensional {
        /// Shape of the matrix
        shape: Shape,
    },

    /// Matrix is not 1x1.
    #[error("Invalid dimensions for casting to scalar: {}x{}", .shape.0, .shape.1)]
    NotScalar {
        /// Shape of the matrix
        shape: Shape,
    },
}

impl LinalgError {
    /// Create a dimension mismatch error.
    pub fn mismatch(operation: &'static str, left: Shape, right: Shape) -> Self {
        Self::DimensionMismatch {
            operation,
            left,
            right,
        }
    }

    /// Check whether this error is a shape incompatibility between operands.
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = LinalgError::mismatch("matrix multiplication", (2, 3), (2, 3));
        assert_eq!(
            format!("{}", err),
            "Invalid dimensions for matrix multiplication: 2x3 and 2x3"
        );
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_empty_dimension_display() {
        let err = LinalgError::EmptyDimension { shape: (0, 4) };
        assert!(format!("{}", err).contains("0x4"));
        assert!(!err.is_dimension_mismatch());
    }

    #[test]
    fn test_ragged_rows_display() {
        let err = LinalgError::RaggedRows {
            row: 2,
            expected: 3,
            found: 1,
        };
        assert_eq!(format!("{}", err), "Row 2 has 1 elements, expected 3");
    }

    #[test]
    fn test_not_scalar_display() {
        let err = LinalgError::NotScalar { shape: (2, 1) };
        assert!(format!("{}", err).contains("casting to scalar"));
    }

    #[test]
    fn test_error_clone_eq() {
        let err = LinalgError::IndexOutOfBounds {
            index: (5, 0),
            shape: (3, 1),
        };
        assert_eq!(err.clone(), err);
    }
}
