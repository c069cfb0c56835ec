//! Error types for the minimisers.
//!
//! Non-convergence is not an error: a run that stops on a degenerate step or
//! a NaN gradient still yields a report with its best iterate (see
//! [`Termination`](crate::Termination)). `OptimiserError` covers the cases
//! where no meaningful report can be produced.

use linalg_core::LinalgError;
use thiserror::Error;

/// Minimiser errors.
///
/// # Variants
/// - `GradientDimension`: Gradient callback returned a vector of the wrong length
/// - `Linalg`: Shape error from the underlying vector and matrix arithmetic
/// - `InvalidConfig`: Configuration failed validation
/// - `TaskFailed`: Background minimisation task panicked or was aborted
///
/// # Examples
/// ```
/// use linalg_optimiser::OptimiserError;
///
/// let err = OptimiserError::GradientDimension { expected: 3, found: 2 };
/// assert_eq!(
///     format!("{}", err),
///     "Gradient has 2 elements, expected 3"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimiserError {
    /// Gradient length differs from the point it was evaluated at.
    #[error("Gradient has {found} elements, expected {expected}")]
    GradientDimension {
        /// Length of the input point
        expected: usize,
        /// Length returned by the gradient callback
        found: usize,
    },

    /// Vector or matrix arithmetic failed.
    #[error("Linear algebra error: {0}")]
    Linalg(#[from] LinalgError),

    /// Configuration rejected by `validate`.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Spawned minimisation task did not complete.
    #[error("Minimisation task failed: {0}")]
    TaskFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linalg_error_converts() {
        let inner = LinalgError::mismatch("vector addition", (2, 1), (3, 1));
        let err: OptimiserError = inner.clone().into();
        assert_eq!(err, OptimiserError::Linalg(inner));
        assert!(format!("{}", err).contains("vector addition"));
    }

    #[test]
    fn test_invalid_config_display() {
        let err = OptimiserError::InvalidConfig("gradient_tolerance must be positive".into());
        assert_eq!(
            format!("{}", err),
            "Invalid configuration: gradient_tolerance must be positive"
        );
    }

    #[test]
    fn test_task_failed_display() {
        let err = OptimiserError::TaskFailed("task panicked".into());
        assert!(format!("{}", err).contains("task panicked"));
    }
}
