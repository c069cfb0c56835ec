//! Factories for common matrices.

use crate::error::LinalgError;
use crate::matrix::Matrix;
use crate::ops::NumericOps;
use crate::vector::Vector;

/// Stateless constructors for structured matrices.
///
/// # Examples
///
/// ```
/// use linalg_core::MatrixBuilder;
///
/// let eye = MatrixBuilder::identity::<i32>(3).unwrap();
/// assert_eq!(eye[(1, 1)], 1);
/// assert_eq!(eye[(0, 1)], 0);
///
/// let ones = MatrixBuilder::all(2, 3, 1.0_f64).unwrap();
/// assert_eq!(ones.shape(), (2, 3));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixBuilder;

impl MatrixBuilder {
    /// `n × n` identity matrix.
    ///
    /// # Errors
    ///
    /// - `LinalgError::EmptyDimension` when `n == 0`
    /// - `LinalgError::SizeOverflow` when `n²` overflows `usize`
    pub fn identity<T: NumericOps>(n: usize) -> Result<Matrix<T>, LinalgError> {
        let mut m = Matrix::zeros(n, n)?;
        for i in 0..n {
            m[(i, i)] = T::one();
        }
        Ok(m)
    }

    /// `rows × cols` matrix with every element equal to `value`.
    pub fn all<T: NumericOps>(rows: usize, cols: usize, value: T) -> Result<Matrix<T>, LinalgError> {
        Matrix::filled(value, rows, cols)
    }

    /// Square matrix with `diagonal` on its main diagonal and zeros elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::SizeOverflow` when `len²` overflows `usize`.
    pub fn diagonal<T: NumericOps>(diagonal: &Vector<T>) -> Result<Matrix<T>, LinalgError> {
        let mut m = Matrix::zeros(diagonal.len(), diagonal.len())?;
        for (i, d) in diagonal.iter().enumerate() {
            m[(i, i)] = d;
        }
        Ok(m)
    }
}
