//! Fixed-length dense vector.
//!
//! [`Vector<T>`] owns its storage exclusively. Its length is fixed at
//! construction and is always at least one. Arithmetic never mutates the
//! operands; every operation returns a freshly allocated vector, and the only
//! in-place mutation is indexed assignment.
//!
//! ## Construction
//!
//! | Constructor | Storage |
//! |-------------|---------|
//! | [`Vector::from_vec`] | adopts the caller's `Vec` without copying |
//! | [`Vector::from_slice`] | clones the borrowed values |
//! | [`Vector::zeros`] / [`Vector::filled`] | fresh allocation |
//! | [`Vector::from_matrix`] | copies a 1×N or N×1 matrix |
//! | `Clone` | deep copy |
//!
//! # Example
//!
//! ```
//! use linalg_core::Vector;
//!
//! let a = Vector::from_vec(vec![1.0, 2.0, 3.0]).unwrap();
//! let b = Vector::from_slice(&[4.0, 5.0, 6.0]).unwrap();
//!
//! assert_eq!(a.dot(&b).unwrap(), 32.0);
//! assert_eq!(a.add(&b).unwrap().as_slice(), &[5.0, 7.0, 9.0]);
//! assert!((a.euclidean_norm() - 14.0_f64.sqrt()).abs() < 1e-15);
//! ```

use std::fmt;
use std::ops::{Div, Index, IndexMut, Mul, Neg};

use num_traits::Float;

use crate::error::{LinalgError, Shape};
use crate::matrix::{Matrix, Orientation};
use crate::ops::NumericOps;

/// Dense vector of `len() >= 1` elements.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "Vec<T>",
        into = "Vec<T>",
        bound(
            serialize = "T: NumericOps + serde::Serialize",
            deserialize = "T: NumericOps + serde::Deserialize<'de>"
        )
    )
)]
pub struct Vector<T> {
    values: Vec<T>,
}

impl<T: NumericOps> Vector<T> {
    /// Adopt an owned buffer as vector storage without copying.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::EmptyDimension` if `values` is empty.
    pub fn from_vec(values: Vec<T>) -> Result<Self, LinalgError> {
        if values.is_empty() {
            return Err(LinalgError::EmptyDimension { shape: (0, 1) });
        }
        Ok(Self { values })
    }

    /// Create a vector holding a copy of `values`.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::EmptyDimension` if `values` is empty.
    pub fn from_slice(values: &[T]) -> Result<Self, LinalgError> {
        Self::from_vec(values.to_vec())
    }

    /// Create a zero-filled vector of length `len`.
    pub fn zeros(len: usize) -> Result<Self, LinalgError> {
        Self::filled(T::zero(), len)
    }

    /// Create a vector of length `len` with every element set to `value`.
    pub fn filled(value: T, len: usize) -> Result<Self, LinalgError> {
        Self::from_vec(vec![value; len])
    }

    /// Reinterpret a single-row or single-column matrix as a vector.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::NotOneDimensional` unless the matrix is 1×N or N×1.
    pub fn from_matrix(matrix: &Matrix<T>) -> Result<Self, LinalgError> {
        let (rows, cols) = matrix.shape();
        if rows != 1 && cols != 1 {
            return Err(LinalgError::NotOneDimensional {
                shape: (rows, cols),
            });
        }
        Ok(Self::from_raw(matrix.as_slice().to_vec()))
    }

    /// Wrap a buffer already known to be non-empty.
    #[inline]
    pub(crate) fn from_raw(values: Vec<T>) -> Self {
        debug_assert!(!values.is_empty());
        Self { values }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; a vector holds at least one element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Shape as a column, `(len, 1)`.
    #[inline]
    pub fn shape(&self) -> Shape {
        (self.len(), 1)
    }

    /// Element at `i`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, i: usize) -> Option<T> {
        self.values.get(i).copied()
    }

    /// Overwrite the element at `i`.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::IndexOutOfBounds` when `i >= len()`.
    pub fn set(&mut self, i: usize, value: T) -> Result<(), LinalgError> {
        let shape = self.shape();
        match self.values.get_mut(i) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(LinalgError::IndexOutOfBounds {
                index: (i, 0),
                shape,
            }),
        }
    }

    /// Read-only view of the elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Iterate over the elements by value.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.values.iter().copied()
    }

    /// Consume the vector and return its storage.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.values
    }

    /// Apply `f` to every element.
    pub fn map<U: NumericOps, F: Fn(T) -> U>(&self, f: F) -> Vector<U> {
        Vector::from_raw(self.values.iter().map(|&v| f(v)).collect())
    }

    fn check_same_len(&self, other: &Self, operation: &'static str) -> Result<(), LinalgError> {
        if self.len() != other.len() {
            return Err(LinalgError::mismatch(operation, self.shape(), other.shape()));
        }
        Ok(())
    }

    fn zip_with<F: Fn(T, T) -> T>(
        &self,
        other: &Self,
        operation: &'static str,
        f: F,
    ) -> Result<Self, LinalgError> {
        self.check_same_len(other, operation)?;
        Ok(Self::from_raw(
            self.values
                .iter()
                .zip(&other.values)
                .map(|(&l, &r)| f(l, r))
                .collect(),
        ))
    }

    /// Elementwise sum.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::DimensionMismatch` if the lengths differ.
    pub fn add(&self, other: &Self) -> Result<Self, LinalgError> {
        self.zip_with(other, "vector addition", T::add)
    }

    /// Elementwise difference.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::DimensionMismatch` if the lengths differ.
    pub fn sub(&self, other: &Self) -> Result<Self, LinalgError> {
        self.zip_with(other, "vector subtraction", T::subtract)
    }

    /// Elementwise negation.
    pub fn neg(&self) -> Self {
        self.map(T::negate)
    }

    /// Inner product `Σ lᵢ·rᵢ`.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::DimensionMismatch` if the lengths differ.
    pub fn dot(&self, other: &Self) -> Result<T, LinalgError> {
        self.check_same_len(other, "vector multiplication")?;
        Ok(self
            .values
            .iter()
            .zip(&other.values)
            .fold(T::zero(), |acc, (&l, &r)| T::multiply_add(l, r, acc)))
    }

    /// Elementwise (Hadamard) product.
    pub fn hadamard(&self, other: &Self) -> Result<Self, LinalgError> {
        self.zip_with(other, "hadamard multiplication", T::multiply)
    }

    /// Elementwise quotient `lᵢ / rᵢ`.
    pub fn elementwise_div(&self, other: &Self) -> Result<Self, LinalgError> {
        self.zip_with(other, "hadamard division", T::divide)
    }

    /// Multiply every element by `k`.
    pub fn scale(&self, k: T) -> Self {
        self.map(|v| T::multiply(k, v))
    }

    /// Divide every element by `k`.
    pub fn div_scalar(&self, k: T) -> Self {
        self.map(|v| T::divide(v, k))
    }

    /// Add `k` to every element.
    pub fn add_scalar(&self, k: T) -> Self {
        self.map(|v| T::add(v, k))
    }

    /// Subtract `k` from every element.
    pub fn sub_scalar(&self, k: T) -> Self {
        self.map(|v| T::subtract(v, k))
    }

    /// Outer product `L ⊗ R`, a `len(L) × len(R)` matrix.
    pub fn outer(&self, other: &Self) -> Matrix<T> {
        let data = self
            .values
            .iter()
            .flat_map(|&l| other.values.iter().map(move |&r| T::multiply(l, r)))
            .collect();
        Matrix::from_raw(self.len(), other.len(), data)
    }

    /// Sum of squared elements, `v·v`.
    pub fn norm_squared(&self) -> T {
        self.values
            .iter()
            .fold(T::zero(), |acc, &v| T::multiply_add(v, v, acc))
    }

    /// Euclidean length `sqrt(Σ vᵢ²)`.
    pub fn euclidean_norm(&self) -> T {
        T::sqrt(self.norm_squared())
    }

    /// Row-vector times matrix, `vᵀ·A`.
    ///
    /// The vector is lifted to a `1 × len` matrix, multiplied and narrowed
    /// back to a vector of length `A.cols()`.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::DimensionMismatch` unless `len() == A.rows()`.
    pub fn mul_matrix(&self, matrix: &Matrix<T>) -> Result<Self, LinalgError> {
        let row = Matrix::from_vector(self, Orientation::Row);
        Self::from_matrix(&row.matmul(matrix)?)
    }
}

impl<T: NumericOps + Float> Vector<T> {
    /// Raise every element to the real power `power`.
    ///
    /// Negative elements with a non-integral power give NaN.
    pub fn powf(&self, power: T) -> Self {
        self.map(|v| v.powf(power))
    }

    /// Raise every element to the integer power `n`.
    pub fn powi(&self, n: i32) -> Self {
        self.map(|v| v.powi(n))
    }
}

impl<T: NumericOps> TryFrom<Vec<T>> for Vector<T> {
    type Error = LinalgError;

    fn try_from(values: Vec<T>) -> Result<Self, Self::Error> {
        Self::from_vec(values)
    }
}

impl<T: NumericOps> TryFrom<&Matrix<T>> for Vector<T> {
    type Error = LinalgError;

    fn try_from(matrix: &Matrix<T>) -> Result<Self, Self::Error> {
        Self::from_matrix(matrix)
    }
}

impl<T> From<Vector<T>> for Vec<T> {
    fn from(vector: Vector<T>) -> Self {
        vector.values
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.values[i]
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.values[i]
    }
}

impl<T: NumericOps> Neg for &Vector<T> {
    type Output = Vector<T>;

    fn neg(self) -> Vector<T> {
        Vector::neg(self)
    }
}

impl<T: NumericOps> Neg for Vector<T> {
    type Output = Vector<T>;

    fn neg(self) -> Vector<T> {
        Vector::neg(&self)
    }
}

impl<T: NumericOps> Mul<T> for &Vector<T> {
    type Output = Vector<T>;

    fn mul(self, k: T) -> Vector<T> {
        self.scale(k)
    }
}

impl<T: NumericOps> Div<T> for &Vector<T> {
    type Output = Vector<T>;

    fn div(self, k: T) -> Vector<T> {
        self.div_scalar(k)
    }
}

macro_rules! impl_scalar_left_mul {
    ($($t:ty),*) => {
        $(
            impl Mul<&Vector<$t>> for $t {
                type Output = Vector<$t>;

                fn mul(self, v: &Vector<$t>) -> Vector<$t> {
                    v.scale(self)
                }
            }
        )*
    };
}

impl_scalar_left_mul!(f64, f32, i32, i64);

impl<T: fmt::Display> fmt::Display for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn v(values: &[f64]) -> Vector<f64> {
        Vector::from_slice(values).unwrap()
    }

    // ========================================
    // Construction Tests
    // ========================================

    #[test]
    fn test_from_vec_adopts_values() {
        let a = Vector::from_vec(vec![1.0_f32, 2.0, 3.0]).unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(a.get(0), Some(1.0));
        assert_eq!(a.get(2), Some(3.0));
        assert_eq!(a.get(3), None);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            Vector::<f64>::from_vec(vec![]),
            Err(LinalgError::EmptyDimension { .. })
        ));
        assert!(Vector::<i32>::zeros(0).is_err());
    }

    #[test]
    fn test_zeros() {
        let z = Vector::<i32>::zeros(4).unwrap();
        assert_eq!(z.as_slice(), &[0, 0, 0, 0]);
        assert!(!z.is_empty());
    }

    #[test]
    fn test_clone_is_independent() {
        let a = v(&[1.0, 2.0, 3.0]);
        let mut b = a.clone();
        assert_eq!(a, b);

        b.set(0, 10.0).unwrap();
        assert_ne!(a, b);
        assert_eq!(a[0], 1.0);
    }

    #[test]
    fn test_from_slice_copies() {
        let mut source = vec![1, 2, 3];
        let a = Vector::from_slice(&source).unwrap();
        source[0] = 99;
        assert_eq!(a[0], 1);
    }

    #[test]
    fn test_from_matrix_row_and_column() {
        let row = Matrix::from_rows(&[[1.0, 2.0, 3.0]]).unwrap();
        let col = Matrix::from_rows(&[[1.0], [2.0], [3.0]]).unwrap();
        let expected = v(&[1.0, 2.0, 3.0]);

        assert_eq!(Vector::from_matrix(&row).unwrap(), expected);
        assert_eq!(Vector::try_from(&col).unwrap(), expected);
    }

    #[test]
    fn test_from_matrix_rejects_2d() {
        let m = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert!(matches!(
            Vector::from_matrix(&m),
            Err(LinalgError::NotOneDimensional { shape: (2, 2) })
        ));
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut a = v(&[1.0]);
        assert!(a.set(1, 2.0).is_err());
        a.set(0, 2.0).unwrap();
        assert_eq!(a[0], 2.0);
    }

    // ========================================
    // Arithmetic Tests
    // ========================================

    #[test]
    fn test_math_operators() {
        let a = v(&[1.0, 2.0, 3.0]);
        let b = v(&[1.0, 2.0, 3.0]);
        let a_times_2 = v(&[2.0, 4.0, 6.0]);
        let zero = v(&[0.0, 0.0, 0.0]);

        assert_eq!(a.add(&b).unwrap(), a_times_2);
        assert_eq!(a.sub(&b).unwrap(), zero);
        assert_eq!(2.0 * &a, a_times_2);
        assert_eq!(&a * 2.0, a_times_2);
        assert_eq!(-&a, v(&[-1.0, -2.0, -3.0]));
        assert_eq!(&a_times_2 / 2.0, a);
        assert_eq!(a.hadamard(&zero).unwrap(), zero);
        assert_eq!(a.dot(&b).unwrap(), 14.0);
        assert_relative_eq!(a.euclidean_norm(), 14.0_f64.sqrt());
    }

    #[test]
    fn test_scalar_shift() {
        let a = v(&[1.0, 2.0]);
        assert_eq!(a.add_scalar(1.0), v(&[2.0, 3.0]));
        assert_eq!(a.sub_scalar(1.0), v(&[0.0, 1.0]));
    }

    #[test]
    fn test_elementwise_power() {
        let a = v(&[1.0, 2.0, 3.0]);
        assert_eq!(a.powi(2), a.hadamard(&a).unwrap());
        let cubes = a.powf(3.0);
        assert_relative_eq!(cubes[1], 8.0);
        assert_relative_eq!(cubes[2], 27.0);
        assert_eq!(a.powi(0), v(&[1.0, 1.0, 1.0]));

        let roots = v(&[4.0, 9.0, 2.0]).powf(0.5);
        assert_relative_eq!(roots[0], 2.0);
        assert_relative_eq!(roots[1], 3.0);
        assert_relative_eq!(roots[2], std::f64::consts::SQRT_2);

        assert!(v(&[-8.0]).powf(1.0 / 3.0)[0].is_nan());
        assert_eq!(v(&[2.0, -0.5]).powi(-1), v(&[0.5, -2.0]));
    }

    #[test]
    fn test_elementwise_div() {
        let a = v(&[2.0, 9.0]);
        let b = v(&[4.0, 3.0]);
        assert_eq!(a.elementwise_div(&b).unwrap(), v(&[0.5, 3.0]));
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = v(&[1.0, 2.0]);
        let b = v(&[1.0, 2.0, 3.0]);

        assert!(a.add(&b).unwrap_err().is_dimension_mismatch());
        assert!(a.sub(&b).unwrap_err().is_dimension_mismatch());
        assert!(a.dot(&b).unwrap_err().is_dimension_mismatch());
        assert!(a.hadamard(&b).unwrap_err().is_dimension_mismatch());
        assert!(a.elementwise_div(&b).unwrap_err().is_dimension_mismatch());
    }

    #[test]
    fn test_outer_product() {
        let l = Vector::from_vec(vec![1, 2]).unwrap();
        let r = Vector::from_vec(vec![3, 4, 5]).unwrap();
        let outer = l.outer(&r);

        assert_eq!(outer.shape(), (2, 3));
        assert_eq!(
            outer,
            Matrix::from_rows(&[[3, 4, 5], [6, 8, 10]]).unwrap()
        );
    }

    #[test]
    fn test_int_norm_truncates() {
        let a = Vector::from_vec(vec![1, 1, 1]).unwrap();
        assert_eq!(a.euclidean_norm(), 1);
        let b = Vector::from_vec(vec![3, 4]).unwrap();
        assert_eq!(b.euclidean_norm(), 5);
    }

    #[test]
    fn test_row_vector_times_matrix() {
        let a = v(&[1.0, 2.0]);
        let m = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(a.mul_matrix(&m).unwrap(), v(&[9.0, 12.0, 15.0]));

        let wrong = v(&[1.0, 2.0, 3.0]);
        assert!(wrong.mul_matrix(&m).unwrap_err().is_dimension_mismatch());
    }

    #[test]
    fn test_map_changes_type() {
        let a = Vector::from_vec(vec![1, 2, 3]).unwrap();
        let b: Vector<f64> = a.map(|x| x as f64 * 0.5);
        assert_eq!(b, v(&[0.5, 1.0, 1.5]));
    }

    #[test]
    fn test_display() {
        let a = Vector::from_vec(vec![1, -2, 3]).unwrap();
        assert_eq!(format!("{}", a), "1,-2,3");
    }

    #[test]
    fn test_into_vec_round_trip() {
        let a = v(&[1.0, 2.0]);
        let raw: Vec<f64> = a.clone().into();
        assert_eq!(raw, vec![1.0, 2.0]);
        assert_eq!(Vector::try_from(raw).unwrap(), a);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_plain_list() {
        let a = v(&[1.0, 2.5]);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "[1.0,2.5]");
        let back: Vector<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
        assert!(serde_json::from_str::<Vector<f64>>("[]").is_err());
    }
}
