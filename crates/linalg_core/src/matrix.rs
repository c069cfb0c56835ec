//! Row-major dense matrix.
//!
//! [`Matrix<T>`] stores `rows × cols` elements contiguously in row-major
//! order. Both dimensions are at least one and fixed after construction.
//! Arithmetic returns new matrices and never aliases its operands.
//!
//! Multiplication dispatches to a [`MultiplyKernel`]: small products run on
//! the calling thread and large ones are split across worker threads when the
//! `parallel` feature is enabled. Both paths accumulate each output element in
//! the same order and therefore produce identical results.
//!
//! # Example
//!
//! ```
//! use linalg_core::{Matrix, MatrixBuilder};
//!
//! let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
//! let i = MatrixBuilder::identity::<f64>(2).unwrap();
//!
//! assert_eq!(a.matmul(&i).unwrap(), a);
//! assert_eq!(a.transpose().row(0), Some(&[1.0, 3.0][..]));
//! ```

use std::fmt;
use std::ops::{Div, Index, IndexMut, Mul, Neg};

use num_traits::Float;

use crate::error::{LinalgError, Shape};
use crate::kernel::{self, MultiplyKernel};
use crate::ops::NumericOps;
use crate::vector::Vector;

/// How a vector is laid out when lifted into a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// `len × 1`
    #[default]
    Column,
    /// `1 × len`
    Row,
}

/// Dense `rows × cols` matrix with row-major storage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "MatrixRepr<T>",
        into = "MatrixRepr<T>",
        bound(
            serialize = "T: NumericOps + serde::Serialize",
            deserialize = "T: NumericOps + serde::Deserialize<'de>"
        )
    )
)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: NumericOps> Matrix<T> {
    /// Adopt a row-major buffer as matrix storage without copying.
    ///
    /// # Errors
    ///
    /// - `LinalgError::EmptyDimension` if either dimension is zero
    /// - `LinalgError::BufferLength` if `data.len() != rows * cols`
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, LinalgError> {
        if rows == 0 || cols == 0 {
            return Err(LinalgError::EmptyDimension {
                shape: (rows, cols),
            });
        }
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(LinalgError::BufferLength {
                shape: (rows, cols),
                len: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Build a matrix by copying nested rows.
    ///
    /// # Errors
    ///
    /// - `LinalgError::EmptyDimension` if there are no rows or the first row is empty
    /// - `LinalgError::RaggedRows` if any row differs in length from the first
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self, LinalgError> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        if rows.is_empty() || cols == 0 {
            return Err(LinalgError::EmptyDimension {
                shape: (rows.len(), cols),
            });
        }

        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(LinalgError::RaggedRows {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self::from_raw(rows.len(), cols, data))
    }

    /// Create a zero-filled `rows × cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, LinalgError> {
        Self::filled(T::zero(), rows, cols)
    }

    /// Create a `rows × cols` matrix with every element set to `value`.
    ///
    /// # Errors
    ///
    /// - `LinalgError::EmptyDimension` if either dimension is zero
    /// - `LinalgError::SizeOverflow` if `rows * cols` overflows `usize`
    pub fn filled(value: T, rows: usize, cols: usize) -> Result<Self, LinalgError> {
        if rows == 0 || cols == 0 {
            return Err(LinalgError::EmptyDimension {
                shape: (rows, cols),
            });
        }
        let len = rows
            .checked_mul(cols)
            .ok_or(LinalgError::SizeOverflow {
                shape: (rows, cols),
            })?;
        Ok(Self::from_raw(rows, cols, vec![value; len]))
    }

    /// Copy a vector into a single-column or single-row matrix.
    pub fn from_vector(vector: &Vector<T>, orientation: Orientation) -> Self {
        let data = vector.as_slice().to_vec();
        match orientation {
            Orientation::Column => Self::from_raw(vector.len(), 1, data),
            Orientation::Row => Self::from_raw(1, vector.len(), data),
        }
    }

    /// Wrap a buffer whose shape has already been validated.
    #[inline]
    pub(crate) fn from_raw(rows: usize, cols: usize, data: Vec<T>) -> Self {
        debug_assert!(rows > 0 && cols > 0);
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    #[inline]
    pub fn shape(&self) -> Shape {
        (self.rows, self.cols)
    }

    /// Whether `rows == cols`.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Element at `(i, j)`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<T> {
        if i < self.rows && j < self.cols {
            Some(self.data[i * self.cols + j])
        } else {
            None
        }
    }

    /// Overwrite the element at `(i, j)`.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::IndexOutOfBounds` when either index is outside the matrix.
    pub fn set(&mut self, i: usize, j: usize, value: T) -> Result<(), LinalgError> {
        if i >= self.rows || j >= self.cols {
            return Err(LinalgError::IndexOutOfBounds {
                index: (i, j),
                shape: self.shape(),
            });
        }
        self.data[i * self.cols + j] = value;
        Ok(())
    }

    /// Borrow row `i`, or `None` when out of bounds.
    pub fn row(&self, i: usize) -> Option<&[T]> {
        if i < self.rows {
            let start = i * self.cols;
            Some(&self.data[start..start + self.cols])
        } else {
            None
        }
    }

    /// Iterate over rows in order.
    pub fn rows_iter(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        self.data.chunks_exact(self.cols)
    }

    /// Row-major view of all elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Row-major copy of all elements.
    pub fn to_flat_vec(&self) -> Vec<T> {
        self.data.clone()
    }

    /// Consume the matrix and return its row-major storage.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Apply `f` to every element.
    pub fn map<U: NumericOps, F: Fn(T) -> U>(&self, f: F) -> Matrix<U> {
        Matrix::from_raw(self.rows, self.cols, self.data.iter().map(|&v| f(v)).collect())
    }

    fn zip_with<F: Fn(T, T) -> T>(
        &self,
        other: &Self,
        operation: &'static str,
        f: F,
    ) -> Result<Self, LinalgError> {
        if self.shape() != other.shape() {
            return Err(LinalgError::mismatch(operation, self.shape(), other.shape()));
        }
        Ok(Self::from_raw(
            self.rows,
            self.cols,
            self.data
                .iter()
                .zip(&other.data)
                .map(|(&l, &r)| f(l, r))
                .collect(),
        ))
    }

    /// Elementwise sum.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::DimensionMismatch` if the shapes differ.
    pub fn add(&self, other: &Self) -> Result<Self, LinalgError> {
        self.zip_with(other, "matrix addition", T::add)
    }

    /// Elementwise difference.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::DimensionMismatch` if the shapes differ.
    pub fn sub(&self, other: &Self) -> Result<Self, LinalgError> {
        self.zip_with(other, "matrix subtraction", T::subtract)
    }

    /// Elementwise negation.
    pub fn neg(&self) -> Self {
        self.map(T::negate)
    }

    /// Elementwise (Hadamard) product.
    pub fn hadamard(&self, other: &Self) -> Result<Self, LinalgError> {
        self.zip_with(other, "hadamard multiplication", T::multiply)
    }

    /// Elementwise quotient.
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

    /// Matrix product `self · other`.
    ///
    /// Products whose work `m·n·p` reaches
    /// [`PARALLEL_THRESHOLD`](crate::kernel::PARALLEL_THRESHOLD) are computed
    /// on the parallel kernel when it is compiled in.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::DimensionMismatch` unless `self.cols() == other.rows()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use linalg_core::Matrix;
    ///
    /// let a = Matrix::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap();
    /// let b = Matrix::from_rows(&[[1, 2], [3, 4], [5, 6]]).unwrap();
    /// let c = a.matmul(&b).unwrap();
    ///
    /// assert_eq!(c, Matrix::from_rows(&[[22, 28], [49, 64]]).unwrap());
    /// assert!(a.matmul(&a).is_err());
    /// ```
    pub fn matmul(&self, other: &Self) -> Result<Self, LinalgError> {
        kernel::multiply_auto(self, other)
    }

    /// Matrix product computed by an explicit kernel.
    pub fn matmul_with<K: MultiplyKernel<T> + ?Sized>(
        &self,
        other: &Self,
        kernel: &K,
    ) -> Result<Self, LinalgError> {
        kernel.multiply(self, other)
    }

    /// Linear map `A·v`, returning a vector of length `rows()`.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::DimensionMismatch` unless `v.len() == cols()`.
    pub fn mul_vector(&self, vector: &Vector<T>) -> Result<Vector<T>, LinalgError> {
        let column = Self::from_vector(vector, Orientation::Column);
        Vector::from_matrix(&self.matmul(&column)?)
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                data.push(self.data[i * self.cols + j]);
            }
        }
        Self::from_raw(self.cols, self.rows, data)
    }

    /// Frobenius norm `sqrt(Σ aᵢⱼ²)`.
    pub fn frobenius_norm(&self) -> T {
        T::sqrt(
            self.data
                .iter()
                .fold(T::zero(), |acc, &v| T::multiply_add(v, v, acc)),
        )
    }

    /// Narrow a 1×1 matrix to its single element.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::NotScalar` for any other shape.
    pub fn to_scalar(&self) -> Result<T, LinalgError> {
        if self.shape() != (1, 1) {
            return Err(LinalgError::NotScalar {
                shape: self.shape(),
            });
        }
        Ok(self.data[0])
    }
}

impl<T: NumericOps + Float> Matrix<T> {
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

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        &self.data[i * self.cols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        &mut self.data[i * self.cols + j]
    }
}

impl<T: NumericOps> Neg for &Matrix<T> {
    type Output = Matrix<T>;

    fn neg(self) -> Matrix<T> {
        Matrix::neg(self)
    }
}

impl<T: NumericOps> Mul<T> for &Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, k: T) -> Matrix<T> {
        self.scale(k)
    }
}

impl<T: NumericOps> Div<T> for &Matrix<T> {
    type Output = Matrix<T>;

    fn div(self, k: T) -> Matrix<T> {
        self.div_scalar(k)
    }
}

macro_rules! impl_scalar_left_mul {
    ($($t:ty),*) => {
        $(
            impl Mul<&Matrix<$t>> for $t {
                type Output = Matrix<$t>;

                fn mul(self, m: &Matrix<$t>) -> Matrix<$t> {
                    m.scale(self)
                }
            }
        )*
    };
}

impl_scalar_left_mul!(f64, f32, i32, i64);

/// One row per line, elements separated by commas.
impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.data.chunks_exact(self.cols).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", v)?;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
use repr::MatrixRepr;

#[cfg(feature = "serde")]
mod repr {
    use super::Matrix;
    use crate::error::LinalgError;
    use crate::ops::NumericOps;

    /// Serialised form: explicit shape plus row-major data.
    #[derive(serde::Serialize, serde::Deserialize)]
    pub struct MatrixRepr<T> {
        rows: usize,
        cols: usize,
        data: Vec<T>,
    }

    impl<T: NumericOps> TryFrom<MatrixRepr<T>> for Matrix<T> {
        type Error = LinalgError;

        fn try_from(repr: MatrixRepr<T>) -> Result<Self, Self::Error> {
            Matrix::from_vec(repr.rows, repr.cols, repr.data)
        }
    }

    impl<T> From<Matrix<T>> for MatrixRepr<T> {
        fn from(m: Matrix<T>) -> Self {
            Self {
                rows: m.rows,
                cols: m.cols,
                data: m.data,
            }
        }
    }
}
