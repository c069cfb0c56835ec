//! Matrix multiplication kernels.
//!
//! A [`MultiplyKernel`] computes `C = A·B` for already-validated operands.
//! Two kernels are provided:
//!
//! - [`SequentialKernel`]: row by row on the calling thread
//! - [`ParallelKernel`]: output rows statically partitioned into contiguous
//!   blocks, one block per worker (requires the `parallel` feature)
//!
//! Each output element is accumulated as
//! `c[i][j] = a[i][n-1]·b[n-1][j] + (… + (a[i][0]·b[0][j] + 0))`, in ascending
//! `k`, by the same routine in both kernels. Results are therefore bitwise
//! identical regardless of which kernel or how many threads are used.
//!
//! ```text
//!        rows of C
//!   ┌──────────────────┐
//!   │ block 0 (worker 0)│
//!   ├──────────────────┤
//!   │ block 1 (worker 1)│
//!   ├──────────────────┤
//!   │        …         │
//!   └──────────────────┘
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::LinalgError;
use crate::matrix::Matrix;
use crate::ops::NumericOps;

/// Work size `m·n·p` from which [`Matrix::matmul`] switches to the parallel
/// kernel.
pub const PARALLEL_THRESHOLD: usize = 64 * 64 * 64;

/// Strategy for computing a matrix product.
pub trait MultiplyKernel<T: NumericOps> {
    /// Compute `a · b`.
    ///
    /// # Errors
    ///
    /// Returns `LinalgError::DimensionMismatch` unless `a.cols() == b.rows()`.
    fn multiply(&self, a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>, LinalgError>;

    /// Short identifier used in logs and benchmarks.
    fn name(&self) -> &'static str;
}

fn check_shapes<T: NumericOps>(a: &Matrix<T>, b: &Matrix<T>) -> Result<(), LinalgError> {
    if a.cols() != b.rows() {
        return Err(LinalgError::mismatch(
            "matrix multiplication",
            a.shape(),
            b.shape(),
        ));
    }
    Ok(())
}

/// Fill `out` (one output row of length `b.cols()`) with row `i` of `a·b`.
#[inline]
fn row_product<T: NumericOps>(a: &[T], b: &[T], n: usize, p: usize, i: usize, out: &mut [T]) {
    let a_row = &a[i * n..(i + 1) * n];
    for (j, slot) in out.iter_mut().enumerate() {
        let mut acc = T::zero();
        for (k, &a_ik) in a_row.iter().enumerate() {
            acc = T::multiply_add(a_ik, b[k * p + j], acc);
        }
        *slot = acc;
    }
}

/// Single-threaded kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialKernel;

impl<T: NumericOps> MultiplyKernel<T> for SequentialKernel {
    fn multiply(&self, a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
        check_shapes(a, b)?;
        let (m, n, p) = (a.rows(), a.cols(), b.cols());
        let mut out = vec![T::zero(); m * p];
        for (i, row) in out.chunks_exact_mut(p).enumerate() {
            row_product(a.as_slice(), b.as_slice(), n, p, i, row);
        }
        Ok(Matrix::from_raw(m, p, out))
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}

/// Row-partitioned kernel running on the rayon thread pool.
#[cfg(feature = "parallel")]
#[derive(Debug, Clone, Copy)]
pub struct ParallelKernel {
    /// Minimum output rows per worker before the product is split.
    pub min_rows_per_thread: usize,

    /// Rows per block (0 = divide evenly across workers).
    pub chunk_rows: usize,
}

#[cfg(feature = "parallel")]
impl Default for ParallelKernel {
    fn default() -> Self {
        Self {
            min_rows_per_thread: 1,
            chunk_rows: 0,
        }
    }
}

#[cfg(feature = "parallel")]
impl ParallelKernel {
    /// Creates a kernel with a fixed block height.
    #[inline]
    pub fn with_chunk_rows(chunk_rows: usize) -> Self {
        Self {
            chunk_rows,
            ..Default::default()
        }
    }

    /// Sets the minimum rows per worker.
    #[inline]
    pub fn with_min_rows(mut self, min_rows_per_thread: usize) -> Self {
        self.min_rows_per_thread = min_rows_per_thread;
        self
    }

    /// Determines if a product with `rows` output rows is worth splitting.
    #[inline]
    pub fn should_parallelise(&self, rows: usize) -> bool {
        let n_threads = rayon::current_num_threads();
        n_threads > 1 && rows >= self.min_rows_per_thread.max(1) * 2
    }

    /// Rows per block for a product with `rows` output rows.
    #[inline]
    pub fn effective_chunk_rows(&self, rows: usize) -> usize {
        if self.chunk_rows > 0 {
            self.chunk_rows
        } else {
            let n_threads = rayon::current_num_threads();
            rows.div_ceil(n_threads).max(self.min_rows_per_thread).max(1)
        }
    }
}

#[cfg(feature = "parallel")]
impl<T: NumericOps> MultiplyKernel<T> for ParallelKernel {
    fn multiply(&self, a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
        check_shapes(a, b)?;
        if !self.should_parallelise(a.rows()) {
            return SequentialKernel.multiply(a, b);
        }

        let (m, n, p) = (a.rows(), a.cols(), b.cols());
        let block = self.effective_chunk_rows(m);
        let (a_data, b_data) = (a.as_slice(), b.as_slice());
        let mut out = vec![T::zero(); m * p];

        out.par_chunks_mut(block * p)
            .enumerate()
            .for_each(|(block_idx, chunk)| {
                let first_row = block_idx * block;
                for (offset, row) in chunk.chunks_exact_mut(p).enumerate() {
                    row_product(a_data, b_data, n, p, first_row + offset, row);
                }
            });

        Ok(Matrix::from_raw(m, p, out))
    }

    fn name(&self) -> &'static str {
        "parallel"
    }
}

/// Pick a kernel from the work size of the product.
pub(crate) fn multiply_auto<T: NumericOps>(
    a: &Matrix<T>,
    b: &Matrix<T>,
) -> Result<Matrix<T>, LinalgError> {
    #[cfg(feature = "parallel")]
    {
        let work = a
            .rows()
            .saturating_mul(a.cols())
            .saturating_mul(b.cols());
        if work >= PARALLEL_THRESHOLD {
            return ParallelKernel::default().multiply(a, b);
        }
    }
    SequentialKernel.multiply(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_known_product() {
        let a = Matrix::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap();
        let b = Matrix::from_rows(&[[1, 2], [3, 4], [5, 6]]).unwrap();
        let c = SequentialKernel.multiply(&a, &b).unwrap();
        assert_eq!(c, Matrix::from_rows(&[[22, 28], [49, 64]]).unwrap());
    }

    #[test]
    fn test_sequential_rejects_mismatch() {
        let a = Matrix::<f64>::zeros(2, 3).unwrap();
        let err = SequentialKernel.multiply(&a, &a).unwrap_err();
        assert_eq!(
            err,
            LinalgError::mismatch("matrix multiplication", (2, 3), (2, 3))
        );
    }

    #[test]
    fn test_kernel_names() {
        assert_eq!(MultiplyKernel::<f64>::name(&SequentialKernel), "sequential");
    }

    #[cfg(feature = "parallel")]
    mod parallel_tests {
        use super::*;

        fn pattern(rows: usize, cols: usize, seed: f64) -> Matrix<f64> {
            let data = (0..rows * cols)
                .map(|k| ((k as f64 + seed) * 0.37).sin())
                .collect();
            Matrix::from_vec(rows, cols, data).unwrap()
        }

        #[test]
        fn test_parallel_matches_sequential_bitwise() {
            let a = pattern(97, 41, 0.0);
            let b = pattern(41, 53, 1.5);

            let seq = SequentialKernel.multiply(&a, &b).unwrap();
            let par = ParallelKernel::default().multiply(&a, &b).unwrap();
            assert_eq!(seq, par);
        }

        #[test]
        fn test_uneven_blocks_cover_all_rows() {
            let a = pattern(10, 4, 2.0);
            let b = pattern(4, 3, 3.0);

            let seq = SequentialKernel.multiply(&a, &b).unwrap();
            let par = ParallelKernel::with_chunk_rows(3).multiply(&a, &b).unwrap();
            assert_eq!(seq, par);
        }

        #[test]
        fn test_auto_dispatch_above_threshold() {
            let a = pattern(70, 70, 0.5);
            let b = pattern(70, 70, 0.25);

            let auto = a.matmul(&b).unwrap();
            let seq = a.matmul_with(&b, &SequentialKernel).unwrap();
            assert_eq!(auto, seq);
        }

        #[test]
        fn test_parallel_rejects_mismatch() {
            let a = Matrix::<i64>::zeros(4, 2).unwrap();
            assert!(ParallelKernel::default()
                .multiply(&a, &a)
                .unwrap_err()
                .is_dimension_mismatch());
        }

        #[test]
        fn test_effective_chunk_rows() {
            let kernel = ParallelKernel::with_chunk_rows(8);
            assert_eq!(kernel.effective_chunk_rows(100), 8);

            let auto = ParallelKernel::default();
            let n_threads = rayon::current_num_threads();
            assert_eq!(auto.effective_chunk_rows(100), 100_usize.div_ceil(n_threads));
        }

        #[test]
        fn test_small_products_stay_sequential() {
            let kernel = ParallelKernel::default().with_min_rows(1000);
            assert!(!kernel.should_parallelise(10));
        }
    }
}
