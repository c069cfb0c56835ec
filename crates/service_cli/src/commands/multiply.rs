//! Multiply command implementation
//!
//! Multiplies two deterministic square matrices with every available kernel
//! and compares the products.

use std::time::{Duration, Instant};

use linalg_core::{Matrix, MultiplyKernel, SequentialKernel};
use tracing::{info, warn};

use crate::{CliError, Result};

/// Deterministic `n×n` test matrix with small integer-valued entries
pub fn test_matrix(n: usize, seed: usize) -> Result<Matrix<f64>> {
    let data = (0..n * n)
        .map(|k| {
            let (i, j) = (k / n, k % n);
            ((i * 7 + j * 3 + seed * 5) % 11) as f64 - 5.0
        })
        .collect();
    Ok(Matrix::from_vec(n, n, data)?)
}

/// Product and timing of one kernel
#[derive(Debug, Clone)]
pub struct KernelRun {
    /// Kernel label
    pub kernel: &'static str,
    /// Wall-clock time of the multiplication
    pub elapsed: Duration,
    /// Product matrix
    pub product: Matrix<f64>,
}

fn time_kernel<K: MultiplyKernel<f64>>(
    kernel: &'static str,
    implementation: &K,
    a: &Matrix<f64>,
    b: &Matrix<f64>,
) -> Result<KernelRun> {
    let started = Instant::now();
    let product = implementation.multiply(a, b)?;
    Ok(KernelRun {
        kernel,
        elapsed: started.elapsed(),
        product,
    })
}

/// Multiply two `size×size` matrices with each kernel
pub fn compare_kernels(size: usize) -> Result<Vec<KernelRun>> {
    if size == 0 {
        return Err(CliError::InvalidArgument("Size must be positive".to_string()));
    }
    let a = test_matrix(size, 0)?;
    let b = test_matrix(size, 1)?;

    let mut runs = vec![time_kernel("sequential", &SequentialKernel, &a, &b)?];
    #[cfg(feature = "parallel")]
    runs.push(time_kernel(
        "parallel",
        &linalg_core::ParallelKernel::default(),
        &a,
        &b,
    )?);

    let started = Instant::now();
    let product = a.matmul(&b)?;
    runs.push(KernelRun {
        kernel: "auto",
        elapsed: started.elapsed(),
        product,
    });
    Ok(runs)
}

/// Run the multiply command
pub fn run(size: usize) -> Result<()> {
    info!("Multiplying two {}x{} matrices...", size, size);
    let runs = compare_kernels(size)?;

    println!("\n┌────────────┬──────────────┬────────────────────┐");
    println!("│ Kernel     │ Elapsed      │ Frobenius norm     │");
    println!("├────────────┼──────────────┼────────────────────┤");
    for run in &runs {
        println!(
            "│ {:<10} │ {:<12} │ {:<18.6e} │",
            run.kernel,
            format!("{:.3?}", run.elapsed),
            run.product.frobenius_norm()
        );
    }
    println!("└────────────┴──────────────┴────────────────────┘");

    let reference = &runs[0].product;
    let agree = runs.iter().all(|run| &run.product == reference);
    if agree {
        info!("All kernels agree");
    } else {
        warn!("Kernel products differ");
        return Err(CliError::InvalidArgument(
            "Kernel products differ".to_string(),
        ));
    }
    Ok(())
}
