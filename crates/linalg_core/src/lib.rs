//! # linalg_core: Dense Linear Algebra over Pluggable Arithmetic
//!
//! ## Layer 1 (Foundation) Role
//!
//! linalg_core is the bottom layer of the workspace, providing:
//! - The scalar capability contract (`ops::NumericOps`)
//! - Fixed-length vectors (`vector::Vector`)
//! - Row-major matrices (`matrix::Matrix`, `matrix::Orientation`)
//! - Multiplication kernels (`kernel`)
//! - Structured matrix factories (`builder::MatrixBuilder`)
//! - Error types: `LinalgError` (`error`)
//!
//! ## Value Semantics
//!
//! Containers own their storage exclusively. Arithmetic returns fresh
//! containers; only indexed assignment mutates in place. Shape errors are
//! returned as `Err(LinalgError)` at the call that caused them.
//!
//! ## Usage Examples
//!
//! ```rust
//! use linalg_core::{Matrix, MatrixBuilder, Vector};
//!
//! let v = Vector::from_vec(vec![1.0, 2.0, 3.0]).unwrap();
//! let a = MatrixBuilder::identity::<f64>(3).unwrap().scale(2.0);
//!
//! let w = a.mul_vector(&v).unwrap();
//! assert_eq!(w.as_slice(), &[2.0, 4.0, 6.0]);
//!
//! let outer = v.outer(&w);
//! assert_eq!(outer.shape(), (3, 3));
//! assert_eq!(outer[(2, 1)], 12.0);
//!
//! let bad = Matrix::<f64>::zeros(2, 2).unwrap();
//! assert!(bad.mul_vector(&v).is_err());
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` (default): Row-partitioned multiplication on the rayon pool
//! - `serde`: Serialisation for `Vector`, `Matrix` and `Orientation`

#![deny(missing_docs)]

pub mod builder;
pub mod error;
pub mod kernel;
pub mod matrix;
pub mod ops;
pub mod vector;

pub use builder::MatrixBuilder;
pub use error::{LinalgError, Shape};
#[cfg(feature = "parallel")]
pub use kernel::ParallelKernel;
pub use kernel::{MultiplyKernel, SequentialKernel, PARALLEL_THRESHOLD};
pub use matrix::{Matrix, Orientation};
pub use ops::NumericOps;
pub use vector::Vector;
