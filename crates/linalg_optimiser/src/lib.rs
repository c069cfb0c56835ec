//! # linalg_optimiser
//!
//! Gradient-based unconstrained minimisers over `linalg_core` vectors.
//!
//! ## Architecture Position
//!
//! Layer 2 of the workspace. Depends on `linalg_core` (L1) for vectors,
//! matrices and shape errors.
//!
//! ## Modules
//!
//! - `line_search`: Backtracking step-length selection (Armijo or Wolfe)
//! - `bfgs`: Quasi-Newton minimiser with an inverse-Hessian update
//! - `conjugate_gradient`: Fletcher-Reeves nonlinear conjugate gradient
//! - `minimizer`: `Minimizer` trait, `Objective` and `MinimizationReport`
//! - `cancellation` / `handle`: Cooperative cancellation and async runs
//! - `problems`: Built-in objectives with known minimisers
//!
//! ## Example
//!
//! ```rust
//! use linalg_core::Vector;
//! use linalg_optimiser::prelude::*;
//!
//! let objective = Objective::new(
//!     |x: &Vector<f64>| (x[0] - 3.0).powi(2) + (x[1] + 1.0).powi(2),
//!     |x: &Vector<f64>| Vector::from_vec(vec![2.0 * (x[0] - 3.0), 2.0 * (x[1] + 1.0)]).unwrap(),
//! );
//!
//! let mut bfgs = BfgsMinimizer::new(objective).with_config(OptimiserConfig::fast());
//! let x0 = Vector::from_vec(vec![0.0, 0.0]).unwrap();
//! let report = bfgs.minimize(&x0, &CancellationToken::new()).unwrap();
//!
//! assert_eq!(report.termination, Termination::Converged);
//! assert!((report.solution[0] - 3.0).abs() < 1e-6);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` (default): Forwards to `linalg_core/parallel`
//! - `serde`: Serialisation of configuration and reports

#![deny(missing_docs)]

pub mod bfgs;
pub mod cancellation;
pub mod config;
pub mod conjugate_gradient;
pub mod handle;
pub mod line_search;
pub mod minimizer;
pub mod problems;

mod error;

pub use bfgs::BfgsMinimizer;
pub use cancellation::CancellationToken;
pub use config::{ConjugateStep, LineSearchConfig, LineSearchPolicy, OptimiserConfig};
pub use conjugate_gradient::NonlinearConjugateGradient;
pub use error::OptimiserError;
pub use handle::MinimizationHandle;
pub use line_search::{LineSearch, LineSearchOutcome};
pub use minimizer::{
    GradientFn, MinimizationReport, Minimizer, NumericFailure, Objective, ObjectiveFn,
    ProgressCallback, Termination,
};
pub use problems::Problem;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bfgs::BfgsMinimizer;
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::*;
    pub use crate::conjugate_gradient::NonlinearConjugateGradient;
    pub use crate::minimizer::*;
    pub use crate::OptimiserError;
}
