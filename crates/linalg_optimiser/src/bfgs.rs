//! BFGS quasi-Newton minimiser.
//!
//! Maintains an approximation `B⁻¹` of the inverse Hessian, starting at the
//! identity. Each iteration steps along `p = -B⁻¹·g` with a length from the
//! line search, then applies the rank-two secant update with
//! `s = α·p` and `y = g_next - g`:
//!
//! ```text
//! B⁻¹ ← B⁻¹ + (sᵗy + yᵗB⁻¹y) / (sᵗy)² · s sᵗ  −  (B⁻¹y sᵗ + s yᵗB⁻¹) / sᵗy
//! ```
//!
//! If `p` is not a descent direction, `B⁻¹` is reset to the identity. A pair
//! with `sᵗy < 0` is skipped so the approximation stays positive definite.
//!
//! # Example
//!
//! ```
//! use linalg_core::Vector;
//! use linalg_optimiser::{problems, BfgsMinimizer, CancellationToken, Minimizer};
//!
//! let mut bfgs = BfgsMinimizer::new(problems::paraboloid());
//! let x0 = Vector::from_vec(vec![1.0, 4.0, -5.0]).unwrap();
//!
//! let report = bfgs.minimize(&x0, &CancellationToken::new()).unwrap();
//! assert!(report.termination.is_converged());
//! for xi in report.solution.iter() {
//!     assert!((xi + 5.0).abs() < 1e-8);
//! }
//! ```

use linalg_core::{Matrix, MatrixBuilder, Vector};
use tracing::{debug, info, warn};

use crate::cancellation::CancellationToken;
use crate::config::OptimiserConfig;
use crate::error::OptimiserError;
use crate::line_search::LineSearch;
use crate::minimizer::{
    MinimizationReport, Minimizer, NumericFailure, Objective, ProgressCallback, Termination,
};

/// Quasi-Newton minimiser with a BFGS inverse-Hessian update.
#[derive(Clone)]
pub struct BfgsMinimizer {
    objective: Objective,
    config: OptimiserConfig,
    progress: Option<ProgressCallback>,
    last_report: Option<MinimizationReport>,
}

/// Iteration state of one run.
struct State {
    x: Vector<f64>,
    fx: f64,
    grad: Vector<f64>,
    grad_norm: f64,
    b_inv: Matrix<f64>,
    step: f64,
    iterations: usize,
}

impl State {
    fn report(&self, termination: Termination) -> MinimizationReport {
        MinimizationReport {
            solution: self.x.clone(),
            termination,
            iterations: self.iterations,
            gradient_norm: self.grad_norm,
            objective_value: self.fx,
        }
    }
}

impl BfgsMinimizer {
    /// Create a minimiser with the default configuration.
    pub fn new(objective: Objective) -> Self {
        Self {
            objective,
            config: OptimiserConfig::default(),
            progress: None,
            last_report: None,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: OptimiserConfig) -> Self {
        self.config = config;
        self
    }

    /// Install a progress callback.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &OptimiserConfig {
        &self.config
    }

    fn run(
        &self,
        x0: &Vector<f64>,
        token: &CancellationToken,
    ) -> Result<MinimizationReport, OptimiserError> {
        self.config.validate()?;
        let cfg = &self.config;
        let line_search = LineSearch::new(cfg.line_search);

        let grad = self.objective.gradient(x0)?;
        let mut state = State {
            x: x0.clone(),
            fx: self.objective.value(x0),
            grad_norm: grad.euclidean_norm(),
            grad,
            b_inv: MatrixBuilder::identity(x0.len())?,
            step: cfg.line_search.initial_step,
            iterations: 0,
        };

        loop {
            if token.is_cancelled() {
                return Ok(state.report(Termination::Cancelled));
            }
            if state.grad_norm.is_nan() {
                return Ok(state.report(Termination::NumericFailure(NumericFailure::NanGradient)));
            }
            if state.grad_norm <= cfg.gradient_tolerance {
                return Ok(state.report(Termination::Converged));
            }
            if state.iterations >= cfg.max_iterations {
                return Ok(state.report(Termination::MaxIterations));
            }

            let mut p = state.b_inv.mul_vector(&state.grad.neg())?;
            if state.grad.dot(&p)? >= 0.0 {
                debug!(iteration = state.iterations, "Not a descent direction, resetting inverse Hessian");
                state.b_inv = MatrixBuilder::identity(state.x.len())?;
                p = state.grad.neg();
            }

            let outcome =
                line_search.search(&self.objective, &state.x, state.fx, &state.grad, &p, state.step)?;
            if token.is_cancelled() {
                return Ok(state.report(Termination::Cancelled));
            }
            let alpha = outcome.alpha;
            if !outcome.accepted || alpha.is_nan() || alpha < cfg.line_search.min_step {
                return Ok(state.report(Termination::NumericFailure(NumericFailure::DegenerateStep)));
            }

            let s = p.scale(alpha);
            let x_next = state.x.add(&s)?;
            let grad_next = self.objective.gradient(&x_next)?;
            let grad_norm_next = grad_next.euclidean_norm();
            if grad_norm_next.is_nan() {
                // x_next is discarded; the report keeps the previous iterate.
                return Ok(state.report(Termination::NumericFailure(NumericFailure::NanGradient)));
            }
            let y = grad_next.sub(&state.grad)?;

            state.x = x_next;
            state.fx = outcome.value;
            state.grad = grad_next;
            state.grad_norm = grad_norm_next;
            state.step = alpha;
            state.iterations += 1;

            let sy = s.dot(&y)?;
            if sy.abs() <= cfg.curvature_epsilon {
                return Ok(
                    state.report(Termination::NumericFailure(NumericFailure::CurvatureBreakdown))
                );
            }
            if token.is_cancelled() {
                return Ok(state.report(Termination::Cancelled));
            }
            if sy > 0.0 {
                state.b_inv = inverse_hessian_update(&state.b_inv, &s, &y, sy)?;
            } else {
                debug!(iteration = state.iterations, sy, "Skipping update with negative curvature");
            }
            if token.is_cancelled() {
                return Ok(state.report(Termination::Cancelled));
            }

            debug!(
                iteration = state.iterations,
                alpha,
                gradient_norm = state.grad_norm,
                value = state.fx,
                "BFGS step"
            );
            if let Some(progress) = &self.progress {
                progress(&state.x, state.grad_norm);
            }
        }
    }
}

/// Rank-two BFGS update of the inverse Hessian for `sy = sᵗy ≠ 0`.
fn inverse_hessian_update(
    b_inv: &Matrix<f64>,
    s: &Vector<f64>,
    y: &Vector<f64>,
    sy: f64,
) -> Result<Matrix<f64>, OptimiserError> {
    let b_y = b_inv.mul_vector(y)?;
    let yt_b = y.mul_matrix(b_inv)?;
    let y_b_y = y.dot(&b_y)?;

    let curvature = s.outer(s).scale((sy + y_b_y) / (sy * sy));
    let cross = b_y.outer(s).add(&s.outer(&yt_b))?.div_scalar(sy);
    Ok(b_inv.add(&curvature)?.sub(&cross)?)
}

impl Minimizer for BfgsMinimizer {
    fn name(&self) -> &'static str {
        "bfgs"
    }

    fn minimize(
        &mut self,
        x0: &Vector<f64>,
        token: &CancellationToken,
    ) -> Result<MinimizationReport, OptimiserError> {
        let report = self.run(x0, token)?;
        match report.termination {
            Termination::Converged | Termination::MaxIterations => info!(
                method = self.name(),
                iterations = report.iterations,
                gradient_norm = report.gradient_norm,
                termination = %report.termination,
                "Minimisation finished"
            ),
            Termination::Cancelled | Termination::NumericFailure(_) => warn!(
                method = self.name(),
                iterations = report.iterations,
                gradient_norm = report.gradient_norm,
                termination = %report.termination,
                "Minimisation stopped early"
            ),
        }
        self.last_report = Some(report.clone());
        Ok(report)
    }

    fn last_report(&self) -> Option<&MinimizationReport> {
        self.last_report.as_ref()
    }
}
